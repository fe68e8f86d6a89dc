//! The detection service boundary and its script-backed implementation.

use std::future::Future;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use futures::channel::oneshot;

use super::error::DetectionError;
use super::response::DetectionResponse;

/// The image pair to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub baseline: PathBuf,
    pub candidate: PathBuf,
}

impl AnalysisRequest {
    pub fn new(baseline: impl Into<PathBuf>, candidate: impl Into<PathBuf>) -> Self {
        Self {
            baseline: baseline.into(),
            candidate: candidate.into(),
        }
    }
}

/// Anything that can compare a baseline and a candidate image.
///
/// The returned future owns everything it needs so it can be wrapped in an
/// [`super::AnalysisTask`] and cancelled independently of the service.
pub trait DetectionService {
    fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<DetectionResponse, DetectionError>> + Send + 'static;
}

/// Runs the analysis script as `<program> <script> BASELINE CANDIDATE` and
/// parses the JSON line it prints.
///
/// Through [`DetectionService`] the process is watched from a background
/// thread, and dropping or cancelling the run kills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDetector {
    program: String,
    script: PathBuf,
}

impl ScriptDetector {
    pub fn new(program: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
        }
    }

    pub fn from_config(config: &crate::config::DetectorConfig) -> Self {
        Self::new(config.program.clone(), config.script.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Run the script synchronously.
    pub fn run(&self, request: &AnalysisRequest) -> Result<DetectionResponse, DetectionError> {
        self.log_start(request);
        let output = self
            .command(request)
            .output()
            .map_err(|source| self.spawn_error(source))?;
        interpret(output, &request.candidate)
    }

    fn command(&self, request: &AnalysisRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(&self.script)
            .arg(&request.baseline)
            .arg(&request.candidate);
        command
    }

    fn spawn_error(&self, source: io::Error) -> DetectionError {
        DetectionError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    fn log_start(&self, request: &AnalysisRequest) {
        log::info!(
            "Running detector: {} {:?} {:?} {:?}",
            self.program,
            self.script,
            request.baseline,
            request.candidate
        );
    }

    /// Launch the process and a thread that collects its output.
    fn spawn(&self, request: &AnalysisRequest) -> Result<RunningScript, DetectionError> {
        self.log_start(request);
        let mut child = self
            .command(request)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;
        log::debug!("Detector process {} started", child.id());

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let child = Arc::new(Mutex::new(child));
        // Kills the process if the worker cannot be started.
        let process = KillOnDrop(Arc::clone(&child));

        let (sender, receiver) = oneshot::channel();
        let candidate = request.candidate.clone();
        thread::Builder::new()
            .name("detector".to_string())
            .spawn(move || {
                let result = collect_output(&child, stdout, stderr)
                    .map_err(DetectionError::Io)
                    .and_then(|output| interpret(output, &candidate));
                // The receiver is gone if the run was cancelled.
                let _ = sender.send(result);
            })?;

        Ok(RunningScript { receiver, process })
    }
}

/// Turn the finished process output into a response.
fn interpret(output: Output, candidate: &Path) -> Result<DetectionResponse, DetectionError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let exit_error = || DetectionError::ExitStatus {
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    // The script prints exactly one JSON document; take the last non-empty line
    // in case an interpreter warning precedes it.
    let Some(line) = stdout.lines().rev().find(|line| !line.trim().is_empty()) else {
        return Err(if output.status.success() {
            DetectionError::EmptyOutput
        } else {
            exit_error()
        });
    };

    let mut response = match DetectionResponse::from_json(line) {
        Ok(response) => response,
        Err(_) if !output.status.success() => return Err(exit_error()),
        Err(e) => return Err(e.into()),
    };

    if response.is_success() && !response.has_dimensions() {
        fill_dimensions_from_file(&mut response, candidate);
    }

    log::info!(
        "Detector returned {} regions (fault type: {})",
        response.boxes.len(),
        response.fault_type.as_deref().unwrap_or("none")
    );
    Ok(response)
}

/// Read both pipes to the end, then reap the process.
fn collect_output(
    child: &Mutex<Child>,
    stdout: Option<impl Read>,
    stderr: Option<impl Read + Send + 'static>,
) -> io::Result<Output> {
    let stderr_reader = thread::Builder::new()
        .name("detector-stderr".to_string())
        .spawn(move || read_pipe(stderr))?;
    let stdout = read_pipe(stdout)?;
    let stderr = stderr_reader
        .join()
        .map_err(|_| io::Error::other("stderr reader panicked"))??;
    let status = child.lock().unwrap_or_else(PoisonError::into_inner).wait()?;
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

fn read_pipe(pipe: Option<impl Read>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

/// A launched detector process and the channel its result arrives on.
struct RunningScript {
    receiver: oneshot::Receiver<Result<DetectionResponse, DetectionError>>,
    process: KillOnDrop,
}

/// Kills the process on drop unless it has already been reaped.
struct KillOnDrop(Arc<Mutex<Child>>);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let mut child = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let Ok(None) = child.try_wait() {
            log::info!("Stopping detector process {}", child.id());
            if let Err(e) = child.kill() {
                log::warn!("Failed to stop detector process {}: {}", child.id(), e);
            }
        }
    }
}

/// Read missing image dimensions from the candidate file header.
fn fill_dimensions_from_file(response: &mut DetectionResponse, candidate: &Path) {
    match image::image_dimensions(candidate) {
        Ok((width, height)) => {
            log::debug!(
                "Detector omitted image size, read {}x{} from {:?}",
                width,
                height,
                candidate
            );
            response.image_width = Some(width as f32);
            response.image_height = Some(height as f32);
        }
        Err(e) => {
            log::warn!("Could not read dimensions of {:?}: {}", candidate, e);
        }
    }
}

impl DetectionService for ScriptDetector {
    fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<DetectionResponse, DetectionError>> + Send + 'static {
        let spawned = self.spawn(request);

        async move {
            let RunningScript { receiver, process } = spawned?;
            let result = match receiver.await {
                Ok(result) => result,
                Err(_) => Err(DetectionError::WorkerLost),
            };
            drop(process);
            result
        }
    }
}
