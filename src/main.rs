//! thermview command-line front end.
//!
//! Runs the detector on an image pair, applies the result to a fresh
//! annotation store and prints the regions.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use thermview::config::{EngineConfig, LogLevel};
use thermview::detection::{self, AnalysisRequest, ScriptDetector};
use thermview::interaction::{AnalysisReport, InteractionController};
use thermview::model::Size;

/// Thermal anomaly detection and annotation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "THERMVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace), overriding the config
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare a candidate image against its baseline
    Analyze {
        /// Reference image of the healthy equipment
        baseline: PathBuf,
        /// Image to inspect
        candidate: PathBuf,
        /// Analysis script to run
        #[arg(long)]
        script: Option<PathBuf>,
        /// Interpreter used to run the script
        #[arg(long)]
        program: Option<String>,
        /// Print the annotation records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the default config path
        #[arg(long)]
        save: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = cli.log_level.unwrap_or(config.preferences.log_level);
    init_logging(level, cli.verbose);

    match run(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig, thermview::config::ConfigError> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::load_from_default_path().unwrap_or_default()),
    }
}

/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: LogLevel, verbose: u8) {
    let level = (0..verbose).fold(level, |level, _| level.more_verbose());
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();
    log::debug!("Logging at {} level", level);
}

fn run(command: Command, mut config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Analyze {
            baseline,
            candidate,
            script,
            program,
            json,
        } => {
            if let Some(script) = script {
                config.analysis.detector.script = script;
            }
            if let Some(program) = program {
                config.analysis.detector.program = program;
            }
            analyze(&config, AnalysisRequest::new(baseline, candidate), json)
        }
        Command::Config { save } => {
            println!("{}", config.to_json()?);
            if save {
                config.save_to_default_path()?;
            }
            Ok(())
        }
    }
}

fn analyze(
    config: &EngineConfig,
    request: AnalysisRequest,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let detector = ScriptDetector::from_config(&config.analysis.detector);
    let [w, h] = config.analysis.fallback_image_size;
    let size = Size::new(w, h);
    let mut controller = InteractionController::from_config(config, size, size);

    let (task, _cancel) = detection::start(&detector, &request);
    controller.begin_analysis();
    let report = controller.finish_analysis(pollster::block_on(task.run()))?;

    if json {
        println!("{}", controller.store().to_json()?);
        return Ok(());
    }

    if let AnalysisReport::Applied {
        elapsed,
        summary,
        used_fallback_size,
        ..
    } = &report
    {
        let image = controller.store().image_size();
        println!(
            "{} ({}x{}{}), analyzed in {:.2}s",
            request.candidate.display(),
            image.width,
            image.height,
            if *used_fallback_size { ", assumed" } else { "" },
            elapsed.as_secs_f32()
        );
        if let Some(fault) = &summary.fault_type {
            println!(
                "Fault type: {} (p = {})",
                fault,
                summary
                    .probability
                    .map_or_else(|| "n/a".to_string(), |p| format!("{:.2}", p))
            );
        }
    }

    let records = controller.store().to_records();
    if records.is_empty() {
        println!("No anomalies detected");
        return Ok(());
    }

    println!("  #  Label            Severity  Area %  Box [x, y, w, h]");
    for record in &records {
        let [x, y, w, h] = record.coords;
        println!(
            "{:>3}  {:<16} {:<8} {:>7.3}  [{:.0}, {:.0}, {:.0}, {:.0}]",
            record.idx,
            record.label.to_string(),
            record.severity.map_or("-", |s| s.name()),
            record.area_frac * 100.0,
            x,
            y,
            w,
            h
        );
    }
    Ok(())
}
