//! Tool selection.

use std::fmt;

/// Tools the host can select. The tool decides what a pointer press starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Drag to pan the view
    #[default]
    Pan,
    /// Click to zoom in around the pointer
    Zoom,
    /// Drag to draw a new region of the selected category
    Draw,
    /// Drag a region to move it, or one of its handles to resize it
    Adjust,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pan => "Pan",
            Tool::Zoom => "Zoom",
            Tool::Draw => "Draw",
            Tool::Adjust => "Adjust",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[Tool::Pan, Tool::Zoom, Tool::Draw, Tool::Adjust]
    }

    /// Whether the tool changes the annotation list.
    pub fn mutates_annotations(&self) -> bool {
        matches!(self, Tool::Draw | Tool::Adjust)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
