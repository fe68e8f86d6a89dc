//! Severity tiers derived from region size.
//!
//! The confidence value returned here is a **display heuristic**, not a
//! calibrated probability. It is a fixed per-tier number chosen for the
//! results table and carries no information from the detector itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::label::Rgb;

/// Area fraction above which a region is rated [`Severity::High`].
pub const HIGH_AREA_FRACTION: f32 = 0.05;

/// Area fraction above which a region is rated [`Severity::Medium`].
pub const MEDIUM_AREA_FRACTION: f32 = 0.02;

/// Coarse severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }

    /// Overlay color for detected regions of this tier.
    pub fn color(&self) -> Rgb {
        match self {
            Severity::High => [0xDC, 0x26, 0x26],
            Severity::Medium => [0xF9, 0x73, 0x16],
            Severity::Low => [0xFA, 0xCC, 0x15],
        }
    }

    /// Heuristic confidence shown next to this tier.
    pub fn confidence_heuristic(&self) -> f32 {
        match self {
            Severity::High => 0.75,
            Severity::Medium => 0.65,
            Severity::Low => 0.55,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: Severity,
    /// Display heuristic in `[0, 1]`; see the module docs.
    pub confidence_heuristic: f32,
}

/// Classify a region by the fraction of the image it covers.
pub fn classify(area_fraction: f32) -> Classification {
    let tier = if area_fraction > HIGH_AREA_FRACTION {
        Severity::High
    } else if area_fraction > MEDIUM_AREA_FRACTION {
        Severity::Medium
    } else {
        Severity::Low
    };
    Classification {
        tier,
        confidence_heuristic: tier.confidence_heuristic(),
    }
}
