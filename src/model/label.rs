//! Fault categories and annotation labels.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// RGB color used when drawing an overlay.
pub type Rgb = [u8; 3];

/// Known thermal fault categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCategory {
    LooseJoint,
    WireOverload,
    PointOverload,
    OilLeakage,
    BushingFailure,
    OtherHotspot,
}

impl FaultCategory {
    /// Get the display name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            FaultCategory::LooseJoint => "Loose Joint",
            FaultCategory::WireOverload => "Wire Overload",
            FaultCategory::PointOverload => "Point Overload",
            FaultCategory::OilLeakage => "Oil Leakage",
            FaultCategory::BushingFailure => "Bushing Failure",
            FaultCategory::OtherHotspot => "Other Hotspot",
        }
    }

    /// Overlay color for manually drawn regions of this category.
    pub fn color(&self) -> Rgb {
        match self {
            FaultCategory::LooseJoint => [0xDC, 0x26, 0x26],
            FaultCategory::WireOverload => [0xF9, 0x73, 0x16],
            FaultCategory::PointOverload => [0xFA, 0xCC, 0x15],
            FaultCategory::OilLeakage => [0x3B, 0x82, 0xF6],
            FaultCategory::BushingFailure => [0x8B, 0x5C, 0xF6],
            FaultCategory::OtherHotspot => [0x10, 0xB9, 0x81],
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [FaultCategory] {
        &[
            FaultCategory::LooseJoint,
            FaultCategory::WireOverload,
            FaultCategory::PointOverload,
            FaultCategory::OilLeakage,
            FaultCategory::BushingFailure,
            FaultCategory::OtherHotspot,
        ]
    }

    /// Case-insensitive lookup by display name (`"point overload"` matches).
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|cat| cat.name().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label attached to an annotation: a known category or operator free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultLabel {
    Category(FaultCategory),
    Custom(String),
}

impl FaultLabel {
    /// Parse a label string, preferring a known category.
    pub fn parse(text: &str) -> Self {
        match FaultCategory::from_name(text) {
            Some(cat) => FaultLabel::Category(cat),
            None => FaultLabel::Custom(text.trim().to_string()),
        }
    }

    pub fn category(&self) -> Option<FaultCategory> {
        match self {
            FaultLabel::Category(cat) => Some(*cat),
            FaultLabel::Custom(_) => None,
        }
    }

    /// Overlay color; free-text labels use the "other hotspot" green.
    pub fn color(&self) -> Rgb {
        self.category()
            .unwrap_or(FaultCategory::OtherHotspot)
            .color()
    }
}

impl From<FaultCategory> for FaultLabel {
    fn from(cat: FaultCategory) -> Self {
        FaultLabel::Category(cat)
    }
}

impl fmt::Display for FaultLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultLabel::Category(cat) => f.write_str(cat.name()),
            FaultLabel::Custom(text) => f.write_str(text),
        }
    }
}

// Labels travel as plain strings on the wire and in persisted records.
impl Serialize for FaultLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FaultLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(FaultLabel::parse(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            FaultLabel::parse("point overload"),
            FaultLabel::Category(FaultCategory::PointOverload)
        );
        assert_eq!(
            FaultLabel::parse("  Oil Leakage "),
            FaultLabel::Category(FaultCategory::OilLeakage)
        );
    }

    #[test]
    fn test_parse_keeps_free_text() {
        let label = FaultLabel::parse("cracked insulator");
        assert_eq!(label, FaultLabel::Custom("cracked insulator".to_string()));
        assert_eq!(label.color(), FaultCategory::OtherHotspot.color());
    }

    #[test]
    fn test_category_colors_distinct() {
        let colors: Vec<Rgb> = FaultCategory::all().iter().map(|c| c.color()).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_label_serializes_as_string() {
        let json = serde_json::to_string(&FaultLabel::from(FaultCategory::LooseJoint))
            .expect("serialize label");
        assert_eq!(json, "\"Loose Joint\"");

        let back: FaultLabel = serde_json::from_str("\"wire overload\"").expect("parse label");
        assert_eq!(back.category(), Some(FaultCategory::WireOverload));
    }
}
