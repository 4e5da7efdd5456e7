use crate::ir::{FontSize, Stroke, TextStyle};
use serde::{Deserialize, Serialize};

/// Colors and default strokes for one laser job.
///
/// Laser drivers map stroke color to an operation, so the palette decides
/// which outlines are cut, which are engraved, and which are only alignment
/// markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub cut_color: String,
    pub engrave_color: String,
    pub marker_color: String,
    pub background: String,
    pub stroke_width: f32,
    pub font_family: String,
    pub font_size: FontSize,
}

impl Palette {
    pub fn laser_default() -> Self {
        Self {
            cut_color: "black".to_string(),
            engrave_color: "red".to_string(),
            marker_color: "green".to_string(),
            background: "white".to_string(),
            stroke_width: 0.5,
            font_family: "Arial, sans-serif".to_string(),
            font_size: FontSize::pt(3.0),
        }
    }

    /// Everything in the cut color, for machines that run one pass.
    pub fn single_pass() -> Self {
        Self {
            engrave_color: "black".to_string(),
            marker_color: "black".to_string(),
            ..Self::laser_default()
        }
    }

    pub fn cut(&self) -> Stroke {
        Stroke::new(self.cut_color.clone(), self.stroke_width)
    }

    pub fn engrave(&self) -> Stroke {
        Stroke::new(self.engrave_color.clone(), self.stroke_width)
    }

    pub fn marker(&self) -> Stroke {
        Stroke::new(self.marker_color.clone(), self.stroke_width)
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            ..TextStyle::default()
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::laser_default()
    }
}
