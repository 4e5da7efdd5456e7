use serde::{Deserialize, Serialize};

use crate::ir::{AnchorMode, Path, Point, Shape};

/// One label of a rotary cluster: its text and the direction it sits in,
/// measured in degrees clockwise from +x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub text: String,
    #[serde(alias = "angle")]
    pub angle_degrees: f32,
}

impl LabelSpec {
    pub fn new(text: impl Into<String>, angle_degrees: f32) -> Self {
        Self {
            text: text.into(),
            angle_degrees,
        }
    }
}

/// Where a label goes and how it is connected to its hole.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub text_anchor: Point,
    pub anchor_mode: AnchorMode,
    pub leader_path: Path,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotaryLabel {
    pub placement: LabelPlacement,
    pub text: Shape,
    pub leader: Shape,
}

/// A hole with its ring of labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RotaryGroup {
    pub hole: Shape,
    pub labels: Vec<RotaryLabel>,
}

impl RotaryGroup {
    /// Shapes in drawing order: the hole, then text and leader per label.
    pub fn into_shapes(self) -> Vec<Shape> {
        let mut shapes = Vec::with_capacity(1 + self.labels.len() * 2);
        shapes.push(self.hole);
        for label in self.labels {
            shapes.push(label.text);
            shapes.push(label.leader);
        }
        shapes
    }
}
