use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A position in millimeters. The y axis points down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The point `distance` away from `self` in direction `degrees`
    /// (clockwise from +x in y-down coordinates).
    pub fn polar(self, distance: f32, degrees: f32) -> Self {
        let rad = degrees.to_radians();
        Self::new(self.x + distance * rad.cos(), self.y + distance * rad.sin())
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn min_side(self) -> f32 {
        self.width.min(self.height)
    }
}

impl From<(f32, f32)> for Size {
    fn from((width, height): (f32, f32)) -> Self {
        Self::new(width, height)
    }
}

/// Which way the corners of a rounded rectangle bend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Standard fillet, bulging away from the interior.
    #[default]
    Convex,
    /// Scooped corner, bulging into the interior.
    Concave,
}

/// How a text run's insertion point relates to its rendered extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    Start,
    #[default]
    Middle,
    End,
}

impl AnchorMode {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontUnit {
    Pt,
    Px,
    Mm,
}

impl FontUnit {
    fn suffix(self) -> &'static str {
        match self {
            Self::Pt => "pt",
            Self::Px => "px",
            Self::Mm => "mm",
        }
    }
}

/// A CSS font size such as `3pt`.
///
/// The drawing's user unit is one millimeter of sheet, but font sizes inside
/// an SVG are still resolved with CSS absolute-unit rules against that user
/// unit, so `3pt` renders 4 units tall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontSize {
    pub value: f32,
    pub unit: FontUnit,
}

impl FontSize {
    pub const fn pt(value: f32) -> Self {
        Self {
            value,
            unit: FontUnit::Pt,
        }
    }

    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: FontUnit::Px,
        }
    }

    pub const fn mm(value: f32) -> Self {
        Self {
            value,
            unit: FontUnit::Mm,
        }
    }

    /// Size in drawing user units.
    pub fn user_units(self) -> f32 {
        match self.unit {
            FontUnit::Px => self.value,
            FontUnit::Pt => self.value * 96.0 / 72.0,
            FontUnit::Mm => self.value * 96.0 / 25.4,
        }
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::pt(3.0)
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

static FONT_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9]*\.?[0-9]+)\s*(pt|px|mm)?\s*$").expect("font size pattern")
});

impl FromStr for FontSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = FONT_SIZE_RE
            .captures(s)
            .ok_or_else(|| format!("invalid font size '{s}'"))?;
        let value: f32 = caps[1]
            .parse()
            .map_err(|_| format!("invalid font size '{s}'"))?;
        let unit = match caps.get(2).map(|m| m.as_str()) {
            Some("pt") => FontUnit::Pt,
            Some("mm") => FontUnit::Mm,
            _ => FontUnit::Px,
        };
        Ok(Self { value, unit })
    }
}

impl TryFrom<String> for FontSize {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FontSize> for String {
    fn from(size: FontSize) -> Self {
        size.to_string()
    }
}

/// Outline presentation shared by every shape. Fill is always `none`:
/// the output drives a laser, not a rendered image.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new("black", 1.0)
    }
}

/// Font attributes for a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: FontSize,
    pub font_family: String,
    pub anchor_mode: AnchorMode,
    pub rotation: f32,
}

impl TextStyle {
    pub fn with_anchor(mut self, anchor_mode: AnchorMode) -> Self {
        self.anchor_mode = anchor_mode;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: FontSize::default(),
            font_family: "Arial".to_string(),
            anchor_mode: AnchorMode::Middle,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Circular arc from the current point to `to`.
    ArcTo {
        radius: f32,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

impl PathCommand {
    /// The point the pen ends on, if the command moves it explicitly.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) => Some(p),
            Self::ArcTo { to, .. } => Some(to),
            Self::Close => None,
        }
    }

    fn translated(self, dx: f32, dy: f32) -> Self {
        match self {
            Self::MoveTo(p) => Self::MoveTo(p.offset(dx, dy)),
            Self::LineTo(p) => Self::LineTo(p.offset(dx, dy)),
            Self::ArcTo {
                radius,
                large_arc,
                sweep,
                to,
            } => Self::ArcTo {
                radius,
                large_arc,
                sweep,
                to: to.offset(dx, dy),
            },
            Self::Close => Self::Close,
        }
    }
}

/// An ordered sequence of typed path commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn arc_to(mut self, radius: f32, large_arc: bool, sweep: bool, to: Point) -> Self {
        self.commands.push(PathCommand::ArcTo {
            radius,
            large_arc,
            sweep,
            to,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn start(&self) -> Option<Point> {
        match self.commands.first() {
            Some(PathCommand::MoveTo(p)) => Some(*p),
            _ => None,
        }
    }

    /// Every explicit pen position, in order.
    pub fn points(&self) -> Vec<Point> {
        self.commands.iter().filter_map(PathCommand::end_point).collect()
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::LineTo(_)))
            .count()
    }

    pub fn arc_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::ArcTo { .. }))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            commands: self
                .commands
                .iter()
                .map(|c| c.translated(dx, dy))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub anchor: Point,
    pub content: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Circle {
        center: Point,
        radius: f32,
    },
    Rectangle {
        insert: Point,
        size: Size,
    },
    RoundedRectangle {
        insert: Point,
        size: Size,
        corner_radius: f32,
        polarity: Polarity,
    },
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    },
    Path(Path),
    Text(TextRun),
}

/// A single drawable outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub stroke: Stroke,
}

impl Shape {
    pub fn new(kind: ShapeKind, stroke: Stroke) -> Self {
        Self { kind, stroke }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match &self.kind {
            ShapeKind::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match &self.kind {
            ShapeKind::Text(run) => Some(run),
            _ => None,
        }
    }

    /// A copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let kind = match &self.kind {
            ShapeKind::Circle { center, radius } => ShapeKind::Circle {
                center: center.offset(dx, dy),
                radius: *radius,
            },
            ShapeKind::Rectangle { insert, size } => ShapeKind::Rectangle {
                insert: insert.offset(dx, dy),
                size: *size,
            },
            ShapeKind::RoundedRectangle {
                insert,
                size,
                corner_radius,
                polarity,
            } => ShapeKind::RoundedRectangle {
                insert: insert.offset(dx, dy),
                size: *size,
                corner_radius: *corner_radius,
                polarity: *polarity,
            },
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => ShapeKind::Arc {
                center: center.offset(dx, dy),
                radius: *radius,
                start_angle: *start_angle,
                end_angle: *end_angle,
            },
            ShapeKind::Path(path) => ShapeKind::Path(path.translated(dx, dy)),
            ShapeKind::Text(run) => ShapeKind::Text(TextRun {
                anchor: run.anchor.offset(dx, dy),
                content: run.content.clone(),
                style: run.style.clone(),
            }),
        };
        Self {
            kind,
            stroke: self.stroke.clone(),
        }
    }
}
