//! Declarative panel descriptions.
//!
//! A panel file lists the stacked layers of one enclosure face and the
//! features cut or engraved into them. Feature coordinates are relative to
//! the top-left corner of a panel; the sheet places layers side by side.

use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::ir::{AnchorMode, FontSize, Point, Polarity, Shape, Size};
use crate::layout::{
    LabelSpec, SwitchLabels, backlit_label, border, bordered_text_block, mounting_holes, rotary_labels_low,
    rotary_labels_middle, switch, through_layer_feature,
};
use crate::primitives::{arc, circle, text};
use crate::render::Document;
use crate::rounded_rect::rounded_rectangle;
use crate::text_metrics::TextMeasure;

/// The three-layer switch panel used when no input file is given.
pub const DEMO_PANEL: &str = include_str!("../demos/example_panel.json5");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSpec {
    #[serde(default)]
    pub output: Option<PathBuf>,
    pub width: f32,
    pub height: f32,
    /// Gap around and between panels on the sheet.
    #[serde(default = "default_padding")]
    pub padding: f32,
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

fn default_padding() -> f32 {
    5.0
}

fn default_backlight_radius() -> f32 {
    1.5
}

fn default_text_offset() -> f32 {
    8.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    pub name: String,
    #[serde(default)]
    pub corner_radius: f32,
    #[serde(default)]
    pub polarity: Polarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotaryVariant {
    Middle,
    #[default]
    Low,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Feature {
    /// A round hole, through every listed layer (all layers by default).
    #[serde(rename_all = "camelCase")]
    Hole {
        x: f32,
        y: f32,
        radius: f32,
        #[serde(default)]
        layers: Option<Vec<String>>,
    },
    /// A rectangular opening, optionally with rounded corners.
    #[serde(rename_all = "camelCase")]
    Cutout {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        #[serde(default)]
        corner_radius: f32,
        #[serde(default)]
        polarity: Polarity,
        #[serde(default)]
        layers: Option<Vec<String>>,
    },
    #[serde(rename_all = "camelCase")]
    Arc {
        x: f32,
        y: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        #[serde(default)]
        layers: Option<Vec<String>>,
    },
    /// Engraved text on one layer (the face layer by default).
    #[serde(rename_all = "camelCase")]
    Text {
        x: f32,
        y: f32,
        text: String,
        #[serde(default)]
        layer: Option<String>,
        #[serde(default)]
        anchor: AnchorMode,
        #[serde(default)]
        rotation: f32,
        #[serde(default)]
        size: Option<FontSize>,
    },
    /// An engraved (optionally rounded) frame around a group of controls.
    #[serde(rename_all = "camelCase")]
    Border {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        #[serde(default)]
        corner_radius: f32,
        #[serde(default)]
        layer: Option<String>,
    },
    /// An engraved frame centred on (x, y) with a title in its top edge.
    #[serde(rename_all = "camelCase")]
    TitledBorder {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        title: String,
        #[serde(default)]
        layer: Option<String>,
    },
    /// Text on the face layer with a backlight hole on every other layer.
    #[serde(rename_all = "camelCase")]
    BacklitLabel {
        x: f32,
        y: f32,
        text: String,
        #[serde(default = "default_backlight_radius")]
        backlight_radius: f32,
    },
    /// A switch hole through every layer with backlit labels on any side.
    #[serde(rename_all = "camelCase")]
    Switch {
        x: f32,
        y: f32,
        hole_radius: f32,
        #[serde(default)]
        labels: SwitchLabels,
        #[serde(default = "default_text_offset")]
        text_offset: f32,
        #[serde(default = "default_backlight_radius")]
        backlight_radius: f32,
    },
    /// Corner screw holes on one layer, with alignment markers on the rest.
    #[serde(rename_all = "camelCase")]
    MountingHoles {
        inset: f32,
        radius: f32,
        #[serde(default)]
        layer: Option<String>,
        #[serde(default = "default_true")]
        markers: bool,
    },
    /// A rotary switch hole with radial labels on the face layer.
    #[serde(rename_all = "camelCase")]
    Rotary {
        x: f32,
        y: f32,
        hole_radius: f32,
        labels: Vec<LabelSpec>,
        padding: f32,
        #[serde(default)]
        variant: RotaryVariant,
        #[serde(default)]
        line_length: Option<f32>,
        #[serde(default)]
        layer: Option<String>,
        /// Punch the hole through the other layers too.
        #[serde(default = "default_true")]
        through: bool,
    },
}

impl Feature {
    fn name(&self) -> &'static str {
        match self {
            Self::Hole { .. } => "hole",
            Self::Cutout { .. } => "cutout",
            Self::Arc { .. } => "arc",
            Self::Text { .. } => "text",
            Self::Border { .. } => "border",
            Self::TitledBorder { .. } => "titledBorder",
            Self::BacklitLabel { .. } => "backlitLabel",
            Self::Switch { .. } => "switch",
            Self::MountingHoles { .. } => "mountingHoles",
            Self::Rotary { .. } => "rotary",
        }
    }
}

/// Overall sheet dimensions and where each layer's panel starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub width: f32,
    pub height: f32,
    pub layer_offsets: Vec<f32>,
    pub origin_y: f32,
}

impl PanelSpec {
    pub fn sheet(&self) -> Sheet {
        let n = self.layers.len() as f32;
        let layer_offsets = (0..self.layers.len())
            .map(|i| self.padding + i as f32 * (self.width + self.padding))
            .collect();
        Sheet {
            width: self.width * n + 2.0 * n + self.padding * n,
            height: self.height + 2.0 * self.padding,
            layer_offsets,
            origin_y: self.padding,
        }
    }

    fn layer_index(&self, name: &str) -> anyhow::Result<usize> {
        self.layers
            .iter()
            .position(|layer| layer.name == name)
            .with_context(|| format!("unknown layer '{name}'"))
    }
}

pub fn parse_panel(contents: &str) -> anyhow::Result<PanelSpec> {
    let spec: PanelSpec = json5::from_str(contents)?;
    if spec.layers.is_empty() {
        bail!("panel must have at least one layer");
    }
    Ok(spec)
}

pub fn load_panel(path: &Path) -> anyhow::Result<PanelSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading panel {}", path.display()))?;
    parse_panel(&contents).with_context(|| format!("parsing panel {}", path.display()))
}

/// Lays out every layer frame and feature of `spec` into a new document.
pub fn build_document(
    spec: &PanelSpec,
    config: &Config,
    metrics: &dyn TextMeasure,
    output: &Path,
) -> anyhow::Result<Document> {
    if spec.layers.is_empty() {
        bail!("panel must have at least one layer");
    }
    let sheet = spec.sheet();
    let mut doc = Document::create(output, sheet.width, sheet.height)?
        .with_background(config.render.background.clone());
    let palette = &config.palette;
    let panel_size = Size::new(spec.width, spec.height);

    for (layer, offset) in spec.layers.iter().zip(&sheet.layer_offsets) {
        let frame = rounded_rectangle(
            Point::new(*offset, sheet.origin_y),
            panel_size,
            layer.corner_radius,
            palette.cut(),
            layer.polarity,
        )
        .with_context(|| format!("frame of layer '{}'", layer.name))?;
        doc.add(frame);
    }

    let builder = FeatureBuilder {
        spec,
        sheet: &sheet,
        config,
        metrics,
    };
    for (idx, feature) in spec.features.iter().enumerate() {
        let shapes = builder
            .build(feature)
            .with_context(|| format!("feature #{} ({})", idx + 1, feature.name()))?;
        tracing::debug!(feature = feature.name(), shapes = shapes.len(), "built feature");
        doc.extend(shapes);
    }

    Ok(doc)
}

struct FeatureBuilder<'a> {
    spec: &'a PanelSpec,
    sheet: &'a Sheet,
    config: &'a Config,
    metrics: &'a dyn TextMeasure,
}

impl FeatureBuilder<'_> {
    /// Point (x, y) of a panel, before any layer offset.
    fn local(&self, x: f32, y: f32) -> Point {
        Point::new(x, self.sheet.origin_y + y)
    }

    fn face_index(&self) -> usize {
        self.spec.layers.len() - 1
    }

    fn offset_of(&self, layer: Option<&str>, default: usize) -> anyhow::Result<f32> {
        let idx = match layer {
            Some(name) => self.spec.layer_index(name)?,
            None => default,
        };
        Ok(self.sheet.layer_offsets[idx])
    }

    fn offsets_of(&self, layers: Option<&[String]>) -> anyhow::Result<Vec<f32>> {
        match layers {
            None => Ok(self.sheet.layer_offsets.clone()),
            Some(names) => names
                .iter()
                .map(|name| Ok(self.sheet.layer_offsets[self.spec.layer_index(name)?]))
                .collect(),
        }
    }

    fn build(&self, feature: &Feature) -> anyhow::Result<Vec<Shape>> {
        let palette = &self.config.palette;
        let shapes = match feature {
            Feature::Hole {
                x,
                y,
                radius,
                layers,
            } => {
                let hole = circle(self.local(*x, *y), *radius, palette.cut())?;
                through_layer_feature(&hole, &self.offsets_of(layers.as_deref())?)
            }
            Feature::Cutout {
                x,
                y,
                width,
                height,
                corner_radius,
                polarity,
                layers,
            } => {
                let cutout = rounded_rectangle(
                    self.local(*x, *y),
                    Size::new(*width, *height),
                    *corner_radius,
                    palette.cut(),
                    *polarity,
                )?;
                through_layer_feature(&cutout, &self.offsets_of(layers.as_deref())?)
            }
            Feature::Arc {
                x,
                y,
                radius,
                start_angle,
                end_angle,
                layers,
            } => {
                let shape = arc(
                    self.local(*x, *y),
                    *radius,
                    *start_angle,
                    *end_angle,
                    palette.cut(),
                )?;
                through_layer_feature(&shape, &self.offsets_of(layers.as_deref())?)
            }
            Feature::Text {
                x,
                y,
                text: content,
                layer,
                anchor,
                rotation,
                size,
            } => {
                let offset = self.offset_of(layer.as_deref(), self.face_index())?;
                let mut style = palette
                    .text_style()
                    .with_anchor(*anchor)
                    .with_rotation(*rotation);
                if let Some(size) = size {
                    style.font_size = *size;
                }
                vec![text(
                    self.local(*x + offset, *y),
                    content.as_str(),
                    palette.engrave(),
                    style,
                )?]
            }
            Feature::Border {
                x,
                y,
                width,
                height,
                corner_radius,
                layer,
            } => {
                let offset = self.offset_of(layer.as_deref(), self.face_index())?;
                let insert = self.local(*x + offset, *y);
                let size = Size::new(*width, *height);
                if *corner_radius == 0.0 {
                    let center = insert.offset(width / 2.0, height / 2.0);
                    vec![border(center, size, palette.engrave())?]
                } else {
                    vec![rounded_rectangle(
                        insert,
                        size,
                        *corner_radius,
                        palette.engrave(),
                        Polarity::Convex,
                    )?]
                }
            }
            Feature::TitledBorder {
                x,
                y,
                width,
                height,
                title,
                layer,
            } => {
                let offset = self.offset_of(layer.as_deref(), self.face_index())?;
                bordered_text_block(
                    self.local(*x + offset, *y),
                    title,
                    Size::new(*width, *height),
                    palette.engrave(),
                    palette.text_style(),
                    self.metrics,
                )?
            }
            Feature::BacklitLabel {
                x,
                y,
                text: content,
                backlight_radius,
            } => {
                let face = self.face_index();
                let backing = &self.sheet.layer_offsets[..face];
                backlit_label(
                    self.local(*x, *y),
                    content,
                    self.sheet.layer_offsets[face],
                    backing,
                    *backlight_radius,
                    palette.engrave(),
                    palette.cut(),
                    palette.text_style(),
                )?
            }
            Feature::Switch {
                x,
                y,
                hole_radius,
                labels,
                text_offset,
                backlight_radius,
            } => {
                let face = self.face_index();
                switch(
                    self.local(*x, *y),
                    *hole_radius,
                    labels,
                    *text_offset,
                    self.sheet.layer_offsets[face],
                    &self.sheet.layer_offsets[..face],
                    *backlight_radius,
                    palette.engrave(),
                    palette.cut(),
                    palette.text_style(),
                )?
            }
            Feature::MountingHoles {
                inset,
                radius,
                layer,
                markers,
            } => {
                let idx = match layer.as_deref() {
                    Some(name) => self.spec.layer_index(name)?,
                    None => 0,
                };
                let panel = Size::new(self.spec.width, self.spec.height);
                let holes = mounting_holes(
                    self.local(0.0, 0.0),
                    panel,
                    *inset,
                    *radius,
                    palette.cut(),
                )?;
                let own = self.sheet.layer_offsets[idx];
                let mut shapes = through_layer_feature_all(&holes, &[own]);
                if *markers {
                    let others: Vec<f32> = self
                        .sheet
                        .layer_offsets
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != idx)
                        .map(|(_, offset)| *offset)
                        .collect();
                    let marker_holes: Vec<Shape> = holes
                        .iter()
                        .map(|hole| Shape::new(hole.kind.clone(), palette.marker()))
                        .collect();
                    shapes.extend(through_layer_feature_all(&marker_holes, &others));
                }
                shapes
            }
            Feature::Rotary {
                x,
                y,
                hole_radius,
                labels,
                padding,
                variant,
                line_length,
                layer,
                through,
            } => {
                let idx = match layer.as_deref() {
                    Some(name) => self.spec.layer_index(name)?,
                    None => self.face_index(),
                };
                let offset = self.sheet.layer_offsets[idx];
                let center = self.local(*x + offset, *y);
                let rotary = &self.config.rotary;
                let group = match variant {
                    RotaryVariant::Middle => {
                        let Some(line_length) = line_length else {
                            bail!("middle rotary labels need a lineLength");
                        };
                        rotary_labels_middle(
                            center,
                            *hole_radius,
                            labels,
                            *padding,
                            *line_length,
                            rotary,
                        )?
                    }
                    RotaryVariant::Low => rotary_labels_low(
                        center,
                        *hole_radius,
                        labels,
                        *padding,
                        rotary,
                        self.metrics,
                    )?,
                };
                let hole = group.hole.clone();
                let mut shapes = group.into_shapes();
                if *through {
                    let others: Vec<f32> = self
                        .sheet
                        .layer_offsets
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != idx)
                        .map(|(_, other)| *other - offset)
                        .collect();
                    shapes.extend(through_layer_feature(&hole, &others));
                }
                shapes
            }
        };
        Ok(shapes)
    }
}

fn through_layer_feature_all(shapes: &[Shape], offsets: &[f32]) -> Vec<Shape> {
    offsets
        .iter()
        .flat_map(|offset| shapes.iter().map(move |shape| shape.translated(*offset, 0.0)))
        .collect()
}
