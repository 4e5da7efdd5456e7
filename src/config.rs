use crate::ir::{FontSize, Stroke};
use crate::theme::Palette;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Presentation of a rotary label cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotaryConfig {
    pub hole_color: String,
    pub hole_stroke_width: f32,
    pub label_color: String,
    pub label_size: FontSize,
    pub font_family: String,
    pub stroke_width: f32,
    /// Horizontal distance the underline starts before the text edge.
    pub underline_lead: f32,
    /// Vertical drop of the underline below the text anchor.
    pub underline_drop: f32,
}

impl RotaryConfig {
    pub fn hole_stroke(&self) -> Stroke {
        Stroke::new(self.hole_color.clone(), self.hole_stroke_width)
    }

    pub fn label_stroke(&self) -> Stroke {
        Stroke::new(self.label_color.clone(), self.stroke_width)
    }

    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            hole_color: palette.cut_color.clone(),
            hole_stroke_width: palette.stroke_width,
            label_color: palette.engrave_color.clone(),
            label_size: palette.font_size,
            font_family: palette.font_family.clone(),
            stroke_width: palette.stroke_width,
            ..Self::default()
        }
    }
}

impl Default for RotaryConfig {
    fn default() -> Self {
        Self {
            hole_color: "black".to_string(),
            hole_stroke_width: 0.5,
            label_color: "red".to_string(),
            label_size: FontSize::pt(3.0),
            font_family: "Arial, sans-serif".to_string(),
            stroke_width: 0.5,
            underline_lead: 1.0,
            underline_drop: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster resolution of the PNG preview.
    pub pixels_per_mm: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_mm: 8.0,
            background: "white".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub palette: Palette,
    pub rotary: RotaryConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let palette = Palette::laser_default();
        let render = RenderConfig {
            background: palette.background.clone(),
            ..Default::default()
        };
        Self {
            rotary: RotaryConfig::from_palette(&palette),
            palette,
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PaletteFile {
    cut_color: Option<String>,
    engrave_color: Option<String>,
    marker_color: Option<String>,
    background: Option<String>,
    stroke_width: Option<f32>,
    font_family: Option<String>,
    font_size: Option<FontSize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RotaryConfigFile {
    hole_color: Option<String>,
    hole_stroke_width: Option<f32>,
    label_color: Option<String>,
    label_size: Option<FontSize>,
    stroke_width: Option<f32>,
    underline_lead: Option<f32>,
    underline_drop: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    palette: Option<String>,
    colors: Option<PaletteFile>,
    rotary: Option<RotaryConfigFile>,
    pixels_per_mm: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    match parsed.palette.as_deref() {
        None | Some("laser") | Some("default") => {}
        Some("single-pass") | Some("singlePass") => config.palette = Palette::single_pass(),
        Some(other) => anyhow::bail!("unknown palette '{other}'"),
    }

    if let Some(colors) = parsed.colors {
        if let Some(v) = colors.cut_color {
            config.palette.cut_color = v;
        }
        if let Some(v) = colors.engrave_color {
            config.palette.engrave_color = v;
        }
        if let Some(v) = colors.marker_color {
            config.palette.marker_color = v;
        }
        if let Some(v) = colors.background {
            config.palette.background = v;
        }
        if let Some(v) = colors.stroke_width {
            config.palette.stroke_width = v;
        }
        if let Some(v) = colors.font_family {
            config.palette.font_family = v;
        }
        if let Some(v) = colors.font_size {
            config.palette.font_size = v;
        }
    }

    // Rotary clusters follow the palette unless overridden below.
    config.rotary = RotaryConfig::from_palette(&config.palette);
    if let Some(rotary) = parsed.rotary {
        if let Some(v) = rotary.hole_color {
            config.rotary.hole_color = v;
        }
        if let Some(v) = rotary.hole_stroke_width {
            config.rotary.hole_stroke_width = v;
        }
        if let Some(v) = rotary.label_color {
            config.rotary.label_color = v;
        }
        if let Some(v) = rotary.label_size {
            config.rotary.label_size = v;
        }
        if let Some(v) = rotary.stroke_width {
            config.rotary.stroke_width = v;
        }
        if let Some(v) = rotary.underline_lead {
            config.rotary.underline_lead = v;
        }
        if let Some(v) = rotary.underline_drop {
            config.rotary.underline_drop = v;
        }
    }

    if let Some(v) = parsed.pixels_per_mm {
        config.render.pixels_per_mm = v;
    }
    config.render.background = config.palette.background.clone();

    Ok(config)
}
