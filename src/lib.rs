#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod panel;
pub mod primitives;
pub mod render;
pub mod rounded_rect;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RotaryConfig, load_config};
pub use error::{Error, Result};
pub use ir::{AnchorMode, FontSize, Point, Polarity, Shape, ShapeKind, Size, Stroke, TextStyle};
pub use layout::{
    LabelSpec, RotaryGroup, bordered_text_block, rotary_labels_low, rotary_labels_middle,
    through_layer_feature,
};
pub use panel::{PanelSpec, build_document, load_panel};
pub use primitives::{arc, circle, path, rectangle, text};
pub use render::Document;
pub use rounded_rect::rounded_rectangle;
pub use text_metrics::{FallbackMetrics, FontFile, SystemFonts, TextMeasure};
pub use theme::Palette;
