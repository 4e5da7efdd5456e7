use crate::error::{Error, Result};
use crate::ir::{Path, PathCommand, Shape, ShapeKind};
use crate::primitives::{arc_path, ensure_positive};
use std::fmt::Write as _;
use std::path::{Path as FsPath, PathBuf};

/// A millimeter-sized drawing that collects shapes in cut order.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    width: f32,
    height: f32,
    background: String,
    shapes: Vec<Shape>,
}

impl Document {
    pub fn create(path: impl Into<PathBuf>, width: f32, height: f32) -> Result<Self> {
        ensure_positive(width, "document width")?;
        ensure_positive(height, "document height")?;
        Ok(Self {
            path: path.into(),
            width,
            height,
            background: "white".to_string(),
            shapes: Vec::new(),
        })
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = color.into();
        self
    }

    pub fn add(&mut self, shape: Shape) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    pub fn extend(&mut self, shapes: impl IntoIterator<Item = Shape>) -> &mut Self {
        self.shapes.extend(shapes);
        self
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn path(&self) -> &FsPath {
        &self.path
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let (w, h) = (fmt(self.width), fmt(self.height));
        svg.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">"
        );
        let _ = writeln!(
            svg,
            "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{}\"/>",
            escape_xml(&self.background)
        );
        for shape in &self.shapes {
            svg.push_str(&shape_svg(shape));
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub fn save(&self) -> Result<()> {
        write_output_svg(&self.to_svg(), Some(&self.path))?;
        tracing::info!(
            path = %self.path.display(),
            shapes = self.shapes.len(),
            "wrote cut file"
        );
        Ok(())
    }
}

fn shape_svg(shape: &Shape) -> String {
    let stroke = format!(
        "fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&shape.stroke.color),
        fmt(shape.stroke.width)
    );
    match &shape.kind {
        ShapeKind::Circle { center, radius } => format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" {stroke}/>",
            fmt(center.x),
            fmt(center.y),
            fmt(*radius)
        ),
        ShapeKind::Rectangle { insert, size } => format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {stroke}/>",
            fmt(insert.x),
            fmt(insert.y),
            fmt(size.width),
            fmt(size.height)
        ),
        ShapeKind::RoundedRectangle {
            insert,
            size,
            corner_radius,
            polarity: crate::ir::Polarity::Convex,
        } => format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{r}\" ry=\"{r}\" {stroke}/>",
            fmt(insert.x),
            fmt(insert.y),
            fmt(size.width),
            fmt(size.height),
            r = fmt(*corner_radius)
        ),
        ShapeKind::RoundedRectangle {
            insert,
            size,
            corner_radius,
            polarity,
        } => {
            let outline = crate::rounded_rect::contour(*insert, *size, *corner_radius, *polarity);
            format!("<path d=\"{}\" {stroke}/>", path_data(&outline))
        }
        ShapeKind::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let outline = arc_path(*center, *radius, *start_angle, *end_angle);
            format!("<path d=\"{}\" {stroke}/>", path_data(&outline))
        }
        ShapeKind::Path(path) => format!("<path d=\"{}\" {stroke}/>", path_data(path)),
        ShapeKind::Text(run) => {
            let (x, y) = (fmt(run.anchor.x), fmt(run.anchor.y));
            let mut out = format!(
                "<text x=\"{x}\" y=\"{y}\" {stroke} font-size=\"{}\" font-family=\"{}\" text-anchor=\"{}\" dominant-baseline=\"middle\"",
                run.style.font_size,
                escape_xml(&run.style.font_family),
                run.style.anchor_mode.as_svg()
            );
            if run.style.rotation != 0.0 {
                let _ = write!(
                    out,
                    " transform=\"rotate({},{x},{y})\"",
                    fmt(run.style.rotation)
                );
            }
            let _ = write!(out, ">{}</text>", escape_xml(&run.content));
            out
        }
    }
}

/// Path-data text for a command sequence.
pub fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for command in &path.commands {
        if !d.is_empty() {
            d.push(' ');
        }
        match command {
            PathCommand::MoveTo(p) => {
                let _ = write!(d, "M {} {}", fmt(p.x), fmt(p.y));
            }
            PathCommand::LineTo(p) => {
                let _ = write!(d, "L {} {}", fmt(p.x), fmt(p.y));
            }
            PathCommand::ArcTo {
                radius,
                large_arc,
                sweep,
                to,
            } => {
                let r = fmt(*radius);
                let _ = write!(
                    d,
                    "A {r} {r} 0 {} {} {} {}",
                    u8::from(*large_arc),
                    u8::from(*sweep),
                    fmt(to.x),
                    fmt(to.y)
                );
            }
            PathCommand::Close => d.push('Z'),
        }
    }
    d
}

/// Formats a coordinate with at most four decimals and no trailing zeros.
fn fmt(value: f32) -> String {
    let mut s = format!("{value:.4}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

pub fn write_output_svg(svg: &str, output: Option<&FsPath>) -> Result<()> {
    match output {
        Some(path) if path != FsPath::new("-") => {
            std::fs::write(path, svg).map_err(Error::Io)?;
        }
        _ => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &FsPath,
    render_cfg: &crate::config::RenderConfig,
) -> anyhow::Result<()> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)?;
    // usvg resolves the mm-sized root to CSS pixels at 96 dpi
    let scale = render_cfg.pixels_per_mm.max(0.1) * 25.4 / 96.0;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate {width}x{height} pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    tracing::info!(path = %output.display(), width, height, "wrote preview");
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
