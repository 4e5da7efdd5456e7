use crate::config::{Config, load_config};
use crate::error::{Error, Result as LayoutResult};
use crate::panel::{DEMO_PANEL, PanelSpec, build_document, load_panel, parse_panel};
use crate::render::write_output_svg;
use crate::text_metrics::{FallbackMetrics, FontFile, SystemFonts, TextMeasure};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser, Debug)]
#[command(name = "lcpanel", version, about = "Generate layered laser-cut panel SVGs")]
pub struct Args {
    /// Panel description (.json5) or '-' for stdin. Renders the built-in demo if omitted.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Falls back to the panel's own output, then stdout for SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (palette and rotary label settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Measure label text with this font file instead of system fonts
    #[arg(long = "font")]
    pub font: Option<PathBuf>,

    /// Estimate label widths without loading any font
    #[arg(long = "fastText", conflicts_with = "font")]
    pub fast_text: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_logging()?;
    let args = Args::parse();
    run_with(&args)
}

/// Logs go to stderr so SVG on stdout stays clean. `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_logging() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init()?;
    Ok(())
}

pub fn run_with(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let spec = read_panel(args.input.as_deref())?;
    let metrics = select_metrics(args)?;
    render_panel(&spec, &config, metrics.as_ref(), args)
}

fn render_panel(
    spec: &PanelSpec,
    config: &Config,
    metrics: &dyn TextMeasure,
    args: &Args,
) -> Result<()> {
    let output = args.output.clone().or_else(|| spec.output.clone());
    let doc_path = output.clone().unwrap_or_else(|| PathBuf::from("-"));
    let doc = build_document(spec, config, metrics, &doc_path)?;
    tracing::info!(layers = spec.layers.len(), shapes = doc.shapes().len(), "built panel");
    let svg = doc.to_svg();
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, config)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}

fn read_panel(path: Option<&Path>) -> Result<PanelSpec> {
    match path {
        None => parse_panel(DEMO_PANEL),
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            parse_panel(&buf)
        }
        Some(path) => load_panel(path),
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn select_metrics(args: &Args) -> Result<Box<dyn TextMeasure>> {
    if let Some(path) = &args.font {
        let font = FontFile::open(path)
            .map_err(|err| anyhow::anyhow!("loading font {}: {err}", path.display()))?;
        tracing::debug!(font = font.name(), "measuring with font file");
        return Ok(Box::new(font));
    }
    if args.fast_text {
        return Ok(Box::new(FallbackMetrics::default()));
    }
    Ok(Box::new(SystemOrFallback::default()))
}

/// System fonts, dropping to [`FallbackMetrics`] for families the host
/// does not have.
#[derive(Debug, Default)]
struct SystemOrFallback {
    warned: AtomicBool,
}

impl TextMeasure for SystemOrFallback {
    fn measure_width(&self, text: &str, font_family: &str, font_size: f32) -> LayoutResult<f32> {
        match SystemFonts.measure_width(text, font_family, font_size) {
            Err(Error::FontResolution { family }) => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(%family, "font not found, estimating label widths");
                }
                FallbackMetrics::default().measure_width(text, font_family, font_size)
            }
            other => other,
        }
    }
}
