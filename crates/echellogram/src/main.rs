//! echellogram: draw an annotated echellogram from the reference echelle
//! model.
//!
//! Samples the spectral format, assembles per-order traces, projects a
//! line catalog onto the detector, and writes the result as SVG and/or
//! JSON. Useful for:
//!
//! - Checking which catalog lines land in which order
//! - Comparing free-spectral-range and full-bandwidth line coverage
//! - Inspecting a spectral format produced by an external ray tracer
//!   (`--format`)
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin echellogram -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use echellogram_export::{SvgMetadata, to_svg};
use echellogram_layout::color::wavelength_to_rgb;
use echellogram_layout::{
    Detector, EchelleConfig, EchelleModel, LabelPolicy, LineCatalog, OrderPolyline, Orientation,
    RenderConfig, SpectralFormatPoint, SpectralLine, VerboseLabels, WindowKind, assemble, project,
};
use env_logger::Env;
use serde::Serialize;

/// Draw an annotated echellogram.
///
/// Traces each diffraction order of the reference echelle spectrograph
/// across the detector, colors it by wavelength, labels every
/// `--label-stride`-th order, and marks catalog lines where they fall.
#[derive(Parser)]
#[command(name = "echellogram", version)]
struct Cli {
    /// Write the rendered echellogram as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print traced lines and an order summary as JSON instead of the
    /// human-readable report.
    #[arg(long)]
    json: bool,

    /// Match catalog lines against each order's full design bandwidth
    /// instead of its free spectral range.
    #[arg(long)]
    full_bandwidth: bool,

    /// First order to trace.
    #[arg(long, default_value_t = EchelleConfig::DEFAULT_MIN_ORDER, allow_negative_numbers = true)]
    min_order: i32,

    /// Last order to trace.
    #[arg(long, default_value_t = EchelleConfig::DEFAULT_MAX_ORDER, allow_negative_numbers = true)]
    max_order: i32,

    /// Wavelength samples per order, endpoints included.
    #[arg(long, default_value_t = 11, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..=100_000))]
    points_per_order: usize,

    /// Detector pixels along one side.
    #[arg(long, default_value_t = Detector::DEFAULT_PIXELS, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    detector_pixels: u32,

    /// Detector pixel pitch in micrometres.
    #[arg(long, default_value_t = Detector::DEFAULT_PIXEL_SIZE_UM)]
    pixel_size_um: f64,

    /// Line catalog as JSON: a list of `{"name", "wavelength_angstrom"}`
    /// objects or a map of name to angstrom. Defaults to the built-in
    /// stellar catalog.
    #[arg(long)]
    lines: Option<PathBuf>,

    /// Spectral format as a JSON array of `{"order", "wavelength_um",
    /// "x", "y"}` samples, replacing the reference model's own sampling.
    #[arg(long)]
    format: Option<PathBuf>,

    /// Full echelle model config as a JSON string.
    ///
    /// When provided, the order and detector flags are ignored. The JSON
    /// must be a valid `EchelleConfig` serialization; missing fields take
    /// their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Plot detector x horizontally instead of detector y.
    #[arg(long)]
    native_orientation: bool,

    /// Gamma for the dim ends of the visible spectrum.
    #[arg(long, default_value_t = RenderConfig::DEFAULT_GAMMA)]
    gamma: f64,

    /// Label every order whose number is a multiple of this.
    #[arg(long, default_value_t = LabelPolicy::DEFAULT_STRIDE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    label_stride: u32,

    /// Which order carries the explanatory `λ=…nm` / `m=…` labels.
    #[arg(long, value_enum, default_value_t = VerboseArg::Outermost)]
    verbose_labels: VerboseArg,

    /// Give verbose labels to this absolute order number; overrides
    /// `--verbose-labels`.
    #[arg(long, value_name = "N", value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    verbose_order: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Verbose label selection.
#[derive(Clone, Copy, ValueEnum)]
enum VerboseArg {
    /// Only bare numbers.
    Never,
    /// The labeled order with the highest order number.
    Outermost,
}

/// Build an [`EchelleConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// order and detector flags are ignored.
fn echelle_config_from_cli(cli: &Cli) -> Result<EchelleConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(EchelleConfig {
        min_order: cli.min_order,
        max_order: cli.max_order,
        detector: Detector {
            pixels: cli.detector_pixels,
            pixel_size_um: cli.pixel_size_um,
        },
        ..EchelleConfig::default()
    })
}

fn render_config_from_cli(cli: &Cli) -> RenderConfig {
    RenderConfig {
        gamma: cli.gamma,
        orientation: if cli.native_orientation {
            Orientation::Native
        } else {
            Orientation::Transposed
        },
        labels: LabelPolicy {
            stride: cli.label_stride,
            verbose: match (cli.verbose_order, cli.verbose_labels) {
                (Some(n), _) => VerboseLabels::Order(n),
                (None, VerboseArg::Never) => VerboseLabels::Never,
                (None, VerboseArg::Outermost) => VerboseLabels::OutermostLabeled,
            },
            ..LabelPolicy::default()
        },
        ..RenderConfig::default()
    }
}

const fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

fn load_catalog(path: Option<&Path>) -> Result<LineCatalog, String> {
    let Some(path) = path else {
        return Ok(LineCatalog::stellar());
    };
    let json = read_file(path)?;
    LineCatalog::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

fn load_format(path: &Path) -> Result<Vec<SpectralFormatPoint>, String> {
    let json = read_file(path)?;
    serde_json::from_str(&json).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

/// Per-order line of the JSON summary.
#[derive(Serialize)]
struct OrderSummary {
    order: i32,
    points: usize,
    mean_wavelength_um: Option<f64>,
    color: Option<String>,
}

#[derive(Serialize)]
struct Summary<'a> {
    detector_half_extent_mm: f64,
    orders: Vec<OrderSummary>,
    lines: &'a [SpectralLine],
}

fn summarize<'a>(
    polylines: &[OrderPolyline],
    lines: &'a [SpectralLine],
    detector_half_extent_mm: f64,
    gamma: f64,
) -> Summary<'a> {
    let orders = polylines
        .iter()
        .map(|p| {
            let mean = p.mean_wavelength_um();
            OrderSummary {
                order: p.order(),
                points: p.len(),
                mean_wavelength_um: mean,
                color: mean
                    .and_then(|um| wavelength_to_rgb(um * 1000.0, gamma))
                    .map(|c| c.to_hex()),
            }
        })
        .collect();
    Summary {
        detector_half_extent_mm,
        orders,
        lines,
    }
}

fn report(polylines: &[OrderPolyline], lines: &[SpectralLine], window: WindowKind) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Orders traced: {}", polylines.len());
    let _ = writeln!(out, "Line window:   {window:?}");
    let _ = writeln!(out, "Lines found:   {}", lines.len());
    for line in lines {
        let _ = writeln!(
            out,
            "  {:<14} {:>8.4} um  order {:>4}  ({:>8.3}, {:>8.3}) mm",
            echellogram_layout::catalog::display_text(&line.name),
            line.wavelength_um,
            line.order,
            line.position.x,
            line.position.y,
        );
    }
    out
}

fn run(cli: &Cli) -> Result<(), String> {
    let echelle_config = echelle_config_from_cli(cli)?;
    let render_config = render_config_from_cli(cli);
    log::debug!("echelle config: {echelle_config:?}");
    log::debug!("render config: {render_config:?}");

    let mut model = EchelleModel::new(echelle_config).map_err(|e| e.to_string())?;
    let catalog = load_catalog(cli.lines.as_deref())?;
    log::info!("catalog: {} lines", catalog.len());

    let format = match cli.format {
        Some(ref path) => load_format(path)?,
        None => model
            .spectral_format(cli.points_per_order)
            .map_err(|e| e.to_string())?,
    };
    let polylines = assemble(&format);
    log::info!("{} samples in {} order runs", format.len(), polylines.len());

    let window = if cli.full_bandwidth {
        WindowKind::FullBandwidth
    } else {
        WindowKind::FreeSpectralRange
    };
    let lines = project(&catalog, &mut model, window).map_err(|e| e.to_string())?;
    let half_extent = model.detector().half_extent_mm();

    if let Some(ref svg_path) = cli.svg {
        let config_json = serde_json::to_string(&render_config)
            .map_err(|e| format!("Error serializing render config: {e}"))?;
        let description = format!(
            "orders {}..{}, {} lines, {window:?}",
            model.config().min_order,
            model.config().max_order,
            lines.len(),
        );
        let svg = to_svg(
            &polylines,
            &lines,
            half_extent,
            &render_config,
            &SvgMetadata {
                title: Some("echellogram"),
                description: Some(&description),
                config_json: Some(&config_json),
            },
        )
        .map_err(|e| e.to_string())?;
        std::fs::write(svg_path, &svg)
            .map_err(|e| format!("Error writing {}: {e}", svg_path.display()))?;
        log::info!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
    }

    if cli.json {
        let summary = summarize(&polylines, &lines, half_extent, render_config.gamma);
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Error serializing summary: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", report(&polylines, &lines, window));
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(log_filter(cli.verbose)))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            log::error!("{msg}");
            ExitCode::FAILURE
        }
    }
}
