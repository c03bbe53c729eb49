//! echellogram-layout: Pure echellogram layout and annotation engine (sans-IO).
//!
//! Turns an echelle spectrograph's spectral format into a labeled drawing:
//! spectral format -> per-order polylines -> line projection ->
//! colored traces, labels, and detector outline on a [`Canvas`].
//!
//! This crate has **no I/O dependencies**. The optical model and ray
//! tracer are reached through the [`OpticalModel`] and [`RayTracer`]
//! traits, and all drawing goes through [`Canvas`]. SVG output lives in
//! `echellogram-export`; the command-line front end in `echellogram`.

pub mod assemble;
pub mod canvas;
pub mod catalog;
pub mod color;
pub mod labeling;
pub mod model;
pub mod optics;
pub mod project;
pub mod render;
pub mod types;

pub use assemble::assemble;
pub use canvas::{Canvas, HorizontalAlign, Stroke, TextBackground, TextStyle};
pub use catalog::{CatalogLine, LineCatalog};
pub use color::wavelength_to_rgb;
pub use labeling::{LabelPolicy, VerboseLabels};
pub use model::{EchelleConfig, EchelleModel};
pub use optics::{
    EchelleOrder, OpticalModel, RayTracer, TraceError, TraceSession, WavelengthWindow, WindowKind,
};
pub use project::{project, project_lines};
pub use render::render;
pub use types::{
    Detector, EchellogramError, OrderPolyline, Orientation, Point, RenderConfig, Rgb,
    SpectralFormatPoint, SpectralLine, Viewport,
};

/// Everything needed to draw one echellogram.
#[derive(Debug, Clone)]
pub struct Echellogram {
    /// One polyline per contiguous run of the spectral format.
    pub polylines: Vec<OrderPolyline>,
    /// Catalog lines found inside the orders.
    pub lines: Vec<SpectralLine>,
    /// Detector half-extent in millimetres.
    pub detector_half_extent: f64,
}

/// Build an [`Echellogram`] from the reference model.
///
/// # Steps
///
/// 1. Sample the spectral format (`points_per_order` per order)
/// 2. Assemble per-order polylines
/// 3. Project the catalog through the model
///
/// # Errors
///
/// Returns [`EchellogramError::InvalidConfig`] if `points_per_order` is
/// below 2, or any error the model raises while listing its orders.
pub fn build(
    model: &mut EchelleModel,
    catalog: &LineCatalog,
    points_per_order: usize,
    window: WindowKind,
) -> Result<Echellogram, EchellogramError> {
    let format = model.spectral_format(points_per_order)?;
    let polylines = assemble(&format);
    let lines = project(catalog, model, window)?;
    log::info!(
        "{} orders, {} spectral lines on the detector",
        polylines.len(),
        lines.len(),
    );
    Ok(Echellogram {
        polylines,
        lines,
        detector_half_extent: model.detector().half_extent_mm(),
    })
}
