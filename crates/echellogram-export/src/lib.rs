//! echellogram-export: Pure output formats for echellogram render passes (sans-IO).
//!
//! Currently supports SVG through [`SvgCanvas`].

pub mod svg;

use echellogram_layout::{EchellogramError, OrderPolyline, RenderConfig, SpectralLine, render};

pub use svg::{SvgCanvas, SvgMetadata};

/// Render an echellogram onto a default-sized [`SvgCanvas`] and serialize
/// it.
///
/// # Errors
///
/// Propagates [`render`] errors (invalid configuration or detector
/// extent); no partial document is produced.
pub fn to_svg(
    polylines: &[OrderPolyline],
    lines: &[SpectralLine],
    detector_half_extent: f64,
    config: &RenderConfig,
    metadata: &SvgMetadata<'_>,
) -> Result<String, EchellogramError> {
    let mut canvas = SvgCanvas::default();
    render(&mut canvas, polylines, lines, detector_half_extent, config)?;
    Ok(canvas.finish(metadata))
}
