//! Echellogram rendering: draw order traces, labels, and the detector
//! outline onto a [`Canvas`].
//!
//! A render pass either completes or fails before drawing anything.
//! Preconditions (configuration, viewport) are checked up front; per-item
//! problems (an empty polyline, a line outside the viewport) are skipped.

use crate::canvas::{Canvas, HorizontalAlign, Stroke, TextBackground, TextStyle};
use crate::catalog::display_text;
use crate::color::wavelength_to_rgb;
use crate::labeling::OrderLabel;
use crate::types::{EchellogramError, OrderPolyline, Rgb, RenderConfig, SpectralLine, Viewport};

/// Padding around spectral-line name backgrounds, in output units.
const LINE_LABEL_PADDING: f64 = 1.0;

/// Color for an order trace: the visible color of its mean wavelength,
/// or `neutral` when that wavelength is not visible (or the polyline is
/// empty).
#[must_use]
pub fn order_color(polyline: &OrderPolyline, gamma: f64, neutral: Rgb) -> Rgb {
    polyline
        .mean_wavelength_um()
        .and_then(|um| wavelength_to_rgb(um * 1000.0, gamma))
        .unwrap_or(neutral)
}

/// Draw a complete echellogram.
///
/// Steps:
///
/// 1. Set the canvas range to `±(detector_half_extent * viewport_scale)`.
/// 2. Stroke each order trace in the color of its mean wavelength.
/// 3. Label qualifying orders per [`LabelPolicy`](crate::labeling::LabelPolicy).
/// 4. Write each spectral line's name, on a background patch, at its
///    position if that position is strictly inside the viewport.
/// 5. Outline the detector at its exact half-extent and hide the axes.
///
/// # Errors
///
/// Returns [`EchellogramError::InvalidConfig`] if `config` fails
/// validation, or [`EchellogramError::InvalidViewport`] if
/// `detector_half_extent` is non-finite or zero. In both cases nothing
/// has been drawn.
pub fn render<C: Canvas + ?Sized>(
    canvas: &mut C,
    polylines: &[OrderPolyline],
    lines: &[SpectralLine],
    detector_half_extent: f64,
    config: &RenderConfig,
) -> Result<(), EchellogramError> {
    config.validate()?;
    let viewport = Viewport::symmetric(detector_half_extent, config.viewport_scale)?;
    let detector = Viewport::symmetric(detector_half_extent, 1.0)?;
    let orientation = config.orientation;

    canvas.set_limits(orientation.viewport_to_plot(viewport));

    let verbose_order = config
        .labels
        .verbose_order(polylines.iter().map(OrderPolyline::order));

    for polyline in polylines {
        if polyline.is_empty() {
            log::debug!("skipping empty polyline for order {}", polyline.order());
            continue;
        }

        let color = order_color(polyline, config.gamma, config.neutral_color);
        let points: Vec<_> = polyline
            .points()
            .iter()
            .map(|&p| orientation.to_plot(p))
            .collect();
        canvas.polyline(&points, &Stroke::solid(color, config.stroke_width));

        let verbose = verbose_order == Some(polyline.order().unsigned_abs());
        let labels = [
            config.labels.start_label(polyline, &viewport, verbose),
            config.labels.end_label(polyline, &viewport, verbose),
        ];
        for label in labels.into_iter().flatten() {
            draw_order_label(canvas, &label, config);
        }
    }

    let line_style = TextStyle {
        size: config.line_label_size,
        align: HorizontalAlign::Center,
        offset: 0.0,
        background: Some(TextBackground {
            color: Rgb::WHITE,
            opacity: config.line_label_background_opacity,
            padding: LINE_LABEL_PADDING,
        }),
    };
    for line in lines {
        if !viewport.contains(line.position) {
            log::debug!(
                "{} in order {} lies outside the viewport; not labeled",
                line.name,
                line.order,
            );
            continue;
        }
        canvas.text(
            orientation.to_plot(line.position),
            &display_text(&line.name),
            &line_style,
        );
    }

    let outline = Stroke {
        color: Rgb::BLACK,
        width: config.detector_stroke_width,
        opacity: config.detector_opacity,
        dashed: true,
    };
    canvas.polygon(&detector.corners().map(|p| orientation.to_plot(p)), &outline);
    canvas.hide_axes();

    Ok(())
}

fn draw_order_label<C: Canvas + ?Sized>(canvas: &mut C, label: &OrderLabel, config: &RenderConfig) {
    let gap = config.labels.text_gap;
    let offset = match label.align {
        HorizontalAlign::Left => gap,
        HorizontalAlign::Center => 0.0,
        HorizontalAlign::Right => -gap,
    };
    let style = TextStyle {
        size: config.labels.font_size,
        align: label.align,
        offset,
        background: None,
    };
    canvas.text(config.orientation.to_plot(label.anchor), &label.text, &style);
}
