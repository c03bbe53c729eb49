//! Render target abstraction.
//!
//! The renderer draws through the [`Canvas`] trait so that the layout
//! logic stays free of any output format. Coordinates passed to a canvas
//! are plot coordinates in the units of the [`Viewport`] given to
//! [`Canvas::set_limits`]; sizes and offsets in styles are in output
//! units (points).

use serde::{Deserialize, Serialize};

use crate::types::{Point, Rgb, Viewport};

/// Line style for polylines and outlines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
    pub opacity: f64,
    pub dashed: bool,
}

impl Stroke {
    /// An opaque solid stroke.
    #[must_use]
    pub const fn solid(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            opacity: 1.0,
            dashed: false,
        }
    }
}

/// Horizontal text alignment relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlign {
    /// Text starts at the anchor and runs right.
    Left,
    Center,
    /// Text ends at the anchor.
    Right,
}

/// Filled patch drawn behind text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBackground {
    pub color: Rgb,
    pub opacity: f64,
    /// Padding around the text extent.
    pub padding: f64,
}

/// Text style. Text is always vertically centered on its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f64,
    pub align: HorizontalAlign,
    /// Horizontal shift from the anchor; positive moves right.
    pub offset: f64,
    pub background: Option<TextBackground>,
}

/// A 2D drawing surface.
pub trait Canvas {
    /// Set the plot range. Called once, before any drawing.
    fn set_limits(&mut self, viewport: Viewport);

    /// Draw an open polyline.
    fn polyline(&mut self, points: &[Point], stroke: &Stroke);

    /// Draw text anchored at `anchor`.
    fn text(&mut self, anchor: Point, text: &str, style: &TextStyle);

    /// Draw a closed, unfilled polygon.
    fn polygon(&mut self, vertices: &[Point], stroke: &Stroke);

    /// Suppress axis ticks and the axes frame.
    fn hide_axes(&mut self);
}
