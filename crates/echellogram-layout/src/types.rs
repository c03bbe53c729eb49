//! Shared types for the echellogram layout engine.

use serde::{Deserialize, Serialize};

use crate::labeling::LabelPolicy;

/// A 2D point on the detector plane, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Detector x (main dispersion direction).
    pub x: f64,
    /// Detector y (cross-dispersion direction).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Swap the two axes.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

/// An RGB color with each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a new color.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Format as a `#rrggbb` hex string.
    ///
    /// Channels are clamped to `[0, 1]` and rounded to the nearest
    /// 8-bit value.
    ///
    /// ```
    /// use echellogram_layout::Rgb;
    ///
    /// assert_eq!(Rgb::new(1.0, 0.5, 0.0).to_hex(), "#ff8000");
    /// ```
    #[must_use]
    pub fn to_hex(self) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b),
        )
    }
}

/// One projected sample of the spectral format: an (order, wavelength)
/// pair traced to the detector plane.
///
/// A spectral format is a flat sequence of these, grouped so that all
/// samples of one order are contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralFormatPoint {
    /// Diffraction order (may be negative).
    pub order: i32,
    /// Wavelength in micrometres.
    pub wavelength_um: f64,
    /// Detector x in millimetres.
    pub x: f64,
    /// Detector y in millimetres.
    pub y: f64,
}

impl SpectralFormatPoint {
    #[must_use]
    pub const fn new(order: i32, wavelength_um: f64, x: f64, y: f64) -> Self {
        Self {
            order,
            wavelength_um,
            x,
            y,
        }
    }

    /// The detector position of this sample.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The trace of a single diffraction order across the detector.
///
/// Built by appending consecutive samples of one order; `points` and
/// `wavelengths` always have the same length. Only the assembler (or a
/// caller constructing test fixtures) appends; renderers read it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPolyline {
    order: i32,
    points: Vec<Point>,
    wavelengths: Vec<f64>,
}

impl OrderPolyline {
    /// Create an empty polyline for the given order.
    #[must_use]
    pub const fn new(order: i32) -> Self {
        Self {
            order,
            points: Vec::new(),
            wavelengths: Vec::new(),
        }
    }

    /// Append one sample.
    pub fn push(&mut self, position: Point, wavelength_um: f64) {
        self.points.push(position);
        self.wavelengths.push(wavelength_um);
    }

    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Detector positions, in sample order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Wavelengths in micrometres, parallel to [`points`](Self::points).
    #[must_use]
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The first sample as `(position, wavelength_um)`.
    #[must_use]
    pub fn first(&self) -> Option<(Point, f64)> {
        Some((*self.points.first()?, *self.wavelengths.first()?))
    }

    /// The last sample as `(position, wavelength_um)`.
    #[must_use]
    pub fn last(&self) -> Option<(Point, f64)> {
        Some((*self.points.last()?, *self.wavelengths.last()?))
    }

    /// Arithmetic mean of the sample wavelengths in micrometres.
    ///
    /// Returns `None` for an empty polyline.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_wavelength_um(&self) -> Option<f64> {
        if self.wavelengths.is_empty() {
            return None;
        }
        Some(self.wavelengths.iter().sum::<f64>() / self.wavelengths.len() as f64)
    }
}

/// A catalog line found inside one order's window and traced to the
/// detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralLine {
    /// Catalog name, possibly containing display markup.
    pub name: String,
    /// Order the line was found in.
    pub order: i32,
    /// Wavelength in micrometres.
    pub wavelength_um: f64,
    /// Traced detector position (always finite).
    pub position: Point,
}

/// Axis-aligned plot range in detector millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    /// Symmetric viewport `±(half_extent * scale)` on both axes.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::InvalidViewport`] if `half_extent` or
    /// `scale` is non-finite or not strictly positive.
    pub fn symmetric(half_extent: f64, scale: f64) -> Result<Self, EchellogramError> {
        let b = half_extent.abs() * scale;
        if !b.is_finite() || b <= 0.0 {
            return Err(EchellogramError::InvalidViewport { half_extent });
        }
        Ok(Self {
            x_min: -b,
            x_max: b,
            y_min: -b,
            y_max: b,
        })
    }

    /// Strict containment: points on the boundary are outside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.contains_with_margins(p, 0.0, 0.0)
    }

    /// Strict containment after shrinking the y range inward by
    /// `y_low_margin` at the bottom and `y_high_margin` at the top.
    #[must_use]
    pub fn contains_with_margins(&self, p: Point, y_low_margin: f64, y_high_margin: f64) -> bool {
        p.x > self.x_min
            && p.x < self.x_max
            && p.y - y_low_margin > self.y_min
            && p.y + y_high_margin < self.y_max
    }

    /// Corners in counter-clockwise order starting at `(x_min, y_min)`.
    #[must_use]
    pub const fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x_min, self.y_min),
            Point::new(self.x_max, self.y_min),
            Point::new(self.x_max, self.y_max),
            Point::new(self.x_min, self.y_max),
        ]
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// A square detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    /// Pixels along one side.
    pub pixels: u32,
    /// Pixel pitch in micrometres.
    pub pixel_size_um: f64,
}

impl Detector {
    pub const DEFAULT_PIXELS: u32 = 10_560;
    pub const DEFAULT_PIXEL_SIZE_UM: f64 = 9.0;

    /// Half the physical side length in millimetres.
    #[must_use]
    pub fn half_extent_mm(&self) -> f64 {
        f64::from(self.pixels) * self.pixel_size_um / 1000.0 / 2.0
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            pixels: Self::DEFAULT_PIXELS,
            pixel_size_um: Self::DEFAULT_PIXEL_SIZE_UM,
        }
    }
}

/// How detector coordinates map onto the plot axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Detector y on the horizontal axis, detector x on the vertical.
    #[default]
    Transposed,
    /// Detector x horizontal, detector y vertical.
    Native,
}

impl Orientation {
    /// Map a detector point into plot coordinates.
    #[must_use]
    pub const fn to_plot(self, p: Point) -> Point {
        match self {
            Self::Transposed => p.transposed(),
            Self::Native => p,
        }
    }

    /// Map a detector-space viewport into plot coordinates.
    #[must_use]
    pub const fn viewport_to_plot(self, vp: Viewport) -> Viewport {
        match self {
            Self::Transposed => Viewport {
                x_min: vp.y_min,
                x_max: vp.y_max,
                y_min: vp.x_min,
                y_max: vp.x_max,
            },
            Self::Native => vp,
        }
    }
}

/// Configuration for a render pass.
///
/// Fields are public; [`validate`](Self::validate) checks the invariants
/// and is called by [`render`](crate::render::render) before drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Gamma exponent for the attenuated edges of the visible spectrum.
    pub gamma: f64,

    /// Viewport half-range as a multiple of the detector half-extent.
    pub viewport_scale: f64,

    /// Stroke width for order traces.
    pub stroke_width: f64,

    /// Color used for orders whose mean wavelength is not visible.
    pub neutral_color: Rgb,

    /// Axis mapping from detector to plot.
    pub orientation: Orientation,

    /// Order label placement rules.
    pub labels: LabelPolicy,

    /// Font size of spectral-line name labels.
    pub line_label_size: f64,

    /// Opacity of the patch behind spectral-line names.
    pub line_label_background_opacity: f64,

    /// Stroke width of the detector outline.
    pub detector_stroke_width: f64,

    /// Opacity of the detector outline.
    pub detector_opacity: f64,
}

impl RenderConfig {
    pub const DEFAULT_GAMMA: f64 = crate::color::DEFAULT_GAMMA;
    pub const DEFAULT_VIEWPORT_SCALE: f64 = 1.25;
    pub const DEFAULT_STROKE_WIDTH: f64 = 1.2;
    pub const DEFAULT_LINE_LABEL_SIZE: f64 = 12.0;
    pub const DEFAULT_LINE_LABEL_BACKGROUND_OPACITY: f64 = 0.75;
    pub const DEFAULT_DETECTOR_STROKE_WIDTH: f64 = 4.0;
    pub const DEFAULT_DETECTOR_OPACITY: f64 = 0.1;

    /// Check invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::InvalidConfig`] describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), EchellogramError> {
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(EchellogramError::InvalidConfig(format!(
                "gamma must be finite and positive, got {}",
                self.gamma
            )));
        }
        if !(self.viewport_scale.is_finite() && self.viewport_scale > 0.0) {
            return Err(EchellogramError::InvalidConfig(format!(
                "viewport_scale must be finite and positive, got {}",
                self.viewport_scale
            )));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(EchellogramError::InvalidConfig(format!(
                "stroke_width must be finite and positive, got {}",
                self.stroke_width
            )));
        }
        self.labels.validate()
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gamma: Self::DEFAULT_GAMMA,
            viewport_scale: Self::DEFAULT_VIEWPORT_SCALE,
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            neutral_color: Rgb::BLACK,
            orientation: Orientation::default(),
            labels: LabelPolicy::default(),
            line_label_size: Self::DEFAULT_LINE_LABEL_SIZE,
            line_label_background_opacity: Self::DEFAULT_LINE_LABEL_BACKGROUND_OPACITY,
            detector_stroke_width: Self::DEFAULT_DETECTOR_STROKE_WIDTH,
            detector_opacity: Self::DEFAULT_DETECTOR_OPACITY,
        }
    }
}

/// Errors that abort a projection or render pass.
///
/// Per-item failures (a single trace, an empty polyline) never surface
/// here; they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum EchellogramError {
    /// The detector half-extent cannot produce a usable viewport.
    #[error("invalid detector half-extent {half_extent}: must be finite and non-zero")]
    InvalidViewport { half_extent: f64 },

    /// The optical model or ray tracer could not be reached or initialized.
    #[error("optical collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// A configuration value violates its invariants.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A line catalog could not be parsed.
    #[error("failed to parse line catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_transposed_swaps_axes() {
        assert_eq!(Point::new(1.0, 2.0).transposed(), Point::new(2.0, 1.0));
    }

    #[test]
    fn point_non_finite() {
        assert!(!Point::new(f64::NAN, 0.0).is_finite());
        assert!(!Point::new(0.0, f64::INFINITY).is_finite());
        assert!(Point::new(-3.0, 4.0).is_finite());
    }

    #[test]
    fn rgb_hex_clamps_and_rounds() {
        assert_eq!(Rgb::BLACK.to_hex(), "#000000");
        assert_eq!(Rgb::WHITE.to_hex(), "#ffffff");
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_hex(), "#ff0080");
    }

    // --- OrderPolyline ---

    #[test]
    fn order_polyline_push_keeps_parallel_vectors() {
        let mut pl = OrderPolyline::new(-42);
        pl.push(Point::new(0.0, 1.0), 0.5);
        pl.push(Point::new(2.0, 3.0), 0.6);
        assert_eq!(pl.order(), -42);
        assert_eq!(pl.len(), 2);
        assert_eq!(pl.points().len(), pl.wavelengths().len());
        assert_eq!(pl.first(), Some((Point::new(0.0, 1.0), 0.5)));
        assert_eq!(pl.last(), Some((Point::new(2.0, 3.0), 0.6)));
    }

    #[test]
    fn order_polyline_mean_wavelength() {
        let mut pl = OrderPolyline::new(10);
        assert!(pl.mean_wavelength_um().is_none());
        pl.push(Point::new(0.0, 0.0), 0.500);
        pl.push(Point::new(0.0, 0.0), 0.520);
        assert!((pl.mean_wavelength_um().unwrap() - 0.510).abs() < 1e-12);
    }

    // --- Viewport ---

    #[test]
    fn viewport_symmetric_scales_half_extent() {
        let vp = Viewport::symmetric(40.0, 1.25).unwrap();
        assert!((vp.x_min + 50.0).abs() < f64::EPSILON);
        assert!((vp.x_max - 50.0).abs() < f64::EPSILON);
        assert!((vp.y_min + 50.0).abs() < f64::EPSILON);
        assert!((vp.y_max - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn viewport_uses_absolute_half_extent() {
        // Detector corners are often given as the negative corner.
        let vp = Viewport::symmetric(-47.52, 1.0).unwrap();
        assert!((vp.x_max - 47.52).abs() < 1e-12);
    }

    #[test]
    fn viewport_rejects_degenerate_extent() {
        for bad in [0.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                matches!(
                    Viewport::symmetric(bad, 1.25),
                    Err(EchellogramError::InvalidViewport { .. })
                ),
                "expected error for {bad}",
            );
        }
    }

    #[test]
    fn viewport_contains_is_strict() {
        let vp = Viewport::symmetric(10.0, 1.0).unwrap();
        assert!(vp.contains(Point::new(0.0, 0.0)));
        assert!(vp.contains(Point::new(9.999, -9.999)));
        assert!(!vp.contains(Point::new(10.0, 0.0)));
        assert!(!vp.contains(Point::new(0.0, -10.0)));
    }

    #[test]
    fn viewport_margins_shrink_y_only() {
        let vp = Viewport::symmetric(10.0, 1.0).unwrap();
        let p = Point::new(9.9, 6.0);
        assert!(vp.contains_with_margins(p, 0.0, 3.0));
        assert!(!vp.contains_with_margins(p, 0.0, 4.0));
        let q = Point::new(0.0, -6.0);
        assert!(vp.contains_with_margins(q, 3.0, 0.0));
        assert!(!vp.contains_with_margins(q, 4.0, 0.0));
    }

    // --- Detector ---

    #[test]
    fn default_detector_half_extent() {
        // 10560 px * 9 um = 95.04 mm, half is 47.52 mm.
        assert!((Detector::default().half_extent_mm() - 47.52).abs() < 1e-9);
    }

    // --- RenderConfig ---

    #[test]
    fn render_config_defaults() {
        let config = RenderConfig::default();
        assert!((config.gamma - 0.8).abs() < f64::EPSILON);
        assert!((config.viewport_scale - 1.25).abs() < f64::EPSILON);
        assert!((config.stroke_width - 1.2).abs() < f64::EPSILON);
        assert_eq!(config.neutral_color, Rgb::BLACK);
        assert_eq!(config.orientation, Orientation::Transposed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn render_config_rejects_bad_gamma() {
        let config = RenderConfig {
            gamma: 0.0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EchellogramError::InvalidConfig(_))
        ));
    }

    #[test]
    fn render_config_partial_json_uses_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{"gamma": 1.0}"#).unwrap();
        assert!((config.gamma - 1.0).abs() < f64::EPSILON);
        assert!((config.viewport_scale - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn error_display() {
        let err = EchellogramError::CollaboratorUnavailable("no lens".to_string());
        assert_eq!(err.to_string(), "optical collaborator unavailable: no lens");
    }
}
