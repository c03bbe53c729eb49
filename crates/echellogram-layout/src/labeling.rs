//! Order label placement.
//!
//! Only every `stride`-th order is labeled. A labeled order gets its
//! starting wavelength next to the first sample and its order number
//! next to the last sample, each only if that sample sits inside the
//! viewport with room for the text. One order can be singled out for a
//! verbose form (`λ=…nm`, `m=…`) that tells the reader what the bare
//! numbers on the other orders mean.

use serde::{Deserialize, Serialize};

use crate::canvas::HorizontalAlign;
use crate::types::{EchellogramError, OrderPolyline, Point, Viewport};

/// Which order receives verbose labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerboseLabels {
    /// All labels are bare numbers.
    Never,
    /// The order with this absolute order number.
    Order(u32),
    /// The labeled order with the largest absolute order number.
    #[default]
    OutermostLabeled,
}

/// Rules for placing order labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPolicy {
    /// Label orders whose absolute order number is a multiple of this.
    pub stride: u32,

    /// Which order gets the verbose label form.
    pub verbose: VerboseLabels,

    /// Room needed above the first sample (detector y, mm) for the
    /// wavelength label.
    pub start_margin: f64,

    /// Room needed below the last sample (detector y, mm) for the order
    /// label.
    pub end_margin: f64,

    /// Font size of order labels.
    pub font_size: f64,

    /// Gap between a curve end and its label, in output units.
    pub text_gap: f64,
}

impl LabelPolicy {
    pub const DEFAULT_STRIDE: u32 = 5;
    pub const DEFAULT_START_MARGIN: f64 = 5.0;
    pub const DEFAULT_END_MARGIN: f64 = 3.0;
    pub const DEFAULT_FONT_SIZE: f64 = 12.0;
    pub const DEFAULT_TEXT_GAP: f64 = 7.0;

    /// Check invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::InvalidConfig`] for a zero stride or a
    /// negative / non-finite margin, font size, or gap.
    pub fn validate(&self) -> Result<(), EchellogramError> {
        if self.stride == 0 {
            return Err(EchellogramError::InvalidConfig(
                "label stride must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("start_margin", self.start_margin),
            ("end_margin", self.end_margin),
            ("font_size", self.font_size),
            ("text_gap", self.text_gap),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EchellogramError::InvalidConfig(format!(
                    "label {name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Whether order `m` is labeled at all.
    #[must_use]
    pub const fn labels_order(&self, m: i32) -> bool {
        self.stride != 0 && m.unsigned_abs() % self.stride == 0
    }

    /// Resolve [`VerboseLabels`] against the orders present in a pass.
    ///
    /// Returns the absolute order number that gets verbose labels.
    #[must_use]
    pub fn verbose_order(&self, orders: impl IntoIterator<Item = i32>) -> Option<u32> {
        match self.verbose {
            VerboseLabels::Never => None,
            VerboseLabels::Order(n) => Some(n),
            VerboseLabels::OutermostLabeled => orders
                .into_iter()
                .filter(|&m| self.labels_order(m))
                .map(i32::unsigned_abs)
                .max(),
        }
    }

    /// The wavelength label at the start of `polyline`, if it fits.
    ///
    /// The first sample must be strictly inside `viewport`, with
    /// `start_margin` of clearance below the top edge.
    #[must_use]
    pub fn start_label(
        &self,
        polyline: &OrderPolyline,
        viewport: &Viewport,
        verbose: bool,
    ) -> Option<OrderLabel> {
        if !self.labels_order(polyline.order()) {
            return None;
        }
        let (anchor, wavelength_um) = polyline.first()?;
        if !viewport.contains_with_margins(anchor, 0.0, self.start_margin) {
            return None;
        }
        let nm = wavelength_um * 1000.0;
        let text = if verbose {
            format!("λ={nm:.0}nm")
        } else {
            format!("{nm:.0}")
        };
        Some(OrderLabel {
            anchor,
            text,
            align: HorizontalAlign::Left,
        })
    }

    /// The order-number label at the end of `polyline`, if it fits.
    ///
    /// The last sample must be strictly inside `viewport`, with
    /// `end_margin` of clearance above the bottom edge.
    #[must_use]
    pub fn end_label(
        &self,
        polyline: &OrderPolyline,
        viewport: &Viewport,
        verbose: bool,
    ) -> Option<OrderLabel> {
        let m = polyline.order();
        if !self.labels_order(m) {
            return None;
        }
        let (anchor, _) = polyline.last()?;
        if !viewport.contains_with_margins(anchor, self.end_margin, 0.0) {
            return None;
        }
        let n = m.unsigned_abs();
        let text = if verbose {
            format!("m={n}")
        } else {
            n.to_string()
        };
        Some(OrderLabel {
            anchor,
            text,
            align: HorizontalAlign::Right,
        })
    }
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            stride: Self::DEFAULT_STRIDE,
            verbose: VerboseLabels::default(),
            start_margin: Self::DEFAULT_START_MARGIN,
            end_margin: Self::DEFAULT_END_MARGIN,
            font_size: Self::DEFAULT_FONT_SIZE,
            text_gap: Self::DEFAULT_TEXT_GAP,
        }
    }
}

/// A placed order label in detector coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLabel {
    pub anchor: Point,
    pub text: String,
    /// [`Left`](HorizontalAlign::Left) for start labels (text runs away
    /// from the curve), [`Right`](HorizontalAlign::Right) for end labels.
    pub align: HorizontalAlign,
}
