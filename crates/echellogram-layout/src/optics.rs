//! Optical collaborators: the seams between the layout engine and
//! whatever models the spectrograph.
//!
//! [`OpticalModel`] describes the orders and their wavelength windows.
//! [`RayTracer`] maps one (order, wavelength) pair to the detector. The
//! pair to trace is carried in an explicit [`TraceSession`] rather than
//! hidden state on the model, so the "configure, then trace" ordering is
//! visible at every call site.

use serde::{Deserialize, Serialize};

use crate::types::{EchellogramError, Point};

/// An open wavelength interval in micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthWindow {
    pub lo: f64,
    pub hi: f64,
}

impl WavelengthWindow {
    /// Build a window from two bounds in either order.
    #[must_use]
    pub const fn normalized(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Open-interval containment: the bounds themselves are outside.
    #[must_use]
    pub fn contains(&self, wavelength_um: f64) -> bool {
        wavelength_um > self.lo && wavelength_um < self.hi
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Which window of an order a catalog line must fall inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowKind {
    /// The free spectral range: the non-overlapping part of the order.
    #[default]
    FreeSpectralRange,
    /// The full design bandwidth, overlapping neighbouring orders.
    FullBandwidth,
}

/// One diffraction order as described by the optical model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchelleOrder {
    /// Signed order number.
    pub m: i32,
    /// FSR bounds `(min, max)` exactly as the model stores them.
    ///
    /// Models that use negative order numbers store these swapped
    /// (`min > max`); use [`fsr_window`](Self::fsr_window) rather than
    /// reading the tuple directly.
    pub fsr_bounds: (f64, f64),
    /// Shortest design wavelength in micrometres.
    pub min_wavelength_um: f64,
    /// Longest design wavelength in micrometres.
    pub max_wavelength_um: f64,
}

impl EchelleOrder {
    /// The FSR window with its bounds put in ascending order.
    #[must_use]
    pub const fn fsr_window(&self) -> WavelengthWindow {
        WavelengthWindow::normalized(self.fsr_bounds.0, self.fsr_bounds.1)
    }

    /// The full design bandwidth.
    #[must_use]
    pub const fn full_window(&self) -> WavelengthWindow {
        WavelengthWindow::normalized(self.min_wavelength_um, self.max_wavelength_um)
    }

    #[must_use]
    pub const fn window(&self, kind: WindowKind) -> WavelengthWindow {
        match kind {
            WindowKind::FreeSpectralRange => self.fsr_window(),
            WindowKind::FullBandwidth => self.full_window(),
        }
    }
}

/// The active (order, wavelength) configuration for a trace request.
///
/// Set the order, then the wavelength, then hand the session to
/// [`RayTracer::trace`]. A session is cheap; callers tracing
/// concurrently give each worker its own.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TraceSession {
    order: Option<i32>,
    wavelength_um: Option<f64>,
}

impl TraceSession {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            order: None,
            wavelength_um: None,
        }
    }

    /// Make `m` the active order. Clears the active wavelength.
    pub const fn set_order(&mut self, m: i32) {
        self.order = Some(m);
        self.wavelength_um = None;
    }

    /// Make `wavelength_um` the active wavelength.
    pub const fn set_wavelength(&mut self, wavelength_um: f64) {
        self.wavelength_um = Some(wavelength_um);
    }

    #[must_use]
    pub const fn order(&self) -> Option<i32> {
        self.order
    }

    #[must_use]
    pub const fn wavelength_um(&self) -> Option<f64> {
        self.wavelength_um
    }

    /// The active `(order, wavelength_um)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Unconfigured`] unless both are set.
    pub const fn active(&self) -> Result<(i32, f64), TraceError> {
        match (self.order, self.wavelength_um) {
            (Some(m), Some(wl)) => Ok((m, wl)),
            _ => Err(TraceError::Unconfigured),
        }
    }
}

/// A single trace request that could not produce a detector position.
///
/// Recoverable: the projector logs it and moves on to the next pair.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraceError {
    /// The session has no active order and wavelength.
    #[error("trace session has no active order and wavelength")]
    Unconfigured,

    /// No physical ray reaches the detector for this configuration.
    #[error("no ray solution for order {order} at {wavelength_um} um")]
    NoSolution { order: i32, wavelength_um: f64 },

    /// The tracer returned a non-finite position.
    #[error("non-finite trace position for order {order} at {wavelength_um} um")]
    NonFinite { order: i32, wavelength_um: f64 },
}

/// Describes the diffraction orders of a spectrograph.
pub trait OpticalModel {
    /// All orders known to the model, in the model's iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::CollaboratorUnavailable`] if the model
    /// cannot be queried.
    fn orders(&self) -> Result<Vec<EchelleOrder>, EchellogramError>;
}

/// Maps the session's active (order, wavelength) to the detector plane.
pub trait RayTracer {
    /// Trace the session's active configuration to a detector position
    /// in millimetres.
    ///
    /// # Errors
    ///
    /// Returns a [`TraceError`] if the session is unconfigured or the ray
    /// cannot be traced.
    fn trace(&mut self, session: &TraceSession) -> Result<Point, TraceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_normalizes_reversed_bounds() {
        let w = WavelengthWindow::normalized(0.52, 0.50);
        assert!((w.lo - 0.50).abs() < f64::EPSILON);
        assert!((w.hi - 0.52).abs() < f64::EPSILON);
    }

    #[test]
    fn window_is_open_interval() {
        let w = WavelengthWindow::normalized(0.5, 0.6);
        assert!(!w.contains(0.5));
        assert!(!w.contains(0.6));
        assert!(w.contains(0.55));
        assert!(!w.contains(f64::NAN));
    }

    #[test]
    fn negative_order_fsr_bounds_are_normalized() {
        // Stored swapped, as models with negative orders do.
        let order = EchelleOrder {
            m: -60,
            fsr_bounds: (0.6150, 0.6050),
            min_wavelength_um: 0.600,
            max_wavelength_um: 0.620,
        };
        let w = order.fsr_window();
        assert!(w.lo < w.hi);
        assert!(w.contains(0.61));
        // Read naively, (min, max) = (0.615, 0.605) is an empty interval.
        assert!(!(0.61 > order.fsr_bounds.0 && 0.61 < order.fsr_bounds.1));
    }

    #[test]
    fn window_kind_selects_bounds() {
        let order = EchelleOrder {
            m: 40,
            fsr_bounds: (0.90, 0.92),
            min_wavelength_um: 0.88,
            max_wavelength_um: 0.94,
        };
        assert!(!order.window(WindowKind::FreeSpectralRange).contains(0.89));
        assert!(order.window(WindowKind::FullBandwidth).contains(0.89));
    }

    #[test]
    fn session_requires_order_and_wavelength() {
        let mut session = TraceSession::new();
        assert_eq!(session.active(), Err(TraceError::Unconfigured));
        session.set_order(-50);
        assert_eq!(session.active(), Err(TraceError::Unconfigured));
        session.set_wavelength(0.7);
        assert_eq!(session.active(), Ok((-50, 0.7)));
    }

    #[test]
    fn changing_order_clears_wavelength() {
        let mut session = TraceSession::new();
        session.set_order(10);
        session.set_wavelength(0.5);
        session.set_order(11);
        assert_eq!(session.order(), Some(11));
        assert_eq!(session.wavelength_um(), None);
    }

    #[test]
    fn trace_error_display() {
        let err = TraceError::NoSolution {
            order: -35,
            wavelength_um: 1.2,
        };
        assert_eq!(err.to_string(), "no ray solution for order -35 at 1.2 um");
    }
}
