//! Analytic reference echelle spectrograph.
//!
//! A Littrow echelle followed by a first-order cross-disperser grating
//! and an ideal camera. Good enough to produce a realistic spectral
//! format without an external ray tracer; real instruments plug in
//! through [`OpticalModel`] and [`RayTracer`] instead.

use serde::{Deserialize, Serialize};

use crate::optics::{EchelleOrder, OpticalModel, RayTracer, TraceError, TraceSession};
use crate::types::{Detector, EchellogramError, Point, SpectralFormatPoint};

const MM_PER_MICRON: f64 = 1.0e-3;

/// Parameters of the reference spectrograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchelleConfig {
    /// Echelle groove density in lines per millimetre.
    pub grooves_per_mm: f64,

    /// Echelle blaze angle in degrees.
    pub blaze_angle_deg: f64,

    /// Cross-disperser groove density in lines per millimetre.
    pub cross_grooves_per_mm: f64,

    /// Cross-disperser incidence angle in degrees.
    pub cross_incidence_deg: f64,

    /// Camera focal length in millimetres.
    pub focal_length_mm: f64,

    /// Wavelength that lands on the detector centre line, micrometres.
    pub reference_wavelength_um: f64,

    /// First order to emit. Orders run from here towards `max_order`.
    pub min_order: i32,

    /// Last order to emit.
    pub max_order: i32,

    pub detector: Detector,
}

impl EchelleConfig {
    pub const DEFAULT_GROOVES_PER_MM: f64 = 52.67;
    pub const DEFAULT_BLAZE_ANGLE_DEG: f64 = 76.0;
    pub const DEFAULT_CROSS_GROOVES_PER_MM: f64 = 300.0;
    pub const DEFAULT_CROSS_INCIDENCE_DEG: f64 = 10.0;
    pub const DEFAULT_FOCAL_LENGTH_MM: f64 = 250.0;
    pub const DEFAULT_REFERENCE_WAVELENGTH_UM: f64 = 0.70;
    pub const DEFAULT_MIN_ORDER: i32 = -35;
    pub const DEFAULT_MAX_ORDER: i32 = -94;

    /// Check invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::InvalidConfig`] for non-positive
    /// densities, focal length, or detector size, a blaze angle outside
    /// `(0, 90)` degrees, or an order range that is zero or spans zero.
    pub fn validate(&self) -> Result<(), EchellogramError> {
        for (name, value) in [
            ("grooves_per_mm", self.grooves_per_mm),
            ("cross_grooves_per_mm", self.cross_grooves_per_mm),
            ("focal_length_mm", self.focal_length_mm),
            ("reference_wavelength_um", self.reference_wavelength_um),
            ("detector.pixel_size_um", self.detector.pixel_size_um),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EchellogramError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        if !(self.blaze_angle_deg > 0.0 && self.blaze_angle_deg < 90.0) {
            return Err(EchellogramError::InvalidConfig(format!(
                "blaze_angle_deg must be in (0, 90), got {}",
                self.blaze_angle_deg
            )));
        }
        if !self.cross_incidence_deg.is_finite() {
            return Err(EchellogramError::InvalidConfig(format!(
                "cross_incidence_deg must be finite, got {}",
                self.cross_incidence_deg
            )));
        }
        if self.detector.pixels == 0 {
            return Err(EchellogramError::InvalidConfig(
                "detector.pixels must be at least 1".to_string(),
            ));
        }
        if self.min_order == 0 || self.max_order == 0 {
            return Err(EchellogramError::InvalidConfig(
                "order numbers must be non-zero".to_string(),
            ));
        }
        if self.min_order.signum() != self.max_order.signum() {
            return Err(EchellogramError::InvalidConfig(format!(
                "order range {}..{} spans zero",
                self.min_order, self.max_order
            )));
        }
        Ok(())
    }

    /// Order numbers from `min_order` towards `max_order`, inclusive.
    #[must_use]
    pub fn order_numbers(&self) -> Vec<i32> {
        if self.min_order <= self.max_order {
            (self.min_order..=self.max_order).collect()
        } else {
            (self.max_order..=self.min_order).rev().collect()
        }
    }
}

impl Default for EchelleConfig {
    fn default() -> Self {
        Self {
            grooves_per_mm: Self::DEFAULT_GROOVES_PER_MM,
            blaze_angle_deg: Self::DEFAULT_BLAZE_ANGLE_DEG,
            cross_grooves_per_mm: Self::DEFAULT_CROSS_GROOVES_PER_MM,
            cross_incidence_deg: Self::DEFAULT_CROSS_INCIDENCE_DEG,
            focal_length_mm: Self::DEFAULT_FOCAL_LENGTH_MM,
            reference_wavelength_um: Self::DEFAULT_REFERENCE_WAVELENGTH_UM,
            min_order: Self::DEFAULT_MIN_ORDER,
            max_order: Self::DEFAULT_MAX_ORDER,
            detector: Detector::default(),
        }
    }
}

/// The reference spectrograph, ready to trace.
#[derive(Debug, Clone)]
pub struct EchelleModel {
    config: EchelleConfig,
    sin_blaze: f64,
    sin_cross_incidence: f64,
    /// Cross-disperser diffraction angle of the reference wavelength.
    cross_reference_angle: f64,
}

impl EchelleModel {
    /// Upper bound on [`spectral_format`](Self::spectral_format) samples per order.
    pub const MAX_POINTS_PER_ORDER: usize = 100_000;

    /// Build a model from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::InvalidConfig`] if the configuration
    /// fails [`EchelleConfig::validate`] or the reference wavelength is
    /// not diffracted by the cross-disperser.
    pub fn new(config: EchelleConfig) -> Result<Self, EchellogramError> {
        config.validate()?;
        let sin_blaze = config.blaze_angle_deg.to_radians().sin();
        let sin_cross_incidence = config.cross_incidence_deg.to_radians().sin();
        let sin_ref = config.cross_grooves_per_mm * config.reference_wavelength_um * MM_PER_MICRON
            - sin_cross_incidence;
        if sin_ref.abs() > 1.0 {
            return Err(EchellogramError::InvalidConfig(format!(
                "reference wavelength {} um has no cross-disperser solution",
                config.reference_wavelength_um
            )));
        }
        Ok(Self {
            sin_blaze,
            sin_cross_incidence,
            cross_reference_angle: sin_ref.asin(),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EchelleConfig {
        &self.config
    }

    #[must_use]
    pub const fn detector(&self) -> Detector {
        self.config.detector
    }

    /// Blaze wavelength of order `m` in micrometres.
    #[must_use]
    pub fn blaze_wavelength_um(&self, m: i32) -> f64 {
        2.0 * self.sin_blaze / (self.config.grooves_per_mm * f64::from(m.unsigned_abs()))
            / MM_PER_MICRON
    }

    /// Describe order `m`.
    ///
    /// FSR bounds are `blaze ∓ blaze / 2m` with the signed order, so
    /// negative orders come out with `min > max`.
    #[must_use]
    pub fn order(&self, m: i32) -> EchelleOrder {
        let blaze = self.blaze_wavelength_um(m);
        let signed = f64::from(m);
        let unsigned = f64::from(m.unsigned_abs());
        EchelleOrder {
            m,
            fsr_bounds: (blaze - blaze / (2.0 * signed), blaze + blaze / (2.0 * signed)),
            min_wavelength_um: blaze - blaze / unsigned,
            max_wavelength_um: blaze + blaze / unsigned,
        }
    }

    /// Trace order `m` at `wavelength_um` to the detector.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::NoSolution`] when either grating equation
    /// has no real solution.
    pub fn trace_point(&self, m: i32, wavelength_um: f64) -> Result<Point, TraceError> {
        let no_solution = TraceError::NoSolution {
            order: m,
            wavelength_um,
        };
        let wl_mm = wavelength_um * MM_PER_MICRON;
        let f = self.config.focal_length_mm;

        let sin_beta =
            f64::from(m.unsigned_abs()) * self.config.grooves_per_mm * wl_mm - self.sin_blaze;
        if !(-1.0..=1.0).contains(&sin_beta) {
            return Err(no_solution);
        }
        let x = f * (sin_beta.asin() - self.sin_blaze.asin()).tan();

        let sin_cross = self.config.cross_grooves_per_mm * wl_mm - self.sin_cross_incidence;
        if !(-1.0..=1.0).contains(&sin_cross) {
            return Err(no_solution);
        }
        let y = f * (sin_cross.asin() - self.cross_reference_angle).tan();

        Ok(Point::new(x, y))
    }

    /// Sample every order's free spectral range.
    ///
    /// Each order contributes `points_per_order` evenly spaced samples,
    /// endpoints included, emitted contiguously in model order. Samples
    /// that fail to trace are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::InvalidConfig`] if `points_per_order`
    /// is less than 2, exceeds [`Self::MAX_POINTS_PER_ORDER`], or the total
    /// sample count overflows `usize`.
    #[allow(clippy::cast_precision_loss)]
    pub fn spectral_format(
        &self,
        points_per_order: usize,
    ) -> Result<Vec<SpectralFormatPoint>, EchellogramError> {
        if points_per_order < 2 {
            return Err(EchellogramError::InvalidConfig(format!(
                "points_per_order must be at least 2, got {points_per_order}"
            )));
        }
        if points_per_order > Self::MAX_POINTS_PER_ORDER {
            return Err(EchellogramError::InvalidConfig(format!(
                "points_per_order must be at most {}, got {points_per_order}",
                Self::MAX_POINTS_PER_ORDER
            )));
        }
        let last = points_per_order - 1;
        let orders = self.config.order_numbers();
        let capacity = orders.len().checked_mul(points_per_order).ok_or_else(|| {
            EchellogramError::InvalidConfig(format!(
                "{} orders x {points_per_order} points overflows the sample count",
                orders.len()
            ))
        })?;
        let mut points = Vec::with_capacity(capacity);

        for m in orders {
            let window = self.order(m).fsr_window();
            let step = window.width() / last as f64;
            for i in 0..points_per_order {
                let wavelength_um = if i == last {
                    window.hi
                } else {
                    (i as f64).mul_add(step, window.lo)
                };
                match self.trace_point(m, wavelength_um) {
                    Ok(p) => points.push(SpectralFormatPoint::new(m, wavelength_um, p.x, p.y)),
                    Err(err) => log::warn!("dropping spectral format sample: {err}"),
                }
            }
        }

        log::debug!(
            "spectral format: {} samples over {} orders",
            points.len(),
            self.config.order_numbers().len(),
        );
        Ok(points)
    }
}

impl OpticalModel for EchelleModel {
    fn orders(&self) -> Result<Vec<EchelleOrder>, EchellogramError> {
        Ok(self
            .config
            .order_numbers()
            .into_iter()
            .map(|m| self.order(m))
            .collect())
    }
}

impl RayTracer for EchelleModel {
    fn trace(&mut self, session: &TraceSession) -> Result<Point, TraceError> {
        let (m, wavelength_um) = session.active()?;
        self.trace_point(m, wavelength_um)
    }
}
