//! Wavelength to visible color.
//!
//! Piecewise-linear approximation of the visible spectrum after Dan
//! Bruton's classic mapping, split into six contiguous bands over
//! 380–750 nm. The two outer bands fade towards 30% intensity to mimic
//! the eye's falling sensitivity; gamma is applied only to those
//! attenuated channels.

use crate::types::Rgb;

/// Default gamma exponent for the attenuated spectrum edges.
pub const DEFAULT_GAMMA: f64 = 0.8;

/// Shortest visible wavelength in nanometres.
pub const VISIBLE_MIN_NM: f64 = 380.0;

/// Longest visible wavelength in nanometres.
pub const VISIBLE_MAX_NM: f64 = 750.0;

/// Intensity at the extreme ends of the visible range.
const EDGE_ATTENUATION: f64 = 0.3;

/// Map a wavelength in nanometres to an RGB color.
///
/// Returns `None` outside `[380, 750]` nm (or for non-finite input):
/// such wavelengths have no visible color, and callers pick their own
/// fallback rather than painting black.
///
/// A wavelength exactly on a band edge is assigned to the lower band.
/// Both adjoining formulas agree there, so the choice is invisible.
///
/// # Examples
///
/// ```
/// use echellogram_layout::color::wavelength_to_rgb;
///
/// let green = wavelength_to_rgb(510.0, 0.8).unwrap();
/// assert_eq!((green.r, green.g, green.b), (0.0, 1.0, 0.0));
/// assert!(wavelength_to_rgb(900.0, 0.8).is_none());
/// ```
#[must_use]
pub fn wavelength_to_rgb(wavelength_nm: f64, gamma: f64) -> Option<Rgb> {
    let wl = wavelength_nm;
    if !(VISIBLE_MIN_NM..=VISIBLE_MAX_NM).contains(&wl) {
        return None;
    }

    let rgb = if wl <= 440.0 {
        let attenuation = EDGE_ATTENUATION + (1.0 - EDGE_ATTENUATION) * (wl - 380.0) / 60.0;
        let r = ((440.0 - wl) / 60.0 * attenuation).powf(gamma);
        Rgb::new(r, 0.0, attenuation.powf(gamma))
    } else if wl <= 490.0 {
        Rgb::new(0.0, (wl - 440.0) / 50.0, 1.0)
    } else if wl <= 510.0 {
        Rgb::new(0.0, 1.0, (510.0 - wl) / 20.0)
    } else if wl <= 580.0 {
        Rgb::new((wl - 510.0) / 70.0, 1.0, 0.0)
    } else if wl <= 645.0 {
        Rgb::new(1.0, (645.0 - wl) / 65.0, 0.0)
    } else {
        let attenuation = EDGE_ATTENUATION + (1.0 - EDGE_ATTENUATION) * (750.0 - wl) / 105.0;
        Rgb::new(attenuation.powf(gamma), 0.0, 0.0)
    };
    Some(rgb)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < TOL && (a.g - b.g).abs() < TOL && (a.b - b.b).abs() < TOL
    }

    /// Evaluate the formula of every band whose closed range contains
    /// `wl`, independent of the production dispatch.
    fn band_formulas(wl: f64, gamma: f64) -> Vec<Rgb> {
        let mut out = Vec::new();
        if (380.0..=440.0).contains(&wl) {
            let a = 0.3 + 0.7 * (wl - 380.0) / 60.0;
            out.push(Rgb::new(
                ((440.0 - wl) / 60.0 * a).powf(gamma),
                0.0,
                a.powf(gamma),
            ));
        }
        if (440.0..=490.0).contains(&wl) {
            out.push(Rgb::new(0.0, (wl - 440.0) / 50.0, 1.0));
        }
        if (490.0..=510.0).contains(&wl) {
            out.push(Rgb::new(0.0, 1.0, (510.0 - wl) / 20.0));
        }
        if (510.0..=580.0).contains(&wl) {
            out.push(Rgb::new((wl - 510.0) / 70.0, 1.0, 0.0));
        }
        if (580.0..=645.0).contains(&wl) {
            out.push(Rgb::new(1.0, (645.0 - wl) / 65.0, 0.0));
        }
        if (645.0..=750.0).contains(&wl) {
            let a = 0.3 + 0.7 * (750.0 - wl) / 105.0;
            out.push(Rgb::new(a.powf(gamma), 0.0, 0.0));
        }
        out
    }

    #[test]
    fn band_edges_are_continuous() {
        for wl in [380.0, 440.0, 490.0, 510.0, 580.0, 645.0, 750.0] {
            let got = wavelength_to_rgb(wl, DEFAULT_GAMMA).unwrap();
            let expected = band_formulas(wl, DEFAULT_GAMMA);
            assert!(!expected.is_empty());
            for e in expected {
                assert!(close(got, e), "discontinuity at {wl} nm: {got:?} vs {e:?}");
            }
        }
    }

    #[test]
    fn outside_visible_range_has_no_color() {
        for wl in [0.0, 379.999, 750.001, 1000.0, -5.0] {
            assert!(wavelength_to_rgb(wl, DEFAULT_GAMMA).is_none(), "{wl}");
        }
    }

    #[test]
    fn nan_has_no_color() {
        assert!(wavelength_to_rgb(f64::NAN, DEFAULT_GAMMA).is_none());
    }

    #[test]
    fn violet_edge_is_attenuated() {
        let c = wavelength_to_rgb(380.0, DEFAULT_GAMMA).unwrap();
        let expected = 0.3_f64.powf(DEFAULT_GAMMA);
        assert!((c.r - expected).abs() < TOL);
        assert!((c.b - expected).abs() < TOL);
        assert!(c.g.abs() < TOL);
    }

    #[test]
    fn red_edge_is_attenuated() {
        let c = wavelength_to_rgb(750.0, DEFAULT_GAMMA).unwrap();
        assert!((c.r - 0.3_f64.powf(DEFAULT_GAMMA)).abs() < TOL);
        assert!(c.g.abs() < TOL && c.b.abs() < TOL);
    }

    #[test]
    fn interior_ramps_are_linear() {
        // Gamma must not touch the unattenuated bands.
        let a = wavelength_to_rgb(465.0, 0.5).unwrap();
        assert!((a.g - 0.5).abs() < TOL);
        let b = wavelength_to_rgb(545.0, 0.5).unwrap();
        assert!((b.r - 0.5).abs() < TOL);
    }

    #[test]
    fn gamma_changes_only_edge_bands() {
        let lo = wavelength_to_rgb(700.0, 0.5).unwrap();
        let hi = wavelength_to_rgb(700.0, 1.0).unwrap();
        assert!((lo.r - hi.r).abs() > 1e-3);

        let lo = wavelength_to_rgb(600.0, 0.5).unwrap();
        let hi = wavelength_to_rgb(600.0, 1.0).unwrap();
        assert!(close(lo, hi));
    }

    #[test]
    fn all_channels_within_unit_range() {
        let mut wl = 380.0;
        while wl <= 750.0 {
            let c = wavelength_to_rgb(wl, DEFAULT_GAMMA).unwrap();
            for ch in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&ch), "{wl} nm -> {c:?}");
            }
            wl += 0.5;
        }
    }
}
