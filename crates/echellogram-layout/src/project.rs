//! Spectral line projection: find catalog lines inside each order and
//! trace them to the detector.

use crate::catalog::LineCatalog;
use crate::optics::{EchelleOrder, OpticalModel, RayTracer, TraceError, TraceSession, WindowKind};
use crate::types::{EchellogramError, SpectralLine};

/// Trace every catalog line that falls inside each order's window.
///
/// For each order (outer loop, model order) and each catalog line (inner
/// loop, catalog order) whose wavelength lies strictly inside the
/// selected window, the session is configured and the tracer asked for a
/// position. A line may be found in several orders; each hit is its own
/// [`SpectralLine`].
///
/// Trace failures are logged and skipped; they never abort the scan.
pub fn project_lines<T: RayTracer + ?Sized>(
    catalog: &LineCatalog,
    orders: &[EchelleOrder],
    tracer: &mut T,
    window: WindowKind,
) -> Vec<SpectralLine> {
    let mut found = Vec::new();
    let mut session = TraceSession::new();

    for order in orders {
        let bounds = order.window(window);
        session.set_order(order.m);

        for line in catalog.lines() {
            let wavelength_um = line.wavelength_um();
            if !bounds.contains(wavelength_um) {
                continue;
            }

            session.set_wavelength(wavelength_um);
            let traced = tracer.trace(&session).and_then(|p| {
                if p.is_finite() {
                    Ok(p)
                } else {
                    Err(TraceError::NonFinite {
                        order: order.m,
                        wavelength_um,
                    })
                }
            });

            match traced {
                Ok(position) => {
                    log::debug!(
                        "{}, {wavelength_um:.3}um, found in order {} at ({}, {})",
                        line.name,
                        order.m,
                        position.x,
                        position.y,
                    );
                    found.push(SpectralLine {
                        name: line.name.clone(),
                        order: order.m,
                        wavelength_um,
                        position,
                    });
                }
                Err(err) => {
                    log::warn!("skipping {} in order {}: {err}", line.name, order.m);
                }
            }
        }
    }

    found
}

/// Query the model for its orders, then [`project_lines`] with the same
/// object acting as tracer.
///
/// # Errors
///
/// Propagates the model's error when its orders cannot be listed
/// (typically [`EchellogramError::CollaboratorUnavailable`]).
pub fn project<O: OpticalModel + RayTracer + ?Sized>(
    catalog: &LineCatalog,
    optics: &mut O,
    window: WindowKind,
) -> Result<Vec<SpectralLine>, EchellogramError> {
    let orders = optics.orders()?;
    Ok(project_lines(catalog, &orders, optics, window))
}
