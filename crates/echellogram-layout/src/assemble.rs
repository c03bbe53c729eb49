//! Order assembly: split a flat spectral format into per-order traces.
//!
//! The input is a single stream of [`SpectralFormatPoint`]s in which all
//! samples of one order are contiguous. Every maximal run of equal
//! `order` becomes one [`OrderPolyline`], in input order.

use crate::types::{OrderPolyline, SpectralFormatPoint};

/// Group consecutive samples with equal order into polylines.
///
/// Each output polyline has at least one point; a run of length one is
/// a valid (degenerate) trace. If an order reappears after a different
/// order it starts a new polyline rather than extending the earlier one,
/// so `[1, 2, 1, 2]` yields four single-point polylines.
///
/// # Examples
///
/// ```
/// use echellogram_layout::SpectralFormatPoint;
/// use echellogram_layout::assemble::assemble;
///
/// let points = [
///     SpectralFormatPoint::new(-40, 0.90, -10.0, 3.0),
///     SpectralFormatPoint::new(-40, 0.91, 10.0, 3.1),
///     SpectralFormatPoint::new(-41, 0.88, -10.0, 2.5),
/// ];
/// let orders = assemble(&points);
/// assert_eq!(orders.len(), 2);
/// assert_eq!(orders[0].len(), 2);
/// assert_eq!(orders[1].order(), -41);
/// ```
#[must_use]
pub fn assemble(points: &[SpectralFormatPoint]) -> Vec<OrderPolyline> {
    let mut result = Vec::new();
    let Some(first) = points.first() else {
        return result;
    };

    let mut current = OrderPolyline::new(first.order);
    for point in points {
        if point.order != current.order() {
            let next = OrderPolyline::new(point.order);
            result.push(std::mem::replace(&mut current, next));
        }
        current.push(point.position(), point.wavelength_um);
    }
    result.push(current);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn sample(order: i32, i: usize) -> SpectralFormatPoint {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f64;
        SpectralFormatPoint::new(order, 0.5 + t * 0.001, t, -t)
    }

    fn stream(orders: &[i32]) -> Vec<SpectralFormatPoint> {
        orders
            .iter()
            .enumerate()
            .map(|(i, &m)| sample(m, i))
            .collect()
    }

    /// Distinct order values in first-seen-per-run order.
    fn runs(orders: &[i32]) -> Vec<i32> {
        let mut out: Vec<i32> = Vec::new();
        for &m in orders {
            if out.last() != Some(&m) {
                out.push(m);
            }
        }
        out
    }

    #[test]
    fn empty_input_produces_no_polylines() {
        assert!(assemble(&[]).is_empty());
    }

    #[test]
    fn single_order_produces_one_polyline() {
        let input = stream(&[7; 11]);
        let result = assemble(&input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 11);
        assert_eq!(result[0].order(), 7);
    }

    #[test]
    fn single_point_input() {
        let result = assemble(&stream(&[3]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 1);
    }

    #[test]
    fn alternating_orders_are_not_merged() {
        let result = assemble(&stream(&[1, 2, 1, 2]));
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|p| p.len() == 1));
        let orders: Vec<i32> = result.iter().map(OrderPolyline::order).collect();
        assert_eq!(orders, vec![1, 2, 1, 2]);
    }

    #[test]
    fn final_point_closes_last_run_without_artifacts() {
        let result = assemble(&stream(&[-35, -35, -36, -36, -36, -37]));
        let lens: Vec<usize> = result.iter().map(OrderPolyline::len).collect();
        assert_eq!(lens, vec![2, 3, 1]);
    }

    #[test]
    fn points_and_wavelengths_follow_input_order() {
        let input = stream(&[5, 5, 5, 6, 6]);
        let result = assemble(&input);
        assert_eq!(
            result[0].points(),
            &[
                Point::new(0.0, -0.0),
                Point::new(1.0, -1.0),
                Point::new(2.0, -2.0)
            ]
        );
        assert_eq!(result[1].wavelengths(), &[input[3].wavelength_um, input[4].wavelength_um]);
    }

    #[test]
    fn invariants_hold_for_mixed_streams() {
        let cases: &[&[i32]] = &[
            &[1],
            &[1, 1, 1],
            &[1, 2, 3],
            &[-35, -35, -36, -37, -37, -37, -38],
            &[4, 4, 9, 9, 4, 4, 4, 9],
            &[0, 0, -1, 1, 1, 0],
        ];
        for &orders in cases {
            let input = stream(orders);
            let result = assemble(&input);

            let total: usize = result.iter().map(OrderPolyline::len).sum();
            assert_eq!(total, input.len(), "point count for {orders:?}");
            assert!(result.iter().all(|p| !p.is_empty()), "empty polyline for {orders:?}");
            assert!(
                result.iter().all(|p| p.points().len() == p.wavelengths().len()),
                "parallel vectors for {orders:?}",
            );
            let got: Vec<i32> = result.iter().map(OrderPolyline::order).collect();
            assert_eq!(got, runs(orders), "order sequence for {orders:?}");
        }
    }
}
