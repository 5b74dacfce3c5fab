//! Temperature grid.

use crate::error::{ReactionError, ReactionResult};
use crate::spec::validate_step;
use tc_core::same_temperature;
use tc_phase::Span;

/// Upper bound on regular grid points per table.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Tabulation temperatures over `range`.
///
/// `lo + i·step` for every value below `hi`, then `hi` itself, plus every
/// transition temperature strictly inside the range. A regular point that
/// coincides with a transition (within tolerance) is replaced by the exact
/// transition temperature.
pub fn temperature_grid(
    range: Span,
    step_k: f64,
    transitions_k: &[f64],
) -> ReactionResult<Vec<f64>> {
    let step_k = validate_step(step_k)?;

    let points = ((range.hi_k - range.lo_k) / step_k).ceil();
    if points.is_nan() || points > MAX_GRID_POINTS as f64 {
        return Err(ReactionError::GridTooLarge {
            lo_k: range.lo_k,
            hi_k: range.hi_k,
            step_k,
            points,
            max_points: MAX_GRID_POINTS,
        });
    }

    let mut grid = Vec::with_capacity(points.max(0.0) as usize + 1 + transitions_k.len());
    let mut i: u32 = 0;
    loop {
        let t = range.lo_k + f64::from(i) * step_k;
        if t >= range.hi_k || same_temperature(t, range.hi_k) {
            break;
        }
        grid.push(t);
        i += 1;
    }
    grid.push(range.hi_k);

    let inside: Vec<f64> = transitions_k
        .iter()
        .copied()
        .filter(|t| range.contains_interior(*t))
        .collect();
    for &t in &inside {
        match grid.iter_mut().find(|g| same_temperature(**g, t)) {
            Some(existing) => *existing = t,
            None => grid.push(t),
        }
    }

    grid.sort_by(f64::total_cmp);
    grid.dedup_by(|a, b| same_temperature(*a, *b));
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(lo: f64, hi: f64) -> Span {
        Span { lo_k: lo, hi_k: hi }
    }

    #[test]
    fn regular_points_then_upper_bound() {
        let grid = temperature_grid(span(298.0, 700.0), 100.0, &[]).unwrap();
        assert_eq!(grid, vec![298.0, 398.0, 498.0, 598.0, 698.0, 700.0]);
    }

    #[test]
    fn exact_multiple_does_not_duplicate_upper_bound() {
        let grid = temperature_grid(span(300.0, 600.0), 100.0, &[]).unwrap();
        assert_eq!(grid, vec![300.0, 400.0, 500.0, 600.0]);
    }

    #[test]
    fn transitions_inserted_in_order() {
        let grid = temperature_grid(span(298.0, 2000.0), 100.0, &[1650.0, 1184.0]).unwrap();
        assert!(grid.contains(&1650.0));
        assert!(grid.contains(&1184.0));
        assert_eq!(grid.len(), 19 + 2);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn transitions_on_bounds_or_outside_ignored() {
        let grid = temperature_grid(span(300.0, 600.0), 100.0, &[300.0, 600.0, 900.0]).unwrap();
        assert_eq!(grid, vec![300.0, 400.0, 500.0, 600.0]);
    }

    #[test]
    fn transition_on_regular_point_is_not_doubled() {
        let grid = temperature_grid(span(300.0, 600.0), 100.0, &[500.0, 500.0]).unwrap();
        assert_eq!(grid, vec![300.0, 400.0, 500.0, 600.0]);
    }

    #[test]
    fn oversized_grid_is_rejected_before_allocating() {
        let err = temperature_grid(span(298.0, 1.0e9), 1.0, &[]).unwrap_err();
        assert!(matches!(
            err,
            ReactionError::GridTooLarge {
                max_points: MAX_GRID_POINTS,
                ..
            }
        ));
        assert!(temperature_grid(span(300.0, f64::INFINITY), 100.0, &[]).is_err());
    }

    #[test]
    fn grid_at_the_point_cap_is_accepted() {
        let lo = 300.0;
        let hi = lo + MAX_GRID_POINTS as f64;
        let grid = temperature_grid(span(lo, hi), 1.0, &[]).unwrap();
        assert_eq!(grid.len(), MAX_GRID_POINTS + 1);
        assert!(temperature_grid(span(lo, hi + 1.0), 1.0, &[]).is_err());
    }

    #[test]
    fn bad_step_rejected() {
        assert!(temperature_grid(span(300.0, 600.0), 0.0, &[]).is_err());
        assert!(temperature_grid(span(300.0, 600.0), 5000.0, &[]).is_err());
    }
}
