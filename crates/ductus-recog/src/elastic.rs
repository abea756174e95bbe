//! Banded elastic matching between resampled strokes
//!
//! Two strokes are compared point-by-point with a dynamic program that
//! may pair one point with several consecutive points on the other
//! stroke, as long as the pairing stays within `elasticity` steps of
//! the diagonal. The result is the cheapest total pairing cost,
//! normalized by path length, so strokes of different density can still
//! be compared.

use ductus_core::geom::Vec2;
use ductus_core::Stroke;

// ===========================================================================
// Pairing costs
// ===========================================================================

/// Cost of pairing one point of stroke `a` with one point of stroke `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostMetric {
    /// Squared distance between point positions, with `a` shifted by
    /// `offset` before comparing.
    Position { offset: Vec2 },
    /// Magnitude of the angular difference between segment directions.
    Direction,
}

impl CostMetric {
    #[inline]
    fn between(&self, a: &Stroke, i: usize, b: &Stroke, j: usize) -> f32 {
        match *self {
            CostMetric::Position { offset } => {
                (a.points()[i].pos() + offset - b.points()[j].pos()).square()
            }
            CostMetric::Direction => a.points()[i].angle.diff(b.points()[j].angle) as f32,
        }
    }
}

// ===========================================================================
// Dynamic program
// ===========================================================================

/// Measures the elastic matching cost between the first `points` points
/// of `a` and of `b`.
///
/// A diagonal move in the pairing table advances both strokes and costs
/// twice the pairing cost; a sideways move advances only one stroke and
/// costs it once, so stretching one stroke against the other is charged
/// fairly. Pairings further than `elasticity` off the diagonal are not
/// considered.
///
/// Both strokes must have at least `points` points, and `points` must be
/// at least 1. The returned cost is averaged over the path length.
pub fn measure_strokes(
    a: &Stroke,
    b: &Stroke,
    metric: CostMetric,
    points: usize,
    elasticity: usize,
) -> f32 {
    // Coordinates count from 1; row 0, column 0, and the band borders
    // stay at MAX so out-of-band moves never win a comparison.
    let n = points + 1;
    let mut table = vec![f32::MAX; n * n + 1];
    table[n + 1] = 2.0 * metric.between(a, 0, b, 0);

    for i in 1..n {
        let mut j = 1.max(i.saturating_sub(elasticity));
        if i == 1 {
            j += 1;
        }
        let j_to = n.min(i + elasticity + 1);

        // Carries the up-left neighbor of the cell being filled.
        let mut value = table[(i - 1) * n + j - 1];
        while j < j_to {
            let measure = metric.between(a, i - 1, b, j - 1);
            let mut low = value + measure * 2.0;
            let left = table[i * n + j - 1] + measure;
            if left <= low {
                low = left;
            }
            value = table[(i - 1) * n + j];
            if value + measure <= low {
                low = value + measure;
            }
            table[i * n + j] = low;
            j += 1;
        }
    }

    table[n * n - 1] / ((n - 1) as f32 * 2.0)
}

// ===========================================================================
// Tests
// ===========================================================================
