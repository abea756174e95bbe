//! Arc-length resampling
//!
//! Comparisons want strokes expressed as points at regular distance
//! intervals along the path. [`Stroke::resample`] recreates a stroke
//! with a given number of evenly spaced points; [`Stroke::resample_clipped`]
//! keeps the spacing of a full resample but emits only a prefix of the
//! points, which is how partial-stroke matches are prepared.
//!
//! Resampled strokes always carry angle data, taken from the input
//! segment each output point falls on.

use log::warn;

use crate::stroke::{Point, Stroke};
use crate::POINTS_MAX;

impl Stroke {
    /// Resample to `points` evenly spaced points.
    ///
    /// The first and last output points are the input endpoints. The
    /// input must be processed so distances and angles are available.
    pub fn resample(&self, points: usize) -> Stroke {
        resample_impl(self, points, points, true)
    }

    /// Resample with the spacing of a `points`-point resample, but
    /// emit at most `cap` points.
    ///
    /// When `cap` is less than `points` the output covers only the
    /// leading portion of the input path.
    pub fn resample_clipped(&self, points: usize, cap: usize) -> Stroke {
        resample_impl(self, points, cap, false)
    }
}

fn resample_impl(input: &Stroke, points: usize, cap: usize, exact_end: bool) -> Stroke {
    if input.is_empty() {
        warn!("attempted to resample an empty stroke");
        return Stroke::new();
    }
    let mut points = points;
    let mut cap = cap;
    if cap >= POINTS_MAX {
        warn!("stroke sized to maximum length possible");
        cap = POINTS_MAX;
    }
    if points >= POINTS_MAX {
        warn!("stroke sampled to maximum length possible");
        points = POINTS_MAX;
    }
    if points < 1 {
        points = 1;
    }
    let out_len = cap.min(points).max(1);

    let mut out = Stroke::new();
    out.set_spread(input.spread());
    out.set_center(input.center());
    out.set_bbox(input.bbox());
    out.set_processed(true);

    // A single input point, or a request for one, replicates.
    if input.len() <= 1 || points <= 1 {
        *out.points_mut() = vec![input.points()[0]; out_len];
        out.set_distance(0.0);
        return out;
    }
    out.set_distance(input.distance());

    let src = input.points();
    let dist_per = input.distance() as f64 / (points - 1) as f64;
    let mut dist_j = seg_mag(src, 0);
    let mut dist_i = dist_per;
    let mut j = 0usize;

    let dst = out.points_mut();
    dst.reserve(out_len);
    dst.push(src[0]);
    let mut i = 1;
    'interpolate: while i < out_len - 1 {
        // Advance to the input segment holding the next sample.
        while dist_i >= dist_j {
            if j >= src.len() - 2 {
                break 'interpolate;
            }
            dist_i -= dist_j;
            j += 1;
            dist_j = seg_mag(src, j);
        }
        let frac = dist_i / dist_j;
        dst.push(Point {
            x: (src[j].x as f64 + (src[j + 1].x as f64 - src[j].x as f64) * frac) as i8,
            y: (src[j].y as f64 + (src[j + 1].y as f64 - src[j].y as f64) * frac) as i8,
            angle: src[j].angle,
        });
        dist_i += dist_per;
        i += 1;
    }
    let tail = if exact_end {
        src[src.len() - 1]
    } else {
        src[j + 1]
    };
    while i < out_len {
        dst.push(tail);
        i += 1;
    }
    out
}

#[inline]
fn seg_mag(points: &[Point], j: usize) -> f64 {
    let dx = points[j + 1].x as f64 - points[j].x as f64;
    let dy = points[j + 1].y as f64 - points[j].y as f64;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processed(points: &[(i32, i32)]) -> Stroke {
        let mut s = Stroke::new();
        for &(x, y) in points {
            s.draw(x, y);
        }
        s.process();
        s
    }

    #[test]
    fn resample_line_is_evenly_spaced() {
        let s = processed(&[(0, 0), (100, 0)]);
        let r = s.resample(5);
        assert_eq!(r.len(), 5);
        let xs: Vec<i8> = r.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 25, 50, 75, 100]);
        assert!(r.points().iter().all(|p| p.y == 0));
    }

    #[test]
    fn resample_preserves_endpoints() {
        let s = processed(&[(-90, -90), (3, 17), (41, -5), (90, 90)]);
        for n in [2, 3, 7, 20] {
            let r = s.resample(n);
            assert_eq!(r.points()[0], s.points()[0]);
            let last = r.points()[r.len() - 1];
            let orig = s.points()[s.len() - 1];
            assert_eq!((last.x, last.y), (orig.x, orig.y));
        }
    }

    #[test]
    fn resample_carries_cached_data() {
        let s = processed(&[(0, 0), (60, 80)]);
        let r = s.resample(10);
        assert_eq!(r.distance(), s.distance());
        assert_eq!(r.center(), s.center());
        assert_eq!(r.spread(), s.spread());
        assert!(r.points().iter().all(|p| p.angle == s.points()[0].angle));
    }

    #[test]
    fn resample_single_point_replicates() {
        let s = processed(&[(7, -3)]);
        let r = s.resample(4);
        assert_eq!(r.len(), 4);
        assert!(r.points().iter().all(|p| (p.x, p.y) == (7, -3)));
        assert_eq!(r.distance(), 0.0);
    }

    #[test]
    fn resample_clipped_covers_leading_portion() {
        let pts: Vec<(i32, i32)> = (0..=10).map(|i| (i * 10, 0)).collect();
        let s = processed(&pts);
        // Spacing of an 11-point resample (10 units), but only 5
        // points: the output stops less than halfway along.
        let r = s.resample_clipped(11, 5);
        assert_eq!(r.len(), 5);
        let xs: Vec<i8> = r.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn resample_caps_at_points_max() {
        let s = processed(&[(-120, 0), (120, 0)]);
        let r = s.resample(POINTS_MAX + 50);
        assert_eq!(r.len(), POINTS_MAX);
    }
}
