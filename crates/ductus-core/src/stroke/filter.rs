//! Input filters applied between pen-up and recognition
//!
//! Raw pen input is noisy. [`Stroke::smooth`] pulls each interior
//! point halfway toward the chord between its neighbors, and
//! [`Stroke::simplify`] drops interior points that sit on the line
//! between their neighbors. Both run before the stroke is processed.

use crate::geom::Vec2;
use crate::stroke::Stroke;

/// Greatest distance from the neighbor chord, in grid units, at which
/// a point is still considered collinear and removed.
const SIMPLIFY_THRESHOLD: f32 = 0.5;

impl Stroke {
    /// Smooth interior points toward the chord between their neighbors.
    ///
    /// Each point moves halfway to its projection onto the segment
    /// joining the previous original point and the next point. Points
    /// whose neighbors coincide are left alone.
    pub fn smooth(&mut self) {
        if self.points.is_empty() {
            return;
        }
        let mut last = (self.points[0].x, self.points[0].y);
        for i in 1..self.points.len().saturating_sub(1) {
            let next = self.points[i + 1];
            if last == (next.x, next.y) {
                last = (self.points[i].x, self.points[i].y);
                continue;
            }
            let a = Vec2::new(last.0 as f32, last.1 as f32);
            let b = self.points[i].pos();
            let c = next.pos();
            let m = a + (b - a).projected_onto(c - a);
            let moved = b + (m - b).scaled(0.5);
            last = (self.points[i].x, self.points[i].y);
            self.points[i].x = (moved.x + 0.5) as i8;
            self.points[i].y = (moved.y + 0.5) as i8;
        }
        self.processed = false;
    }

    /// Remove interior points collinear with their neighbors.
    ///
    /// A point is removed when it projects onto the segment between
    /// its neighbors and lies within half a grid unit of it. Removal
    /// re-examines the same index, so runs of collinear points
    /// collapse in one call.
    pub fn simplify(&mut self) {
        let mut i = 1;
        while i + 1 < self.points.len() {
            let prev = self.points[i - 1].pos();
            let cur = self.points[i].pos();
            let next = self.points[i + 1].pos();
            let (l, mag) = (prev - next).normalized();
            let w = prev - cur;
            let dot = l.dot(w);
            if dot < 0.0 || dot > mag {
                i += 1;
                continue;
            }
            if w.cross(l).abs() < SIMPLIFY_THRESHOLD {
                self.points.remove(i);
            } else {
                i += 1;
            }
        }
        self.processed = false;
    }
}
