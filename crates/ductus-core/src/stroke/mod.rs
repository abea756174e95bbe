//! Stroke - a drawn polyline with cached measurements
//!
//! A stroke is the unit of pen input: the points recorded between pen
//! down and pen up, in drawing order, on the logical grid. Processing a
//! stroke caches the quantities every comparison needs:
//!
//! - per-point segment direction ([`Angle`])
//! - total arc length
//! - arc-length-weighted center
//! - spread (largest bounding-box extent)
//!
//! Strokes whose spread stays within [`DOT_SPREAD`] are "dots": they
//! carry no usable direction information and several measures treat
//! them specially.

pub mod filter;
pub mod glue;
pub mod resample;

use log::warn;

use crate::geom::{Angle, Vec2};
use crate::{DOT_SPREAD, POINTS_GRAN, POINTS_MAX, SCALE};

/// One recorded pen position plus the direction of the segment leaving it.
///
/// Coordinates are clamped to the open grid `(-SCALE/2, SCALE/2)`. The
/// final point of a processed stroke duplicates the previous point's
/// direction so every point has a meaningful angle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i8,
    pub y: i8,
    pub angle: Angle,
}

impl Point {
    /// Position as a float vector.
    #[inline]
    pub fn pos(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// A drawn polyline with cached measurements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    center: Vec2,
    distance: f32,
    spread: i32,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
    processed: bool,
}

impl Stroke {
    /// Create a new empty stroke.
    pub fn new() -> Stroke {
        Stroke::default()
    }

    /// Number of recorded points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no points have been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All recorded points.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Total arc length, valid after [`Stroke::process`].
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Arc-length-weighted center, valid after [`Stroke::process`].
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Largest bounding-box extent, valid after [`Stroke::process`].
    #[inline]
    pub fn spread(&self) -> i32 {
        self.spread
    }

    /// Whether the stroke is a dot (spread below [`DOT_SPREAD`]).
    #[inline]
    pub fn is_dot(&self) -> bool {
        self.spread < DOT_SPREAD
    }

    #[inline]
    pub(crate) fn set_processed(&mut self, processed: bool) {
        self.processed = processed;
    }

    pub(crate) fn bbox(&self) -> (i32, i32, i32, i32) {
        (self.min_x, self.max_x, self.min_y, self.max_y)
    }

    pub(crate) fn set_bbox(&mut self, bbox: (i32, i32, i32, i32)) {
        (self.min_x, self.max_x, self.min_y, self.max_y) = bbox;
    }

    pub(crate) fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub(crate) fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }

    pub(crate) fn set_spread(&mut self, spread: i32) {
        self.spread = spread;
    }

    pub(crate) fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    /// Append a drawn point in grid coordinates.
    ///
    /// Coordinates outside the grid are clamped. When the stroke
    /// reaches [`POINTS_MAX`] points it is resampled down by
    /// [`POINTS_GRAN`] points so drawing can continue indefinitely.
    pub fn draw(&mut self, x: i32, y: i32) {
        if self.points.len() >= POINTS_MAX {
            warn!(
                "stroke reached {} points, resampling down to {}",
                POINTS_MAX,
                POINTS_MAX - POINTS_GRAN
            );
            self.process();
            *self = self.resample(POINTS_MAX - POINTS_GRAN);
        }
        let x = x.clamp(-SCALE / 2 + 1, SCALE / 2 - 1);
        let y = y.clamp(-SCALE / 2 + 1, SCALE / 2 - 1);
        self.points.push(Point {
            x: x as i8,
            y: y as i8,
            angle: Angle::ZERO,
        });
        self.processed = false;
    }

    /// Cache segment angles, arc length, weighted center, and spread.
    ///
    /// Idempotent; mutating operations clear the cached state so the
    /// next call recomputes it.
    pub fn process(&mut self) {
        if self.processed {
            return;
        }
        self.processed = true;
        if self.points.is_empty() {
            return;
        }
        if self.points.len() == 1 {
            self.center = self.points[0].pos();
            self.spread = 0;
            return;
        }

        self.min_x = self.points[0].x as i32;
        self.max_x = self.min_x;
        self.min_y = self.points[0].y as i32;
        self.max_y = self.min_y;
        let mut distance = 0.0f32;
        let mut center = Vec2::ZERO;
        for i in 0..self.points.len() - 1 {
            let p = self.points[i];
            let q = self.points[i + 1];
            let seg = q.pos() - p.pos();
            self.points[i].angle = seg.angle();

            self.min_x = self.min_x.min(q.x as i32);
            self.min_y = self.min_y.min(q.y as i32);
            self.max_x = self.max_x.max(q.x as i32);
            self.max_y = self.max_y.max(q.y as i32);

            let weight = seg.mag();
            distance += weight;
            center = center + (q.pos() + p.pos()).scaled(weight / 2.0);
        }
        if distance > 0.0 {
            self.center = center.scaled(1.0 / distance);
        } else {
            // All points coincide; behave like a dot.
            self.center = self.points[0].pos();
        }
        let last = self.points.len() - 1;
        self.points[last].angle = self.points[last - 1].angle;
        self.distance = distance;

        self.spread = (self.max_x - self.min_x).max(self.max_y - self.min_y);
    }
}
