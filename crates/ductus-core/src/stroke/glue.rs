//! Reversing and gluing strokes
//!
//! Structural matching may decide that one sample's stroke corresponds
//! to several of the other's drawn in sequence, possibly backwards.
//! [`Stroke::glue`] appends a stroke onto another while keeping the
//! cached measurements valid, inserting the implied pen-up segment
//! between them. [`Stroke::reversed`] produces the stroke as if drawn
//! in the opposite direction.

use crate::geom::Vec2;
use crate::stroke::{Point, Stroke};

fn reverse_points(src: &[Point]) -> Vec<Point> {
    let len = src.len();
    (0..len)
        .map(|i| {
            let mut p = src[len - i - 1];
            if i < len - 1 {
                p.angle = src[len - i - 2].angle.opposite();
            } else if len > 1 {
                // The final point has no outgoing segment; duplicate
                // the previous direction like a processed stroke does.
                p.angle = src[0].angle.opposite();
            }
            p
        })
        .collect()
}

impl Stroke {
    /// The same stroke drawn in the opposite direction.
    ///
    /// Cached measurements are direction-independent and carry over;
    /// segment angles are flipped half a turn.
    pub fn reversed(&self) -> Stroke {
        let mut out = self.clone();
        *out.points_mut() = reverse_points(self.points());
        out
    }

    /// Glue `b` onto the end of this stroke, preserving processed
    /// properties.
    ///
    /// The pen-up gap between the two strokes becomes a new segment:
    /// its length joins the total distance and weights the combined
    /// center, and the joint point takes its direction. When `reverse`
    /// is set, `b` is appended back to front.
    pub fn glue(&mut self, b: &Stroke, reverse: bool) {
        if b.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = if reverse { b.reversed() } else { b.clone() };
            return;
        }

        let start = if reverse {
            b.points[b.points.len() - 1]
        } else {
            b.points[0]
        };
        let joint = self.points.len() - 1;
        let end = self.points[joint];
        let glue_seg = Vec2::new(
            start.x as f32 - end.x as f32,
            start.y as f32 - end.y as f32,
        );
        let glue_center = Vec2::new(
            ((start.x as i32 + end.x as i32) / 2) as f32,
            ((start.y as i32 + end.y as i32) / 2) as f32,
        );
        let glue_mag = glue_seg.mag();

        let (a_min_x, a_max_x, a_min_y, a_max_y) = self.bbox();
        let (b_min_x, b_max_x, b_min_y, b_max_y) = b.bbox();
        let min_x = a_min_x.min(b_min_x);
        let max_x = a_max_x.max(b_max_x);
        let min_y = a_min_y.min(b_min_y);
        let max_y = a_max_y.max(b_max_y);
        self.set_bbox((min_x, max_x, min_y, max_y));
        self.set_spread((max_x - min_x).max(max_y - min_y));

        let total = self.distance + b.distance + glue_mag;
        self.center = (self.center.scaled(self.distance)
            + b.center.scaled(b.distance)
            + glue_center.scaled(glue_mag))
        .scaled(1.0 / total);

        if !reverse || b.points.len() < 2 {
            self.points.extend_from_slice(&b.points);
        } else {
            self.points.extend(reverse_points(&b.points));
        }
        self.points[joint].angle = glue_seg.angle();
        self.distance += glue_mag + b.distance;
    }
}
