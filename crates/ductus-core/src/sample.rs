//! Sample - a complete drawn character
//!
//! A sample holds the strokes of one character attempt, either freshly
//! drawn input or a stored training example. Processing a sample
//! processes each stroke, computes the weighted sample center and
//! total weight, caches rough-resampled copies of every stroke for
//! inexpensive comparisons, and fills the gluability matrices that
//! tell the structural matcher which stroke pairs could plausibly be
//! one pen motion.

use log::warn;

use crate::error::{Error, Result};
use crate::geom::Vec2;
use crate::stroke::Stroke;
use crate::{DOT_SPREAD, GLUABLE_MAX, GLUE_DIST, ROUGH_RESOLUTION, STROKES_MAX};

// ===========================================================================
// Transform
// ===========================================================================

/// A structural mapping from the strokes of one sample onto another.
///
/// `order[j]` gives the one-based target stroke that source stroke `j`
/// maps onto, or zero if unassigned. `glue[j]` orders the source
/// strokes glued onto one target, and `reverse[j]` marks strokes
/// matched back to front. `reach` accumulates the pen-up distance the
/// gluing introduced.
#[derive(Debug, Clone, Default)]
pub struct Transform {
    pub valid: bool,
    pub order: Vec<u8>,
    pub reverse: Vec<bool>,
    pub glue: Vec<u8>,
    pub reach: f32,
}

impl Transform {
    /// An invalid transform with room for `len` source strokes.
    pub fn new(len: usize) -> Transform {
        Transform {
            valid: false,
            order: vec![0; len],
            reverse: vec![false; len],
            glue: vec![0; len],
            reach: 0.0,
        }
    }
}

// ===========================================================================
// Sample
// ===========================================================================

/// A drawn or stored character: strokes plus cached measurements.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    ch: Option<char>,
    used: u64,
    enabled: bool,
    strokes: Vec<Stroke>,
    roughs: Vec<Stroke>,
    center: Vec2,
    distance: f32,
    gluable_start: Vec<u8>,
    gluable_end: Vec<u8>,
    processed: bool,
}

impl Sample {
    /// Create a new empty sample.
    pub fn new() -> Sample {
        Sample::default()
    }

    /// The character this sample represents, if assigned.
    #[inline]
    pub fn ch(&self) -> Option<char> {
        self.ch
    }

    pub fn set_ch(&mut self, ch: Option<char>) {
        self.ch = ch;
    }

    /// Usage stamp for least-recently-used replacement.
    #[inline]
    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn set_used(&mut self, used: u64) {
        self.used = used;
    }

    /// Whether the sample's Unicode block is enabled.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Number of strokes.
    #[inline]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Check if the sample has no strokes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// All strokes in drawing order.
    #[inline]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// One stroke by index.
    #[inline]
    pub fn stroke(&self, i: usize) -> &Stroke {
        &self.strokes[i]
    }

    /// Rough-resampled strokes, valid after [`Sample::process`].
    #[inline]
    pub fn roughs(&self) -> &[Stroke] {
        &self.roughs
    }

    /// One rough-resampled stroke by index.
    #[inline]
    pub fn rough(&self, i: usize) -> &Stroke {
        &self.roughs[i]
    }

    /// Weighted center, valid after [`Sample::process`].
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Total stroke weight, valid after [`Sample::process`].
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[inline]
    pub fn processed(&self) -> bool {
        self.processed
    }

    /// Gluability from the start of stroke `i` to stroke `j`, in the
    /// range `0..=GLUABLE_MAX`, where [`GLUABLE_MAX`] means the pair
    /// cannot be glued.
    #[inline]
    pub fn gluable_start(&self, i: usize, j: usize) -> u8 {
        self.gluable_start[i * self.strokes.len() + j]
    }

    /// Gluability from the end of stroke `i` to stroke `j`.
    #[inline]
    pub fn gluable_end(&self, i: usize, j: usize) -> u8 {
        self.gluable_end[i * self.strokes.len() + j]
    }

    /// Append a stroke.
    pub fn add_stroke(&mut self, stroke: Stroke) -> Result<()> {
        if self.strokes.len() >= STROKES_MAX {
            return Err(Error::StrokeLimit {
                len: self.strokes.len(),
                max: STROKES_MAX,
            });
        }
        self.strokes.push(stroke);
        self.processed = false;
        Ok(())
    }

    /// Reset to an empty, unassigned sample.
    pub fn clear(&mut self) {
        *self = Sample::new();
    }

    /// Generate the cached properties of the sample.
    ///
    /// Idempotent. Strokes below [`DOT_SPREAD`] weigh in as dots so a
    /// stray tap cannot vanish from the weighting entirely.
    pub fn process(&mut self) {
        if self.processed {
            return;
        }
        self.processed = true;

        for stroke in &mut self.strokes {
            stroke.process();
        }

        let n = self.strokes.len();
        self.gluable_start = vec![GLUABLE_MAX; n * n];
        self.gluable_end = vec![GLUABLE_MAX; n * n];
        for i in 0..n {
            let (row_start, row_end) = gluable_row(&self.strokes, i);
            self.gluable_start[i * n..(i + 1) * n].copy_from_slice(&row_start);
            self.gluable_end[i * n..(i + 1) * n].copy_from_slice(&row_end);
        }

        let mut center = Vec2::ZERO;
        let mut distance = 0.0f32;
        let mut roughs = Vec::with_capacity(n);
        for stroke in &self.strokes {
            let weight = if stroke.is_dot() {
                DOT_SPREAD as f32
            } else {
                stroke.distance()
            };
            center = center + stroke.center().scaled(weight);
            distance += weight;

            let points = ((stroke.distance() / ROUGH_RESOLUTION + 0.5) as usize).max(4);
            roughs.push(stroke.resample(points));
        }
        self.roughs = roughs;
        if distance > 0.0 {
            self.center = center.scaled(1.0 / distance);
        }
        self.distance = distance;
    }

    /// Build target stroke `i` of a transform by gluing the source
    /// strokes mapped onto it, in glue order.
    pub fn transformed_stroke(&self, tfm: &Transform, target: usize) -> Stroke {
        let mut out = Stroke::new();
        let len = self.strokes.len().min(tfm.order.len());
        for level in 0..STROKES_MAX {
            let found = (0..len).find(|&j| {
                tfm.order[j] as usize == target + 1 && tfm.glue[j] as usize == level
            });
            match found {
                Some(j) => out.glue(&self.strokes[j], tfm.reverse[j]),
                None => break,
            }
        }
        if out.is_empty() {
            warn!("transform mapped no strokes onto target {target}");
        }
        out.process();
        out
    }
}

/// Lowest distance from the start and end points of stroke `k` to any
/// point on each other stroke, scaled into gluability units.
fn gluable_row(strokes: &[Stroke], k: usize) -> (Vec<u8>, Vec<u8>) {
    let n = strokes.len();
    let mut row_start = vec![GLUABLE_MAX; n];
    let mut row_end = vec![GLUABLE_MAX; n];
    let s1 = &strokes[k];
    // Dots cannot be glued.
    if s1.is_dot() {
        return (row_start, row_end);
    }

    for (from_start, row) in [(true, &mut row_start), (false, &mut row_end)] {
        let point = if from_start {
            s1.points()[0].pos()
        } else {
            s1.points()[s1.len() - 1].pos()
        };
        for (i, s2) in strokes.iter().enumerate() {
            if i == k || s2.is_dot() {
                continue;
            }
            let mut min = GLUE_DIST as f32;

            let dist = (s2.points()[0].pos() - point).mag();
            if dist < min {
                min = dist;
            }
            for j in 0..s2.len() - 1 {
                let (l, mag) = (s2.points()[j].pos() - s2.points()[j + 1].pos()).normalized();
                let w = s2.points()[j].pos() - point;
                let dot = l.dot(w);
                // Points outside the segment measure to the far
                // endpoint, otherwise to the segment line.
                let dist = if dot < 0.0 || dot > mag {
                    (s2.points()[j + 1].pos() - point).mag()
                } else {
                    w.cross(l).abs()
                };
                if dist < min {
                    min = dist;
                }
            }
            row[i] = (min * GLUABLE_MAX as f32 / GLUE_DIST as f32) as u8;
        }
    }
    (row_start, row_end)
}
