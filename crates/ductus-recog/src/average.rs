//! Average distance and average angle engines
//!
//! Where the preparation engine compares key points at rough pitch,
//! these engines resample each mapped stroke pair to a fine, equal
//! pitch and average the pointwise distance and the pointwise angular
//! difference over the whole pair. Both reuse the stroke mapping the
//! preparation engine left in each sample's scratch.

use ductus_core::geom::{Vec2, ANGLE_PI};
use ductus_core::{Sample, Stroke, DOT_SPREAD, POINTS_MAX};
use log::warn;

use crate::blocks::BlockTable;
use crate::elastic::{measure_strokes, CostMetric};
use crate::engine::{
    disqualify_reason, EngineKind, EngineSlot, Pass, ScoringEngine, ENGINE_COUNT,
};
use crate::recognizer::Options;
use crate::store::StoredSample;
use crate::{ENGINE_SCALE, FINE_ELASTICITY, FINE_RESOLUTION, MAX_DIST, RATING_MAX};

// Caps on the averaged measures
const MEASURE_DIST: f32 = MAX_DIST as f32;
const MEASURE_ANGLE: f32 = (ANGLE_PI / 4) as f32;

/// Resamples two strokes to a shared fine pitch.
fn fine_pair(a: &Stroke, b: &Stroke) -> (Stroke, Stroke) {
    let dist = a.distance().max(b.distance());
    let mut points = 1 + (dist / FINE_RESOLUTION) as usize;
    if points > POINTS_MAX {
        points = POINTS_MAX;
    }
    (a.resample(points), b.resample(points))
}

/// Average distance and angle between one mapped stroke pair, with `a`
/// shifted by `offset` before distances are taken.
fn stroke_average(
    a: &Stroke,
    b: &Stroke,
    offset: Vec2,
    slots: &[EngineSlot; ENGINE_COUNT],
) -> (f32, f32) {
    if a.is_empty() || b.is_empty() {
        warn!("Attempted to measure zero-length stroke");
        return (MEASURE_DIST, ANGLE_PI as f32);
    }
    let (a_sampled, b_sampled) = fine_pair(a, b);

    let mut dist = 0.0;
    if slots[EngineKind::AvgDist.index()].range != 0 {
        dist = measure_strokes(
            &a_sampled,
            &b_sampled,
            CostMetric::Position { offset },
            a_sampled.len(),
            FINE_ELASTICITY,
        );
    }

    // Angles mean nothing when either stroke has no real segments.
    if a.spread() < DOT_SPREAD {
        return (dist, 0.0);
    }
    if b.spread() < DOT_SPREAD {
        return (dist, ANGLE_PI as f32);
    }

    let mut angle = 0.0;
    if slots[EngineKind::AvgAngle.index()].range != 0 {
        angle = measure_strokes(
            &a_sampled,
            &b_sampled,
            CostMetric::Direction,
            a_sampled.len() - 1,
            FINE_ELASTICITY,
        );
    }
    (dist, angle)
}

/// Rates one stored sample by the averaged measures over all mapped
/// stroke pairs, weighted by stroke length.
fn sample_average(
    entry: &mut StoredSample,
    input: &Sample,
    slots: &[EngineSlot; ENGINE_COUNT],
    options: &Options,
    blocks: &BlockTable,
    num_disqualified: &mut usize,
) {
    let reason = disqualify_reason(entry, input, options, blocks);
    if reason != 0 {
        if reason == 2 {
            *num_disqualified += 1;
        }
        return;
    }

    // Adjust for the difference between sample centers
    let ic_to_sc = entry.sample.center() - input.center();

    let input_larger = input.len() >= entry.sample.len();
    let smaller = if input_larger { &entry.sample } else { input };

    let mut distance = 0.0f32;
    let mut m_dist = 0.0f32;
    let mut m_angle = 0.0f32;
    for i in 0..smaller.len() {
        // Map the larger sample's strokes onto the smaller one
        let (input_stroke, sample_stroke);
        if input_larger {
            input_stroke = input.transformed_stroke(&entry.transform, i);
            sample_stroke = entry.sample.stroke(i).clone();
        } else {
            input_stroke = input.stroke(i).clone();
            sample_stroke = entry.sample.transformed_stroke(&entry.transform, i);
        }

        let weight = if smaller.stroke(i).spread() < DOT_SPREAD {
            DOT_SPREAD as f32
        } else {
            smaller.stroke(i).distance()
        };
        let (s_dist, s_angle) = stroke_average(&input_stroke, &sample_stroke, ic_to_sc, slots);
        m_dist += s_dist * weight;
        m_angle += s_angle * weight;
        distance += weight;
    }

    // Undo square distortion and account for multiple strokes
    m_dist = m_dist.sqrt() / distance;
    m_angle /= distance;

    if m_dist > MEASURE_DIST {
        m_dist = MEASURE_DIST;
    }
    if m_angle > ANGLE_PI as f32 {
        m_angle = ANGLE_PI as f32;
    }

    entry.ratings[EngineKind::AvgDist.index()] =
        (RATING_MAX as f32 - RATING_MAX as f32 * m_dist / MEASURE_DIST) as i32;
    entry.ratings[EngineKind::AvgAngle.index()] =
        (RATING_MAX as f32 - RATING_MAX as f32 * m_angle / MEASURE_ANGLE) as i32;
}

/// The averaging engine; writes the average distance and average angle
/// slots in one sweep.
pub struct AverageEngine;

impl ScoringEngine for AverageEngine {
    fn name(&self) -> &'static str {
        "Average distance"
    }

    fn kind(&self) -> EngineKind {
        EngineKind::AvgDist
    }

    fn run(&mut self, pass: &mut Pass) {
        let input = pass.input;
        let options = pass.options;
        let blocks = pass.blocks;
        let store = &mut *pass.store;
        let slots = &mut *pass.slots;
        let stats = &mut *pass.stats;

        stats.disqualified = 0;
        if slots[EngineKind::AvgDist.index()].range == 0
            && slots[EngineKind::AvgAngle.index()].range == 0
        {
            return;
        }

        // Discount the angle engine when the input contains segments
        // too short to produce meaningful angles
        let mut scale = 0;
        for stroke in input.strokes() {
            if stroke.spread() >= DOT_SPREAD {
                scale += 1;
            }
        }
        slots[EngineKind::AvgAngle.index()].scale = scale * ENGINE_SCALE / input.len() as i32;

        let slots = &*slots;
        for idx in 0..store.slots().len() {
            let slot = &mut store.slots_mut()[idx];
            if slot.sample.ch().is_none() {
                continue;
            }
            sample_average(slot, input, slots, options, blocks, &mut stats.disqualified);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
