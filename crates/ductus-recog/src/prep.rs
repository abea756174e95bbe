//! Preparation engine: greedy stroke mapping and key-point distance
//!
//! This engine runs first. For every stored sample it builds a
//! [`Transform`] that maps the strokes of the larger sample onto the
//! strokes of the smaller one, gluing several pen motions into one
//! where the shapes allow it, and rates the pair by the elastic
//! distance of the mapped strokes. Samples whose best mapping is still
//! poor are disqualified so the costlier engines never see them; the
//! ones that survive carry their transform into the averaging pass.

use ductus_core::geom::Vec2;
use ductus_core::{Sample, Stroke, Transform, DOT_SPREAD, GLUABLE_MAX, ROUGH_RESOLUTION, SCALE};

use crate::elastic::{measure_strokes, CostMetric};
use crate::engine::{EngineKind, Pass, PassStats, ScoringEngine};
use crate::recognizer::Options;
use crate::store::StoredSample;
use crate::{MAX_DIST, RATING_MAX, ROUGH_ELASTICITY};

// Mapping values beyond VALUE_MAX never count as a match; below
// VALUE_MIN the match is good enough to stop searching.
const VALUE_MAX: f32 = 2048.0;
const VALUE_MIN: f32 = 1024.0;

// Penalties, as a proportion of the final composite rating.
const VERTICAL_PENALTY: f32 = 16.0;
const GLUABLE_PENALTY: f32 = 0.08;
const GLUE_PENALTY: f32 = 0.02;

// ===========================================================================
// Partial measurement
// ===========================================================================

/// Rates a rough input stroke against the leading portion of a mapped
/// stroke.
///
/// `b` is resampled at rough pitch as if it had length `b.distance() *
/// scale_b`, but only as many points as `a` offers are compared, so a
/// partially glued stroke is charged for the part drawn so far and not
/// for the part still missing.
fn measure_partial(a: &Stroke, b: &Stroke, offset: Vec2, scale_b: f32) -> f32 {
    let mut b_len = (b.distance() * scale_b / ROUGH_RESOLUTION + 0.5) as usize;
    if b_len < 4 {
        b_len = 4;
    }
    let min_len = a.len().min(b_len);
    let bs = b.resample_clipped(b_len, min_len);
    measure_strokes(
        a,
        &bs,
        CostMetric::Position { offset },
        min_len,
        ROUGH_ELASTICITY,
    )
}

// ===========================================================================
// Greedy mapping
// ===========================================================================

struct GreedyFit {
    transform: Transform,
    value: f32,
    penalty: f32,
}

/// Maps every stroke of `larger` onto some stroke of `smaller`.
///
/// Each smaller stroke claims the unassigned larger stroke that
/// measures best against it, then keeps gluing further strokes on while
/// the glue distances stay plausible and there are strokes to spare.
/// The returned transform is invalid if any larger stroke was left
/// unassigned.
fn greedy_map(larger: &Sample, smaller: &Sample, offset: Vec2, options: &Options) -> GreedyFit {
    let mut ptfm = Transform::new(larger.len());
    let mut tfm = Transform::new(larger.len());
    tfm.valid = true;

    let mut unmapped_len = larger.len();
    let mut total = 0.0f32;
    let mut penalty_total = 0.0f32;

    for i in 0..smaller.len() {
        let mut best_reach = f32::MAX;
        let mut best_value = f32::MAX;
        let mut penalty = f32::MAX;
        let mut seg_dist = 0.0f32;
        let mut last_j = 0usize;
        let mut glue = 0u8;

        'glue_more: loop {
            let mut best = f32::MAX;
            let mut best_j = 0usize;

            'strokes: for j in 0..larger.len() {
                if tfm.order[j] != 0 {
                    continue;
                }
                tfm.reverse[j] = false;

                // Do not glue on oversize segments
                if seg_dist + larger.stroke(j).distance() / 2.0 > smaller.stroke(i).distance()
                    && (larger.stroke(j).spread() > DOT_SPREAD
                        || smaller.stroke(i).spread() > DOT_SPREAD)
                {
                    continue;
                }

                tfm.order[j] = (i + 1) as u8;
                tfm.glue[j] = glue;

                'measure: loop {
                    let mut reach = 0.0f32;
                    let mut gluable: u8 = 0;
                    if glue > 0 {
                        // Can these strokes be one pen motion?
                        if !tfm.reverse[j] {
                            gluable = larger
                                .gluable_start(j, last_j)
                                .min(larger.gluable_end(last_j, j));
                            if gluable >= GLUABLE_MAX {
                                if !options.ignore_stroke_dir {
                                    tfm.order[j] = 0;
                                    continue 'strokes;
                                }
                                tfm.reverse[j] = true;
                            }
                        }
                        if tfm.reverse[j] {
                            gluable = larger
                                .gluable_end(j, last_j)
                                .min(larger.gluable_start(last_j, j));
                            if gluable >= GLUABLE_MAX {
                                tfm.order[j] = 0;
                                tfm.reverse[j] = false;
                                continue 'strokes;
                            }
                        }

                        // Pen-up distance bridged by the glue
                        let from = larger.stroke(last_j);
                        let to = larger.stroke(j);
                        let p1 = from.points()
                            [if tfm.reverse[last_j] { 0 } else { from.len() - 1 }];
                        let p2 = to.points()[if tfm.reverse[j] { to.len() - 1 } else { 0 }];
                        reach = (p2.pos() - p1.pos()).mag();
                    }

                    // Transform and measure the distance
                    let stroke = larger.transformed_stroke(&tfm, i);
                    let scale = smaller.distance() / (reach + ptfm.reach + larger.distance());
                    let value = measure_partial(smaller.rough(i), &stroke, offset, scale);

                    // Keep track of the best result
                    if value < best && value < VALUE_MAX {
                        best = value;
                        best_j = j;
                        best_reach = reach;
                        ptfm = tfm.clone();
                        penalty = glue as f32 * GLUE_PENALTY
                            + gluable as f32 * GLUABLE_PENALTY / GLUABLE_MAX as f32;
                    }

                    // Bail if we have a really good match
                    if value < VALUE_MIN {
                        break 'strokes;
                    }

                    // Retry with the stroke direction reversed
                    if options.ignore_stroke_dir
                        && !tfm.reverse[j]
                        && larger.stroke(j).spread() > DOT_SPREAD
                    {
                        tfm.reverse[j] = true;
                        continue 'measure;
                    }
                    break;
                }

                tfm.reverse[j] = false;
                tfm.order[j] = 0;
            }

            if best < f32::MAX {
                best_value = best;
                penalty_total += penalty;
                seg_dist += best_reach + larger.stroke(best_j).distance();
                ptfm.reach += best_reach;
                tfm = ptfm.clone();

                // If strokes remain and we did not just add on a dot,
                // try gluing them on
                unmapped_len -= 1;
                if unmapped_len >= smaller.len() - i
                    && larger.stroke(best_j).spread() > DOT_SPREAD
                {
                    last_j = best_j;
                    glue += 1;
                    continue 'glue_more;
                }
            } else if glue == 0 {
                // Didn't map a target stroke
                ptfm.valid = false;
                return GreedyFit {
                    transform: ptfm,
                    value: f32::MAX,
                    penalty: penalty_total,
                };
            }
            break;
        }

        total += best_value;
    }

    // Didn't assign all of the strokes?
    if unmapped_len != 0 {
        ptfm.valid = false;
        return GreedyFit {
            transform: ptfm,
            value: f32::MAX,
            penalty: penalty_total,
        };
    }

    GreedyFit {
        value: total / smaller.len() as f32,
        transform: ptfm,
        penalty: penalty_total,
    }
}

// ===========================================================================
// Engine
// ===========================================================================

/// Maps and rates one stored sample; true if it stays in the running.
fn prep_sample(
    entry: &mut StoredSample,
    input: &Sample,
    options: &Options,
    stats: &mut PassStats,
) -> bool {
    // Structural disqualification
    if entry.sample.used() == 0
        || !entry.sample.enabled()
        || (!options.ignore_stroke_num && entry.sample.len() != input.len())
    {
        return false;
    }

    stats.examined += 1;
    entry.penalty = 0.0;

    // Account for displacement
    let offset = input.center() - entry.sample.center();

    // Map the strokes of the larger sample onto the smaller one; the
    // resulting transform is reused by the averaging engines.
    let fit = if input.len() >= entry.sample.len() {
        greedy_map(input, &entry.sample, offset, options)
    } else {
        greedy_map(&entry.sample, input, Vec2::new(-offset.x, -offset.y), options)
    };
    entry.transform = fit.transform;
    entry.penalty += fit.penalty;
    if !entry.transform.valid {
        return false;
    }

    // Undo square distortion
    let dist = fit.value.sqrt();
    if dist > MAX_DIST as f32 {
        return false;
    }

    // Penalize vertical displacement
    entry.penalty += VERTICAL_PENALTY * offset.y * offset.y / SCALE as f32 / SCALE as f32;

    entry.ratings[EngineKind::Prep.index()] =
        (RATING_MAX as f32 - RATING_MAX as f32 * dist / MAX_DIST as f32) as i32;
    true
}

/// The preparation engine; see the module docs.
pub struct PrepEngine;

impl ScoringEngine for PrepEngine {
    fn name(&self) -> &'static str {
        "Key-point distance"
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Prep
    }

    fn run(&mut self, pass: &mut Pass) {
        let input = pass.input;
        let options = pass.options;
        let store = &mut *pass.store;
        let stats = &mut *pass.stats;

        // Only the best few mappings per stored sample count are worth
        // the averaging engines' time.
        let prep_samples = store.samples_max() * 4;
        let mut list: Vec<(i32, usize)> = Vec::with_capacity(prep_samples);

        stats.examined = 0;
        for idx in 0..store.slots().len() {
            let slot = &mut store.slots_mut()[idx];
            slot.disqualified = true;
            if slot.is_free() || slot.sample.ch().is_none() {
                continue;
            }
            if !prep_sample(slot, input, options, stats) {
                continue;
            }

            // Sort the sample into the shortlist
            let rating = slot.ratings[EngineKind::Prep.index()];
            let pos = list
                .iter()
                .position(|entry| entry.0 < rating)
                .unwrap_or(list.len());
            if pos < prep_samples {
                list.insert(pos, (rating, idx));
                list.truncate(prep_samples);
            }
        }

        // Qualify the best samples
        for &(_, idx) in &list {
            store.slots_mut()[idx].disqualified = false;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
