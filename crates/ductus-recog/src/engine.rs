//! Scoring engine plumbing
//!
//! Recognition runs a fixed set of engine slots over the sample store.
//! Each engine rates every stored sample on its own scale and writes the
//! result into the sample's scratch slot; the recognizer then recenters
//! each slot's ratings around their mean and folds them into a single
//! composite rating per sample.

use ductus_core::Sample;

use crate::blocks::BlockTable;
use crate::recognizer::{Options, WordContext};
use crate::store::{SampleStore, StoredSample};
use crate::wordfreq::WordList;
use crate::{ENGINE_SCALE, MAX_RANGE};

/// Number of engine slots.
pub const ENGINE_COUNT: usize = 4;

// ===========================================================================
// Slots
// ===========================================================================

/// Identifies one of the fixed engine slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Greedy stroke mapping and key-point distance.
    Prep,
    /// Average point distance over mapped strokes.
    AvgDist,
    /// Average angular difference over mapped strokes.
    AvgAngle,
    /// Word-frequency context.
    WordFreq,
}

impl EngineKind {
    /// Index of this slot in rating arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Tuning and per-pass statistics for one engine slot.
#[derive(Debug, Clone)]
pub struct EngineSlot {
    /// Display name, also used in profiles and logs.
    pub name: &'static str,
    /// Weight of this engine in the composite rating. Zero disables
    /// the slot.
    pub range: i32,
    /// Leave zero ratings out of the max/average statistics.
    pub ignore_zeros: bool,
    /// Extra attenuation in units of [`ENGINE_SCALE`]; negative means
    /// none. The angle engine adjusts this per pass.
    pub scale: i32,
    /// Highest rating seen this pass.
    pub max: i32,
    /// Mean rating this pass, subtracted before weighting.
    pub average: i32,
}

/// The slot table with stock tuning.
pub fn default_slots() -> [EngineSlot; ENGINE_COUNT] {
    [
        EngineSlot {
            name: "Key-point distance",
            range: MAX_RANGE,
            ignore_zeros: true,
            scale: -1,
            max: 0,
            average: 0,
        },
        EngineSlot {
            name: "Average distance",
            range: MAX_RANGE,
            ignore_zeros: true,
            scale: -1,
            max: 0,
            average: 0,
        },
        EngineSlot {
            name: "Average angle",
            range: MAX_RANGE,
            ignore_zeros: true,
            scale: 0,
            max: 0,
            average: 0,
        },
        EngineSlot {
            name: "Word context",
            range: MAX_RANGE / 3,
            ignore_zeros: false,
            scale: -1,
            max: 0,
            average: 0,
        },
    ]
}

// ===========================================================================
// Pass context
// ===========================================================================

/// Counters and results from one recognition pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassStats {
    /// Samples that survived the cheap structural checks.
    pub examined: usize,
    /// Samples dropped during averaging for a poor stroke mapping.
    pub disqualified: usize,
    /// Rating gap between the top two alternates, in percent.
    pub strength: i32,
    /// Wall-clock time spent recognizing, in milliseconds.
    pub elapsed_ms: u64,
}

/// One recognition pass over the store, as the engines see it.
pub struct Pass<'a> {
    /// The processed input sample.
    pub input: &'a Sample,
    /// Stored samples and their per-pass scratch.
    pub store: &'a mut SampleStore,
    /// Engine slots, mutable for tuning adjusted at run time.
    pub slots: &'a mut [EngineSlot; ENGINE_COUNT],
    /// Recognition options.
    pub options: &'a Options,
    /// Unicode block switches.
    pub blocks: &'a BlockTable,
    /// Word list backing the context engine.
    pub word_list: &'a WordList,
    /// Characters surrounding the input being recognized.
    pub context: &'a WordContext,
    /// Pass counters.
    pub stats: &'a mut PassStats,
}

/// Rates every stored sample against an input sample.
///
/// An engine writes raw ratings into the scratch slot named by
/// [`kind`](ScoringEngine::kind); scales need not agree between engines
/// because the recognizer normalizes each slot separately.
pub trait ScoringEngine {
    /// Display name for logs.
    fn name(&self) -> &'static str;
    /// The slot this engine writes.
    fn kind(&self) -> EngineKind;
    /// Rate every sample in the pass.
    fn run(&mut self, pass: &mut Pass);
}

// ===========================================================================
// Rating helpers
// ===========================================================================

/// Contribution of slot `slot` to a composite rating, given the raw
/// rating a sample earned there.
pub(crate) fn engine_rating(slot: &EngineSlot, rating: i32) -> i32 {
    if slot.range == 0 || slot.max < 1 {
        return 0;
    }
    let mut value = (rating - slot.average) * slot.range / slot.max;
    if slot.scale >= 0 {
        value = value * slot.scale / ENGINE_SCALE;
    }
    value
}

/// Why a stored sample cannot match the input, or 0 if it still can.
///
/// Reason 1 is structural (stroke count or disabled sample), reason 2
/// was determined by an engine this pass, reason 3 is a disabled
/// character.
pub(crate) fn disqualify_reason(
    entry: &StoredSample,
    input: &Sample,
    options: &Options,
    blocks: &BlockTable,
) -> u8 {
    if (!options.ignore_stroke_num && entry.sample.len() != input.len())
        || !entry.sample.enabled()
    {
        return 1;
    }
    if entry.disqualified {
        return 2;
    }
    match entry.sample.ch() {
        Some(ch) if blocks.char_disabled(ch) => 3,
        _ => 0,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ductus_core::{Sample, Stroke};

    #[test]
    fn rating_is_recentered_and_weighted() {
        let mut slot = default_slots()[EngineKind::Prep.index()].clone();
        slot.max = 200;
        slot.average = 50;
        assert_eq!(engine_rating(&slot, 150), 50);
        assert_eq!(engine_rating(&slot, 50), 0);
        assert_eq!(engine_rating(&slot, 0), -25);
    }

    #[test]
    fn unused_slot_rates_zero() {
        let mut slot = default_slots()[EngineKind::Prep.index()].clone();
        slot.max = 0;
        assert_eq!(engine_rating(&slot, 100), 0);
        slot.max = 200;
        slot.range = 0;
        assert_eq!(engine_rating(&slot, 100), 0);
    }

    #[test]
    fn scale_attenuates_in_engine_units() {
        let mut slot = default_slots()[EngineKind::AvgAngle.index()].clone();
        slot.max = 100;
        slot.scale = ENGINE_SCALE / 2;
        assert_eq!(engine_rating(&slot, 100), 50);
    }

    fn entry_with_strokes(ch: char, strokes: usize) -> StoredSample {
        let mut sample = Sample::new();
        for i in 0..strokes {
            let mut stroke = Stroke::new();
            stroke.draw(i as i32 * 10, 0);
            stroke.draw(i as i32 * 10, 50);
            sample.add_stroke(stroke).unwrap();
        }
        sample.set_ch(Some(ch));
        sample.set_used(1);
        sample.set_enabled(true);
        StoredSample::new(sample)
    }

    #[test]
    fn disqualify_checks_structure_then_scratch_then_blocks() {
        let blocks = BlockTable::new();
        let mut options = Options::default();
        let input = entry_with_strokes('x', 1).sample;

        let mut entry = entry_with_strokes('a', 2);
        assert_eq!(disqualify_reason(&entry, &input, &options, &blocks), 0);

        options.ignore_stroke_num = false;
        assert_eq!(disqualify_reason(&entry, &input, &options, &blocks), 1);
        options.ignore_stroke_num = true;

        entry.sample.set_enabled(false);
        assert_eq!(disqualify_reason(&entry, &input, &options, &blocks), 1);
        entry.sample.set_enabled(true);

        entry.disqualified = true;
        assert_eq!(disqualify_reason(&entry, &input, &options, &blocks), 2);
        entry.disqualified = false;

        let mut blocks = BlockTable::new();
        blocks.no_latin_alpha = true;
        assert_eq!(disqualify_reason(&entry, &input, &options, &blocks), 3);

        let digit = entry_with_strokes('7', 1);
        assert_eq!(disqualify_reason(&digit, &input, &options, &blocks), 0);
    }
}
