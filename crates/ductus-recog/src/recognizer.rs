//! Recognition passes and training
//!
//! One pass rates every stored sample with each scoring engine,
//! recenters each engine's ratings around their per-pass mean, and
//! folds them into one composite rating per sample. The best-rated
//! samples become the ranked alternate list and the winner is written
//! back onto the input.

use std::time::Instant;

use ductus_core::Sample;
use log::{debug, info, log_enabled, warn, Level};

use crate::average::AverageEngine;
use crate::blocks::BlockTable;
use crate::engine::{
    default_slots, disqualify_reason, engine_rating, EngineSlot, Pass, PassStats, ScoringEngine,
    ENGINE_COUNT,
};
use crate::error::RecogResult;
use crate::prep::PrepEngine;
use crate::store::{SampleId, SampleStore, StoredSample};
use crate::wordfreq::{WordFreqEngine, WordList};
use crate::{RATING_MAX, RATING_MIN};

// ===========================================================================
// Options and results
// ===========================================================================

/// Recognition tuning, adjustable between passes.
#[derive(Debug, Clone)]
pub struct Options {
    /// Match strokes drawn in the opposite direction of the trained
    /// ones.
    pub ignore_stroke_dir: bool,
    /// Match samples whose stroke count differs from the input's.
    pub ignore_stroke_num: bool,
    /// Let the word being written nudge the ratings.
    pub wordfreq_enable: bool,
    /// Ranked alternates kept per pass. At least one is always kept.
    pub alternates: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            ignore_stroke_dir: true,
            ignore_stroke_num: true,
            wordfreq_enable: true,
            alternates: 5,
        }
    }
}

/// The characters around the cell being written.
#[derive(Debug, Clone, Default)]
pub struct WordContext {
    /// Word fragment to the left of the cell.
    pub before: String,
    /// Word fragment to the right of the cell.
    pub after: String,
}

/// One ranked candidate from a recognition pass.
#[derive(Debug, Clone, Copy)]
pub struct Alternate {
    /// The candidate character.
    pub ch: char,
    /// Composite rating, normalized to percent.
    pub rating: i32,
    /// The sample behind the candidate, for later promotion or
    /// demotion.
    pub id: SampleId,
}

/// The outcome of one recognition pass.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// The best candidate, also written onto the input sample.
    pub ch: Option<char>,
    /// Candidates in falling rating order, at most one per character.
    pub alternates: Vec<Alternate>,
    /// Counters from this pass.
    pub stats: PassStats,
}

// ===========================================================================
// Rating helpers
// ===========================================================================

/// Recenters one slot's statistics over this pass's raw ratings and
/// returns the slot's contribution to the total range.
fn slot_stats(slot: &mut EngineSlot, entries: &[StoredSample], kind: usize) -> i32 {
    slot.max = 0;
    slot.average = 0;
    let mut rated = 0;
    for entry in entries {
        if entry.sample.ch().is_none() {
            continue;
        }
        let value = entry.ratings[kind].max(0);
        if value == 0 && slot.ignore_zeros {
            continue;
        }
        if value > slot.max {
            slot.max = value;
        }
        slot.average += value;
        rated += 1;
    }
    if rated == 0 {
        return 0;
    }
    slot.average /= rated;
    let range = if slot.max > 0 { slot.range } else { 0 };
    if slot.max == slot.average {
        // Every rating was the same; rate them all at full range
        slot.average = 0;
    } else {
        slot.max -= slot.average;
    }
    range
}

/// Composite rating of one stored sample, penalty applied and clamped.
fn composite_rating(
    entry: &StoredSample,
    input: &Sample,
    options: &Options,
    blocks: &BlockTable,
    slots: &[EngineSlot; ENGINE_COUNT],
) -> i32 {
    if entry.sample.ch().is_none()
        || disqualify_reason(entry, input, options, blocks) != 0
        || entry.penalty >= 1.0
    {
        return RATING_MIN;
    }
    let mut rating = 0;
    for (kind, slot) in slots.iter().enumerate() {
        rating += engine_rating(slot, entry.ratings[kind]);
    }
    rating = (rating as f32 * (1.0 - entry.penalty)) as i32;
    rating.clamp(RATING_MIN, RATING_MAX)
}

/// Sorts sample `idx` into the ranked alternate list.
///
/// The list stays sorted by falling rating, holds at most one entry
/// per character, and ends at its first empty slot.
fn rank_alternate(alts: &mut [Option<usize>], entries: &[StoredSample], idx: usize) {
    let num_alts = alts.len();
    let Some(ch) = entries[idx].sample.ch() else {
        return;
    };
    let rating = entries[idx].rating;

    let mut j = 0;
    while j < num_alts {
        match alts[j] {
            None => {
                if j < num_alts - 1 {
                    alts[j + 1] = None;
                }
                break;
            }
            Some(other) if entries[other].sample.ch() == Some(ch) => {
                // One slot per character; keep the better rating
                if entries[other].rating >= rating {
                    j = num_alts;
                }
                break;
            }
            Some(other) if entries[other].rating < rating => {
                if j == num_alts - 1 {
                    break;
                }
                // An entry for the same character further down gets
                // absorbed by the shift
                let mut k = j + 1;
                while k < num_alts - 1
                    && alts[k].is_some_and(|o| entries[o].sample.ch() != Some(ch))
                {
                    k += 1;
                }
                // Do not swallow the terminator
                if alts[k].is_none() && k < num_alts - 1 {
                    alts[k + 1] = None;
                }
                for m in (j..k).rev() {
                    alts[m + 1] = alts[m];
                }
                break;
            }
            Some(_) => j += 1,
        }
    }
    if j < num_alts {
        alts[j] = Some(idx);
    }
}

// ===========================================================================
// Recognizer
// ===========================================================================

/// The recognition state: options, engines, trained samples, block
/// switches, and the word list.
pub struct Recognizer {
    pub(crate) options: Options,
    pub(crate) store: SampleStore,
    pub(crate) blocks: BlockTable,
    pub(crate) slots: [EngineSlot; ENGINE_COUNT],
    pub(crate) engines: Vec<Box<dyn ScoringEngine>>,
    pub(crate) word_list: WordList,
    pub(crate) context: WordContext,
    pub(crate) strength_sum: i32,
    pub(crate) inputs: i32,
}

impl Recognizer {
    /// A recognizer with stock tuning, an empty store, and the
    /// compiled-in word list.
    pub fn new() -> Recognizer {
        Recognizer {
            options: Options::default(),
            store: SampleStore::new(),
            blocks: BlockTable::new(),
            slots: default_slots(),
            engines: vec![
                Box::new(PrepEngine),
                Box::new(AverageEngine),
                Box::new(WordFreqEngine),
            ],
            word_list: WordList::builtin(),
            context: WordContext::default(),
            strength_sum: 0,
            inputs: 0,
        }
    }

    /// Recognition options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable recognition options.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// The trained sample store.
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Mutable access to the trained sample store.
    pub fn store_mut(&mut self) -> &mut SampleStore {
        &mut self.store
    }

    /// Unicode block switches.
    pub fn blocks(&self) -> &BlockTable {
        &self.blocks
    }

    /// Mutable access to the block switches. Samples trained before a
    /// switch flip keep their old enabled state until
    /// [`set_block_enabled`](Recognizer::set_block_enabled) or
    /// [`read_profile`](Recognizer::read_profile) runs.
    pub fn blocks_mut(&mut self) -> &mut BlockTable {
        &mut self.blocks
    }

    /// Switches one Unicode block and refreshes which stored samples
    /// are enabled; returns whether anything changed.
    pub fn set_block_enabled(&mut self, index: usize, on: bool) -> bool {
        let changed = self.blocks.set_enabled(index, on);
        if changed {
            self.blocks.update_enabled(&mut self.store);
        }
        changed
    }

    /// Stores `sample` as a training example for its character.
    pub fn train(&mut self, sample: &Sample, trusted: bool) -> RecogResult<SampleId> {
        self.store.train(sample, trusted)
    }

    /// Forgets every sample trained for `ch`.
    pub fn untrain(&mut self, ch: char) {
        self.store.untrain(ch);
    }

    /// Number of samples stored for `ch`.
    pub fn char_trained(&self, ch: char) -> usize {
        self.store.char_trained(ch)
    }

    /// Rewards the sample behind a correct guess.
    pub fn promote(&mut self, id: SampleId) -> RecogResult<()> {
        self.store.promote(id)
    }

    /// Punishes the sample behind a wrong guess.
    pub fn demote(&mut self, id: SampleId) -> RecogResult<()> {
        self.store.demote(id)
    }

    /// Sets the characters surrounding the cell being written.
    pub fn set_word_context(&mut self, context: WordContext) {
        self.context = context;
    }

    /// Replaces the word list backing the context engine.
    pub fn set_word_list(&mut self, list: WordList) {
        self.word_list = list;
    }

    /// Mean strength over every pass that produced a result, in
    /// percent.
    pub fn average_strength(&self) -> i32 {
        if self.inputs > 0 {
            self.strength_sum / self.inputs
        } else {
            0
        }
    }

    /// Recognizes one drawn sample.
    ///
    /// The winning character is returned and also written onto the
    /// input; an input nothing qualified for gets [`None`].
    pub fn recognize(&mut self, input: &mut Sample) -> Recognition {
        let started = Instant::now();
        let mut stats = PassStats::default();

        input.process();
        if input.is_empty() {
            warn!("Attempted to recognize an empty sample");
            input.set_ch(None);
            return Recognition {
                ch: None,
                alternates: Vec::new(),
                stats,
            };
        }

        let Recognizer {
            options,
            store,
            blocks,
            slots,
            engines,
            word_list,
            context,
            strength_sum,
            inputs,
        } = self;

        // Clear ratings
        for entry in store.slots_mut() {
            entry.ratings = [0; ENGINE_COUNT];
            entry.rating = 0;
        }

        // Run the engines and recenter each slot's ratings
        let mut range = 0;
        for kind in 0..ENGINE_COUNT {
            if let Some(engine) = engines.iter_mut().find(|e| e.kind().index() == kind) {
                let mut pass = Pass {
                    input: &*input,
                    store: &mut *store,
                    slots: &mut *slots,
                    options: &*options,
                    blocks: &*blocks,
                    word_list: &*word_list,
                    context: &*context,
                    stats: &mut stats,
                };
                engine.run(&mut pass);
            }
            range += slot_stats(&mut slots[kind], store.slots(), kind);
        }
        if range == 0 {
            stats.elapsed_ms = started.elapsed().as_millis() as u64;
            info!("Recognized -- no ratings, {}ms", stats.elapsed_ms);
            input.set_ch(None);
            return Recognition {
                ch: None,
                alternates: Vec::new(),
                stats,
            };
        }

        // Rank the top samples
        let num_alts = options.alternates.max(1);
        let mut alts: Vec<Option<usize>> = vec![None; num_alts];
        for idx in 0..store.slots().len() {
            let rating = composite_rating(&store.slots()[idx], input, options, blocks, slots);
            let entries = store.slots_mut();
            entries[idx].rating = rating;
            if rating < 1 {
                continue;
            }
            rank_alternate(&mut alts, entries, idx);
        }

        // Normalize the listed ratings to percent
        let mut alternates = Vec::with_capacity(num_alts);
        for slot_idx in alts.iter().map_while(|entry| *entry) {
            let entry = &mut store.slots_mut()[slot_idx];
            entry.rating = entry.rating * 100 / range;
            if let Some(ch) = entry.sample.ch() {
                alternates.push(Alternate {
                    ch,
                    rating: entry.rating,
                    id: SampleId::new(slot_idx, entry.sample.used()),
                });
            }
        }

        stats.strength = match alternates.len() {
            0 => 0,
            1 => 100,
            _ => alternates[0].rating - alternates[1].rating,
        };
        if !alternates.is_empty() {
            *strength_sum += stats.strength;
            *inputs += 1;
        }

        stats.elapsed_ms = started.elapsed().as_millis() as u64;
        if stats.examined > 0 {
            let qualified = stats.examined - stats.disqualified;
            let per_symbol = if qualified > 0 {
                stats.elapsed_ms as i64 / qualified as i64
            } else {
                -1
            };
            info!(
                "Recognized -- {}/{} ({}%) disqualified, {}ms ({}ms/symbol), {}% strong",
                stats.disqualified,
                stats.examined,
                stats.disqualified * 100 / stats.examined,
                stats.elapsed_ms,
                per_symbol,
                stats.strength
            );
        } else {
            info!("Recognized -- nothing examined, {}ms", stats.elapsed_ms);
        }

        // Print the top candidate scores in detail
        if log_enabled!(Level::Debug) {
            for alt in &alternates {
                let entry = &store.slots()[alt.id.index()];
                let ratings: Vec<String> = slots
                    .iter()
                    .enumerate()
                    .map(|(kind, slot)| {
                        format!(
                            "{:4} [{:5}]",
                            engine_rating(slot, entry.ratings[kind]),
                            entry.ratings[kind]
                        )
                    })
                    .collect();
                let tfm = &entry.transform;
                let order: String = tfm
                    .order
                    .iter()
                    .map(|&o| (i32::from(o) - 1).to_string())
                    .collect();
                let reverse: String = tfm
                    .reverse
                    .iter()
                    .map(|&r| if r { 'R' } else { '-' })
                    .collect();
                let glue: String = tfm.glue.iter().map(|&g| g.to_string()).collect();
                debug!(
                    "| '{}' ({}) {:3}% [{}{}{}]",
                    alt.ch,
                    ratings.join(","),
                    alt.rating,
                    order,
                    reverse,
                    glue
                );
            }
        }

        // Select the top result
        let ch = alternates.first().map(|alt| alt.ch);
        input.set_ch(ch);
        Recognition {
            ch,
            alternates,
            stats,
        }
    }
}

impl Default for Recognizer {
    fn default() -> Recognizer {
        Recognizer::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ductus_core::Stroke;

    fn stroke(pts: &[(i32, i32)]) -> Stroke {
        let mut s = Stroke::new();
        for &(x, y) in pts {
            s.draw(x, y);
        }
        s
    }

    fn sample_of(ch: char, strokes: Vec<Stroke>) -> Sample {
        let mut sample = Sample::new();
        for s in strokes {
            sample.add_stroke(s).unwrap();
        }
        sample.set_ch(Some(ch));
        sample
    }

    fn bar() -> Stroke {
        stroke(&[(0, -80), (0, -40), (0, 0), (0, 40), (0, 80)])
    }

    fn input_of(strokes: Vec<Stroke>) -> Sample {
        let mut sample = Sample::new();
        for s in strokes {
            sample.add_stroke(s).unwrap();
        }
        sample
    }

    fn entry(ch: char, rating: i32) -> StoredSample {
        let mut e = StoredSample::default();
        e.sample.set_ch(Some(ch));
        e.rating = rating;
        e
    }

    #[test]
    fn ranking_fills_slots_in_falling_order() {
        let entries = vec![entry('a', 90), entry('b', 80), entry('c', 70)];
        let mut alts = vec![None; 4];
        for idx in [1, 0, 2] {
            rank_alternate(&mut alts, &entries, idx);
        }
        assert_eq!(alts, vec![Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn ranking_keeps_one_slot_per_character() {
        let entries = vec![entry('a', 90), entry('a', 85), entry('a', 95)];
        let mut alts = vec![None; 4];
        rank_alternate(&mut alts, &entries, 0);
        rank_alternate(&mut alts, &entries, 1);
        assert_eq!(alts, vec![Some(0), None, None, None]);
        rank_alternate(&mut alts, &entries, 2);
        assert_eq!(alts, vec![Some(2), None, None, None]);
    }

    #[test]
    fn displaced_duplicate_is_absorbed() {
        let entries = vec![entry('a', 90), entry('b', 80), entry('x', 70), entry('x', 85)];
        let mut alts = vec![None; 4];
        for idx in [0, 1, 2] {
            rank_alternate(&mut alts, &entries, idx);
        }
        rank_alternate(&mut alts, &entries, 3);
        assert_eq!(alts, vec![Some(0), Some(3), Some(1), None]);
    }

    #[test]
    fn shifting_into_free_space_keeps_terminator() {
        let entries = vec![entry('a', 90), entry('b', 80), entry('c', 85)];
        let mut alts = vec![None; 4];
        for idx in [0, 1] {
            rank_alternate(&mut alts, &entries, idx);
        }
        rank_alternate(&mut alts, &entries, 2);
        assert_eq!(alts, vec![Some(0), Some(2), Some(1), None]);
    }

    #[test]
    fn full_list_drops_the_weakest() {
        let entries = vec![entry('a', 90), entry('b', 80), entry('c', 85)];
        let mut alts = vec![None; 2];
        for idx in [0, 1, 2] {
            rank_alternate(&mut alts, &entries, idx);
        }
        assert_eq!(alts, vec![Some(0), Some(2)]);
    }

    #[test]
    fn slot_stats_skips_zeros_when_told() {
        let mut entries = vec![entry('a', 0), entry('b', 0), entry('c', 0)];
        entries[0].ratings[0] = 100;
        entries[2].ratings[0] = 50;

        let mut slot = default_slots()[0].clone();
        slot.ignore_zeros = true;
        assert_eq!(slot_stats(&mut slot, &entries, 0), 100);
        assert_eq!(slot.average, 75);
        assert_eq!(slot.max, 25);

        let mut slot = default_slots()[0].clone();
        slot.ignore_zeros = false;
        slot_stats(&mut slot, &entries, 0);
        assert_eq!(slot.average, 50);
        assert_eq!(slot.max, 50);
    }

    #[test]
    fn slot_stats_clears_average_when_flat() {
        let mut entries = vec![entry('a', 0)];
        entries[0].ratings[0] = 100;
        let mut slot = default_slots()[0].clone();
        assert_eq!(slot_stats(&mut slot, &entries, 0), 100);
        assert_eq!(slot.max, 100);
        assert_eq!(slot.average, 0);
        // The lone sample rates at full range
        assert_eq!(engine_rating(&slot, 100), 100);
    }

    #[test]
    fn lone_sample_recognized_at_full_strength() {
        let mut recognizer = Recognizer::new();
        recognizer.train(&sample_of('l', vec![bar()]), true).unwrap();

        let mut input = input_of(vec![bar()]);
        let result = recognizer.recognize(&mut input);

        assert_eq!(result.ch, Some('l'));
        assert_eq!(input.ch(), Some('l'));
        assert_eq!(result.alternates.len(), 1);
        assert_eq!(result.alternates[0].rating, 100);
        assert_eq!(result.stats.strength, 100);
        assert_eq!(result.stats.examined, 1);
        assert_eq!(recognizer.average_strength(), 100);

        // The handle in the result stays valid for promotion
        recognizer.promote(result.alternates[0].id).unwrap();
    }

    #[test]
    fn closest_of_several_shapes_wins() {
        let mut recognizer = Recognizer::new();
        recognizer.train(&sample_of('l', vec![bar()]), true).unwrap();
        recognizer
            .train(
                &sample_of('j', vec![stroke(&[(0, -80), (0, -40), (0, 0), (-8, 40), (-20, 80)])]),
                true,
            )
            .unwrap();
        recognizer
            .train(
                &sample_of('r', vec![stroke(&[(0, -80), (8, -40), (20, 0), (35, 40), (55, 80)])]),
                true,
            )
            .unwrap();
        recognizer
            .train(
                &sample_of('s', vec![stroke(&[(0, -80), (-30, -40), (30, 0), (-30, 40), (0, 80)])]),
                true,
            )
            .unwrap();

        let mut input = input_of(vec![bar()]);
        let result = recognizer.recognize(&mut input);

        assert_eq!(result.ch, Some('l'));
        assert_eq!(result.stats.examined, 4);
        assert!(result.alternates.len() >= 2);
        assert!(result
            .alternates
            .windows(2)
            .all(|pair| pair[0].rating >= pair[1].rating));
        assert!(result.alternates.iter().all(|alt| alt.rating <= 100));
        // Normalized ratings were written back to the store
        for alt in &result.alternates {
            assert_eq!(recognizer.store().slots()[alt.id.index()].rating, alt.rating);
        }
    }

    #[test]
    fn empty_store_recognizes_nothing() {
        let mut recognizer = Recognizer::new();
        let mut input = input_of(vec![bar()]);
        let result = recognizer.recognize(&mut input);
        assert_eq!(result.ch, None);
        assert!(result.alternates.is_empty());
        assert_eq!(input.ch(), None);
    }

    #[test]
    fn empty_input_recognizes_nothing() {
        let mut recognizer = Recognizer::new();
        recognizer.train(&sample_of('l', vec![bar()]), true).unwrap();
        let mut input = Sample::new();
        let result = recognizer.recognize(&mut input);
        assert_eq!(result.ch, None);
        assert!(result.alternates.is_empty());
        assert_eq!(result.stats.examined, 0);
    }

    #[test]
    fn disabled_block_disqualifies_its_characters() {
        let mut recognizer = Recognizer::new();
        recognizer.train(&sample_of('я', vec![bar()]), true).unwrap();
        let index = recognizer
            .blocks()
            .blocks()
            .iter()
            .position(|block| block.name == "Cyrillic")
            .unwrap();

        // Cyrillic starts switched off, but the fresh sample stays
        // enabled until the switches are refreshed
        assert!(recognizer.set_block_enabled(index, true));
        let mut input = input_of(vec![bar()]);
        assert_eq!(recognizer.recognize(&mut input).ch, Some('я'));

        assert!(recognizer.set_block_enabled(index, false));
        let mut input = input_of(vec![bar()]);
        let result = recognizer.recognize(&mut input);
        assert_eq!(result.ch, None);
        assert_eq!(result.stats.examined, 0);
    }

    #[test]
    fn word_context_breaks_shape_ties() {
        let mut recognizer = Recognizer::new();
        recognizer.train(&sample_of('1', vec![bar()]), true).unwrap();
        recognizer.train(&sample_of('l', vec![bar()]), true).unwrap();

        // Identical shapes tie, so the first stored sample wins
        let mut input = input_of(vec![bar()]);
        let plain = recognizer.recognize(&mut input);
        assert_eq!(plain.ch, Some('1'));
        assert_eq!(plain.stats.strength, 0);

        // Writing the middle of "all" favors the letter
        recognizer.set_word_context(WordContext {
            before: "a".to_owned(),
            after: "l".to_owned(),
        });
        let mut input = input_of(vec![bar()]);
        let result = recognizer.recognize(&mut input);
        assert_eq!(result.ch, Some('l'));
        assert!(result.stats.strength > 0);
    }
}
