//! Trained sample storage
//!
//! Samples live in a flat slot array. A freed slot keeps its position
//! and is reclaimed by the next insert, so slot indexes stay stable
//! across training and forgetting. Usage stamps order samples by
//! recency: training past the per-character cap overwrites the stalest
//! sample of that character instead of growing the store.

use ductus_core::{Sample, Transform};
use log::warn;

use crate::engine::ENGINE_COUNT;
use crate::error::{RecogError, RecogResult};
use crate::SAMPLES_MAX;

// ===========================================================================
// Stored samples
// ===========================================================================

/// A stored sample and its per-pass recognition scratch.
///
/// The scratch fields are owned by whichever recognition pass is in
/// flight and carry no meaning between passes.
#[derive(Debug, Clone, Default)]
pub struct StoredSample {
    /// The trained sample.
    pub sample: Sample,
    /// Raw per-engine ratings from the current pass.
    pub ratings: [i32; ENGINE_COUNT],
    /// Composite rating from the current pass.
    pub rating: i32,
    /// Dropped by the preparation engine this pass.
    pub disqualified: bool,
    /// Mapping penalty accrued this pass, in `0..=1`.
    pub penalty: f32,
    /// Stroke mapping chosen by the preparation engine.
    pub transform: Transform,
}

impl StoredSample {
    /// Wraps a sample with cleared scratch.
    pub fn new(sample: Sample) -> StoredSample {
        StoredSample {
            sample,
            ..StoredSample::default()
        }
    }

    /// Whether this slot holds no sample.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.sample.used() == 0
    }

    fn free(&mut self) {
        *self = StoredSample::default();
    }
}

/// Stable handle to a stored sample.
///
/// The handle carries the usage stamp from when it was issued and goes
/// stale as soon as the slot is freed, overwritten, or promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleId {
    index: usize,
    used: u64,
}

impl SampleId {
    pub(crate) fn new(index: usize, used: u64) -> SampleId {
        SampleId { index, used }
    }

    /// Slot index this handle refers to.
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }
}

// ===========================================================================
// Store
// ===========================================================================

/// The set of trained samples.
pub struct SampleStore {
    slots: Vec<StoredSample>,
    samples_max: usize,
    current: u64,
}

impl SampleStore {
    pub fn new() -> SampleStore {
        SampleStore {
            slots: Vec::new(),
            samples_max: 5,
            current: 1,
        }
    }

    /// All slots, including freed ones.
    pub fn slots(&self) -> &[StoredSample] {
        &self.slots
    }

    /// All slots with mutable scratch, including freed ones.
    pub fn slots_mut(&mut self) -> &mut [StoredSample] {
        &mut self.slots
    }

    /// Cap on stored samples per character.
    pub fn samples_max(&self) -> usize {
        self.samples_max
    }

    /// Sets the per-character cap, clamped to `1..=SAMPLES_MAX`.
    pub fn set_samples_max(&mut self, max: usize) {
        self.samples_max = max.clamp(1, SAMPLES_MAX);
    }

    /// The usage stamp the next trusted training will take.
    pub(crate) fn current(&self) -> u64 {
        self.current
    }

    pub(crate) fn set_current(&mut self, current: u64) {
        self.current = current;
    }

    /// Whether `id` still names the sample it was issued for.
    pub fn is_valid(&self, id: SampleId) -> bool {
        self.slots
            .get(id.index)
            .is_some_and(|slot| !slot.is_free() && slot.sample.used() == id.used)
    }

    /// The stored sample behind `id`, unless the handle went stale.
    pub fn get(&self, id: SampleId) -> Option<&StoredSample> {
        if self.is_valid(id) {
            Some(&self.slots[id.index])
        } else {
            None
        }
    }

    /// Stores `sample` as a training example for its character.
    ///
    /// A trusted sample takes the next usage stamp and immediately
    /// outranks everything trained before it; an untrusted sample gets
    /// the lowest possible stamp and is the first to be overwritten.
    pub fn train(&mut self, sample: &Sample, trusted: bool) -> RecogResult<SampleId> {
        if sample.is_empty() {
            warn!("Attempted to train an empty sample");
            return Err(RecogError::EmptyInput);
        }
        if sample.ch().is_none() {
            return Err(RecogError::MissingChar);
        }
        let mut new = sample.clone();
        new.set_used(if trusted {
            let used = self.current;
            self.current += 1;
            used
        } else {
            1
        });
        new.set_enabled(true);
        Ok(self.insert(new, true))
    }

    /// Places a prepared sample into a slot and processes it.
    ///
    /// When the character already has `samples_max` samples stored, the
    /// one with the lowest usage stamp is overwritten; `force` treats
    /// the new sample as fresher than everything stored so the
    /// overwrite always goes through. Otherwise the first free slot is
    /// reused before the store grows.
    pub(crate) fn insert(&mut self, sample: Sample, force: bool) -> SampleId {
        let mut last_used = if force {
            self.current + 1
        } else {
            sample.used()
        };
        let mut create = None;
        let mut overwrite = None;
        let mut count = 0;

        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_free() {
                if create.is_none() {
                    create = Some(i);
                }
                continue;
            }
            if slot.sample.ch() != sample.ch() {
                continue;
            }
            if slot.sample.used() < last_used {
                last_used = slot.sample.used();
                overwrite = Some(i);
            }
            count += 1;
        }

        let index = match overwrite {
            Some(i) if count >= self.samples_max => i,
            _ => match create {
                Some(i) => i,
                None => {
                    self.slots.push(StoredSample::default());
                    self.slots.len() - 1
                }
            },
        };
        self.slots[index] = StoredSample::new(sample);
        self.slots[index].sample.process();
        SampleId::new(index, self.slots[index].sample.used())
    }

    /// Forgets every sample trained for `ch`.
    pub fn untrain(&mut self, ch: char) {
        for slot in &mut self.slots {
            if !slot.is_free() && slot.sample.ch() == Some(ch) {
                slot.free();
            }
        }
    }

    /// Number of samples stored for `ch`.
    pub fn char_trained(&self, ch: char) -> usize {
        self.slots
            .iter()
            .filter(|slot| !slot.is_free() && slot.sample.ch() == Some(ch))
            .count()
    }

    /// Marks the sample behind `id` as the freshest of its character.
    ///
    /// Called when the user accepts a correction, so the samples that
    /// keep matching well crowd out the ones that never do.
    pub fn promote(&mut self, id: SampleId) -> RecogResult<()> {
        if !self.is_valid(id) {
            return Err(RecogError::StaleSample);
        }
        let used = self.current;
        self.current += 1;
        self.slots[id.index].sample.set_used(used);
        Ok(())
    }

    /// Pushes the sample behind `id` to the back of the overwrite line,
    /// or forgets it outright when its character has other samples.
    pub fn demote(&mut self, id: SampleId) -> RecogResult<()> {
        if !self.is_valid(id) {
            return Err(RecogError::StaleSample);
        }
        match self.slots[id.index].sample.ch() {
            Some(ch) if self.char_trained(ch) > 1 => self.slots[id.index].free(),
            _ => self.slots[id.index].sample.set_used(1),
        }
        Ok(())
    }
}

impl Default for SampleStore {
    fn default() -> SampleStore {
        SampleStore::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
