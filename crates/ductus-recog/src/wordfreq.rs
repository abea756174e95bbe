//! Word-frequency context engine
//!
//! When the caller tells us which letters surround the cell being
//! written, a frequency-ranked word list suggests which characters are
//! likely to come next. The suggestion is purely additive: it nudges
//! the composite rating and never disqualifies anybody.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::engine::{EngineKind, Pass, ScoringEngine};
use crate::error::RecogResult;
use crate::profile::atoi;

/// Hard cap on loaded word list entries.
const WORDS_MAX: usize = 15000;

/// Longest word kept, in bytes.
const WORD_LEN: usize = 23;

// ===========================================================================
// Word lists
// ===========================================================================

/// A frequency-ranked word list.
///
/// Each line of the source file holds a word, a tab or space, and an
/// occurrence count. Counts are stored on a natural-log scale so that a
/// handful of very common words cannot drown out the rest.
pub struct WordList {
    entries: Vec<(String, i32)>,
}

impl WordList {
    /// An empty list. The context engine abstains with one of these.
    pub fn empty() -> WordList {
        WordList {
            entries: Vec::new(),
        }
    }

    /// The compiled-in list of common English words.
    pub fn builtin() -> WordList {
        let mut list = WordList::empty();
        for line in include_str!("wordfreq.txt").lines() {
            list.push_line(line);
        }
        list
    }

    /// Reads a word list in `word<tab>count` line format.
    pub fn from_reader<R: BufRead>(reader: R) -> RecogResult<WordList> {
        let mut list = WordList::empty();
        for line in reader.lines() {
            list.push_line(&line?);
        }
        Ok(list)
    }

    /// Reads a word list file.
    pub fn load<P: AsRef<Path>>(path: P) -> RecogResult<WordList> {
        WordList::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[(String, i32)] {
        &self.entries
    }

    fn push_line(&mut self, line: &str) {
        if self.entries.len() >= WORDS_MAX {
            return;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        let end = line.find(['\t', ' ']).unwrap_or(line.len());
        if end == 0 {
            return;
        }
        let mut cut = end.min(WORD_LEN);
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        let rest = line[end..].trim_start_matches(['\t', ' ']);
        let count = f64::from(atoi(rest).max(1)).ln() as i32;
        self.entries.push((line[..cut].to_owned(), count));
    }
}

// ===========================================================================
// Suggestion table
// ===========================================================================

/// Credits the characters `word` suggests for a cell with `before` on
/// its left and `after` on its right.
fn suggest(word: &[u8], count: i32, before: &[u8], after: &[u8], chars: &mut [i32; 128]) {
    let pre_len = before.len();
    if pre_len > 0 {
        match word.get(..pre_len) {
            Some(head) if head.eq_ignore_ascii_case(before) => {}
            _ => return,
        }
    }
    if !after.is_empty() {
        match word.get(pre_len + 1..pre_len + 1 + after.len()) {
            Some(tail) if tail.eq_ignore_ascii_case(after) => {}
            _ => return,
        }
    }
    let Some(&ch) = word.get(pre_len) else { return };
    if !(32..127).contains(&ch) {
        return;
    }

    // Suggest the case the word so far implies. Slot 0 absorbs the
    // suppressed variant.
    let mut lower = ch;
    let mut upper = 0u8;
    if ch.is_ascii_alphabetic() {
        lower = ch.to_ascii_lowercase();
        upper = ch.to_ascii_uppercase();
        if pre_len > 1 {
            if before[pre_len - 1].is_ascii_lowercase() {
                upper = 0;
            } else if before[pre_len - 1].is_ascii_uppercase()
                && before[pre_len - 2].is_ascii_uppercase()
            {
                lower = 0;
            }
        }
    }
    chars[lower as usize] += count;
    chars[upper as usize] += count;
}

// ===========================================================================
// Engine
// ===========================================================================

/// Rates printable ASCII characters by how well they continue the word
/// being written.
pub struct WordFreqEngine;

impl ScoringEngine for WordFreqEngine {
    fn name(&self) -> &'static str {
        "Word context"
    }

    fn kind(&self) -> EngineKind {
        EngineKind::WordFreq
    }

    fn run(&mut self, pass: &mut Pass) {
        if !pass.options.wordfreq_enable {
            return;
        }
        let before = pass.context.before.as_bytes();
        let after = pass.context.after.as_bytes();
        if before.is_empty() && after.is_empty() {
            return;
        }

        let mut chars = [0i32; 128];
        if before.last().is_some_and(|b| b.is_ascii_digit()) {
            // A digit next to the cell suggests more digits
            for digit in b'0'..=b'9' {
                chars[digit as usize] = 1;
            }
        } else {
            for (word, count) in pass.word_list.entries() {
                suggest(word.as_bytes(), *count, before, after, &mut chars);
            }
        }

        // Every stored printable character picks up its suggestion,
        // qualified or not
        for slot in pass.store.slots_mut() {
            let Some(ch) = slot.sample.ch() else { continue };
            let code = ch as u32;
            if (32..127).contains(&code) {
                slot.ratings[EngineKind::WordFreq.index()] = chars[code as usize];
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
