//! Profile persistence
//!
//! A profile is a line-oriented text file. Each line starts with a
//! command word followed by whitespace-separated fields: `version`,
//! `recognize` (usage counter, per-character cap, Latin letter
//! override, engine ranges), `blocks` (one switch per Unicode block),
//! and `sample` (character, usage stamp, and `;`-terminated runs of
//! point coordinates). Unknown commands are skipped with a warning so
//! profiles can carry fields this build does not know about.

use std::io::{BufRead, Write};
use std::str::SplitWhitespace;

use ductus_core::{Sample, Stroke, POINTS_MAX};
use log::{debug, warn};

use crate::error::RecogResult;
use crate::recognizer::Recognizer;

/// Leading-integer parse in the C `atoi` style: optional sign, then
/// digits, ignoring anything after them. Out-of-range values saturate.
pub(crate) fn atoi(s: &str) -> i32 {
    let bytes = s.trim_start().as_bytes();
    let mut i = 0;
    let mut negative = false;
    match bytes.first() {
        Some(b'-') => {
            negative = true;
            i = 1;
        }
        Some(b'+') => i = 1,
        _ => {}
    }
    let mut value: i64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        value = value * 10 + i64::from(bytes[i] - b'0');
        if value > i64::from(i32::MAX) + 1 {
            value = i64::from(i32::MAX) + 1;
        }
        i += 1;
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// The profile's field accept rule: a token is taken only when it
/// parses to nonzero or is exactly `"0"`. Anything else leaves the
/// variable it would have set alone.
fn sync_int(token: Option<&str>) -> Option<i32> {
    let token = token?;
    let n = atoi(token);
    if n != 0 || token == "0" {
        Some(n)
    } else {
        None
    }
}

impl Recognizer {
    /// Reads a profile, merging its options, block switches, and
    /// samples into this recognizer.
    ///
    /// Malformed lines are skipped with a warning; only I/O failures
    /// error out.
    pub fn read_profile<R: BufRead>(&mut self, reader: R) -> RecogResult<()> {
        let mut commands = 0;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let mut tokens = line.split_whitespace();
            let Some(command) = tokens.next() else {
                continue;
            };
            commands += 1;
            if command.eq_ignore_ascii_case("version") {
                let version = atoi(tokens.next().unwrap_or(""));
                if version != 0 {
                    warn!("Loading a profile with incompatible version {version} (expected 0)");
                }
            } else if command.eq_ignore_ascii_case("recognize") {
                self.read_recognize(&mut tokens);
            } else if command.eq_ignore_ascii_case("blocks") {
                self.read_blocks(&mut tokens);
            } else if command.eq_ignore_ascii_case("sample") {
                self.read_sample(&mut tokens, line_no);
            } else {
                warn!("Unrecognized profile command '{command}'");
            }
        }
        debug!("Parsed {commands} profile commands");

        // Samples trained for disabled blocks stay stored but must not
        // compete until their block is switched back on
        self.blocks.update_enabled(&mut self.store);
        Ok(())
    }

    /// Writes the full profile: version, options, block switches, and
    /// every stored sample.
    pub fn write_profile<W: Write>(&self, writer: &mut W) -> RecogResult<()> {
        writeln!(writer, "version 0")?;

        write!(writer, "recognize")?;
        write!(writer, " {}", self.store.current())?;
        write!(writer, " {}", self.store.samples_max())?;
        write!(writer, " {}", i32::from(self.blocks.no_latin_alpha))?;
        for slot in &self.slots {
            write!(writer, " {}", slot.range)?;
        }
        writeln!(writer)?;

        write!(writer, "blocks")?;
        for block in self.blocks.blocks() {
            write!(writer, " {}", i32::from(block.enabled))?;
        }
        writeln!(writer)?;

        for entry in self.store.slots() {
            let sample = &entry.sample;
            let Some(ch) = sample.ch() else {
                continue;
            };
            if sample.used() == 0 {
                continue;
            }
            write!(writer, "sample {:5} {:5}", ch as u32, sample.used())?;
            for stroke in sample.strokes() {
                for point in stroke.points() {
                    write!(writer, " {:4} {:4}", point.x, point.y)?;
                }
                write!(writer, "    ;")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    fn read_recognize(&mut self, tokens: &mut SplitWhitespace) {
        if let Some(value) = sync_int(tokens.next()) {
            self.store.set_current(value.max(1) as u64);
        }
        if let Some(value) = sync_int(tokens.next()) {
            self.store.set_samples_max(value.max(1) as usize);
        }
        if let Some(value) = sync_int(tokens.next()) {
            self.blocks.no_latin_alpha = value != 0;
        }
        for slot in &mut self.slots {
            if let Some(value) = sync_int(tokens.next()) {
                slot.range = value;
            }
        }
    }

    fn read_blocks(&mut self, tokens: &mut SplitWhitespace) {
        for index in 0..self.blocks.len() {
            if let Some(value) = sync_int(tokens.next()) {
                self.blocks.set_enabled(index, value != 0);
            }
        }
    }

    fn read_sample(&mut self, tokens: &mut SplitWhitespace, line_no: usize) {
        let code = atoi(tokens.next().unwrap_or(""));
        let Some(ch) = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .filter(|&c| c != '\0')
        else {
            warn!("Sample on line {line_no} has no symbol");
            return;
        };
        let used = atoi(tokens.next().unwrap_or("")).max(0) as u64;

        let mut sample = Sample::new();
        sample.set_ch(Some(ch));
        sample.set_used(used);
        let mut stroke: Option<Stroke> = None;
        loop {
            let Some(token) = tokens.next() else {
                // End of the line commits the sample
                if let Some(pending) = stroke.take() {
                    if sample.add_stroke(pending).is_err() {
                        warn!("Sample on line {line_no} ('{ch}') is oversize");
                        return;
                    }
                }
                if sample.is_empty() {
                    warn!("Sample on line {line_no} ('{ch}') has no point data");
                    return;
                }
                self.store.insert(sample, false);
                return;
            };
            if token.starts_with(';') {
                if let Some(done) = stroke.take() {
                    if sample.add_stroke(done).is_err() {
                        warn!("Sample on line {line_no} ('{ch}') is oversize");
                        return;
                    }
                }
                continue;
            }
            let current = stroke.get_or_insert_with(Stroke::new);
            if current.len() >= POINTS_MAX {
                warn!("Symbol '{ch}' stroke {} is oversize", sample.len() + 1);
                return;
            }
            let x = atoi(token);
            let y = atoi(tokens.next().unwrap_or(""));
            current.draw(x, y);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

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

    #[test]
    fn atoi_parses_leading_integers() {
        assert_eq!(atoi(""), 0);
        assert_eq!(atoi("42"), 42);
        assert_eq!(atoi("-17"), -17);
        assert_eq!(atoi("+8"), 8);
        assert_eq!(atoi("12;"), 12);
        assert_eq!(atoi("x12"), 0);
        assert_eq!(atoi("99999999999"), i32::MAX);
        assert_eq!(atoi("-99999999999"), i32::MIN);
    }

    #[test]
    fn sync_int_rejects_unparsable_tokens() {
        assert_eq!(sync_int(Some("7")), Some(7));
        assert_eq!(sync_int(Some("0")), Some(0));
        assert_eq!(sync_int(Some("-3")), Some(-3));
        assert_eq!(sync_int(Some("x")), None);
        assert_eq!(sync_int(Some("00")), None);
        assert_eq!(sync_int(None), None);
    }

    #[test]
    fn profile_round_trips_byte_for_byte() {
        let mut recognizer = Recognizer::new();
        recognizer
            .train(
                &sample_of(
                    'a',
                    vec![
                        stroke(&[(-50, -50), (0, 0), (50, 50)]),
                        stroke(&[(50, -50), (-50, 50)]),
                    ],
                ),
                true,
            )
            .unwrap();
        recognizer
            .train(&sample_of('b', vec![stroke(&[(0, -80), (0, 80)])]), true)
            .unwrap();
        recognizer.store_mut().set_samples_max(7);
        recognizer.blocks_mut().no_latin_alpha = true;
        let cyrillic = recognizer
            .blocks()
            .blocks()
            .iter()
            .position(|block| block.name == "Cyrillic")
            .unwrap();
        assert!(recognizer.set_block_enabled(cyrillic, true));

        let mut first = Vec::new();
        recognizer.write_profile(&mut first).unwrap();

        let mut reloaded = Recognizer::new();
        reloaded.read_profile(Cursor::new(&first)).unwrap();

        assert_eq!(reloaded.store().current(), 3);
        assert_eq!(reloaded.store().samples_max(), 7);
        assert!(reloaded.blocks().no_latin_alpha);
        assert!(reloaded.blocks().blocks()[cyrillic].enabled);
        assert_eq!(reloaded.char_trained('a'), 1);
        assert_eq!(reloaded.char_trained('b'), 1);

        let original = &recognizer.store().slots()[0].sample;
        let restored = &reloaded.store().slots()[0].sample;
        assert_eq!(restored.ch(), Some('a'));
        assert_eq!(restored.used(), original.used());
        assert_eq!(restored.len(), original.len());
        for (a, b) in original.strokes().iter().zip(restored.strokes()) {
            let a_pts: Vec<_> = a.points().iter().map(|p| (p.x, p.y)).collect();
            let b_pts: Vec<_> = b.points().iter().map(|p| (p.x, p.y)).collect();
            assert_eq!(a_pts, b_pts);
        }

        let mut second = Vec::new();
        reloaded.write_profile(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_commands_are_skipped() {
        let mut recognizer = Recognizer::new();
        let text = "widget 1 2 3\nRECOGNIZE 1 3 0\n";
        recognizer.read_profile(Cursor::new(text)).unwrap();
        assert_eq!(recognizer.store().samples_max(), 3);
    }

    #[test]
    fn bad_fields_keep_their_old_values() {
        let mut recognizer = Recognizer::new();
        recognizer
            .read_profile(Cursor::new("recognize bogus 7 1 50\n"))
            .unwrap();
        assert_eq!(recognizer.store().current(), 1);
        assert_eq!(recognizer.store().samples_max(), 7);
        assert!(recognizer.blocks().no_latin_alpha);
        assert_eq!(recognizer.slots[0].range, 50);
        // The line ran out before the remaining ranges
        assert_eq!(recognizer.slots[1].range, crate::MAX_RANGE);
    }

    #[test]
    fn sample_lines_guard_against_garbage() {
        let mut recognizer = Recognizer::new();
        let text = "sample 97 4 10 20 30 40 ; -5 -6 ;\n\
                    sample 0 1 1 2 ;\n\
                    sample 98 2\n";
        recognizer.read_profile(Cursor::new(text)).unwrap();

        let stored: Vec<_> = recognizer
            .store()
            .slots()
            .iter()
            .filter(|slot| !slot.is_free())
            .collect();
        assert_eq!(stored.len(), 1);
        let sample = &stored[0].sample;
        assert_eq!(sample.ch(), Some('a'));
        assert_eq!(sample.used(), 4);
        assert_eq!(sample.len(), 2);
        let first: Vec<_> = sample.strokes()[0].points().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(first, vec![(10, 20), (30, 40)]);
        let second: Vec<_> = sample.strokes()[1].points().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(second, vec![(-5, -6)]);
    }

    #[test]
    fn disabled_blocks_disable_stored_samples() {
        let mut recognizer = Recognizer::new();
        recognizer
            .train(&sample_of('a', vec![stroke(&[(0, -80), (0, 80)])]), true)
            .unwrap();
        assert!(recognizer.store().slots()[0].sample.enabled());

        // Switch Basic Latin off
        recognizer.read_profile(Cursor::new("blocks 0\n")).unwrap();
        assert!(!recognizer.store().slots()[0].sample.enabled());
    }
}
