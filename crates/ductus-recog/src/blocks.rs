//! Unicode block switches
//!
//! Trainable characters are grouped by Unicode block, and whole blocks
//! are switched on or off at once. Switching a block updates the
//! enabled flag on every stored sample; recognition then skips
//! disabled samples without consulting the table again.

use crate::store::SampleStore;

/// One Unicode block and its switch state.
#[derive(Debug, Clone)]
pub struct UnicodeBlock {
    pub name: &'static str,
    /// First code point of the block.
    pub start: u32,
    /// Last code point of the block, inclusive.
    pub end: u32,
    pub enabled: bool,
}

/// Based on unicode-blocks.h from the gucharmap project. The table
/// ends after the mathematical alphanumerics because later blocks
/// hold no handwriting anyone trains.
const DEFAULT_BLOCKS: &[(bool, u32, u32, &str)] = &[
    (true, 0x0000, 0x007F, "Basic Latin"),
    (true, 0x0080, 0x00FF, "Latin-1 Supplement"),
    (false, 0x0100, 0x017F, "Latin Extended-A"),
    (false, 0x0180, 0x024F, "Latin Extended-B"),
    (false, 0x0250, 0x02AF, "IPA Extensions"),
    (false, 0x02B0, 0x02FF, "Spacing Modifier Letters"),
    (false, 0x0300, 0x036F, "Combining Diacritical Marks"),
    (false, 0x0370, 0x03FF, "Greek and Coptic"),
    (false, 0x0400, 0x04FF, "Cyrillic"),
    (false, 0x0500, 0x052F, "Cyrillic Supplement"),
    (false, 0x0530, 0x058F, "Armenian"),
    (false, 0x0590, 0x05FF, "Hebrew"),
    (false, 0x0600, 0x06FF, "Arabic"),
    (false, 0x0700, 0x074F, "Syriac"),
    (false, 0x0750, 0x077F, "Arabic Supplement"),
    (false, 0x0780, 0x07BF, "Thaana"),
    (false, 0x07C0, 0x07FF, "N'Ko"),
    (false, 0x0900, 0x097F, "Devanagari"),
    (false, 0x0980, 0x09FF, "Bengali"),
    (false, 0x0A00, 0x0A7F, "Gurmukhi"),
    (false, 0x0A80, 0x0AFF, "Gujarati"),
    (false, 0x0B00, 0x0B7F, "Oriya"),
    (false, 0x0B80, 0x0BFF, "Tamil"),
    (false, 0x0C00, 0x0C7F, "Telugu"),
    (false, 0x0C80, 0x0CFF, "Kannada"),
    (false, 0x0D00, 0x0D7F, "Malayalam"),
    (false, 0x0D80, 0x0DFF, "Sinhala"),
    (false, 0x0E00, 0x0E7F, "Thai"),
    (false, 0x0E80, 0x0EFF, "Lao"),
    (false, 0x0F00, 0x0FFF, "Tibetan"),
    (false, 0x1000, 0x109F, "Myanmar"),
    (false, 0x10A0, 0x10FF, "Georgian"),
    (false, 0x1100, 0x11FF, "Hangul Jamo"),
    (false, 0x1200, 0x137F, "Ethiopic"),
    (false, 0x1380, 0x139F, "Ethiopic Supplement"),
    (false, 0x13A0, 0x13FF, "Cherokee"),
    (false, 0x1400, 0x167F, "Unified Canadian Aboriginal Syllabics"),
    (false, 0x1680, 0x169F, "Ogham"),
    (false, 0x16A0, 0x16FF, "Runic"),
    (false, 0x1700, 0x171F, "Tagalog"),
    (false, 0x1720, 0x173F, "Hanunoo"),
    (false, 0x1740, 0x175F, "Buhid"),
    (false, 0x1760, 0x177F, "Tagbanwa"),
    (false, 0x1780, 0x17FF, "Khmer"),
    (false, 0x1800, 0x18AF, "Mongolian"),
    (false, 0x1900, 0x194F, "Limbu"),
    (false, 0x1950, 0x197F, "Tai Le"),
    (false, 0x1980, 0x19DF, "New Tai Lue"),
    (false, 0x19E0, 0x19FF, "Khmer Symbols"),
    (false, 0x1A00, 0x1A1F, "Buginese"),
    (false, 0x1B00, 0x1B7F, "Balinese"),
    (false, 0x1D00, 0x1D7F, "Phonetic Extensions"),
    (false, 0x1D80, 0x1DBF, "Phonetic Extensions Supplement"),
    (false, 0x1DC0, 0x1DFF, "Combining Diacritical Marks Supplement"),
    (false, 0x1E00, 0x1EFF, "Latin Extended Additional"),
    (false, 0x1F00, 0x1FFF, "Greek Extended"),
    (false, 0x2000, 0x206F, "General Punctuation"),
    (false, 0x2070, 0x209F, "Superscripts and Subscripts"),
    (false, 0x20A0, 0x20CF, "Currency Symbols"),
    (false, 0x20D0, 0x20FF, "Combining Diacritical Marks for Symbols"),
    (false, 0x2100, 0x214F, "Letterlike Symbols"),
    (false, 0x2150, 0x218F, "Number Forms"),
    (false, 0x2190, 0x21FF, "Arrows"),
    (false, 0x2200, 0x22FF, "Mathematical Operators"),
    (false, 0x2300, 0x23FF, "Miscellaneous Technical"),
    (false, 0x2400, 0x243F, "Control Pictures"),
    (false, 0x2440, 0x245F, "Optical Character Recognition"),
    (false, 0x2460, 0x24FF, "Enclosed Alphanumerics"),
    (false, 0x2500, 0x257F, "Box Drawing"),
    (false, 0x2580, 0x259F, "Block Elements"),
    (false, 0x25A0, 0x25FF, "Geometric Shapes"),
    (false, 0x2600, 0x26FF, "Miscellaneous Symbols"),
    (false, 0x2700, 0x27BF, "Dingbats"),
    (false, 0x27C0, 0x27EF, "Miscellaneous Mathematical Symbols-A"),
    (false, 0x27F0, 0x27FF, "Supplemental Arrows-A"),
    (false, 0x2800, 0x28FF, "Braille Patterns"),
    (false, 0x2900, 0x297F, "Supplemental Arrows-B"),
    (false, 0x2980, 0x29FF, "Miscellaneous Mathematical Symbols-B"),
    (false, 0x2A00, 0x2AFF, "Supplemental Mathematical Operators"),
    (false, 0x2B00, 0x2BFF, "Miscellaneous Symbols and Arrows"),
    (false, 0x2C00, 0x2C5F, "Glagolitic"),
    (false, 0x2C60, 0x2C7F, "Latin Extended-C"),
    (false, 0x2C80, 0x2CFF, "Coptic"),
    (false, 0x2D00, 0x2D2F, "Georgian Supplement"),
    (false, 0x2D30, 0x2D7F, "Tifinagh"),
    (false, 0x2D80, 0x2DDF, "Ethiopic Extended"),
    (false, 0x2E00, 0x2E7F, "Supplemental Punctuation"),
    (false, 0x2E80, 0x2EFF, "CJK Radicals Supplement"),
    (false, 0x2F00, 0x2FDF, "Kangxi Radicals"),
    (false, 0x2FF0, 0x2FFF, "Ideographic Description Characters"),
    (false, 0x3000, 0x303F, "CJK Symbols and Punctuation"),
    (false, 0x3040, 0x309F, "Hiragana"),
    (false, 0x30A0, 0x30FF, "Katakana"),
    (false, 0x3100, 0x312F, "Bopomofo"),
    (false, 0x3130, 0x318F, "Hangul Compatibility Jamo"),
    (false, 0x3190, 0x319F, "Kanbun"),
    (false, 0x31A0, 0x31BF, "Bopomofo Extended"),
    (false, 0x31C0, 0x31EF, "CJK Strokes"),
    (false, 0x31F0, 0x31FF, "Katakana Phonetic Extensions"),
    (false, 0x3200, 0x32FF, "Enclosed CJK Letters and Months"),
    (false, 0x3300, 0x33FF, "CJK Compatibility"),
    (false, 0x3400, 0x4DBF, "CJK Unified Ideographs Extension A"),
    (false, 0x4DC0, 0x4DFF, "Yijing Hexagram Symbols"),
    (false, 0x4E00, 0x9FFF, "CJK Unified Ideographs"),
    (false, 0xA000, 0xA48F, "Yi Syllables"),
    (false, 0xA490, 0xA4CF, "Yi Radicals"),
    (false, 0xA700, 0xA71F, "Modifier Tone Letters"),
    (false, 0xA720, 0xA7FF, "Latin Extended-D"),
    (false, 0xA800, 0xA82F, "Syloti Nagri"),
    (false, 0xA840, 0xA87F, "Phags-pa"),
    (false, 0xAC00, 0xD7AF, "Hangul Syllables"),
    (false, 0xD800, 0xDB7F, "High Surrogates"),
    (false, 0xDB80, 0xDBFF, "High Private Use Surrogates"),
    (false, 0xDC00, 0xDFFF, "Low Surrogates"),
    (false, 0xE000, 0xF8FF, "Private Use Area"),
    (false, 0xF900, 0xFAFF, "CJK Compatibility Ideographs"),
    (false, 0xFB00, 0xFB4F, "Alphabetic Presentation Forms"),
    (false, 0xFB50, 0xFDFF, "Arabic Presentation Forms-A"),
    (false, 0xFE00, 0xFE0F, "Variation Selectors"),
    (false, 0xFE10, 0xFE1F, "Vertical Forms"),
    (false, 0xFE20, 0xFE2F, "Combining Half Marks"),
    (false, 0xFE30, 0xFE4F, "CJK Compatibility Forms"),
    (false, 0xFE50, 0xFE6F, "Small Form Variants"),
    (false, 0xFE70, 0xFEFF, "Arabic Presentation Forms-B"),
    (false, 0xFF00, 0xFFEF, "Halfwidth and Fullwidth Forms"),
    (false, 0xFFF0, 0xFFFF, "Specials"),
    (false, 0x10000, 0x1007F, "Linear B Syllabary"),
    (false, 0x10080, 0x100FF, "Linear B Ideograms"),
    (false, 0x10100, 0x1013F, "Aegean Numbers"),
    (false, 0x10140, 0x1018F, "Ancient Greek Numbers"),
    (false, 0x10300, 0x1032F, "Old Italic"),
    (false, 0x10330, 0x1034F, "Gothic"),
    (false, 0x10380, 0x1039F, "Ugaritic"),
    (false, 0x103A0, 0x103DF, "Old Persian"),
    (false, 0x10400, 0x1044F, "Deseret"),
    (false, 0x10450, 0x1047F, "Shavian"),
    (false, 0x10480, 0x104AF, "Osmanya"),
    (false, 0x10800, 0x1083F, "Cypriot Syllabary"),
    (false, 0x10900, 0x1091F, "Phoenician"),
    (false, 0x10A00, 0x10A5F, "Kharoshthi"),
    (false, 0x12000, 0x123FF, "Cuneiform"),
    (false, 0x12400, 0x1247F, "Cuneiform Numbers and Punctuation"),
    (false, 0x1D000, 0x1D0FF, "Byzantine Musical Symbols"),
    (false, 0x1D100, 0x1D1FF, "Musical Symbols"),
    (false, 0x1D200, 0x1D24F, "Ancient Greek Musical Notation"),
    (false, 0x1D300, 0x1D35F, "Tai Xuan Jing Symbols"),
    (false, 0x1D360, 0x1D37F, "Counting Rod Numerals"),
    (false, 0x1D400, 0x1D7FF, "Mathematical Alphanumeric Symbols"),
];

/// Whether a character has a visible rendering worth training.
fn is_graphic(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_control()
}

// ===========================================================================
// Block table
// ===========================================================================

/// All block switches plus the Latin letter override.
pub struct BlockTable {
    blocks: Vec<UnicodeBlock>,
    /// Disables Basic Latin letters regardless of block switches, so
    /// shapes a keyboard can type stop competing with ones it cannot.
    pub no_latin_alpha: bool,
}

impl BlockTable {
    /// A table with stock switch states.
    pub fn new() -> BlockTable {
        BlockTable {
            blocks: DEFAULT_BLOCKS
                .iter()
                .map(|&(enabled, start, end, name)| UnicodeBlock {
                    name,
                    start,
                    end,
                    enabled,
                })
                .collect(),
            no_latin_alpha: false,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in code point order.
    pub fn blocks(&self) -> &[UnicodeBlock] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&UnicodeBlock> {
        self.blocks.get(index)
    }

    /// Switches block `index`; returns whether anything changed.
    ///
    /// The caller is responsible for refreshing sample flags with
    /// [`update_enabled`](BlockTable::update_enabled) afterwards.
    pub fn set_enabled(&mut self, index: usize, on: bool) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) if block.enabled != on => {
                block.enabled = on;
                true
            }
            _ => false,
        }
    }

    /// The block containing `ch`, if the table covers it.
    pub fn containing(&self, ch: char) -> Option<&UnicodeBlock> {
        let cp = ch as u32;
        self.blocks.iter().find(|b| cp >= b.start && cp <= b.end)
    }

    /// Whether `ch` can never match, not counting block switches.
    pub fn char_disabled(&self, ch: char) -> bool {
        let cp = ch as u32;
        (self.no_latin_alpha
            && cp >= self.blocks[0].start
            && cp <= self.blocks[0].end
            && ch.is_ascii_alphabetic())
            || !is_graphic(ch)
    }

    /// Re-derives the enabled flag of every stored sample from the
    /// current switch states.
    pub fn update_enabled(&self, store: &mut SampleStore) {
        for slot in store.slots_mut() {
            slot.sample.set_enabled(false);
            let Some(ch) = slot.sample.ch() else {
                continue;
            };
            if let Some(block) = self.containing(ch) {
                slot.sample.set_enabled(block.enabled);
            }
        }
    }
}

impl Default for BlockTable {
    fn default() -> BlockTable {
        BlockTable::new()
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
    fn table_is_sorted_and_disjoint() {
        let table = BlockTable::new();
        assert_eq!(table.len(), 148);
        for pair in table.blocks().windows(2) {
            assert!(pair[0].end < pair[1].start, "{} overlaps", pair[1].name);
        }
        for block in table.blocks() {
            assert!(block.start <= block.end);
        }
    }

    #[test]
    fn only_latin_blocks_start_enabled() {
        let table = BlockTable::new();
        for (i, block) in table.blocks().iter().enumerate() {
            assert_eq!(block.enabled, i < 2, "{}", block.name);
        }
    }

    #[test]
    fn block_lookup_honors_bounds() {
        let table = BlockTable::new();
        assert_eq!(table.containing('\u{7f}').unwrap().name, "Basic Latin");
        assert_eq!(
            table.containing('\u{80}').unwrap().name,
            "Latin-1 Supplement"
        );
        assert!(table.containing('\u{e0000}').is_none());
    }

    fn store_with(chars: &[char]) -> SampleStore {
        let mut store = SampleStore::new();
        for (i, &ch) in chars.iter().enumerate() {
            let mut stroke = Stroke::new();
            stroke.draw(i as i32 * 10 - 60, -40);
            stroke.draw(i as i32 * 10 - 60, 40);
            let mut sample = Sample::new();
            sample.add_stroke(stroke).unwrap();
            sample.set_ch(Some(ch));
            store.train(&sample, true).unwrap();
        }
        store
    }

    #[test]
    fn switching_a_block_flips_its_samples() {
        let mut table = BlockTable::new();
        let mut store = store_with(&['a', 'я']);
        table.update_enabled(&mut store);
        assert!(store.slots()[0].sample.enabled());
        assert!(!store.slots()[1].sample.enabled());

        let cyrillic = table
            .blocks()
            .iter()
            .position(|b| b.name == "Cyrillic")
            .unwrap();
        assert!(table.set_enabled(cyrillic, true));
        assert!(!table.set_enabled(cyrillic, true));
        table.update_enabled(&mut store);
        assert!(store.slots()[1].sample.enabled());
    }

    #[test]
    fn latin_override_only_hits_ascii_letters() {
        let mut table = BlockTable::new();
        assert!(!table.char_disabled('q'));
        table.no_latin_alpha = true;
        assert!(table.char_disabled('q'));
        assert!(table.char_disabled('Z'));
        assert!(!table.char_disabled('4'));
        assert!(!table.char_disabled('é'));
    }

    #[test]
    fn invisible_characters_are_always_disabled() {
        let table = BlockTable::new();
        assert!(table.char_disabled(' '));
        assert!(table.char_disabled('\t'));
        assert!(table.char_disabled('\u{7}'));
        assert!(!table.char_disabled('#'));
    }
}
