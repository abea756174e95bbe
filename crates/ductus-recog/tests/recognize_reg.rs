//! Recognition pipeline regression test
//!
//! Trains a small synthetic alphabet of single-stroke and multi-stroke
//! shapes and checks the recognition results, option switches, and
//! training flows end to end.

use ductus_core::{Sample, Stroke};
use ductus_recog::{Recognizer, WordContext};
use ductus_test::RegParams;

fn stroke(points: &[(i32, i32)]) -> Stroke {
    let mut s = Stroke::new();
    for &(x, y) in points {
        s.draw(x, y);
    }
    s
}

fn sample(ch: char, strokes: &[&[(i32, i32)]]) -> Sample {
    let mut sample = Sample::new();
    for points in strokes {
        sample.add_stroke(stroke(points)).unwrap();
    }
    sample.set_ch(Some(ch));
    sample
}

fn input(strokes: &[&[(i32, i32)]]) -> Sample {
    let mut s = sample('x', strokes);
    s.set_ch(None);
    s
}

const BAR: &[(i32, i32)] = &[(0, -100), (0, -50), (0, 0), (0, 50), (0, 100)];
const DASH: &[(i32, i32)] = &[(-100, 0), (-50, 0), (0, 0), (50, 0), (100, 0)];
const LOOP: &[(i32, i32)] = &[(0, -100), (80, 0), (0, 100), (-80, 0), (0, -100)];
const ARC: &[(i32, i32)] = &[(80, -80), (0, -100), (-80, 0), (0, 100), (80, 80)];

fn matched(rp: &mut RegParams, recognizer: &mut Recognizer, strokes: &[&[(i32, i32)]], ch: char) {
    let mut drawn = input(strokes);
    let result = recognizer.recognize(&mut drawn);
    eprintln!("Expected '{}', got {:?}", ch, result.ch);
    rp.compare_values(1.0, if result.ch == Some(ch) { 1.0 } else { 0.0 }, 0.0);
}

// ========================================================================
// Test: Exact matches over a trained alphabet
// ========================================================================

#[test]
fn recognize_reg_basic() {
    let mut rp = RegParams::new("recognize_basic");

    let mut recognizer = Recognizer::new();
    recognizer.train(&sample('l', &[BAR]), true).unwrap();
    recognizer.train(&sample('o', &[LOOP]), true).unwrap();
    recognizer.train(&sample('c', &[ARC]), true).unwrap();
    recognizer.train(&sample('-', &[DASH]), true).unwrap();

    // Each trained shape recognizes itself at full rating
    for (strokes, ch) in [(BAR, 'l'), (LOOP, 'o'), (ARC, 'c'), (DASH, '-')] {
        let mut drawn = input(&[strokes]);
        let result = recognizer.recognize(&mut drawn);
        eprintln!(
            "'{}': got {:?} at {:?}%",
            ch,
            result.ch,
            result.alternates.first().map(|a| a.rating)
        );
        rp.compare_values(1.0, if result.ch == Some(ch) { 1.0 } else { 0.0 }, 0.0);
        rp.compare_values(100.0, result.alternates[0].rating as f64, 0.0);
        rp.compare_values(4.0, result.stats.examined as f64, 0.0);
        // The winner is written back onto the input
        rp.compare_values(1.0, if drawn.ch() == Some(ch) { 1.0 } else { 0.0 }, 0.0);
    }

    // A jittered bar still reads as 'l'
    matched(
        &mut rp,
        &mut recognizer,
        &[&[(3, -100), (-2, -50), (1, 0), (-3, 50), (2, 100)]],
        'l',
    );

    assert!(rp.cleanup(), "basic recognition tests failed");
}

// ========================================================================
// Test: Stroke direction option
// ========================================================================

#[test]
fn recognize_reg_direction() {
    let mut rp = RegParams::new("recognize_direction");

    let mut recognizer = Recognizer::new();
    recognizer.train(&sample('l', &[BAR]), true).unwrap();
    recognizer.train(&sample('-', &[DASH]), true).unwrap();

    let backwards: Vec<(i32, i32)> = BAR.iter().rev().copied().collect();

    // Direction-blind matching maps the stroke back to front
    let mut drawn = input(&[&backwards]);
    let result = recognizer.recognize(&mut drawn);
    rp.compare_values(1.0, if result.ch == Some('l') { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(100.0, result.alternates[0].rating as f64, 0.0);

    // Direction-strict matching rejects the reversed bar entirely
    recognizer.options_mut().ignore_stroke_dir = false;
    let mut drawn = input(&[&backwards]);
    let result = recognizer.recognize(&mut drawn);
    eprintln!(
        "strict direction: {:?}, {}/{} disqualified",
        result.ch, result.stats.disqualified, result.stats.examined
    );
    rp.compare_values(1.0, if result.ch.is_none() { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(2.0, result.stats.examined as f64, 0.0);
    rp.compare_values(2.0, result.stats.disqualified as f64, 0.0);

    assert!(rp.cleanup(), "direction option tests failed");
}

// ========================================================================
// Test: Stroke count option and gluing
// ========================================================================

#[test]
fn recognize_reg_stroke_count() {
    let mut rp = RegParams::new("recognize_stroke_count");

    // A 'v' drawn in two touching strokes, and a bar for contrast
    let left: &[(i32, i32)] = &[(-80, -80), (0, 80)];
    let right: &[(i32, i32)] = &[(0, 80), (80, -80)];
    let mut recognizer = Recognizer::new();
    recognizer.train(&sample('v', &[left, right]), true).unwrap();
    recognizer.train(&sample('l', &[BAR]), true).unwrap();

    // Drawn with the same two strokes
    matched(&mut rp, &mut recognizer, &[left, right], 'v');

    // Drawn in a single stroke: the sample's strokes are glued to
    // match, and the glue shows up as a small rating discount
    let joined: &[(i32, i32)] = &[(-80, -80), (0, 80), (80, -80)];
    let mut drawn = input(&[joined]);
    let result = recognizer.recognize(&mut drawn);
    eprintln!(
        "glued: {:?} at {:?}%",
        result.ch,
        result.alternates.first().map(|a| a.rating)
    );
    rp.compare_values(1.0, if result.ch == Some('v') { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(98.0, result.alternates[0].rating as f64, 0.0);

    // With strict stroke counts the one-stroke drawing cannot match
    recognizer.options_mut().ignore_stroke_num = false;
    let mut drawn = input(&[joined]);
    let result = recognizer.recognize(&mut drawn);
    rp.compare_values(0.0, if result.ch == Some('v') { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, result.stats.examined as f64, 0.0);

    assert!(rp.cleanup(), "stroke count option tests failed");
}

// ========================================================================
// Test: Training, promotion, and replacement
// ========================================================================

#[test]
fn recognize_reg_training() {
    let mut rp = RegParams::new("recognize_training");

    let mut recognizer = Recognizer::new();
    recognizer.store_mut().set_samples_max(2);

    // Three trainings of 'a' with a cap of two: the stalest is replaced
    recognizer.train(&sample('a', &[BAR]), true).unwrap();
    recognizer
        .train(&sample('a', &[&[(10, -100), (10, 0), (10, 100)]]), true)
        .unwrap();
    recognizer
        .train(&sample('a', &[&[(-10, -100), (-10, 0), (-10, 100)]]), true)
        .unwrap();
    rp.compare_values(2.0, recognizer.char_trained('a') as f64, 0.0);

    // Untraining removes every sample of the character
    recognizer.untrain('a');
    rp.compare_values(0.0, recognizer.char_trained('a') as f64, 0.0);
    let mut drawn = input(&[BAR]);
    let result = recognizer.recognize(&mut drawn);
    rp.compare_values(1.0, if result.ch.is_none() { 1.0 } else { 0.0 }, 0.0);

    // A lone trained sample matches at full rating and full strength
    recognizer.train(&sample('b', &[BAR]), true).unwrap();
    let mut drawn = input(&[BAR]);
    let result = recognizer.recognize(&mut drawn);
    rp.compare_values(1.0, if result.ch == Some('b') { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(100.0, result.alternates[0].rating as f64, 0.0);
    rp.compare_values(100.0, result.stats.strength as f64, 0.0);

    // Demotion of the last sample keeps it around; promotion restamps
    let id = result.alternates[0].id;
    rp.compare_values(1.0, if recognizer.demote(id).is_ok() { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, recognizer.char_trained('b') as f64, 0.0);
    let mut drawn = input(&[BAR]);
    let result = recognizer.recognize(&mut drawn);
    let id = result.alternates[0].id;
    rp.compare_values(1.0, if recognizer.promote(id).is_ok() { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, recognizer.char_trained('b') as f64, 0.0);

    assert!(recognizer.average_strength() >= 0);
    assert!(recognizer.average_strength() <= 100);

    assert!(rp.cleanup(), "training flow tests failed");
}

// ========================================================================
// Test: Word context tie-breaking
// ========================================================================

#[test]
fn recognize_reg_word_context() {
    let mut rp = RegParams::new("recognize_word_context");

    // '1' and 'l' drawn identically: shape alone cannot separate them
    let mut recognizer = Recognizer::new();
    recognizer.train(&sample('1', &[BAR]), true).unwrap();
    recognizer.train(&sample('l', &[BAR]), true).unwrap();

    let mut drawn = input(&[BAR]);
    let result = recognizer.recognize(&mut drawn);
    rp.compare_values(1.0, if result.ch == Some('1') { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(0.0, result.stats.strength as f64, 0.0);

    // Surrounded by "a_l", the letter reading wins
    recognizer.set_word_context(WordContext {
        before: "a".into(),
        after: "l".into(),
    });
    let mut drawn = input(&[BAR]);
    let result = recognizer.recognize(&mut drawn);
    eprintln!(
        "in context: {:?}, strength {}%",
        result.ch, result.stats.strength
    );
    rp.compare_values(1.0, if result.ch == Some('l') { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(100.0, result.alternates[0].rating as f64, 0.0);
    rp.compare_values(80.0, result.alternates[1].rating as f64, 0.0);
    rp.compare_values(20.0, result.stats.strength as f64, 0.0);

    // Switching the engine off restores the tie
    recognizer.options_mut().wordfreq_enable = false;
    let mut drawn = input(&[BAR]);
    let result = recognizer.recognize(&mut drawn);
    rp.compare_values(1.0, if result.ch == Some('1') { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "word context tests failed");
}
