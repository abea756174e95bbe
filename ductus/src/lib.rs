//! Ductus - Online handwriting recognition for Rust
//!
//! Ductus recognizes hand-drawn characters one cell at a time: the
//! caller records pen strokes into a [`Sample`] and the [`Recognizer`]
//! rates it against every sample it has been trained with.
//!
//! # Overview
//!
//! Ductus provides the pieces of a trainable character recognizer:
//!
//! - Stroke and sample geometry (smoothing, simplification, resampling)
//! - Scoring engines (key-point distance, average distance, average
//!   angle, word context)
//! - A trained sample store with usage-based replacement
//! - Unicode block switches over the trainable character set
//! - A line-oriented profile format that persists options and samples
//!
//! # Example
//!
//! ```
//! use ductus::{Recognizer, Sample, Stroke};
//!
//! let mut recognizer = Recognizer::new();
//!
//! // Train one sample of 'l' (a vertical bar of drag points).
//! let mut stroke = Stroke::new();
//! for y in [-100, -50, 0, 50, 100] {
//!     stroke.draw(0, y);
//! }
//! let mut sample = Sample::new();
//! sample.add_stroke(stroke)?;
//! sample.set_ch(Some('l'));
//! recognizer.train(&sample, true)?;
//!
//! // Draw the same shape again and ask for a match.
//! let mut input = sample.clone();
//! input.set_ch(None);
//! assert_eq!(recognizer.recognize(&mut input).ch, Some('l'));
//! # Ok::<(), ductus::recog::RecogError>(())
//! ```

// Re-export core types (primary data structures used everywhere)
pub use ductus_core::*;

// Re-export the recognition crate as a module to avoid name conflicts
pub use ductus_recog as recog;

// The headline types, hoisted for convenience
pub use ductus_recog::{Alternate, Options, Recognition, Recognizer, WordContext};
