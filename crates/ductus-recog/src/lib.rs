//! ductus-recog - stroke-based character recognition
//!
//! This crate turns drawn [`Sample`](ductus_core::Sample)s into character
//! guesses. It provides:
//!
//! - **Scoring engines**: key-point distance, average distance, average
//!   angle, and word context, each rating every stored sample
//! - **Sample store**: trained samples with usage stamps, promotion and
//!   demotion, and per-character caps
//! - **Unicode blocks**: coarse enable/disable switches over ranges of
//!   trainable characters
//! - **Profiles**: a line-oriented text format that persists options,
//!   block switches, and every trained sample
//!
//! # Quick Start
//!
//! ```
//! use ductus_core::{Sample, Stroke};
//! use ductus_recog::Recognizer;
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
//! let result = recognizer.recognize(&mut input);
//! assert_eq!(result.ch, Some('l'));
//! # Ok::<(), ductus_recog::RecogError>(())
//! ```
//!
//! # Modules
//!
//! - [`recognizer`]: the recognition pass and its results
//! - [`engine`]: the [`ScoringEngine`] trait and per-engine slots
//! - [`prep`]: greedy stroke mapping and the key-point distance engine
//! - [`average`]: average distance and average angle engines
//! - [`wordfreq`]: word-frequency context engine
//! - [`elastic`]: banded elastic matching between resampled strokes
//! - [`store`]: trained sample storage
//! - [`blocks`]: Unicode block switches
//!
//! Profile persistence lives on [`Recognizer`] itself; see
//! [`Recognizer::read_profile`] and [`Recognizer::write_profile`].

pub mod average;
pub mod blocks;
pub mod elastic;
pub mod engine;
mod error;
pub mod prep;
mod profile;
pub mod recognizer;
pub mod store;
pub mod wordfreq;

pub use error::{RecogError, RecogResult};

// Re-export commonly used types
pub use blocks::{BlockTable, UnicodeBlock};
pub use elastic::CostMetric;
pub use engine::{EngineKind, EngineSlot, Pass, PassStats, ScoringEngine, ENGINE_COUNT};
pub use recognizer::{Alternate, Options, Recognition, Recognizer, WordContext};
pub use store::{SampleId, SampleStore, StoredSample};
pub use wordfreq::WordList;

// Re-export core for convenience
pub use ductus_core;

/// Upper bound on stored samples per character.
pub const SAMPLES_MAX: usize = 16;

/// Distance between two opposite grid corners, the worst possible
/// offset between matched points.
pub const MAX_DIST: i32 = 362;

/// Full contribution of one engine to the composite rating.
pub const MAX_RANGE: i32 = 100;

/// Denominator for per-engine scale factors.
pub const ENGINE_SCALE: i32 = ductus_core::STROKES_MAX as i32;

/// Best possible per-engine rating.
pub const RATING_MAX: i32 = 32767;

/// Rating assigned to disqualified samples.
pub const RATING_MIN: i32 = -32767;

/// Grid units per resampled point when strokes are compared closely.
pub const FINE_RESOLUTION: f32 = 8.0;

/// Elastic matching band width for fine comparisons.
pub const FINE_ELASTICITY: usize = 2;

/// Elastic matching band width for rough comparisons.
pub const ROUGH_ELASTICITY: usize = 0;
