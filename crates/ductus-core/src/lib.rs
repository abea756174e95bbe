//! Ductus Core - Stroke and sample data structures for handwriting
//! recognition
//!
//! This crate provides the fundamental data structures used throughout
//! the ductus recognizer:
//!
//! - [`Stroke`] - A drawn polyline with cached measurements
//! - [`Sample`] - A complete drawn character
//! - [`Transform`] - A structural mapping between two samples' strokes
//! - [`Vec2`] / [`Angle`] - Geometry primitives
//!
//! All pen input lives on a square logical grid of side [`SCALE`]
//! centered on the origin, so samples compare without reference to the
//! pixel size of whatever widget captured them.

pub mod error;
pub mod geom;
pub mod sample;
pub mod stroke;

pub use error::{Error, Result};
pub use geom::{Angle, Vec2, ANGLE_PI};
pub use sample::{Sample, Transform};
pub use stroke::{Point, Stroke};

/// Side length of the logical coordinate grid. Point coordinates run
/// over the open interval `(-SCALE/2, SCALE/2)`.
pub const SCALE: i32 = 256;

/// Most points a stroke will hold. Drawing past this resamples the
/// stroke down.
pub const POINTS_MAX: usize = 256;

/// Granularity of stroke growth and shrinkage in points.
pub const POINTS_GRAN: usize = 64;

/// Most strokes a sample will hold.
pub const STROKES_MAX: usize = 32;

/// Spread below which a stroke is a dot with no direction information.
pub const DOT_SPREAD: i32 = SCALE / 10;

/// Largest distance between two strokes at which gluing them into one
/// pen motion is still conceivable.
pub const GLUE_DIST: i32 = SCALE / 6;

/// Largest value a gluability matrix entry can take; entries at this
/// value mark pairs that cannot be glued.
pub const GLUABLE_MAX: u8 = 255;

/// Grid units per point in rough-resampled strokes.
pub const ROUGH_RESOLUTION: f32 = 24.0;
