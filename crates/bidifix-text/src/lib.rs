//! bidifix-text: heuristic script analysis for mixed RTL/LTR text.
//!
//! Deliberately not a UAX-9 implementation. The whole decision procedure is:
//! - per-character script classification (Arabic-block ranges vs ASCII)
//! - maximal same-class run segmentation
//! - dominant direction by strong-character majority

pub mod classify;
pub mod direction;
pub mod segment;

pub use classify::{ScriptClass, classify_char};
pub use direction::{Direction, dominant_direction};
pub use segment::{ScriptRun, segment_runs};
