//! bidifix-engine: keeps mixed RTL/LTR text readable in a live document.
//!
//! The moving parts, leaves first:
//! - `applier`: rewrites one block into direction-isolated runs, idempotently
//! - `watcher`: reduces mutation records to cleared processed-flags
//! - `scheduler`: debounces invalidations into single-flight sweeps
//! - `engine`: ties them to a document behind one caller-pumped facade

pub mod applier;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod watcher;

pub use applier::{AnnotationApplier, BlockOutcome, ISOLATE_TAG, PROCESSED_ATTR, PROCESSED_VALUE};
pub use engine::{
    BidiEngine, DEFAULT_BLOCK_SELECTOR, DEFAULT_SKIP_SELECTOR, PumpOutcome, SweepStats,
};
pub use error::{EngineError, Result};
pub use scheduler::{DEFAULT_DEBOUNCE, SweepScheduler};
pub use watcher::MutationWatcher;
