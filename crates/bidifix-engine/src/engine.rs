//! Engine coordinator: wires the watcher, scheduler, and applier to a
//! document and drives them from a caller-pumped clock.
//!
//! The engine owns no threads and never sleeps. The host calls
//! [`BidiEngine::pump`] whenever it likes (after a mutation batch, on a
//! timer tick, in a render loop); each pump drains mutation records,
//! folds them into invalidations, and runs a sweep once the debounce
//! window has elapsed.

use std::time::{Duration, Instant};

use bidifix_config::{BidiConfig, ConfigUpdate};
use bidifix_dom::{Document, Selector};
use tracing::{debug, info, warn};

use crate::applier::AnnotationApplier;
use crate::error::Result;
use crate::scheduler::SweepScheduler;
use crate::watcher::MutationWatcher;

/// Containers whose text content gets the direction fix.
pub const DEFAULT_BLOCK_SELECTOR: &str =
    ".markdown, .prose, div[data-message-id], div[data-testid=\"conversation-turn\"]";

/// Regions the fix must never rewrite, plus `bdi` so existing islands
/// (ours or the page's own) are left alone.
pub const DEFAULT_SKIP_SELECTOR: &str =
    "pre, code, kbd, samp, mjx-container, .katex, table, [contenteditable], bdi";

/// Counters for one completed sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Blocks matched by the block selector.
    pub blocks: usize,
    /// Blocks annotated this sweep.
    pub processed: usize,
    /// Blocks whose processed flag was already set.
    pub skipped: usize,
    /// Blocks with no eligible text (marked, not styled).
    pub no_text: usize,
    /// Isolation islands created across all processed blocks.
    pub wraps: usize,
    /// Blocks that failed and were skipped over.
    pub errors: usize,
}

/// What one [`BidiEngine::pump`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// The engine is disabled; records were drained and dropped.
    Disabled,
    /// Nothing scheduled, nothing due.
    Idle,
    /// A sweep is pending; pump again at (or after) `deadline`.
    Waiting { deadline: Instant },
    /// A sweep ran to completion.
    Swept(SweepStats),
}

/// Live direction-correction engine for one document.
#[derive(Debug)]
pub struct BidiEngine {
    config: BidiConfig,
    block_selector: Selector,
    skip_selector: Selector,
    watcher: MutationWatcher,
    scheduler: SweepScheduler,
    last_location: Option<String>,
    last_stats: Option<SweepStats>,
}

impl BidiEngine {
    /// Engine with the default block and skip selectors.
    pub fn new(config: BidiConfig) -> Result<Self> {
        Self::with_selectors(config, DEFAULT_BLOCK_SELECTOR, DEFAULT_SKIP_SELECTOR)
    }

    /// Engine with caller-supplied selectors. Fails if either selector
    /// does not parse.
    pub fn with_selectors(config: BidiConfig, blocks: &str, skip: &str) -> Result<Self> {
        let block_selector = Selector::parse(blocks)?;
        let skip_selector = Selector::parse(skip)?;
        let watcher = MutationWatcher::new(block_selector.clone());
        Ok(Self {
            config,
            block_selector,
            skip_selector,
            watcher,
            scheduler: SweepScheduler::default(),
            last_location: None,
            last_stats: None,
        })
    }

    pub fn config(&self) -> &BidiConfig {
        &self.config
    }

    /// Counters from the most recent sweep, if any has run.
    pub fn last_stats(&self) -> Option<SweepStats> {
        self.last_stats
    }

    /// Replaces the debounce delay. Any pending sweep is dropped, so chain
    /// this before [`bootstrap`](Self::bootstrap).
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.scheduler = SweepScheduler::new(delay);
        self
    }

    /// Schedules the initial sweep over existing content. Pages carry
    /// text before the first mutation ever fires, so an enabled engine
    /// queues one sweep up front instead of waiting for records.
    pub fn bootstrap(&mut self, now: Instant) {
        if self.config.enabled {
            self.scheduler.request(now);
            debug!(
                delay_ms = self.scheduler.delay().as_millis() as u64,
                "initial sweep scheduled"
            );
        }
    }

    /// Applies a configuration update. On any effective change every
    /// processed flag is cleared, since previously annotated blocks may
    /// now need different output; an enabled engine then schedules a
    /// sweep, a disabled one cancels pending work. Returns whether the
    /// configuration changed.
    pub fn apply_update(
        &mut self,
        doc: &mut Document,
        update: &ConfigUpdate,
        now: Instant,
    ) -> bool {
        let changed = self.config.apply_update(update);
        if changed {
            info!(
                enabled = self.config.enabled,
                mode = %self.config.mode,
                "configuration updated"
            );
            self.watcher.invalidate_all(doc);
            if self.config.enabled {
                self.scheduler.request(now);
            } else {
                self.scheduler.cancel();
            }
        }
        changed
    }

    /// One engine step at time `now`:
    ///
    /// 1. drain the document's mutation records;
    /// 2. if disabled, stop (the records are dropped, not queued);
    /// 3. fold records into flag invalidations and debounce a sweep;
    /// 4. on a location change, invalidate everything and debounce;
    /// 5. run the sweep if its deadline has passed.
    pub fn pump(&mut self, doc: &mut Document, now: Instant) -> PumpOutcome {
        let records = doc.take_records();

        if !self.config.enabled {
            self.last_location = Some(doc.location().to_string());
            return PumpOutcome::Disabled;
        }

        if !records.is_empty() {
            let invalidated = self.watcher.observe(doc, &records);
            debug!(
                records = records.len(),
                invalidated, "mutation batch observed"
            );
            self.scheduler.request(now);
        }

        let location = doc.location().to_string();
        let navigated = matches!(&self.last_location, Some(prev) if *prev != location);
        self.last_location = Some(location);
        if navigated {
            debug!(location = %doc.location(), "location changed; invalidating all blocks");
            self.watcher.invalidate_all(doc);
            self.scheduler.request(now);
        }

        if self.scheduler.begin_sweep(now) {
            let stats = self.sweep(doc);
            self.scheduler.finish_sweep(now);
            self.last_stats = Some(stats);
            return PumpOutcome::Swept(stats);
        }

        match self.scheduler.next_deadline() {
            Some(deadline) => PumpOutcome::Waiting { deadline },
            None => PumpOutcome::Idle,
        }
    }

    /// Annotates every matched block. Per-block failures are logged and
    /// counted; one bad block never aborts the rest of the sweep.
    fn sweep(&self, doc: &mut Document) -> SweepStats {
        let applier = AnnotationApplier::new(&self.config, &self.skip_selector);
        let blocks = doc.select(&self.block_selector);
        let mut stats = SweepStats {
            blocks: blocks.len(),
            ..SweepStats::default()
        };
        for block in blocks {
            match applier.apply(doc, block) {
                Ok(outcome) => {
                    if outcome.skipped {
                        stats.skipped += 1;
                    } else if outcome.no_text {
                        stats.no_text += 1;
                    } else {
                        stats.processed += 1;
                        stats.wraps += outcome.wraps;
                    }
                }
                Err(err) => {
                    warn!(?block, error = %err, "block processing failed; continuing sweep");
                    stats.errors += 1;
                }
            }
        }
        debug!(
            blocks = stats.blocks,
            processed = stats.processed,
            skipped = stats.skipped,
            no_text = stats.no_text,
            wraps = stats.wraps,
            errors = stats.errors,
            "sweep complete"
        );
        stats
    }
}
