//! bidifix: direction correction for mixed RTL/LTR text in live documents.
//!
//! Chat interfaces and rendered-markdown views habitually lay Persian or
//! Arabic text out left-to-right because the container never gets a `dir`.
//! This workspace decides the dominant direction per content block, styles
//! the block accordingly, and wraps minority-script runs in `<bdi>`
//! isolation islands so embedded English (or embedded Arabic, in the other
//! direction) stops scrambling the line.
//!
//! Two ways in:
//! - [`fix_html`] / [`fix_fragment`] for one-shot correction of a string;
//! - [`BidiEngine`] pumped against a [`Document`] for live trees, with
//!   mutation-driven invalidation and debounced re-sweeps.

use std::time::{Duration, Instant};

use anyhow::bail;

pub use bidifix_config::{BidiConfig, ConfigUpdate, FixMode};
pub use bidifix_dom::{Document, MutationRecord, NodeId, Selector};
pub use bidifix_engine::{
    BidiEngine, DEFAULT_BLOCK_SELECTOR, DEFAULT_DEBOUNCE, DEFAULT_SKIP_SELECTOR, PumpOutcome,
    SweepStats,
};
pub use bidifix_text::{
    Direction, ScriptClass, ScriptRun, classify_char, dominant_direction, segment_runs,
};

/// Runs one immediate sweep over an already-parsed document.
///
/// Builds a throwaway engine with a zero debounce so the sweep happens on
/// the first pump. A disabled configuration sweeps nothing and reports
/// empty stats.
pub fn fix_document(doc: &mut Document, config: &BidiConfig) -> anyhow::Result<SweepStats> {
    let mut engine = BidiEngine::new(config.clone())?.with_debounce(Duration::ZERO);
    let now = Instant::now();
    engine.bootstrap(now);
    match engine.pump(doc, now) {
        PumpOutcome::Swept(stats) => Ok(stats),
        PumpOutcome::Disabled => Ok(SweepStats::default()),
        outcome => bail!("one-shot sweep did not run: {outcome:?}"),
    }
}

/// Parses a complete HTML document, corrects it, and serializes it back.
///
/// The output is the parser's normalized view of the input (with `html`,
/// `head`, and `body` made explicit), annotated in place.
pub fn fix_html(html: &str, config: &BidiConfig) -> anyhow::Result<String> {
    let mut doc = Document::parse(html);
    fix_document(&mut doc, config)?;
    Ok(doc.to_html())
}

/// Like [`fix_html`] for a body fragment: no document scaffolding is added
/// around the corrected markup.
pub fn fix_fragment(html: &str, config: &BidiConfig) -> anyhow::Result<String> {
    let mut doc = Document::parse_fragment(html);
    fix_document(&mut doc, config)?;
    Ok(doc.to_html())
}
