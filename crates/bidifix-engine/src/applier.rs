//! Per-block annotation: direction decision plus isolation-island rewrite.

use bidifix_config::{BidiConfig, FixMode};
use bidifix_dom::{Document, NodeId, Selector};
use bidifix_text::{Direction, ScriptClass, dominant_direction, segment_runs};
use tracing::trace;

use crate::error::{EngineError, Result};

/// Attribute persisted on a block once it has been processed. Attribute
/// writes are unobserved, so the marker never feeds back into invalidation.
pub const PROCESSED_ATTR: &str = "data-rtl-fixed";
pub const PROCESSED_VALUE: &str = "1";

/// Tag used for isolation islands around minority-script runs.
pub const ISOLATE_TAG: &str = "bdi";

/// What applying the annotation to one block did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOutcome {
    /// Decided dominant direction (LTR when nothing was decided).
    pub direction: Direction,
    /// Isolation islands created.
    pub wraps: usize,
    /// Eligible text leaves considered.
    pub leaves: usize,
    /// The processed-flag was already set; nothing was touched.
    pub skipped: bool,
    /// No eligible text; the block was marked processed without styling.
    pub no_text: bool,
}

impl BlockOutcome {
    fn skipped_block() -> Self {
        Self {
            direction: Direction::Ltr,
            wraps: 0,
            leaves: 0,
            skipped: true,
            no_text: false,
        }
    }

    fn no_text_block() -> Self {
        Self {
            direction: Direction::Ltr,
            wraps: 0,
            leaves: 0,
            skipped: false,
            no_text: true,
        }
    }
}

/// Applies the direction fix to single blocks.
///
/// Borrows the configuration snapshot and skip predicate for one sweep; the
/// engine constructs a fresh applier per sweep so a configuration swap
/// between sweeps is never observed mid-sweep.
pub struct AnnotationApplier<'a> {
    config: &'a BidiConfig,
    skip: &'a Selector,
}

impl<'a> AnnotationApplier<'a> {
    pub fn new(config: &'a BidiConfig, skip: &'a Selector) -> Self {
        Self { config, skip }
    }

    /// Annotate one block. Idempotent: a set processed-flag short-circuits.
    ///
    /// Side effects on the document, in order: block-level direction,
    /// text-align and unicode-bidi style writes; per-leaf rewrites into
    /// isolation islands (suppressed from the record queue); the
    /// processed-flag write. All happen before this returns, so a mutation
    /// record drained afterwards is by construction external.
    pub fn apply(&self, doc: &mut Document, block: NodeId) -> Result<BlockOutcome> {
        let Some(node) = doc.node(block) else {
            return Err(EngineError::MissingNode(block));
        };
        if !node.is_element() {
            return Err(EngineError::NotAnElement(block));
        }
        if !doc.is_attached(block) {
            return Err(EngineError::DetachedBlock(block));
        }

        let processed = doc
            .element(block)
            .and_then(|el| el.attr(PROCESSED_ATTR))
            .is_some_and(|value| value == PROCESSED_VALUE);
        if processed {
            return Ok(BlockOutcome::skipped_block());
        }

        // A block living inside a skip region (or matching the skip
        // predicate itself) is fully protected; ambiguous ancestry fails
        // closed to this same path. Marked processed so sweeps stop
        // rescanning it.
        if doc.closest(block, self.skip).is_some() {
            doc.set_attr(block, PROCESSED_ATTR, PROCESSED_VALUE);
            return Ok(BlockOutcome::no_text_block());
        }

        let leaves = doc.text_leaves(block, self.skip);
        if leaves.is_empty() {
            doc.set_attr(block, PROCESSED_ATTR, PROCESSED_VALUE);
            return Ok(BlockOutcome::no_text_block());
        }

        let mut combined = String::new();
        for &leaf in &leaves {
            if let Some(text) = doc.text(leaf) {
                combined.push_str(text);
            }
        }
        let dominant = dominant_direction(&combined);

        doc.set_style_property(block, "direction", dominant.as_css());
        doc.set_style_property(block, "text-align", "start");
        doc.set_style_property(block, "unicode-bidi", "isolate");

        let mut wraps = 0;
        if self.config.mode != FixMode::DirOnly {
            wraps = doc.with_records_suppressed(|doc| {
                let mut wraps = 0;
                for &leaf in &leaves {
                    wraps += rewrite_leaf(doc, leaf, dominant, self.config.mode);
                }
                wraps
            });
        }

        doc.set_attr(block, PROCESSED_ATTR, PROCESSED_VALUE);
        trace!(
            direction = dominant.as_css(),
            wraps,
            leaves = leaves.len(),
            "block annotated"
        );
        Ok(BlockOutcome {
            direction: dominant,
            wraps,
            leaves: leaves.len(),
            skipped: false,
            no_text: false,
        })
    }
}

/// Replace one text leaf by its runs, wrapping where the mode table says so.
/// Returns the number of islands created; a leaf producing none is left in
/// place, since its runs would concatenate back to the original text.
fn rewrite_leaf(doc: &mut Document, leaf: NodeId, dominant: Direction, mode: FixMode) -> usize {
    let Some(text) = doc.text(leaf) else {
        return 0;
    };
    let text = text.to_string();
    let runs = segment_runs(&text);
    let wrap_dirs: Vec<Option<Direction>> = runs
        .iter()
        .map(|run| wrap_direction(dominant, run.class, mode))
        .collect();
    if wrap_dirs.iter().all(Option::is_none) {
        return 0;
    }

    let mut wraps = 0;
    for (run, wrap) in runs.iter().zip(&wrap_dirs) {
        match wrap {
            Some(dir) => {
                if let Some(island) = doc.insert_element_before(leaf, ISOLATE_TAG) {
                    doc.set_attr(island, "dir", dir.as_css());
                    doc.append_text(island, run.text);
                    wraps += 1;
                }
            }
            None => {
                doc.insert_text_before(leaf, run.text);
            }
        }
    }
    doc.detach(leaf);
    wraps
}

/// The mode decision table: which runs become islands, and in which
/// direction. Majority and neutral runs never wrap; `wrap-latin` wraps LTR
/// islands only; `dir-only` never wraps.
fn wrap_direction(dominant: Direction, class: ScriptClass, mode: FixMode) -> Option<Direction> {
    let run_dir = class.direction()?;
    if run_dir == dominant {
        return None;
    }
    match (mode, run_dir) {
        (FixMode::DirOnly, _) => None,
        (FixMode::Auto, _) => Some(run_dir),
        (FixMode::WrapLatin, Direction::Ltr) => Some(Direction::Ltr),
        (FixMode::WrapLatin, Direction::Rtl) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip() -> Selector {
        Selector::parse(crate::engine::DEFAULT_SKIP_SELECTOR).unwrap()
    }

    fn apply_with(doc: &mut Document, block: NodeId, config: &BidiConfig) -> BlockOutcome {
        let skip = skip();
        AnnotationApplier::new(config, &skip).apply(doc, block).unwrap()
    }

    fn first_block(doc: &Document) -> NodeId {
        doc.children(doc.root())[0]
    }

    #[test]
    fn persian_block_isolates_latin_runs() {
        let mut doc =
            Document::parse_fragment("<div class=\"markdown\">این یک test ساده است 123</div>");
        let block = first_block(&doc);
        let outcome = apply_with(&mut doc, block, &BidiConfig::default());

        assert_eq!(outcome.direction, Direction::Rtl);
        assert_eq!(outcome.wraps, 2);
        assert!(!outcome.skipped);

        let html = doc.to_html();
        assert!(html.contains("<bdi dir=\"ltr\">test</bdi>"), "{html}");
        assert!(html.contains("<bdi dir=\"ltr\">123</bdi>"), "{html}");

        let el = doc.element(block).unwrap();
        assert_eq!(el.style_property("direction"), Some("rtl"));
        assert_eq!(el.style_property("text-align"), Some("start"));
        assert_eq!(el.style_property("unicode-bidi"), Some("isolate"));
        assert_eq!(el.attr(PROCESSED_ATTR), Some(PROCESSED_VALUE));
    }

    #[test]
    fn english_block_isolates_the_rtl_word() {
        let mut doc =
            Document::parse_fragment("<div class=\"markdown\">This is an مثال paragraph.</div>");
        let block = first_block(&doc);
        let outcome = apply_with(&mut doc, block, &BidiConfig::default());

        assert_eq!(outcome.direction, Direction::Ltr);
        assert_eq!(outcome.wraps, 1);
        let html = doc.to_html();
        assert!(html.contains("<bdi dir=\"rtl\">مثال</bdi>"), "{html}");
        assert!(html.contains("This is an "), "plain majority text survives");
        assert_eq!(
            doc.element(block).unwrap().style_property("direction"),
            Some("ltr")
        );
    }

    #[test]
    fn text_content_is_lossless_across_rewrite() {
        let source = "این یک test ساده است 123";
        let mut doc = Document::parse_fragment(&format!("<div class=\"markdown\">{source}</div>"));
        let block = first_block(&doc);
        apply_with(&mut doc, block, &BidiConfig::default());
        assert_eq!(doc.text_content(block), source);
    }

    #[test]
    fn second_apply_is_a_flag_guarded_no_op() {
        let mut doc = Document::parse_fragment("<div class=\"markdown\">متن test</div>");
        let block = first_block(&doc);
        apply_with(&mut doc, block, &BidiConfig::default());
        let before = doc.to_html();

        let outcome = apply_with(&mut doc, block, &BidiConfig::default());
        assert!(outcome.skipped);
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn reprocessing_after_invalidation_is_byte_stable() {
        let mut doc =
            Document::parse_fragment("<div class=\"markdown\">این یک test ساده است 123</div>");
        let block = first_block(&doc);
        apply_with(&mut doc, block, &BidiConfig::default());
        let first = doc.to_html();

        // Clear the flag with the content unchanged and run again: islands
        // are skip-protected, plain runs stay plain, styles overwrite in
        // place.
        doc.remove_attr(block, PROCESSED_ATTR);
        let outcome = apply_with(&mut doc, block, &BidiConfig::default());
        assert!(!outcome.skipped);
        assert_eq!(outcome.wraps, 0, "islands are not re-wrapped");
        assert_eq!(doc.to_html(), first);
    }

    #[test]
    fn dir_only_sets_styles_without_rewriting() {
        let mut doc =
            Document::parse_fragment("<div class=\"markdown\">این یک test ساده است 123</div>");
        let block = first_block(&doc);
        let config = BidiConfig {
            mode: FixMode::DirOnly,
            ..Default::default()
        };
        let outcome = apply_with(&mut doc, block, &config);

        assert_eq!(outcome.direction, Direction::Rtl);
        assert_eq!(outcome.wraps, 0);
        let html = doc.to_html();
        assert!(!html.contains("<bdi"), "{html}");
        assert!(html.contains("این یک test ساده است 123"));
        assert_eq!(
            doc.element(block).unwrap().style_property("direction"),
            Some("rtl")
        );
        assert_eq!(
            doc.element(block).unwrap().attr(PROCESSED_ATTR),
            Some(PROCESSED_VALUE)
        );
    }

    #[test]
    fn wrap_latin_never_wraps_rtl_runs() {
        // RTL-dominant: LTR runs still wrap.
        let mut doc = Document::parse_fragment("<div class=\"markdown\">متن test متن</div>");
        let block = first_block(&doc);
        let config = BidiConfig {
            mode: FixMode::WrapLatin,
            ..Default::default()
        };
        let outcome = apply_with(&mut doc, block, &config);
        assert_eq!(outcome.wraps, 1);
        assert!(doc.to_html().contains("<bdi dir=\"ltr\">test</bdi>"));

        // LTR-dominant: the minority RTL run stays plain.
        let mut doc =
            Document::parse_fragment("<div class=\"markdown\">This is an مثال paragraph.</div>");
        let block = first_block(&doc);
        let outcome = apply_with(&mut doc, block, &config);
        assert_eq!(outcome.direction, Direction::Ltr);
        assert_eq!(outcome.wraps, 0);
        assert!(!doc.to_html().contains("<bdi"));
    }

    #[test]
    fn code_content_is_untouched_byte_for_byte() {
        let mut doc = Document::parse_fragment(
            "<div class=\"markdown\">این متن <code>console.log(\"سلام test\");</code> است</div>",
        );
        let block = first_block(&doc);
        let code = doc.select(&Selector::parse("code").unwrap())[0];
        let code_before = doc.outer_html(code);

        let outcome = apply_with(&mut doc, block, &BidiConfig::default());
        assert_eq!(outcome.direction, Direction::Rtl);
        assert_eq!(doc.outer_html(code), code_before);
    }

    #[test]
    fn code_only_block_is_a_marked_no_op() {
        let mut doc = Document::parse_fragment(
            "<div class=\"markdown\"><code>سلام دنیا</code></div>",
        );
        let block = first_block(&doc);
        let before = doc.inner_html(block);
        let outcome = apply_with(&mut doc, block, &BidiConfig::default());

        assert!(outcome.no_text);
        assert_eq!(outcome.direction, Direction::Ltr);
        assert_eq!(outcome.wraps, 0);
        assert_eq!(doc.inner_html(block), before);
        let el = doc.element(block).unwrap();
        assert_eq!(el.attr(PROCESSED_ATTR), Some(PROCESSED_VALUE));
        assert_eq!(el.style_property("direction"), None, "no styles on no-op");
    }

    #[test]
    fn block_inside_skip_region_fails_closed() {
        let mut doc = Document::parse_fragment(
            "<div contenteditable=\"true\"><div class=\"markdown\">متن test</div></div>",
        );
        let outer = first_block(&doc);
        let block = doc.children(outer)[0];
        let before = doc.to_html();

        let outcome = apply_with(&mut doc, block, &BidiConfig::default());
        assert!(outcome.no_text);
        // Only the processed marker may appear; content and styles stay put.
        assert!(!doc.to_html().contains("<bdi"));
        assert_eq!(doc.element(block).unwrap().style_property("direction"), None);
        assert_ne!(doc.to_html(), before, "marker attribute was added");
    }

    #[test]
    fn blank_only_block_is_a_marked_no_op() {
        let mut doc = Document::parse_fragment("<div class=\"markdown\">   \n\t  </div>");
        let block = first_block(&doc);
        let outcome = apply_with(&mut doc, block, &BidiConfig::default());
        assert!(outcome.no_text);
        assert_eq!(outcome.leaves, 0);
    }

    #[test]
    fn uniform_text_produces_no_islands() {
        let mut doc = Document::parse_fragment("<div class=\"markdown\">سلام دنیای قشنگ</div>");
        let block = first_block(&doc);
        let before = doc.inner_html(block);
        let outcome = apply_with(&mut doc, block, &BidiConfig::default());

        assert_eq!(outcome.direction, Direction::Rtl);
        assert_eq!(outcome.wraps, 0);
        assert_eq!(doc.inner_html(block), before, "leaves left in place");
    }

    #[test]
    fn nested_markup_wraps_only_minority_leaf_runs() {
        let mut doc = Document::parse_fragment(
            "<div class=\"markdown\"><p>متن <strong>bold</strong> ادامه</p></div>",
        );
        let block = first_block(&doc);
        let outcome = apply_with(&mut doc, block, &BidiConfig::default());

        assert_eq!(outcome.direction, Direction::Rtl);
        assert_eq!(outcome.wraps, 1);
        let html = doc.to_html();
        assert!(html.contains("<strong><bdi dir=\"ltr\">bold</bdi></strong>"), "{html}");
    }

    #[test]
    fn rewrites_never_surface_in_the_record_queue() {
        let mut doc = Document::parse_fragment("<div class=\"markdown\">متن test</div>");
        let block = first_block(&doc);
        doc.take_records();
        apply_with(&mut doc, block, &BidiConfig::default());
        assert!(doc.take_records().is_empty());
    }

    #[test]
    fn detached_block_is_an_error() {
        let mut doc = Document::parse_fragment("<div class=\"markdown\">متن test</div>");
        let block = first_block(&doc);
        doc.detach(block);

        let config = BidiConfig::default();
        let skip = skip();
        let err = AnnotationApplier::new(&config, &skip)
            .apply(&mut doc, block)
            .unwrap_err();
        assert!(matches!(err, EngineError::DetachedBlock(_)));
    }

    #[test]
    fn text_node_as_block_is_an_error() {
        let mut doc = Document::parse_fragment("<div class=\"markdown\">متن</div>");
        let block = first_block(&doc);
        let leaf = doc.children(block)[0];

        let config = BidiConfig::default();
        let skip = skip();
        let err = AnnotationApplier::new(&config, &skip)
            .apply(&mut doc, leaf)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotAnElement(_)));
    }

    #[test]
    fn mode_table_is_exhaustive() {
        use Direction::*;
        use FixMode::*;
        use ScriptClass as C;

        let cases = [
            (Rtl, C::Ltr, Auto, Some(Ltr)),
            (Rtl, C::Ltr, DirOnly, None),
            (Rtl, C::Ltr, WrapLatin, Some(Ltr)),
            (Rtl, C::Rtl, Auto, None),
            (Rtl, C::Rtl, DirOnly, None),
            (Rtl, C::Rtl, WrapLatin, None),
            (Ltr, C::Rtl, Auto, Some(Rtl)),
            (Ltr, C::Rtl, DirOnly, None),
            (Ltr, C::Rtl, WrapLatin, None),
            (Ltr, C::Ltr, Auto, None),
            (Ltr, C::Ltr, DirOnly, None),
            (Ltr, C::Ltr, WrapLatin, None),
            (Rtl, C::Neutral, Auto, None),
            (Rtl, C::Neutral, DirOnly, None),
            (Rtl, C::Neutral, WrapLatin, None),
            (Ltr, C::Neutral, Auto, None),
            (Ltr, C::Neutral, DirOnly, None),
            (Ltr, C::Neutral, WrapLatin, None),
        ];
        for (dominant, class, mode, expected) in cases {
            assert_eq!(
                wrap_direction(dominant, class, mode),
                expected,
                "dominant={dominant:?} class={class:?} mode={mode:?}"
            );
        }
    }
}
