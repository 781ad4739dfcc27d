//! Mutation-record triage.
//!
//! The watcher turns a batch of [`MutationRecord`]s into flag
//! invalidations: any block whose content may have changed loses its
//! processed marker so the next sweep picks it up again. It never
//! touches block content itself.

use bidifix_dom::{Document, MutationRecord, NodeId, Selector};
use tracing::trace;

use crate::applier::PROCESSED_ATTR;

/// Maps mutation records onto processed-flag invalidations.
#[derive(Debug, Clone)]
pub struct MutationWatcher {
    block_selector: Selector,
}

impl MutationWatcher {
    pub fn new(block_selector: Selector) -> Self {
        Self { block_selector }
    }

    /// Processes a batch of mutation records, clearing the processed flag
    /// on every block the batch may have dirtied. Returns the number of
    /// blocks invalidated.
    ///
    /// A child-list change dirties the nearest enclosing block of the
    /// insertion point plus every block inside the added subtrees (the
    /// added root included, so inserting a complete block re-processes
    /// it even when its flag survived a move). A character-data change
    /// dirties the nearest enclosing block of the text node.
    pub fn observe(&self, doc: &mut Document, records: &[MutationRecord]) -> usize {
        let mut invalidated = 0;
        for record in records {
            match record {
                MutationRecord::ChildrenAdded { parent, added } => {
                    if let Some(block) = doc.closest(*parent, &self.block_selector) {
                        if invalidate(doc, block) {
                            invalidated += 1;
                        }
                    }
                    for &node in added {
                        for block in doc.select_within(node, &self.block_selector) {
                            if invalidate(doc, block) {
                                invalidated += 1;
                            }
                        }
                    }
                }
                MutationRecord::CharacterData { node } => {
                    if let Some(block) = doc.closest(*node, &self.block_selector) {
                        if invalidate(doc, block) {
                            invalidated += 1;
                        }
                    }
                }
            }
        }
        invalidated
    }

    /// Clears the processed flag on every block in the document.
    /// Used when the whole ruleset shifts under the page: navigation,
    /// or a configuration change that alters annotation output.
    pub fn invalidate_all(&self, doc: &mut Document) -> usize {
        let mut invalidated = 0;
        for block in doc.select(&self.block_selector) {
            if invalidate(doc, block) {
                invalidated += 1;
            }
        }
        invalidated
    }
}

/// Removes the processed flag from `block` if present. Returns whether
/// the flag was actually there, so callers can count real invalidations
/// rather than no-ops.
fn invalidate(doc: &mut Document, block: NodeId) -> bool {
    let had_flag = doc
        .element(block)
        .is_some_and(|el| el.attr(PROCESSED_ATTR).is_some());
    if had_flag {
        doc.remove_attr(block, PROCESSED_ATTR);
        trace!(?block, "processed flag cleared");
    }
    had_flag
}
