//! bidifix-dom: an owned, mutable HTML document tree with mutation records.
//!
//! The Rust rendition of "the DOM plus a MutationObserver", scoped to what a
//! text-correction engine needs:
//! - an `ego-tree` arena of elements/text/comments, ingested via `scraper`
//! - an editing API that queues mutation records (structural insertions and
//!   text changes only; attribute writes are deliberately unobserved)
//! - a structural selector subset (tag/#id/.class/[attr], comma lists)
//! - filtered text-leaf traversal with skip-subtree pruning
//! - HTML serialization

pub mod document;
pub mod html;
pub mod node;
pub mod record;
pub mod selector;
pub mod serialize;

pub use document::Document;
pub use ego_tree::NodeId;
pub use node::{ElementData, NodeData};
pub use record::MutationRecord;
pub use selector::{Selector, SelectorError};
