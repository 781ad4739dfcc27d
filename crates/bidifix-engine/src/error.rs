use bidifix_dom::{NodeId, SelectorError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the correction engine.
///
/// Per-block errors are logged and counted during a sweep, never allowed to
/// abort it.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("node {0:?} does not exist in this document")]
    MissingNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("block {0:?} is no longer attached to the document")]
    DetachedBlock(NodeId),

    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),
}
