use ego_tree::NodeId;

/// A unit of observed document mutation.
///
/// Only structural insertion and text mutation are observed. Attribute
/// writes never produce records, which is what lets processed markers and
/// style writes live on the nodes themselves without feeding back into
/// invalidation. Node removals are not observed either: a removed subtree
/// needs no reprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Nodes were inserted under `parent`; `added` holds the roots of the
    /// inserted subtrees.
    ChildrenAdded { parent: NodeId, added: Vec<NodeId> },
    /// The payload of an existing text node changed.
    CharacterData { node: NodeId },
}
