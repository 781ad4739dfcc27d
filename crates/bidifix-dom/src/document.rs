use ego_tree::{NodeId, NodeRef, Tree};
use tracing::debug;

use crate::html;
use crate::node::{ElementData, NodeData};
use crate::record::MutationRecord;
use crate::selector::Selector;
use crate::serialize;

/// An owned, mutable document tree that records its own mutations.
///
/// Structural insertions and text changes are queued as [`MutationRecord`]s
/// for the host to drain; attribute and style writes are not observed. The
/// record queue plus the suppression scope are what allow a rewriting engine
/// to edit the tree without observing itself.
pub struct Document {
    tree: Tree<NodeData>,
    location: String,
    records: Vec<MutationRecord>,
    recording: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document: just the synthetic root.
    pub fn new() -> Self {
        Self::from_tree(Tree::new(NodeData::Root))
    }

    /// Parse a complete HTML document. The usual `html`/`head`/`body`
    /// scaffolding is preserved as parsed.
    pub fn parse(html: &str) -> Self {
        Self::from_tree(html::document_tree(html))
    }

    /// Parse an HTML fragment; the parsed nodes become direct children of
    /// the root, without document scaffolding.
    pub fn parse_fragment(html: &str) -> Self {
        Self::from_tree(html::fragment_tree(html))
    }

    fn from_tree(tree: Tree<NodeData>) -> Self {
        Self {
            tree,
            location: String::new(),
            records: Vec::new(),
            recording: true,
        }
    }

    pub(crate) fn tree(&self) -> &Tree<NodeData> {
        &self.tree
    }

    // ==== access ====

    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.tree.get(id).map(|node| node.value())
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(NodeData::as_element)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(NodeData::as_text)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|parent| parent.id())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.tree.get(id) {
            Some(node) => node.children().map(|child| child.id()).collect(),
            None => Vec::new(),
        }
    }

    /// True if the node still hangs off this document's root. Detached
    /// subtrees keep their arena slots, so id lookup alone is not enough.
    pub fn is_attached(&self, id: NodeId) -> bool {
        match self.tree.get(id) {
            Some(node) => {
                let top = node.ancestors().last().map(|a| a.id()).unwrap_or(id);
                top == self.root()
            }
            None => false,
        }
    }

    /// Concatenated text of the node's subtree, comments excluded.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            collect_text(node, &mut out);
        }
        out
    }

    // ==== navigation signal ====

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn navigate(&mut self, url: impl Into<String>) {
        self.location = url.into();
        debug!(location = %self.location, "document navigated");
    }

    // ==== queries ====

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.select_within(self.root(), selector)
    }

    /// Matching elements within a subtree (the subtree root included), in
    /// document order.
    pub fn select_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let Some(start) = self.tree.get(root) else {
            return Vec::new();
        };
        start
            .descendants()
            .filter(|node| {
                node.value()
                    .as_element()
                    .is_some_and(|el| selector.matches(el))
            })
            .map(|node| node.id())
            .collect()
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id).is_some_and(|el| selector.matches(el))
    }

    /// Nearest ancestor-or-self element matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = self.tree.get(id);
        while let Some(node) = current {
            if let Some(el) = node.value().as_element() {
                if selector.matches(el) {
                    return Some(node.id());
                }
            }
            current = node.parent();
        }
        None
    }

    /// Eligible text leaves of a block: depth-first over the subtree, blank
    /// leaves dropped, subtrees matching `skip` pruned entirely.
    pub fn text_leaves(&self, block: NodeId, skip: &Selector) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        if let Some(root) = self.tree.get(block) {
            collect_leaves(root, skip, &mut leaves);
        }
        leaves
    }

    // ==== mutation (recorded) ====

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.append_node(parent, NodeData::Element(ElementData::new(tag)))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Option<NodeId> {
        self.append_node(parent, NodeData::Text(text.to_string()))
    }

    fn append_node(&mut self, parent: NodeId, data: NodeData) -> Option<NodeId> {
        if !self.node(parent)?.is_container() {
            return None;
        }
        let id = self.tree.get_mut(parent)?.append(data).id();
        self.record(MutationRecord::ChildrenAdded {
            parent,
            added: vec![id],
        });
        Some(id)
    }

    /// Parse an HTML fragment and graft its nodes as the last children of
    /// `parent`. One record is emitted covering all inserted roots.
    pub fn append_html(&mut self, parent: NodeId, fragment: &str) -> Vec<NodeId> {
        if !self.node(parent).map(NodeData::is_container).unwrap_or(false) {
            return Vec::new();
        }
        let added = html::graft_fragment(&mut self.tree, parent, fragment);
        if !added.is_empty() {
            debug!(count = added.len(), "grafted html fragment");
            self.record(MutationRecord::ChildrenAdded {
                parent,
                added: added.clone(),
            });
        }
        added
    }

    pub fn insert_element_before(&mut self, anchor: NodeId, tag: &str) -> Option<NodeId> {
        self.insert_node_before(anchor, NodeData::Element(ElementData::new(tag)))
    }

    pub fn insert_text_before(&mut self, anchor: NodeId, text: &str) -> Option<NodeId> {
        self.insert_node_before(anchor, NodeData::Text(text.to_string()))
    }

    fn insert_node_before(&mut self, anchor: NodeId, data: NodeData) -> Option<NodeId> {
        // Root and detached nodes have no parent to insert under.
        let parent = self.parent(anchor)?;
        let id = self.tree.get_mut(anchor)?.insert_before(data).id();
        self.record(MutationRecord::ChildrenAdded {
            parent,
            added: vec![id],
        });
        Some(id)
    }

    /// Replace the payload of a text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> bool {
        let Some(mut node_mut) = self.tree.get_mut(node) else {
            return false;
        };
        let NodeData::Text(payload) = node_mut.value() else {
            return false;
        };
        *payload = text.to_string();
        self.record(MutationRecord::CharacterData { node });
        true
    }

    /// Detach a subtree. Not observed: removed content needs no
    /// reprocessing.
    pub fn detach(&mut self, id: NodeId) -> bool {
        if id == self.root() {
            return false;
        }
        match self.tree.get_mut(id) {
            Some(mut node) => {
                node.detach();
                true
            }
            None => false,
        }
    }

    // ==== mutation (unobserved attribute/style writes) ====

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        self.with_element_mut(id, |el| el.set_attr(name, value))
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        self.with_element_mut(id, |el| {
            el.remove_attr(name);
        })
    }

    pub fn set_style_property(&mut self, id: NodeId, prop: &str, value: &str) -> bool {
        self.with_element_mut(id, |el| el.set_style_property(prop, value))
    }

    fn with_element_mut(&mut self, id: NodeId, f: impl FnOnce(&mut ElementData)) -> bool {
        self.tree
            .get_mut(id)
            .and_then(|mut node| node.value().as_element_mut().map(f))
            .is_some()
    }

    // ==== observation ====

    /// Drain all queued mutation records in emission order.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    /// Run edits without emitting records. Used by the correction engine so
    /// its own rewrites never show up as external mutations.
    pub fn with_records_suppressed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.recording;
        self.recording = false;
        let out = f(self);
        self.recording = previous;
        out
    }

    fn record(&mut self, record: MutationRecord) {
        if self.recording {
            self.records.push(record);
        }
    }

    // ==== serialization ====

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        serialize::inner_html(self, self.root())
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        serialize::inner_html(self, id)
    }

    /// Serialize a node including itself.
    pub fn outer_html(&self, id: NodeId) -> String {
        serialize::outer_html(self, id)
    }
}

fn collect_text(node: NodeRef<'_, NodeData>, out: &mut String) {
    match node.value() {
        NodeData::Text(text) => out.push_str(text),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn collect_leaves(node: NodeRef<'_, NodeData>, skip: &Selector, out: &mut Vec<NodeId>) {
    for child in node.children() {
        match child.value() {
            NodeData::Element(el) => {
                if !skip.matches(el) {
                    collect_leaves(child, skip, out);
                }
            }
            NodeData::Text(text) => {
                if !text.trim().is_empty() {
                    out.push(child.id());
                }
            }
            _ => {}
        }
    }
}
