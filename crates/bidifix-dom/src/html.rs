//! HTML ingestion: scraper-parsed trees copied into our own node model.

use std::ops::Deref;

use ego_tree::{NodeId, Tree};
use scraper::{Html, Node};

use crate::node::{ElementData, NodeData};

/// Parse a complete document. Doctype and processing instructions are
/// dropped; the element scaffolding html5ever builds is kept.
pub(crate) fn document_tree(html: &str) -> Tree<NodeData> {
    let parsed = Html::parse_document(html);
    let mut tree = Tree::new(NodeData::Root);
    let root = tree.root().id();
    for child in parsed.tree.root().children() {
        copy_into(&mut tree, root, child);
    }
    tree
}

/// Parse a fragment; its nodes land directly under our root without the
/// synthetic wrapper the fragment parser creates.
pub(crate) fn fragment_tree(html: &str) -> Tree<NodeData> {
    let parsed = Html::parse_fragment(html);
    let mut tree = Tree::new(NodeData::Root);
    let root = tree.root().id();
    for child in fragment_contents(&parsed) {
        copy_into(&mut tree, root, child);
    }
    tree
}

/// Parse a fragment and graft its nodes as the last children of `parent`.
/// Returns the ids of the grafted roots in document order.
pub(crate) fn graft_fragment(tree: &mut Tree<NodeData>, parent: NodeId, html: &str) -> Vec<NodeId> {
    let parsed = Html::parse_fragment(html);
    fragment_contents(&parsed)
        .into_iter()
        .filter_map(|child| copy_into(tree, parent, child))
        .collect()
}

/// html5ever parses fragments in a `body` context, leaving the parsed nodes
/// under a synthetic `html` element; unwrap it.
fn fragment_contents(parsed: &Html) -> Vec<ego_tree::NodeRef<'_, Node>> {
    let root = parsed.tree.root();
    for child in root.children() {
        if let Node::Element(el) = child.value() {
            if el.name() == "html" {
                return child.children().collect();
            }
        }
    }
    root.children().collect()
}

fn copy_into(
    tree: &mut Tree<NodeData>,
    parent: NodeId,
    node: ego_tree::NodeRef<'_, Node>,
) -> Option<NodeId> {
    let data = match node.value() {
        Node::Element(el) => NodeData::Element(ElementData::with_attrs(el.name(), el.attrs())),
        Node::Text(text) => NodeData::Text(text.deref().to_string()),
        Node::Comment(comment) => NodeData::Comment(comment.deref().to_string()),
        _ => return None,
    };
    let id = tree.get_mut(parent)?.append(data).id();
    for child in node.children() {
        copy_into(tree, id, child);
    }
    Some(id)
}
