//! HTML serialization of the document tree.
//!
//! Standard HTML5 serialization rules scoped to the node kinds we hold:
//! escaped text, double-quoted attributes, void elements without end tags,
//! raw text inside `script`/`style`.

use ego_tree::NodeRef;

use crate::document::Document;
use crate::node::NodeData;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(crate) fn inner_html(doc: &Document, id: ego_tree::NodeId) -> String {
    let mut out = String::new();
    if let Some(node) = doc.tree().get(id) {
        let raw = node
            .value()
            .as_element()
            .is_some_and(|el| is_raw_text(el.tag()));
        for child in node.children() {
            serialize_node(child, raw, &mut out);
        }
    }
    out
}

pub(crate) fn outer_html(doc: &Document, id: ego_tree::NodeId) -> String {
    let mut out = String::new();
    if let Some(node) = doc.tree().get(id) {
        serialize_node(node, false, &mut out);
    }
    out
}

fn serialize_node(node: NodeRef<'_, NodeData>, raw_text: bool, out: &mut String) {
    match node.value() {
        NodeData::Root => {
            for child in node.children() {
                serialize_node(child, false, out);
            }
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(el.tag());
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void(el.tag()) {
                return;
            }
            let raw = is_raw_text(el.tag());
            for child in node.children() {
                serialize_node(child, raw, out);
            }
            out.push_str("</");
            out.push_str(el.tag());
            out.push('>');
        }
        NodeData::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeData::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| tag.eq_ignore_ascii_case(v))
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| tag.eq_ignore_ascii_case(v))
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}
