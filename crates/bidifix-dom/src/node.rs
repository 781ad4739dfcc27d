/// Payload of a document tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Synthetic tree root; never serialized.
    Root,
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl NodeData {
    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeData::Text(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Only elements and the root may carry children.
    pub(crate) fn is_container(&self) -> bool {
        matches!(self, NodeData::Root | NodeData::Element(_))
    }
}

/// Element payload: tag name plus attributes in insertion order.
///
/// Attribute order is preserved so repeated serialization of an unchanged
/// tree is byte-stable, which is what idempotence checks compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attrs<'a>(
        tag: impl Into<String>,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attrs: attrs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing the value in place if it already exists
    /// so attribute order stays stable across rewrites.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(attr, _)| !attr.eq_ignore_ascii_case(name));
        self.attrs.len() != before
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes().any(|class| class == name)
    }

    /// Read a single declaration out of the inline `style` attribute.
    pub fn style_property(&self, prop: &str) -> Option<&str> {
        let style = self.attr("style")?;
        for decl in split_declarations(style) {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case(prop) {
                return Some(value.trim());
            }
        }
        None
    }

    /// Merge one declaration into the inline `style` attribute, preserving
    /// unrelated declarations and the position of an existing one.
    pub fn set_style_property(&mut self, prop: &str, value: &str) {
        let mut decls: Vec<(String, String)> = Vec::new();
        if let Some(style) = self.attr("style") {
            for decl in split_declarations(style) {
                let Some((name, val)) = decl.split_once(':') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                decls.push((name.to_string(), val.trim().to_string()));
            }
        }
        match decls
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(prop))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => decls.push((prop.to_string(), value.to_string())),
        }
        let rendered = decls
            .iter()
            .map(|(name, val)| format!("{}: {}", name, val))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attr("style", rendered);
    }
}

/// Split on semicolons outside of parentheses and quotes, so a `;` inside
/// `url(data:...;base64,...)` or a quoted `content` string stays part of
/// its declaration.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in style.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&style[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&style[start..]);
    parts
}
