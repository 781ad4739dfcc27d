use thiserror::Error;

use crate::node::ElementData;

/// Errors produced while parsing a selector string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character '{found}' in selector '{selector}'")]
    UnexpectedChar { found: char, selector: String },
    #[error("combinators are not supported: '{0}'")]
    Combinator(String),
    #[error("unterminated attribute test in selector '{0}'")]
    UnterminatedAttr(String),
}

/// A structural selector: a comma-separated list of compound selectors over
/// tag name, `#id`, `.class` and `[attr]` / `[attr="value"]` tests.
///
/// Deliberately the subset the block and skip predicates need. Matching is
/// per-element and there are no combinators, so `matches` never has to walk
/// the tree. Ancestry questions are the document's job.
#[derive(Debug, Clone)]
pub struct Selector {
    parts: Vec<Compound>,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug, Clone)]
struct AttrTest {
    name: String,
    value: Option<String>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parts = Vec::new();
        for part in split_commas(input) {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError::Empty);
            }
            parts.push(parse_compound(part)?);
        }
        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { parts })
    }

    /// True if any of the comma-separated compounds matches the element.
    pub fn matches(&self, element: &ElementData) -> bool {
        self.parts.iter().any(|part| part.matches(element))
    }
}

impl Compound {
    fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attrs.iter().all(|test| match &test.value {
            Some(value) => element.attr(&test.name) == Some(value.as_str()),
            None => element.has_attr(&test.name),
        })
    }
}

/// Split on commas outside of attribute brackets and quotes.
fn split_commas(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_compound(part: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut chars = part.char_indices().peekable();

    // Optional leading tag name (or `*` for any).
    if let Some(&(_, first)) = chars.peek() {
        if first == '*' {
            chars.next();
        } else if is_ident_char(first) {
            let tag = take_ident(&mut chars);
            compound.tag = Some(tag.to_ascii_lowercase());
        }
    }

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '.' => {
                let class = take_ident(&mut chars);
                if class.is_empty() {
                    return Err(SelectorError::UnexpectedChar {
                        found: ch,
                        selector: part.to_string(),
                    });
                }
                compound.classes.push(class);
            }
            '#' => {
                let id = take_ident(&mut chars);
                if id.is_empty() {
                    return Err(SelectorError::UnexpectedChar {
                        found: ch,
                        selector: part.to_string(),
                    });
                }
                compound.id = Some(id);
            }
            '[' => {
                let test = parse_attr_test(part, idx)?;
                // Skip ahead to the closing bracket consumed by the helper.
                while let Some((_, inner)) = chars.next() {
                    if inner == ']' {
                        break;
                    }
                }
                compound.attrs.push(test);
            }
            c if c.is_whitespace() => {
                return Err(SelectorError::Combinator(part.to_string()));
            }
            other => {
                return Err(SelectorError::UnexpectedChar {
                    found: other,
                    selector: part.to_string(),
                });
            }
        }
    }

    Ok(compound)
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&(_, ch)) = chars.peek() {
        if is_ident_char(ch) {
            ident.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

/// Parse `[name]` or `[name="value"]` starting at the `[` found at `open`.
fn parse_attr_test(part: &str, open: usize) -> Result<AttrTest, SelectorError> {
    let rest = &part[open + 1..];
    let close = rest
        .find(']')
        .ok_or_else(|| SelectorError::UnterminatedAttr(part.to_string()))?;
    let body = &rest[..close];
    match body.split_once('=') {
        Some((name, value)) => {
            let name = name.trim();
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Ok(AttrTest {
                name: name.to_ascii_lowercase(),
                value: Some(value.to_string()),
            })
        }
        None => Ok(AttrTest {
            name: body.trim().to_ascii_lowercase(),
            value: None,
        }),
    }
}
