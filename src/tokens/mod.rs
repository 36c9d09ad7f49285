// src/tokens/mod.rs

use scraper::{Html, Node};
use tracing::trace;

/// A markup token, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    EndOfDocument,
}

impl Token {
    pub fn start_tag(name: &str, attrs: &[(&str, &str)]) -> Self {
        Token::StartTag {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn text(s: &str) -> Self {
        Token::Text(s.to_string())
    }

    /// Value of attribute `key` if this is a start tag carrying it.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::StartTag { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn is_start_tag(&self, tag: &str) -> bool {
        matches!(self, Token::StartTag { name, .. } if name.eq_ignore_ascii_case(tag))
    }
}

/// Parse `html` leniently and flatten it into start-tag and text tokens.
///
/// Nodes are visited in pre-order, so a cell's first child directly follows
/// its start tag. The returned sequence always ends with `EndOfDocument`.
pub fn tokenize(html: &str) -> Vec<Token> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for node in doc.root_element().descendants() {
        match node.value() {
            Node::Element(el) => out.push(Token::StartTag {
                name: el.name().to_string(),
                attrs: el
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }),
            Node::Text(text) => {
                let s: &str = text;
                out.push(Token::Text(s.to_string()));
            }
            _ => {}
        }
    }
    out.push(Token::EndOfDocument);

    trace!(count = out.len(), "tokenized document");
    out
}
