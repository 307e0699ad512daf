//! Field paths into the evaluated document.
//!
//! A path is a root variable plus a sequence of field names. It is only turned
//! into text when an expression is emitted, so field names that are not valid
//! identifiers can be rendered with index syntax instead of being pasted in.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::compile::TranslateError;
use crate::expr::quote;

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    root: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Document root variable.
    pub const OBJECT: &'static str = "object";
    /// Loop variable bound by `all()` in for-each clauses.
    pub const ELEMENT: &'static str = "element";

    pub fn root(name: impl Into<String>) -> Self {
        Self { root: name.into(), segments: Vec::new() }
    }

    pub fn object() -> Self {
        Self::root(Self::OBJECT)
    }

    pub fn element() -> Self {
        Self::root(Self::ELEMENT)
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { root: self.root.clone(), segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Rewrite a source list path (`request.object.spec.containers`) into a
    /// root-relative path (`object.spec.containers`).
    ///
    /// Only plain dotted field chains translate. Projections, multi-selects,
    /// filters and pipes (`spec.[a, b][]`, `items[?x]`, `a | b`) are rejected.
    pub fn from_jmespath(list: &str) -> Result<Self, TranslateError> {
        let rest = list.strip_prefix("request.").unwrap_or(list);
        let pieces: Vec<&str> = rest.split('.').filter(|p| !p.is_empty()).collect();
        if pieces.iter().any(|p| p.contains(is_query_char)) {
            return Err(TranslateError::UnsupportedShape(format!("list expression `{list}`")));
        }
        let mut pieces = pieces.into_iter();
        let root = pieces.next().unwrap_or(Self::OBJECT);
        Ok(Self {
            root: root.to_string(),
            segments: pieces.map(str::to_string).collect(),
        })
    }

    /// `has(p)`, or `'key' in parent` when the last field is not an identifier.
    pub fn presence(&self) -> String {
        match self.segments.split_last() {
            Some((last, parent)) if !is_ident(last) => {
                format!("{} in {}", quote(last), render(&self.root, parent))
            }
            _ => format!("has({self})"),
        }
    }

    pub fn absence(&self) -> String {
        match self.segments.last() {
            Some(last) if !is_ident(last) => format!("!({})", self.presence()),
            _ => format!("!{}", self.presence()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.root, &self.segments))
    }
}

fn is_query_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | '|' | ',' | '*' | '@' | '?' | '{' | '}' | '(' | ')' | '`')
}

fn is_ident(name: &str) -> bool {
    IDENT.is_match(name)
}

fn render(root: &str, segments: &[String]) -> String {
    let mut out = String::from(root);
    for segment in segments {
        if is_ident(segment) {
            out.push('.');
            out.push_str(segment);
        } else {
            out.push('[');
            out.push_str(&quote(segment));
            out.push(']');
        }
    }
    out
}
