//! Token strings: templates whose value depends on the current token context
//!
//! The engine only consumes the [`Resolvable`] capability. [`TokenString`] is
//! the bundled implementation, supporting plain `{{Name}}` substitution.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Supplies current values for named tokens
pub trait Context {
    /// Get the current value of a token, or `None` if it isn't available.
    ///
    /// `name` is always lowercase.
    fn token_value(&self, name: &str) -> Option<&str>;
}

impl Context for BTreeMap<String, String> {
    fn token_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Context for HashMap<String, String> {
    fn token_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// A string value which may need re-evaluation when the context changes
pub trait Resolvable {
    /// Whether the value references at least one token.
    fn is_mutable(&self) -> bool;

    /// Re-evaluate against a context, returning whether the value changed.
    fn update_context(&mut self, context: &dyn Context) -> bool;

    /// The most recently evaluated value.
    fn value(&self) -> &str;

    /// Whether every referenced token had a value on the last update.
    fn is_ready(&self) -> bool;

    /// Names of the tokens referenced by the template.
    fn tokens(&self) -> Box<dyn Iterator<Item = &str> + '_>;
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Token { name: String, raw: String },
}

/// A string template with `{{Name}}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenString {
    raw: String,
    parts: Vec<Part>,
    value: String,
    ready: bool,
}

impl TokenString {
    /// Parse a template. Values start out unresolved unless the template is
    /// a plain literal.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parts = parse_parts(&raw);
        let ready = !parts.iter().any(|p| matches!(p, Part::Token { .. }));
        Self {
            value: raw.clone(),
            raw,
            parts,
            ready,
        }
    }

    /// The template as written by the author
    pub fn raw(&self) -> &str {
        &self.raw
    }

    fn render(&self, context: &dyn Context) -> (String, bool) {
        let mut out = String::with_capacity(self.raw.len());
        let mut ready = true;
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Token { name, raw } => match context.token_value(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        ready = false;
                        out.push_str(raw);
                    }
                },
            }
        }
        (out, ready)
    }
}

impl Resolvable for TokenString {
    fn is_mutable(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, Part::Token { .. }))
    }

    fn update_context(&mut self, context: &dyn Context) -> bool {
        if !self.is_mutable() {
            return false;
        }
        let (value, ready) = self.render(context);
        let changed = value != self.value || ready != self.ready;
        self.value = value;
        self.ready = ready;
        changed
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn tokens(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.parts.iter().filter_map(|p| match p {
            Part::Token { name, .. } => Some(name.as_str()),
            Part::Literal(_) => None,
        }))
    }
}

impl From<&str> for TokenString {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TokenString {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for TokenString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Split a template into literal text and `{{token}}` references
fn parse_parts(raw: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let name = rest[start + 2..start + 2 + len].trim();
        let end = start + 2 + len + 2;

        if name.is_empty() {
            // "{{}}" isn't a token
            literal.push_str(&rest[..end]);
        } else {
            literal.push_str(&rest[..start]);
            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            parts.push(Part::Token {
                name: name.to_lowercase(),
                raw: rest[start..end].to_string(),
            });
        }
        rest = &rest[end..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    parts
}
