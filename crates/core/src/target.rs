use serde::{Deserialize, Serialize};
use std::fmt;

/// What a binding attaches to: one element by id, or every selector match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Id(String),
    Selector(String),
}

impl Target {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    /// A bare identifier (letters, digits, `-`, `_`, starting with a letter)
    /// is an element id; anything else is treated as a CSS selector.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let mut chars = input.chars();
        let is_ident = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if is_ident {
            Self::Id(input.to_string())
        } else {
            Self::Selector(input.to_string())
        }
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Id(id) => write!(f, "#{}", id),
            Target::Selector(selector) => f.write_str(selector),
        }
    }
}

/// One resolved element: the n-th match of its target, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub target: Target,
    pub position: usize,
}

impl ElementHandle {
    pub fn new(target: Target, position: usize) -> Self {
        Self { target, position }
    }
}

/// What the disablement predicate and completion callback get to see.
#[derive(Debug, Clone, Serialize)]
pub struct BindingContext {
    pub target: Target,
    pub elements: Vec<ElementHandle>,
    pub token_name: String,
}
