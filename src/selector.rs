//! Selector candidates and prioritized target descriptors.
//!
//! A [`TargetDescriptor`] is an ordered list of fallback strategies for
//! locating elements. Candidates are tried strictly in order and the first
//! one yielding at least one live match wins; later candidates are never
//! consulted once an earlier one has matched.

use serde::{Deserialize, Serialize};

/// One strategy for locating elements on the UI surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum SelectorCandidate {
    /// Match elements whose text content contains the given string
    Text { text: String },

    /// Match elements where the named attribute's value contains the substring
    AttributeSubstring { name: String, value: String },

    /// Match elements whose class list contains a class with this substring
    ClassSubstring { class: String },

    /// Match by CSS-like structural path (tag, `#id`, `.class` compounds,
    /// space-separated for descendants)
    Structure { path: String },
}

impl SelectorCandidate {
    /// Create a text-content candidate
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an attribute-substring candidate
    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttributeSubstring {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a class-substring candidate
    pub fn class(class: impl Into<String>) -> Self {
        Self::ClassSubstring {
            class: class.into(),
        }
    }

    /// Create a structural candidate
    pub fn structure(path: impl Into<String>) -> Self {
        Self::Structure { path: path.into() }
    }

    /// Parse the compact notation used in scenario shorthand:
    /// `text=To Do`, `class*=todo-column`, `attr*=placeholder:task`,
    /// or any other string as a structural path.
    pub fn parse(spec: &str) -> Self {
        if let Some(text) = spec.strip_prefix("text=") {
            Self::text(text)
        } else if let Some(class) = spec.strip_prefix("class*=") {
            Self::class(class)
        } else if let Some(rest) = spec.strip_prefix("attr*=") {
            match rest.split_once(':') {
                Some((name, value)) => Self::attr(name, value),
                None => Self::attr(rest, ""),
            }
        } else {
            Self::structure(spec)
        }
    }
}

impl std::fmt::Display for SelectorCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectorCandidate::Text { text } => write!(f, "text={}", text),
            SelectorCandidate::AttributeSubstring { name, value } => {
                write!(f, "attr*={}:{}", name, value)
            }
            SelectorCandidate::ClassSubstring { class } => write!(f, "class*={}", class),
            SelectorCandidate::Structure { path } => write!(f, "{}", path),
        }
    }
}

/// Ordered fallback list of selector candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetDescriptor {
    candidates: Vec<SelectorCandidate>,
}

impl TargetDescriptor {
    /// Create a descriptor from candidates. The list must be non-empty.
    pub fn new(candidates: Vec<SelectorCandidate>) -> Self {
        assert!(
            !candidates.is_empty(),
            "TargetDescriptor requires at least one candidate"
        );
        Self { candidates }
    }

    /// Create a single-candidate descriptor
    pub fn single(candidate: SelectorCandidate) -> Self {
        Self::new(vec![candidate])
    }

    /// Parse a descriptor from compact shorthand, one string per candidate
    pub fn parse(specs: &[&str]) -> Self {
        Self::new(specs.iter().map(|s| SelectorCandidate::parse(s)).collect())
    }

    /// Candidates in priority order
    pub fn candidates(&self) -> &[SelectorCandidate] {
        &self.candidates
    }

    /// Whether the descriptor holds at least one candidate (always true for
    /// descriptors built through the constructors; checked again after
    /// deserialization)
    pub fn is_valid(&self) -> bool {
        !self.candidates.is_empty()
    }
}

impl std::fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.candidates.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
