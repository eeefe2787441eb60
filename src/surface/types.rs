// Core types for the UI surface boundary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque handle identifying one element on the surface.
///
/// Handles are only valid until the surface mutates; callers re-resolve on
/// every step instead of caching them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view of one resolved element, captured at resolution time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Handle for follow-up interaction verbs
    pub id: ElementId,

    /// Tag name (lowercase)
    pub tag: String,

    /// The element's own text content
    pub text: String,

    /// Class list in document order
    pub classes: Vec<String>,

    /// Attribute map (includes `id`, `value`, `placeholder`, `title`, ...)
    pub attributes: BTreeMap<String, String>,

    /// Effective visibility (element and all ancestors visible)
    pub visible: bool,
}

impl ElementSnapshot {
    /// Whether the class list contains the exact class name
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Attribute value, if present
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Short human-readable description for diagnostics
    pub fn describe(&self) -> String {
        let mut desc = format!("<{}", self.tag);
        if let Some(id) = self.attribute("id") {
            desc.push_str(&format!(" id={:?}", id));
        }
        if !self.classes.is_empty() {
            desc.push_str(&format!(" class={:?}", self.classes.join(" ")));
        }
        desc.push('>');
        if !self.text.is_empty() {
            desc.push_str(&format!(" {:?}", self.text));
        }
        if !self.visible {
            desc.push_str(" (hidden)");
        }
        desc
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ElementSnapshot {
        ElementSnapshot {
            id: ElementId(7),
            tag: "button".to_string(),
            text: "Adicionar Tarefa".to_string(),
            classes: vec!["add-btn".to_string(), "primary".to_string()],
            attributes: BTreeMap::from([("title".to_string(), "add".to_string())]),
            visible: true,
        }
    }

    #[test]
    fn test_has_class_exact_match_only() {
        let snap = snapshot();
        assert!(snap.has_class("add-btn"));
        assert!(!snap.has_class("add"));
    }

    #[test]
    fn test_describe_mentions_tag_and_text() {
        let desc = snapshot().describe();
        assert!(desc.contains("<button"));
        assert!(desc.contains("Adicionar Tarefa"));
    }

    #[test]
    fn test_viewport_display() {
        assert_eq!(ViewportSize::new(375, 667).to_string(), "375x667");
    }
}
