//! Selector resolution with prioritized fallback.
//!
//! Resolution is a read-only query: candidates are tried strictly in listed
//! order and the first one yielding at least one live match wins. An empty
//! result is not an error here; callers decide whether emptiness is failure,
//! and any retrying is layered on top by the retry engine.

use crate::selector::{SelectorCandidate, TargetDescriptor};
use crate::surface::{ElementId, ElementSnapshot, UiSurface};

/// Outcome of resolving one target descriptor
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Matches from the winning candidate, empty if nothing matched
    pub matches: Vec<ElementSnapshot>,

    /// Index of the candidate that produced the matches
    pub winning_candidate: Option<usize>,
}

impl Resolution {
    fn empty() -> Self {
        Self {
            matches: Vec::new(),
            winning_candidate: None,
        }
    }

    /// The first matched element, if any
    pub fn first(&self) -> Option<&ElementSnapshot> {
        self.matches.first()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// One-line description of the resolved set for failure detail
    pub fn describe(&self) -> String {
        if self.matches.is_empty() {
            return "no matches".to_string();
        }
        let head = self
            .matches
            .iter()
            .take(3)
            .map(|m| m.describe())
            .collect::<Vec<_>>()
            .join(", ");
        if self.matches.len() > 3 {
            format!("{} matches: {}, ...", self.matches.len(), head)
        } else {
            format!("{} matches: {}", self.matches.len(), head)
        }
    }
}

/// Resolve a descriptor against the surface, scoped to `scope` or the
/// document root.
///
/// Deterministic for an unchanged surface: the same candidate wins and
/// returns the same match set. Later candidates are never consulted once an
/// earlier one has matched.
pub fn resolve(
    surface: &dyn UiSurface,
    descriptor: &TargetDescriptor,
    scope: Option<ElementId>,
) -> Resolution {
    for (index, candidate) in descriptor.candidates().iter().enumerate() {
        let matches = surface.query(candidate, scope);
        if !matches.is_empty() {
            tracing::trace!(candidate = %candidate, index, count = matches.len(), "candidate matched");
            return Resolution {
                matches,
                winning_candidate: Some(index),
            };
        }
    }
    tracing::trace!(descriptor = %descriptor, "no candidate matched");
    Resolution::empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Element, MockSurface, Tree};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn board_surface() -> MockSurface {
        let mut tree = Tree::new();
        let root = tree.root();
        let column = tree.append(root, Element::new("section").class("todo-column"));
        tree.append(column, Element::new("h2").text("To Do"));
        MockSurface::with_tree(tree)
    }

    #[test]
    fn test_first_candidate_wins() {
        let surface = board_surface();
        let descriptor = TargetDescriptor::parse(&["text=To Do", "class*=todo-column"]);
        let resolution = resolve(&surface, &descriptor, None);
        assert_eq!(resolution.winning_candidate, Some(0));
        assert_eq!(resolution.matches.len(), 1);
        assert_eq!(resolution.matches[0].tag, "h2");
    }

    #[test]
    fn test_fallback_to_second_candidate() {
        let surface = board_surface();
        let descriptor = TargetDescriptor::parse(&["text=Backlog", "class*=todo-column"]);
        let resolution = resolve(&surface, &descriptor, None);
        assert_eq!(resolution.winning_candidate, Some(1));
        assert_eq!(resolution.matches[0].tag, "section");
    }

    #[test]
    fn test_no_candidate_matches_is_empty_not_error() {
        let surface = board_surface();
        let descriptor = TargetDescriptor::parse(&["text=Backlog", "class*=archive"]);
        let resolution = resolve(&surface, &descriptor, None);
        assert!(resolution.is_empty());
        assert_eq!(resolution.winning_candidate, None);
    }

    /// Once an earlier candidate matches, later candidates are never queried.
    #[test]
    fn test_fallback_short_circuits() {
        struct CountingSurface {
            inner: MockSurface,
            queried: Rc<RefCell<Vec<SelectorCandidate>>>,
        }

        impl UiSurface for CountingSurface {
            fn navigate(&mut self, url: &str) -> crate::error::EngineResult<()> {
                self.inner.navigate(url)
            }
            fn query(
                &self,
                candidate: &SelectorCandidate,
                scope: Option<ElementId>,
            ) -> Vec<ElementSnapshot> {
                self.queried.borrow_mut().push(candidate.clone());
                self.inner.query(candidate, scope)
            }
            fn click(&mut self, target: ElementId) -> crate::error::EngineResult<()> {
                self.inner.click(target)
            }
            fn type_text(&mut self, target: ElementId, text: &str) -> crate::error::EngineResult<()> {
                self.inner.type_text(target, text)
            }
            fn clear(&mut self, target: ElementId) -> crate::error::EngineResult<()> {
                self.inner.clear(target)
            }
            fn set_viewport(
                &mut self,
                size: crate::surface::ViewportSize,
            ) -> crate::error::EngineResult<()> {
                self.inner.set_viewport(size)
            }
            fn viewport(&self) -> crate::surface::ViewportSize {
                self.inner.viewport()
            }
            fn current_url(&self) -> Option<String> {
                self.inner.current_url()
            }
            fn source_type(&self) -> &str {
                "counting-mock"
            }
        }

        let queried = Rc::new(RefCell::new(Vec::new()));
        let surface = CountingSurface {
            inner: board_surface(),
            queried: Rc::clone(&queried),
        };

        let descriptor =
            TargetDescriptor::parse(&["text=Backlog", "text=To Do", "class*=todo-column"]);
        let resolution = resolve(&surface, &descriptor, None);

        assert_eq!(resolution.winning_candidate, Some(1));
        let queries = queried.borrow();
        assert_eq!(queries.len(), 2, "third candidate must never be queried");
        assert_eq!(queries[1], SelectorCandidate::text("To Do"));
    }

    /// Resolving twice against an unchanged surface yields the same set.
    #[test]
    fn test_resolution_idempotent() {
        let surface = board_surface();
        let descriptor = TargetDescriptor::parse(&["class*=todo"]);
        let first = resolve(&surface, &descriptor, None);
        let second = resolve(&surface, &descriptor, None);
        assert_eq!(first.matches, second.matches);
        assert_eq!(first.winning_candidate, second.winning_candidate);
    }
}
