//! Surface abstraction for driving a UI under test.
//!
//! This module provides a unified interface over whatever renders the
//! application: the engine only issues read queries plus a small set of
//! interaction verbs (click, type-text, clear, set-viewport, navigate).
//!
//! - `UiSurface` is the seam a real browser adapter would implement
//! - `MockSurface` is an in-memory element tree for testing and demos,
//!   with scripted interaction effects and time-delayed mutations so tests
//!   can exercise eventual consistency without a browser

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crate::error::{EngineError, EngineResult};
use crate::selector::SelectorCandidate;

use super::types::{ElementId, ElementSnapshot, ViewportSize};

/// Default viewport for a freshly constructed surface
pub const DEFAULT_SURFACE_VIEWPORT: ViewportSize = ViewportSize::new(1280, 720);

/// Trait for UI surfaces
///
/// Implementations drive different rendering targets. The engine never
/// reaches into a surface's internals: it resolves elements through `query`
/// and acts through the verb methods. Element handles are invalidated by any
/// mutation, so callers re-resolve on every step.
pub trait UiSurface {
    /// Navigate to a URL. Completion is *not* guaranteed when this returns;
    /// callers gate readiness with a settle-check on the root content.
    fn navigate(&mut self, url: &str) -> EngineResult<()>;

    /// Return all current matches for one selector candidate, searched
    /// within `scope` (default: document root). Read-only; never retries.
    fn query(&self, candidate: &SelectorCandidate, scope: Option<ElementId>) -> Vec<ElementSnapshot>;

    /// Click an element
    fn click(&mut self, target: ElementId) -> EngineResult<()>;

    /// Type text into an element
    fn type_text(&mut self, target: ElementId, text: &str) -> EngineResult<()>;

    /// Clear an element's input value
    fn clear(&mut self, target: ElementId) -> EngineResult<()>;

    /// Request a viewport change. The new size may take effect
    /// asynchronously; `viewport()` reports what is currently in effect.
    fn set_viewport(&mut self, size: ViewportSize) -> EngineResult<()>;

    /// Currently effective viewport dimensions
    fn viewport(&self) -> ViewportSize;

    /// URL of the current document, if any navigation has happened
    fn current_url(&self) -> Option<String>;

    /// Surface type identifier (e.g. "mock", "browser")
    fn source_type(&self) -> &str;
}

// ============================================================================
// Element tree
// ============================================================================

/// Builder for one element added to a [`Tree`]
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    text: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    visible: bool,
}

impl Element {
    /// Create an element with the given tag name
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            visible: true,
        }
    }

    /// Set the `id` attribute
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.attributes.insert("id".to_string(), id.into());
        self
    }

    /// Append a class name
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the element's own text content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Start hidden (display: none equivalent)
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

struct ElementNode {
    tag: String,
    text: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    visible: bool,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    detached: bool,
}

/// Mutable in-memory element tree backing a [`MockSurface`]
///
/// Elements live in an arena; removal detaches rather than reuses slots so
/// stale handles are detectable as vanished targets.
pub struct Tree {
    nodes: Vec<ElementNode>,
}

impl Tree {
    /// Create a tree holding only a visible `body` root
    pub fn new() -> Self {
        Self {
            nodes: vec![ElementNode {
                tag: "body".to_string(),
                text: String::new(),
                classes: Vec::new(),
                attributes: BTreeMap::new(),
                visible: true,
                parent: None,
                children: Vec::new(),
                detached: false,
            }],
        }
    }

    /// The document root
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Append a child element under `parent`, returning its handle
    pub fn append(&mut self, parent: ElementId, element: Element) -> ElementId {
        let id = ElementId(self.nodes.len() as u64);
        self.nodes.push(ElementNode {
            tag: element.tag,
            text: element.text,
            classes: element.classes,
            attributes: element.attributes,
            visible: element.visible,
            parent: Some(parent),
            children: Vec::new(),
            detached: false,
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    /// Detach an element and its whole subtree
    pub fn remove(&mut self, id: ElementId) {
        let children = self.nodes[id.0 as usize].children.clone();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.0 as usize].detached = true;
        if let Some(parent) = self.nodes[id.0 as usize].parent {
            self.nodes[parent.0 as usize].children.retain(|c| *c != id);
        }
    }

    /// Whether the handle refers to a live (attached) element
    pub fn is_attached(&self, id: ElementId) -> bool {
        (id.0 as usize) < self.nodes.len() && !self.nodes[id.0 as usize].detached
    }

    /// Find an element by its `id` attribute
    pub fn find(&self, dom_id: &str) -> Option<ElementId> {
        (0..self.nodes.len())
            .map(|i| ElementId(i as u64))
            .find(|id| {
                self.is_attached(*id)
                    && self.nodes[id.0 as usize].attributes.get("id").map(String::as_str)
                        == Some(dom_id)
            })
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.nodes[id.0 as usize].text = text.into();
    }

    pub fn set_attr(&mut self, id: ElementId, name: impl Into<String>, value: impl Into<String>) {
        self.nodes[id.0 as usize].attributes.insert(name.into(), value.into());
    }

    /// Current `value` attribute (input contents), empty if unset
    pub fn value(&self, id: ElementId) -> String {
        self.nodes[id.0 as usize]
            .attributes
            .get("value")
            .cloned()
            .unwrap_or_default()
    }

    pub fn add_class(&mut self, id: ElementId, class: impl Into<String>) {
        let class = class.into();
        let node = &mut self.nodes[id.0 as usize];
        if !node.classes.contains(&class) {
            node.classes.push(class);
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        self.nodes[id.0 as usize].classes.retain(|c| c != class);
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.nodes[id.0 as usize].classes.iter().any(|c| c == class)
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) {
        self.nodes[id.0 as usize].visible = visible;
    }

    /// Effective visibility: the element and every ancestor are visible
    pub fn effectively_visible(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &self.nodes[id.0 as usize];
            if node.detached || !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Snapshot of one element's readable state
    pub fn snapshot(&self, id: ElementId) -> ElementSnapshot {
        let node = &self.nodes[id.0 as usize];
        ElementSnapshot {
            id,
            tag: node.tag.clone(),
            text: node.text.clone(),
            classes: node.classes.clone(),
            attributes: node.attributes.clone(),
            visible: self.effectively_visible(id),
        }
    }

    /// All attached elements in the subtree rooted at `scope`, depth-first
    fn subtree(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![scope];
        while let Some(id) = stack.pop() {
            if !self.is_attached(id) {
                continue;
            }
            out.push(id);
            let node = &self.nodes[id.0 as usize];
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Evaluate one selector candidate against the subtree under `scope`
    pub fn query(&self, candidate: &SelectorCandidate, scope: Option<ElementId>) -> Vec<ElementId> {
        let scope = scope.unwrap_or_else(|| self.root());
        if !self.is_attached(scope) {
            return Vec::new();
        }
        self.subtree(scope)
            .into_iter()
            .filter(|id| self.matches(*id, candidate))
            .collect()
    }

    fn matches(&self, id: ElementId, candidate: &SelectorCandidate) -> bool {
        let node = &self.nodes[id.0 as usize];
        match candidate {
            SelectorCandidate::Text { text } => !text.is_empty() && node.text.contains(text),
            SelectorCandidate::AttributeSubstring { name, value } => node
                .attributes
                .get(name)
                .is_some_and(|v| v.contains(value)),
            SelectorCandidate::ClassSubstring { class } => {
                node.classes.iter().any(|c| c.contains(class))
            }
            SelectorCandidate::Structure { path } => self.matches_structure(id, path),
        }
    }

    /// CSS-like descendant match: space-separated compounds, the last one
    /// matching the element itself and earlier ones matching ancestors in
    /// document order.
    fn matches_structure(&self, id: ElementId, path: &str) -> bool {
        let compounds: Vec<&str> = path.split_whitespace().collect();
        let Some((last, ancestors)) = compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(id, last) {
            return false;
        }
        let mut remaining = ancestors.iter().rev();
        let mut wanted = remaining.next();
        let mut current = self.nodes[id.0 as usize].parent;
        while let (Some(compound), Some(ancestor)) = (wanted, current) {
            if self.matches_compound(ancestor, compound) {
                wanted = remaining.next();
            }
            current = self.nodes[ancestor.0 as usize].parent;
        }
        wanted.is_none()
    }

    /// Match one compound like `button.add-btn`, `#star`, or `.modal`
    fn matches_compound(&self, id: ElementId, compound: &str) -> bool {
        let node = &self.nodes[id.0 as usize];
        let mut rest = compound;
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && node.tag != tag {
            return false;
        }
        rest = &rest[tag_end..];
        while !rest.is_empty() {
            let sigil = rest.as_bytes()[0];
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            match sigil {
                b'.' if !node.classes.iter().any(|c| c == name) => return false,
                b'#' if node.attributes.get("id").map(String::as_str) != Some(name) => {
                    return false;
                }
                _ => {}
            }
            rest = &body[end..];
        }
        true
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Mock surface
// ============================================================================

type ClickEffect = Box<dyn FnMut(&mut Tree)>;
type TypeEffect = Box<dyn FnMut(&mut Tree, &str)>;
type DelayedMutation = Box<dyn FnOnce(&mut Tree)>;

/// An in-memory UI surface for tests and demos
///
/// Behaviors of a real application are scripted:
/// - `on_click` / `on_type` register per-element effects that mutate the tree
/// - `schedule` queues a mutation that lands after a delay, simulating
///   animations and network responses
/// - a configurable navigation load delay and viewport settle delay make the
///   surface eventually consistent rather than instant
pub struct MockSurface {
    tree: RefCell<Tree>,
    click_effects: HashMap<String, ClickEffect>,
    type_effects: HashMap<String, TypeEffect>,
    scheduled: RefCell<Vec<(Instant, Option<DelayedMutation>)>>,
    viewport: Cell<ViewportSize>,
    pending_viewport: RefCell<Option<(ViewportSize, Instant)>>,
    viewport_settle_delay: Duration,
    load_delay: Duration,
    ready_at: Cell<Option<Instant>>,
    url: RefCell<Option<String>>,
    interaction_log: RefCell<Vec<String>>,
}

impl MockSurface {
    /// Create an empty surface (just a `body` root), ready immediately
    pub fn new() -> Self {
        Self::with_tree(Tree::new())
    }

    /// Create a surface around a pre-built tree
    pub fn with_tree(tree: Tree) -> Self {
        Self {
            tree: RefCell::new(tree),
            click_effects: HashMap::new(),
            type_effects: HashMap::new(),
            scheduled: RefCell::new(Vec::new()),
            viewport: Cell::new(DEFAULT_SURFACE_VIEWPORT),
            pending_viewport: RefCell::new(None),
            viewport_settle_delay: Duration::ZERO,
            load_delay: Duration::ZERO,
            ready_at: Cell::new(None),
            url: RefCell::new(None),
            interaction_log: RefCell::new(Vec::new()),
        }
    }

    /// Delay between `navigate` and the document becoming queryable
    pub fn load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Delay between `set_viewport` and `viewport()` reporting the new size
    pub fn viewport_settle_delay(mut self, delay: Duration) -> Self {
        self.viewport_settle_delay = delay;
        self
    }

    /// Register an effect applied when the element with this `id` attribute
    /// is clicked
    pub fn on_click(&mut self, dom_id: impl Into<String>, effect: impl FnMut(&mut Tree) + 'static) {
        self.click_effects.insert(dom_id.into(), Box::new(effect));
    }

    /// Register an effect applied when text is typed into the element with
    /// this `id` attribute. The effect receives the typed text.
    pub fn on_type(
        &mut self,
        dom_id: impl Into<String>,
        effect: impl FnMut(&mut Tree, &str) + 'static,
    ) {
        self.type_effects.insert(dom_id.into(), Box::new(effect));
    }

    /// Queue a tree mutation that takes effect after `delay`
    pub fn schedule(&self, delay: Duration, mutation: impl FnOnce(&mut Tree) + 'static) {
        self.scheduled
            .borrow_mut()
            .push((Instant::now() + delay, Some(Box::new(mutation))));
    }

    /// Direct tree access for test setup and assertions
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> R {
        f(&mut self.tree.borrow_mut())
    }

    /// Interaction verbs applied so far, oldest first
    pub fn interaction_log(&self) -> Vec<String> {
        self.interaction_log.borrow().clone()
    }

    /// Whether the current document has finished its load delay
    fn is_ready(&self) -> bool {
        match self.ready_at.get() {
            Some(at) => Instant::now() >= at,
            None => true,
        }
    }

    /// Apply any due delayed state: scheduled mutations and pending viewport
    fn settle(&self) {
        let now = Instant::now();
        {
            let mut scheduled = self.scheduled.borrow_mut();
            let mut tree = self.tree.borrow_mut();
            for (due, mutation) in scheduled.iter_mut() {
                if *due <= now {
                    if let Some(mutation) = mutation.take() {
                        mutation(&mut tree);
                    }
                }
            }
            scheduled.retain(|(_, m)| m.is_some());
        }
        let mut pending = self.pending_viewport.borrow_mut();
        if let Some((size, due)) = *pending {
            if due <= now {
                self.viewport.set(size);
                *pending = None;
            }
        }
    }

    /// Validate a handle before an interaction verb is applied
    fn check_target(&self, target: ElementId, verb: &str) -> EngineResult<()> {
        let tree = self.tree.borrow();
        if !tree.is_attached(target) {
            return Err(EngineError::InteractionFault(format!(
                "{} target {} vanished before the action was applied",
                verb, target
            )));
        }
        if !tree.effectively_visible(target) {
            return Err(EngineError::InteractionFault(format!(
                "{} target {} is not visible",
                verb,
                tree.snapshot(target).describe()
            )));
        }
        Ok(())
    }

    fn dom_id_of(&self, target: ElementId) -> Option<String> {
        self.tree
            .borrow()
            .snapshot(target)
            .attribute("id")
            .map(str::to_string)
    }
}

impl Default for MockSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSurface for MockSurface {
    fn navigate(&mut self, url: &str) -> EngineResult<()> {
        *self.url.borrow_mut() = Some(url.to_string());
        self.ready_at.set(Some(Instant::now() + self.load_delay));
        self.interaction_log
            .borrow_mut()
            .push(format!("navigate {}", url));
        Ok(())
    }

    fn query(&self, candidate: &SelectorCandidate, scope: Option<ElementId>) -> Vec<ElementSnapshot> {
        self.settle();
        if !self.is_ready() {
            return Vec::new();
        }
        let tree = self.tree.borrow();
        tree.query(candidate, scope)
            .into_iter()
            .map(|id| tree.snapshot(id))
            .collect()
    }

    fn click(&mut self, target: ElementId) -> EngineResult<()> {
        self.settle();
        self.check_target(target, "click")?;
        self.interaction_log
            .borrow_mut()
            .push(format!("click {}", target));
        if let Some(dom_id) = self.dom_id_of(target) {
            if let Some(mut effect) = self.click_effects.remove(&dom_id) {
                effect(&mut self.tree.borrow_mut());
                self.click_effects.insert(dom_id, effect);
            }
        }
        Ok(())
    }

    fn type_text(&mut self, target: ElementId, text: &str) -> EngineResult<()> {
        self.settle();
        self.check_target(target, "type")?;
        self.interaction_log
            .borrow_mut()
            .push(format!("type {} {:?}", target, text));
        let dom_id = self.dom_id_of(target);
        if let Some(dom_id) = dom_id {
            if let Some(mut effect) = self.type_effects.remove(&dom_id) {
                effect(&mut self.tree.borrow_mut(), text);
                self.type_effects.insert(dom_id, effect);
                return Ok(());
            }
        }
        // Default input behavior: append to the current value
        let mut tree = self.tree.borrow_mut();
        let value = tree.value(target) + text;
        tree.set_attr(target, "value", value);
        Ok(())
    }

    fn clear(&mut self, target: ElementId) -> EngineResult<()> {
        self.settle();
        self.check_target(target, "clear")?;
        self.interaction_log
            .borrow_mut()
            .push(format!("clear {}", target));
        self.tree.borrow_mut().set_attr(target, "value", "");
        Ok(())
    }

    fn set_viewport(&mut self, size: ViewportSize) -> EngineResult<()> {
        self.interaction_log
            .borrow_mut()
            .push(format!("viewport {}", size));
        if self.viewport_settle_delay.is_zero() {
            self.viewport.set(size);
        } else {
            *self.pending_viewport.borrow_mut() =
                Some((size, Instant::now() + self.viewport_settle_delay));
        }
        Ok(())
    }

    fn viewport(&self) -> ViewportSize {
        self.settle();
        self.viewport.get()
    }

    fn current_url(&self) -> Option<String> {
        self.url.borrow().clone()
    }

    fn source_type(&self) -> &str {
        "mock"
    }
}
