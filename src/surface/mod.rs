pub mod backend;
pub mod demo;
pub mod types;

pub use backend::{DEFAULT_SURFACE_VIEWPORT, Element, MockSurface, Tree, UiSurface};
pub use demo::demo_kanban_surface;
pub use types::{ElementId, ElementSnapshot, ViewportSize};
