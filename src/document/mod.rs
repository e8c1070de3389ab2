//! Host document abstraction
//!
//! Popups never reach for a global document. Every operation that touches the
//! page receives a [`MountPoint`], which owns the body the overlays are
//! attached to and routes the input events raised inside them, either to a
//! host handler as they happen or into a queue drained with
//! [`MountPoint::take_events`].

pub mod events;
pub mod memory;
pub mod node;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use events::{EventHandler, EventSink};
pub use memory::HtmlDocument;
pub use node::{Element, Node};
#[cfg(target_arch = "wasm32")]
pub use web::WebDocument;

/// Result type for document operations
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Document-level failures
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document has no body to attach overlays to")]
    MountPointMissing,

    #[error("Document operation failed: {0}")]
    Backend(String),
}

/// Input events raised inside mounted overlays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// An element (by id) was clicked or otherwise activated
    Activated(String),
}

/// The place overlays are attached to, usually the document body
pub trait MountPoint {
    /// Append the overlay as the last child of the body
    fn append_overlay(&mut self, overlay: &Element) -> DocumentResult<()>;

    /// Remove the top-level node with the given id.
    ///
    /// Returns `Ok(false)` when no such node was attached.
    fn remove_overlay(&mut self, node_id: &str) -> DocumentResult<bool>;

    /// Whether a top-level node with the given id is attached
    fn contains(&self, node_id: &str) -> bool;

    /// Drain the events queued since the last call.
    ///
    /// Events delivered to a registered host handler are not queued.
    fn take_events(&mut self) -> Vec<DocumentEvent>;
}
