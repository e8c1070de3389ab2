//! In-memory document
//!
//! Keeps the body as a list of [`Element`]s. Used by the CLI to produce
//! markup and by tests to observe what popups attach and remove.

use super::{DocumentError, DocumentEvent, DocumentResult, Element, EventSink, MountPoint};

/// Document whose body lives in memory
#[derive(Debug, Default)]
pub struct HtmlDocument {
    /// Top-level body children, `None` when the document has no body
    body: Option<Vec<Element>>,

    /// Routes activations inside mounted overlays
    events: EventSink,
}

impl HtmlDocument {
    /// Create a document with an empty body
    pub fn new() -> Self {
        Self {
            body: Some(Vec::new()),
            events: EventSink::new(),
        }
    }

    /// Create a document without a body; attaching to it fails
    pub fn without_body() -> Self {
        Self {
            body: None,
            events: EventSink::new(),
        }
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Top-level body children in document order
    pub fn nodes(&self) -> &[Element] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Number of top-level body children
    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Number of top-level nodes carrying `node_id`
    pub fn overlay_count(&self, node_id: &str) -> usize {
        self.nodes()
            .iter()
            .filter(|node| node.id() == Some(node_id))
            .count()
    }

    /// Find any element in the body by id
    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.nodes().iter().find_map(|node| node.find_by_id(id))
    }

    /// Event routing shared with whoever raises activations
    pub fn events(&self) -> EventSink {
        self.events.clone()
    }

    /// Deliver activations straight to `handler` instead of queueing them
    pub fn set_event_handler(&self, handler: impl FnMut(DocumentEvent) + 'static) {
        self.events.set_handler(handler);
    }

    /// Simulate the user activating an element inside a mounted overlay.
    ///
    /// Returns whether the element was activatable. A handler that needs
    /// this document again must be driven through [`HtmlDocument::events`]
    /// instead, outside any borrow of the document.
    pub fn activate(&mut self, element_id: &str) -> bool {
        self.events.dispatch(element_id)
    }

    /// Serialize the body contents
    pub fn to_html(&self) -> String {
        self.nodes().iter().map(Element::to_html).collect()
    }
}

impl MountPoint for HtmlDocument {
    fn append_overlay(&mut self, overlay: &Element) -> DocumentResult<()> {
        let body = self.body.as_mut().ok_or(DocumentError::MountPointMissing)?;
        body.push(overlay.clone());
        self.events.register(overlay.descendant_ids());
        Ok(())
    }

    fn remove_overlay(&mut self, node_id: &str) -> DocumentResult<bool> {
        let Some(body) = self.body.as_mut() else {
            return Ok(false);
        };

        if let Some(index) = body.iter().position(|node| node.id() == Some(node_id)) {
            let removed = body.remove(index);
            self.events.unregister(removed.descendant_ids());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn contains(&self, node_id: &str) -> bool {
        self.overlay_count(node_id) > 0
    }

    fn take_events(&mut self) -> Vec<DocumentEvent> {
        self.events.take_pending()
    }
}
