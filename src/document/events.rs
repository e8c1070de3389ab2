//! Delivery of activation events raised inside mounted overlays
//!
//! A [`EventSink`] knows which element ids belong to mounted overlays. When
//! one of them is activated it hands a [`DocumentEvent`] to the registered
//! host handler right away, or queues it for
//! [`MountPoint::take_events`](super::MountPoint::take_events) when no
//! handler is set. Clones share the same state, so a browser listener can
//! hold one while the document keeps another.

use super::DocumentEvent;
use std::{cell::RefCell, collections::HashSet, rc::Rc};
use tracing::debug;

/// Host callback receiving events as they happen
pub type EventHandler = Box<dyn FnMut(DocumentEvent)>;

#[derive(Default)]
struct SinkState {
    activatable: HashSet<String>,
    pending: Vec<DocumentEvent>,
}

/// Shared event routing state of a document
#[derive(Clone, Default)]
pub struct EventSink {
    state: Rc<RefCell<SinkState>>,
    handler: Rc<RefCell<Option<EventHandler>>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver future events to `handler` instead of queueing them.
    ///
    /// The handler runs outside any document borrow, so it may route the
    /// event to a popup that hides itself on the same document.
    pub fn set_handler(&self, handler: impl FnMut(DocumentEvent) + 'static) {
        *self.handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Go back to queueing events
    pub fn clear_handler(&self) {
        self.handler.borrow_mut().take();
    }

    pub fn has_handler(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// Make element ids activatable
    pub fn register<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        let mut state = self.state.borrow_mut();
        state.activatable.extend(ids.into_iter().map(str::to_string));
    }

    /// Stop accepting activations for element ids
    pub fn unregister<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        let mut state = self.state.borrow_mut();
        for id in ids {
            state.activatable.remove(id);
        }
    }

    pub fn is_activatable(&self, element_id: &str) -> bool {
        self.state.borrow().activatable.contains(element_id)
    }

    /// Report that an element was activated.
    ///
    /// Returns false, and does nothing, for ids outside mounted overlays.
    pub fn dispatch(&self, element_id: &str) -> bool {
        if !self.is_activatable(element_id) {
            debug!("Ignoring activation of unknown element '{}'", element_id);
            return false;
        }

        let event = DocumentEvent::Activated(element_id.to_string());

        // Take the handler out while it runs so it can replace itself
        let handler = self.handler.borrow_mut().take();
        match handler {
            Some(mut handler) => {
                handler(event);
                let mut slot = self.handler.borrow_mut();
                if slot.is_none() {
                    *slot = Some(handler);
                }
            }
            None => self.state.borrow_mut().pending.push(event),
        }
        true
    }

    /// Drain queued events
    pub fn take_pending(&self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventSink")
            .field("activatable", &state.activatable)
            .field("pending", &state.pending)
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
