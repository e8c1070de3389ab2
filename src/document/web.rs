//! Browser document backed by `web-sys`
//!
//! Overlays are inserted into `document.body`. One delegated click listener
//! on the document maps each click to the nearest ancestor carrying an id
//! and hands it to the document's [`EventSink`]. Hosts either register a
//! handler with [`WebDocument::set_event_handler`], which runs on the click
//! itself, or drain [`MountPoint::take_events`] from their own loop.
//!
//! ```ignore
//! let doc = Rc::new(RefCell::new(WebDocument::from_window()?));
//! let popup = Rc::new(RefCell::new(PanelPopup::new()));
//!
//! let (weak_doc, handler_popup) = (Rc::downgrade(&doc), Rc::clone(&popup));
//! doc.borrow().set_event_handler(move |event| {
//!     if let Some(doc) = weak_doc.upgrade() {
//!         let result = handler_popup.borrow_mut().handle_event(&mut *doc.borrow_mut(), &event);
//!         if let Err(e) = result {
//!             tracing::warn!("Failed to handle {:?}: {}", event, e);
//!         }
//!     }
//! });
//! ```

use super::{DocumentError, DocumentEvent, DocumentResult, Element, EventSink, MountPoint};
use tracing::debug;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

type ClickListener = Closure<dyn FnMut(web_sys::Event)>;

/// Mount point over the page's live DOM
pub struct WebDocument {
    document: web_sys::Document,
    events: EventSink,
    /// Delegated click listener, removed on drop
    listener: ClickListener,
}

impl WebDocument {
    /// Attach to the current window's document
    pub fn from_window() -> DocumentResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| DocumentError::Backend("No window document available".to_string()))?;
        Self::new(document)
    }

    pub fn new(document: web_sys::Document) -> DocumentResult<Self> {
        let events = EventSink::new();
        let sink = events.clone();
        let listener = ClickListener::new(move |event: web_sys::Event| {
            let Some(target) = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
            else {
                return;
            };

            if let Ok(Some(element)) = target.closest("[id]") {
                sink.dispatch(&element.id());
            }
        });

        document
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .map_err(js_error)?;

        Ok(Self {
            document,
            events,
            listener,
        })
    }

    /// Event routing shared with the click listener
    pub fn events(&self) -> EventSink {
        self.events.clone()
    }

    /// Deliver clicks inside overlays straight to `handler`.
    ///
    /// The handler runs from the browser's click dispatch, outside any
    /// borrow the host holds, so it may borrow this document to hide a
    /// popup.
    pub fn set_event_handler(&self, handler: impl FnMut(DocumentEvent) + 'static) {
        self.events.set_handler(handler);
    }
}

impl MountPoint for WebDocument {
    fn append_overlay(&mut self, overlay: &Element) -> DocumentResult<()> {
        let body = self.document.body().ok_or(DocumentError::MountPointMissing)?;
        body.insert_adjacent_html("beforeend", &overlay.to_html())
            .map_err(js_error)?;

        self.events.register(overlay.descendant_ids());
        debug!("Mounted '{}'", overlay.id().unwrap_or_default());
        Ok(())
    }

    fn remove_overlay(&mut self, node_id: &str) -> DocumentResult<bool> {
        match self.document.get_element_by_id(node_id) {
            Some(node) => {
                let ids = descendant_ids(&node);
                node.remove();
                self.events
                    .unregister(std::iter::once(node_id).chain(ids.iter().map(String::as_str)));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn contains(&self, node_id: &str) -> bool {
        self.document.get_element_by_id(node_id).is_some()
    }

    fn take_events(&mut self) -> Vec<DocumentEvent> {
        self.events.take_pending()
    }
}

impl Drop for WebDocument {
    fn drop(&mut self) {
        if let Err(e) = self
            .document
            .remove_event_listener_with_callback("click", self.listener.as_ref().unchecked_ref())
        {
            debug!("Failed to remove click listener: {:?}", e);
        }
    }
}

fn descendant_ids(node: &web_sys::Element) -> Vec<String> {
    let Ok(found) = node.query_selector_all("[id]") else {
        return Vec::new();
    };

    (0..found.length())
        .filter_map(|index| found.item(index))
        .filter_map(|item| item.dyn_into::<web_sys::Element>().ok())
        .map(|element| element.id())
        .collect()
}

fn js_error(value: JsValue) -> DocumentError {
    DocumentError::Backend(format!("{value:?}"))
}
