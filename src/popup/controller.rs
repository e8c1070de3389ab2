//! The popup controller
//!
//! A [`PanelPopup`] owns its configuration and display state. It is shown on
//! and hidden from a [`MountPoint`] passed in by the caller, so several
//! popups can share one document and one popup can be handed to whatever
//! code needs it.

use super::{
    template::TemplateKeys,
    types::{classes, HideCallback, PopupId, PopupOptions, PopupResult, DEFAULT_CLOSE_CAPTION, DEFAULT_CONTENT},
};
use crate::document::{DocumentEvent, Element, MountPoint};
use tracing::{debug, warn};

/// A modal "please wait" overlay
pub struct PanelPopup {
    /// Namespaces this popup's nodes in the document
    id: PopupId,

    /// Whether the overlay node is currently attached
    visible: bool,

    /// HTML content, possibly containing `{key}` placeholders
    content: String,

    /// Placeholder substitutions
    template_keys: TemplateKeys,

    /// Whether a dismiss button is rendered
    close_button: bool,

    /// Whether the attached node carries a dismiss button
    button_mounted: bool,

    /// Dismiss button caption
    close_caption: String,

    /// Fired after every hide that doesn't supply its own callback
    on_hide: Option<HideCallback>,
}

impl PanelPopup {
    /// Create a popup with the default "Working" content
    pub fn new() -> Self {
        Self::with_content(DEFAULT_CONTENT)
    }

    /// Create a popup with the given HTML content.
    ///
    /// Empty content falls back to the default message.
    pub fn with_content(content: impl Into<String>) -> Self {
        let mut content = content.into();
        if content.is_empty() {
            content = DEFAULT_CONTENT.to_string();
        }

        Self {
            id: PopupId::generate(),
            visible: false,
            content,
            template_keys: TemplateKeys::new(),
            close_button: false,
            button_mounted: false,
            close_caption: DEFAULT_CLOSE_CAPTION.to_string(),
            on_hide: None,
        }
    }

    pub fn id(&self) -> &PopupId {
        &self.id
    }

    /// Id of the node this popup attaches while shown
    pub fn node_id(&self) -> String {
        self.id.node_id()
    }

    /// Id of the dismiss button wrapper
    pub fn button_id(&self) -> String {
        self.id.button_id()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Raw content, placeholders included
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn template_keys(&self) -> &TemplateKeys {
        &self.template_keys
    }

    pub fn close_button(&self) -> bool {
        self.close_button
    }

    pub fn close_caption(&self) -> &str {
        &self.close_caption
    }

    pub fn has_callback(&self) -> bool {
        self.on_hide.is_some()
    }

    /// Replace the content used by the next show
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Merge options into the current configuration.
    ///
    /// Only the options that are set overwrite; the rest keep their values.
    pub fn configure(&mut self, options: PopupOptions) {
        let PopupOptions {
            template_keys,
            close_button,
            close_caption,
            callback,
            unrecognized,
        } = options;

        if !unrecognized.is_empty() {
            let names: Vec<&str> = unrecognized.keys().map(String::as_str).collect();
            warn!("Ignoring unrecognized popup options: {}", names.join(", "));
        }

        if let Some(template_keys) = template_keys {
            self.template_keys = template_keys;
        }
        if let Some(close_button) = close_button {
            self.close_button = close_button;
        }
        if let Some(close_caption) = close_caption {
            self.close_caption = close_caption;
        }
        if let Some(callback) = callback {
            self.on_hide = Some(callback);
        }

        debug!(
            "Configured popup {}: {} template key(s), close button {}",
            self.id,
            self.template_keys.len(),
            self.close_button
        );
    }

    /// Content with placeholders substituted
    pub fn rendered_content(&self) -> PopupResult<String> {
        Ok(self.template_keys.render(&self.content)?.into_owned())
    }

    /// Build the overlay node for the current state
    pub fn build_overlay(&self) -> PopupResult<Element> {
        let mut container = Element::new("div")
            .with_class(classes::CONTAINER)
            .with_html(self.rendered_content()?);

        if self.close_button {
            let button = Element::new("button")
                .with_attribute("type", "button")
                .with_html(self.close_caption.clone());
            container = container.with_child(
                Element::new("div")
                    .with_id(self.button_id())
                    .with_class(classes::BUTTON)
                    .with_child(button),
            );
        }

        Ok(Element::new("div")
            .with_id(self.node_id())
            .with_class(classes::WAITING)
            .with_child(Element::new("div").with_class(classes::OVERLAY))
            .with_child(container))
    }

    /// Show the popup with its current content and options.
    ///
    /// Showing an already visible popup replaces its node with a freshly
    /// rendered one; no hide notification fires for the replaced node.
    pub fn show(&mut self, doc: &mut dyn MountPoint) -> PopupResult<()> {
        let overlay = self.build_overlay()?;
        let node_id = self.node_id();

        if self.visible {
            debug!("Popup {} already visible, replacing its node", self.id);
            doc.remove_overlay(&node_id)?;
            self.visible = false;
            self.button_mounted = false;
        }

        doc.append_overlay(&overlay)?;
        self.visible = true;
        self.button_mounted = self.close_button;

        debug!("Showing popup {}", self.id);
        Ok(())
    }

    /// Replace the content, optionally merge options, then show
    pub fn set_content_and_show(
        &mut self,
        doc: &mut dyn MountPoint,
        content: impl Into<String>,
        options: Option<PopupOptions>,
    ) -> PopupResult<()> {
        self.set_content(content);
        if let Some(options) = options {
            self.configure(options);
        }
        self.show(doc)
    }

    /// Merge options, then show
    pub fn configure_and_show(
        &mut self,
        doc: &mut dyn MountPoint,
        options: PopupOptions,
    ) -> PopupResult<()> {
        self.configure(options);
        self.show(doc)
    }

    /// Hide the popup and fire the stored notification, if any.
    ///
    /// Returns `Ok(false)` without doing anything when the popup is hidden.
    pub fn hide(&mut self, doc: &mut dyn MountPoint) -> PopupResult<bool> {
        if !self.detach(doc)? {
            return Ok(false);
        }

        if let Some(callback) = self.on_hide.as_mut() {
            callback();
        }
        Ok(true)
    }

    /// Hide the popup and fire `callback` instead of the stored notification.
    ///
    /// The stored notification is kept for later hides. `callback` is
    /// dropped without being called when the popup is hidden.
    pub fn hide_with(
        &mut self,
        doc: &mut dyn MountPoint,
        callback: impl FnOnce(),
    ) -> PopupResult<bool> {
        if !self.detach(doc)? {
            return Ok(false);
        }

        callback();
        Ok(true)
    }

    fn detach(&mut self, doc: &mut dyn MountPoint) -> PopupResult<bool> {
        if !self.visible {
            return Ok(false);
        }

        let node_id = self.node_id();
        if !doc.remove_overlay(&node_id)? {
            warn!("Popup node '{}' was already removed from the document", node_id);
        }
        self.visible = false;
        self.button_mounted = false;

        debug!("Hid popup {}", self.id);
        Ok(true)
    }

    /// Route a document event to this popup.
    ///
    /// Activating the dismiss button hides the popup with the stored
    /// notification. The button rendered by the last show stays wired even
    /// if `close_button` was switched off since. Returns whether the event
    /// belonged to this popup.
    pub fn handle_event(
        &mut self,
        doc: &mut dyn MountPoint,
        event: &DocumentEvent,
    ) -> PopupResult<bool> {
        match event {
            DocumentEvent::Activated(target)
                if self.button_mounted && *target == self.button_id() =>
            {
                self.hide(doc)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl Default for PanelPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PanelPopup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelPopup")
            .field("id", &self.id)
            .field("visible", &self.visible)
            .field("content", &self.content)
            .field("template_keys", &self.template_keys)
            .field("close_button", &self.close_button)
            .field("button_mounted", &self.button_mounted)
            .field("close_caption", &self.close_caption)
            .field("on_hide", &self.on_hide.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentError, HtmlDocument};
    use crate::popup::PopupError;
    use scraper::{Html, Selector};
    use std::{cell::Cell, rc::Rc};

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move || handle.set(handle.get() + 1))
    }

    fn select_text(html: &str, selector: &str) -> Vec<String> {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse(selector).unwrap();
        fragment
            .select(&selector)
            .map(|element| element.text().collect::<String>())
            .collect()
    }

    #[test]
    fn test_new_popup_defaults() {
        let popup = PanelPopup::new();

        assert!(!popup.is_visible());
        assert_eq!(popup.content(), DEFAULT_CONTENT);
        assert!(popup.template_keys().is_empty());
        assert!(!popup.close_button());
        assert_eq!(popup.close_caption(), "Close");
        assert!(!popup.has_callback());
    }

    #[test]
    fn test_empty_initial_content_uses_default() {
        assert_eq!(PanelPopup::with_content("").content(), DEFAULT_CONTENT);
        assert_eq!(PanelPopup::with_content("<p>x</p>").content(), "<p>x</p>");
    }

    #[test]
    fn test_popups_get_distinct_ids() {
        assert_ne!(PanelPopup::new().id(), PanelPopup::new().id());
    }

    #[test]
    fn test_default_show_then_hide_without_callback() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();

        popup.show(&mut doc).unwrap();
        assert!(popup.is_visible());
        assert_eq!(doc.overlay_count(&popup.node_id()), 1);

        let html = doc.to_html();
        let texts = select_text(&html, ".ppopup-container h2");
        assert_eq!(texts, vec!["Working"]);
        assert_eq!(select_text(&html, ".ppopup-overlay").len(), 1);
        assert!(doc.element_by_id(&popup.button_id()).is_none());

        assert!(popup.hide(&mut doc).unwrap());
        assert!(!popup.is_visible());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_template_keys_scenario() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::with_content("Waits {delay} {unit length}. {untouched} stays.");

        popup.configure(
            PopupOptions::new()
                .with_template_keys([("delay", "3"), ("unit length", "seconds")]),
        );
        assert_eq!(
            popup.rendered_content().unwrap(),
            "Waits 3 seconds. {untouched} stays."
        );

        popup.show(&mut doc).unwrap();
        assert_eq!(
            select_text(&doc.to_html(), ".ppopup-container"),
            vec!["Waits 3 seconds. {untouched} stays."]
        );
    }

    #[test]
    fn test_configure_overwrites_only_present_fields() {
        let mut popup = PanelPopup::new();
        popup.configure(
            PopupOptions::new()
                .with_template_key("a", "1")
                .with_close_button(true)
                .with_close_caption("Dismiss"),
        );
        popup.configure(PopupOptions::new().with_template_key("b", "2"));

        assert!(popup.close_button());
        assert_eq!(popup.close_caption(), "Dismiss");
        assert_eq!(popup.template_keys().get("a"), None);
        assert_eq!(popup.template_keys().get("b"), Some("2"));
    }

    #[test]
    fn test_configure_is_idempotent() {
        let json = r#"{"templateKeys": {"k": "v"}, "closeButton": true, "closeCaption": "Go", "extra": 1}"#;
        let mut once = PanelPopup::with_content("{k}");
        let mut twice = PanelPopup::with_content("{k}");

        once.configure(PopupOptions::from_json(json).unwrap());
        twice.configure(PopupOptions::from_json(json).unwrap());
        twice.configure(PopupOptions::from_json(json).unwrap());

        assert_eq!(once.template_keys(), twice.template_keys());
        assert_eq!(once.close_button(), twice.close_button());
        assert_eq!(once.close_caption(), twice.close_caption());
        assert_eq!(once.rendered_content().unwrap(), twice.rendered_content().unwrap());
    }

    #[test]
    fn test_set_content_takes_effect_on_next_show() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();
        popup.set_content("<p>{who} is busy</p>");
        assert!(doc.is_empty());

        popup
            .set_content_and_show(
                &mut doc,
                "<p>{who} is done</p>",
                Some(PopupOptions::new().with_template_key("who", "Export")),
            )
            .unwrap();
        assert_eq!(select_text(&doc.to_html(), "p"), vec!["Export is done"]);
    }

    #[test]
    fn test_close_button_dismisses_and_fires_stored_callback() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();
        let (count, callback) = counter();

        popup
            .configure_and_show(
                &mut doc,
                PopupOptions::new()
                    .with_close_button(true)
                    .with_close_caption("Dismiss")
                    .with_callback(callback),
            )
            .unwrap();

        let html = doc.to_html();
        assert_eq!(select_text(&html, ".ppopup-button button"), vec!["Dismiss"]);

        assert!(doc.activate(&popup.button_id()));
        for event in doc.take_events() {
            assert!(popup.handle_event(&mut doc, &event).unwrap());
        }

        assert_eq!(count.get(), 1);
        assert!(!popup.is_visible());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_events_for_other_targets_are_not_handled() {
        let mut doc = HtmlDocument::new();
        let mut first = PanelPopup::new();
        let mut second = PanelPopup::new();
        first.configure(PopupOptions::new().with_close_button(true));
        second.configure(PopupOptions::new().with_close_button(true));
        first.show(&mut doc).unwrap();
        second.show(&mut doc).unwrap();

        let event = DocumentEvent::Activated(second.button_id());
        assert!(!first.handle_event(&mut doc, &event).unwrap());
        assert!(second.handle_event(&mut doc, &event).unwrap());

        assert!(first.is_visible());
        assert!(!second.is_visible());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_explicit_hide_callback_overrides_stored_one() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();
        let (stored, stored_cb) = counter();
        let (explicit, mut explicit_cb) = counter();

        popup
            .configure_and_show(&mut doc, PopupOptions::new().with_callback(stored_cb))
            .unwrap();
        assert!(popup.hide_with(&mut doc, || explicit_cb()).unwrap());

        assert_eq!(explicit.get(), 1);
        assert_eq!(stored.get(), 0);

        // Stored callback still applies to later hides
        popup.show(&mut doc).unwrap();
        popup.hide(&mut doc).unwrap();
        assert_eq!(stored.get(), 1);
        assert_eq!(explicit.get(), 1);
    }

    #[test]
    fn test_hide_while_hidden_is_a_no_op() {
        let mut doc = HtmlDocument::new();
        let mut other = PanelPopup::new();
        other.show(&mut doc).unwrap();

        let mut popup = PanelPopup::new();
        let (stored, stored_cb) = counter();
        let (explicit, mut explicit_cb) = counter();
        popup.configure(PopupOptions::new().with_callback(stored_cb));

        assert!(!popup.hide(&mut doc).unwrap());
        assert!(!popup.hide_with(&mut doc, || explicit_cb()).unwrap());

        assert_eq!(stored.get(), 0);
        assert_eq!(explicit.get(), 0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_one_notification_per_hide_across_cycles() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();
        let (count, callback) = counter();
        popup.configure(PopupOptions::new().with_callback(callback));

        for cycle in 1..=3 {
            popup.show(&mut doc).unwrap();
            popup.hide(&mut doc).unwrap();
            popup.hide(&mut doc).unwrap();
            assert_eq!(count.get(), cycle);
        }
    }

    #[test]
    fn test_double_show_replaces_node() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::with_content("<p>first</p>");
        let (count, callback) = counter();
        popup.configure(PopupOptions::new().with_callback(callback));

        popup.show(&mut doc).unwrap();
        popup.set_content("<p>second</p>");
        popup.show(&mut doc).unwrap();

        assert!(popup.is_visible());
        assert_eq!(doc.overlay_count(&popup.node_id()), 1);
        assert_eq!(select_text(&doc.to_html(), "p"), vec!["second"]);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_show_without_mount_point_fails_and_stays_hidden() {
        let mut doc = HtmlDocument::without_body();
        let mut popup = PanelPopup::new();

        let result = popup.show(&mut doc);
        assert!(matches!(
            result,
            Err(PopupError::Document(DocumentError::MountPointMissing))
        ));
        assert!(!popup.is_visible());
    }

    #[test]
    fn test_hide_after_external_removal_still_notifies() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();
        let (count, callback) = counter();
        popup
            .configure_and_show(&mut doc, PopupOptions::new().with_callback(callback))
            .unwrap();

        doc.remove_overlay(&popup.node_id()).unwrap();
        assert!(popup.hide(&mut doc).unwrap());
        assert!(!popup.is_visible());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_rendered_button_still_dismisses_after_option_change() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();
        let (count, callback) = counter();
        popup
            .configure_and_show(
                &mut doc,
                PopupOptions::new().with_close_button(true).with_callback(callback),
            )
            .unwrap();

        popup.configure(PopupOptions::new().with_close_button(false));
        assert!(doc.activate(&popup.button_id()));
        for event in doc.take_events() {
            assert!(popup.handle_event(&mut doc, &event).unwrap());
        }

        assert!(!popup.is_visible());
        assert!(doc.is_empty());
        assert_eq!(count.get(), 1);

        // Next show follows the new setting: no button, activation ignored
        popup.show(&mut doc).unwrap();
        assert!(doc.element_by_id(&popup.button_id()).is_none());
        let event = DocumentEvent::Activated(popup.button_id());
        assert!(!popup.handle_event(&mut doc, &event).unwrap());
        assert!(popup.is_visible());
    }

    #[test]
    fn test_close_button_activation_ignored_when_disabled() {
        let mut doc = HtmlDocument::new();
        let mut popup = PanelPopup::new();
        popup.show(&mut doc).unwrap();

        let event = DocumentEvent::Activated(popup.button_id());
        assert!(!popup.handle_event(&mut doc, &event).unwrap());
        assert!(popup.is_visible());
    }
}
