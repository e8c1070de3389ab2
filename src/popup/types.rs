//! Core popup types
//!
//! Identifiers, the options merged into a popup, and popup errors.

use super::template::TemplateKeys;
use crate::document::DocumentError;
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Content shown when a popup is created without any
pub const DEFAULT_CONTENT: &str = "<h2>Working</h2><p>This may take a while for large projects</p>";

/// Caption of the dismiss button unless configured otherwise
pub const DEFAULT_CLOSE_CAPTION: &str = "Close";

/// Style hooks an external stylesheet may target
pub mod classes {
    /// Outer node attached to the body
    pub const WAITING: &str = "ppopup-waiting";
    /// Full-viewport backdrop
    pub const OVERLAY: &str = "ppopup-overlay";
    /// Centered box holding the rendered content
    pub const CONTAINER: &str = "ppopup-container";
    /// Wrapper around the dismiss button
    pub const BUTTON: &str = "ppopup-button";
}

/// Unique identifier namespacing a popup's DOM nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PopupId(String);

impl PopupId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the top-level overlay node
    pub fn node_id(&self) -> String {
        format!("ppopup-{}", self.0)
    }

    /// Id of the dismiss button wrapper
    pub fn button_id(&self) -> String {
        format!("popup-button-{}", self.0)
    }
}

impl std::fmt::Display for PopupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification fired after a popup has been hidden
pub type HideCallback = Box<dyn FnMut()>;

/// Partial popup configuration.
///
/// Every field is optional; [`PanelPopup::configure`](super::PanelPopup::configure)
/// only overwrites what is present. Deserializes from the camelCase JSON
/// shape (`templateKeys`, `closeButton`, `closeCaption`).
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupOptions {
    /// Replaces the whole substitution table
    pub template_keys: Option<TemplateKeys>,
    /// Whether to render a dismiss button
    pub close_button: Option<bool>,
    /// Caption of the dismiss button
    pub close_caption: Option<String>,
    /// Stored hide notification
    #[serde(skip)]
    pub callback: Option<HideCallback>,
    /// Keys that are not popup options
    #[serde(flatten)]
    pub(crate) unrecognized: BTreeMap<String, serde_json::Value>,
}

impl PopupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object
    pub fn from_json(json: &str) -> PopupResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_template_keys(mut self, keys: impl Into<TemplateKeys>) -> Self {
        self.template_keys = Some(keys.into());
        self
    }

    /// Add one substitution, starting a new table if none is set yet
    pub fn with_template_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_keys
            .get_or_insert_with(TemplateKeys::new)
            .insert(key, value);
        self
    }

    pub fn with_close_button(mut self, close_button: bool) -> Self {
        self.close_button = Some(close_button);
        self
    }

    pub fn with_close_caption(mut self, caption: impl Into<String>) -> Self {
        self.close_caption = Some(caption.into());
        self
    }

    pub fn with_callback(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Names of keys that were supplied but are not popup options
    pub fn unrecognized_keys(&self) -> impl Iterator<Item = &str> {
        self.unrecognized.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for PopupOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupOptions")
            .field("template_keys", &self.template_keys)
            .field("close_button", &self.close_button)
            .field("close_caption", &self.close_caption)
            .field("callback", &self.callback.as_ref().map(|_| "<callback>"))
            .field("unrecognized", &self.unrecognized)
            .finish()
    }
}

/// Result type for popup operations
pub type PopupResult<T> = std::result::Result<T, PopupError>;

/// Popup-specific error types
#[derive(Debug, thiserror::Error)]
pub enum PopupError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Failed to compile template keys: {0}")]
    Template(#[from] regex::Error),

    #[error("Invalid popup options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_namespaced() {
        let a = PopupId::generate();
        let b = PopupId::generate();

        assert_ne!(a, b);
        assert_eq!(a.node_id(), format!("ppopup-{a}"));
        assert_eq!(a.button_id(), format!("popup-button-{a}"));
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_options_parse_from_json() {
        let options = PopupOptions::from_json(
            r#"{"templateKeys": {"state": "enabled"}, "closeButton": true, "closeCaption": "OK"}"#,
        )
        .unwrap();

        assert_eq!(options.close_button, Some(true));
        assert_eq!(options.close_caption.as_deref(), Some("OK"));
        assert_eq!(
            options.template_keys.as_ref().and_then(|keys| keys.get("state")),
            Some("enabled")
        );
        assert_eq!(options.unrecognized_keys().count(), 0);
    }

    #[test]
    fn test_numeric_template_values_parse() {
        let options = PopupOptions::from_json(r#"{"templateKeys": {"delay": 3}}"#).unwrap();
        assert_eq!(
            options.template_keys.as_ref().and_then(|keys| keys.get("delay")),
            Some("3")
        );
    }

    #[test]
    fn test_unknown_json_keys_are_collected() {
        let options = PopupOptions::from_json(r#"{"callback": "f", "zIndex": 5}"#).unwrap();

        assert!(options.callback.is_none());
        assert_eq!(options.unrecognized_keys().collect::<Vec<_>>(), vec!["callback", "zIndex"]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let result = PopupOptions::from_json(r#"{"closeButton": "yes"}"#);
        assert!(matches!(result, Err(PopupError::InvalidOptions(_))));
    }

    #[test]
    fn test_with_template_key_accumulates() {
        let options = PopupOptions::new()
            .with_template_key("a", "1")
            .with_template_key("b", "2");

        let keys = options.template_keys.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.get("b"), Some("2"));
    }
}
