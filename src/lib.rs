//! Modal "please wait" overlays for HTML host panels.
//!
//! ```
//! use panel_popup::{document::HtmlDocument, PanelPopup, PopupOptions};
//!
//! let mut doc = HtmlDocument::new();
//! let mut popup = PanelPopup::with_content("<p>Exporting {count} layers</p>");
//! popup
//!     .configure_and_show(&mut doc, PopupOptions::new().with_template_key("count", "12"))
//!     .unwrap();
//! assert!(doc.to_html().contains("Exporting 12 layers"));
//!
//! popup.hide(&mut doc).unwrap();
//! assert!(doc.is_empty());
//! ```

pub mod config;
pub mod document;
pub mod popup;

pub use document::{DocumentError, DocumentEvent, MountPoint};
pub use popup::{PanelPopup, PopupError, PopupId, PopupOptions, PopupResult, TemplateKeys};
