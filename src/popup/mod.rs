//! "Please wait" overlay popups
//!
//! A [`PanelPopup`] renders its HTML content (with `{key}` placeholders
//! substituted from its [`TemplateKeys`]) into a modal overlay, attaches it
//! to a [`MountPoint`](crate::document::MountPoint) and later removes it
//! again, firing a hide notification.

pub mod controller;
pub mod template;
pub mod types;

pub use controller::PanelPopup;
pub use template::TemplateKeys;
pub use types::*;
