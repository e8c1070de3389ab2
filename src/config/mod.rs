use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::popup::{PanelPopup, PopupOptions, TemplateKeys, DEFAULT_CLOSE_CAPTION};

/// Defaults applied to popups created by the application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Content used instead of the built-in "Working" message
    pub default_content: Option<String>,

    /// Whether popups get a dismiss button
    pub close_button: bool,

    /// Caption of the dismiss button
    pub close_caption: String,

    /// Substitutions every popup starts with
    #[serde(deserialize_with = "deserialize_template_keys")]
    pub template_keys: BTreeMap<String, String>,
}

/// Accept the same scalar values popup options do
fn deserialize_template_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let keys = TemplateKeys::deserialize(deserializer)?;
    Ok(keys
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_content: None,
            close_button: false,
            close_caption: DEFAULT_CLOSE_CAPTION.to_string(),
            template_keys: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Initialize configuration from files and the environment
    pub fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = Self::default();

        if let Some(file_config) = Self::load_from_file()? {
            config.merge_with(file_config);
        }

        // Environment wins over files
        config.load_from_env();

        config.validate()?;
        Ok(config)
    }

    /// Candidate configuration files, highest priority first
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.panel-popup.json"),
            PathBuf::from("./panel-popup.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("panel-popup").join("panel-popup.json"));
        }

        paths
    }

    /// Load the first configuration file that exists
    pub fn load_from_file() -> Result<Option<Self>> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from_path(&path).map(Some);
            }
        }

        debug!("No configuration file found");
        Ok(None)
    }

    /// Load configuration from a JSON file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid configuration in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(content) = var("PANEL_POPUP_CONTENT") {
            self.default_content = Some(content);
        }

        if let Some(close_button) = var("PANEL_POPUP_CLOSE_BUTTON") {
            self.close_button = matches!(close_button.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Some(caption) = var("PANEL_POPUP_CLOSE_CAPTION") {
            self.close_caption = caption;
        }
    }

    /// Merge another configuration into this one
    pub fn merge_with(&mut self, other: Self) {
        if other.default_content.is_some() {
            self.default_content = other.default_content;
        }
        if other.close_button {
            self.close_button = true;
        }
        if other.close_caption != DEFAULT_CLOSE_CAPTION {
            self.close_caption = other.close_caption;
        }
        if !other.template_keys.is_empty() {
            self.template_keys.extend(other.template_keys);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.close_button && self.close_caption.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "closeCaption must not be empty when closeButton is enabled"
            ));
        }

        Ok(())
    }

    /// Options equivalent to this configuration
    pub fn popup_options(&self) -> PopupOptions {
        PopupOptions::new()
            .with_template_keys(self.template_keys.clone())
            .with_close_button(self.close_button)
            .with_close_caption(self.close_caption.clone())
    }

    /// Create a popup seeded with these defaults
    pub fn popup(&self) -> PanelPopup {
        let mut popup = match &self.default_content {
            Some(content) => PanelPopup::with_content(content.clone()),
            None => PanelPopup::new(),
        };
        popup.configure(self.popup_options());
        popup
    }
}
