use anyhow::{anyhow, bail, Result};
use clap::Args;
use std::{
    cell::Cell,
    io::{self, Read},
    rc::Rc,
};
use tracing::{debug, info};

use panel_popup::{config::Config, document::HtmlDocument, MountPoint, PanelPopup, PopupOptions};

/// Render a popup and print the resulting document
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// HTML content of the popup; "-" reads it from stdin
    pub content: Option<String>,

    /// Popup options as a JSON object (templateKeys, closeButton, closeCaption).
    /// templateKeys values may be strings, numbers or booleans
    #[arg(short = 'o', long = "options")]
    pub options: Option<String>,

    /// Template substitution, repeatable
    #[arg(short = 'k', long = "key", value_name = "NAME=VALUE", value_parser = parse_key)]
    pub keys: Vec<(String, String)>,

    /// Render a dismiss button
    #[arg(long = "close-button")]
    pub close_button: bool,

    /// Caption of the dismiss button
    #[arg(long = "caption")]
    pub caption: Option<String>,

    /// Activate the dismiss button after rendering and print the document again
    #[arg(long = "dismiss")]
    pub dismiss: bool,
}

impl RenderCommand {
    pub fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing render command");

        let mut doc = HtmlDocument::new();
        let mut popup = config.popup();

        if let Some(content) = self.get_content()? {
            popup.set_content(content);
        }
        if let Some(json) = &self.options {
            popup.configure(PopupOptions::from_json(json)?);
        }
        popup.configure(self.flag_options(&popup));

        let dismissed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dismissed);
        popup.configure(PopupOptions::new().with_callback(move || {
            info!("Popup dismissed");
            flag.set(true);
        }));

        popup.show(&mut doc)?;
        println!("{}", doc.to_html());

        if self.dismiss {
            self.dismiss(&mut popup, &mut doc)?;
            if !dismissed.get() {
                bail!("Popup {} was not dismissed", popup.id());
            }
            println!("{}", doc.to_html());
        }

        Ok(())
    }

    /// Options set through individual flags
    fn flag_options(&self, popup: &PanelPopup) -> PopupOptions {
        let mut options = PopupOptions::new();

        if !self.keys.is_empty() {
            let mut keys = popup.template_keys().clone();
            for (name, value) in &self.keys {
                keys.insert(name.clone(), value.clone());
            }
            options = options.with_template_keys(keys);
        }
        if self.close_button {
            options = options.with_close_button(true);
        }
        if let Some(caption) = &self.caption {
            options = options.with_close_caption(caption.clone());
        }

        options
    }

    fn dismiss(&self, popup: &mut PanelPopup, doc: &mut HtmlDocument) -> Result<()> {
        if !popup.close_button() {
            bail!("--dismiss needs a dismiss button; pass --close-button");
        }

        doc.activate(&popup.button_id());
        for event in doc.take_events() {
            if !popup.handle_event(doc, &event)? {
                debug!("Unhandled document event: {:?}", event);
            }
        }
        Ok(())
    }

    fn get_content(&self) -> Result<Option<String>> {
        match self.content.as_deref() {
            Some("-") => {
                debug!("Reading content from stdin");
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
                Ok(Some(buffer.trim_end().to_string()))
            }
            Some(content) => Ok(Some(content.to_string())),
            None => Ok(None),
        }
    }
}

fn parse_key(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}
