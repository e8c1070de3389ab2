use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::render::RenderCommand;
use panel_popup::config::Config;

/// Render "please wait" overlay popups for HTML panels
#[derive(Parser)]
#[command(
    name = "panel-popup",
    version,
    about = "Render \"please wait\" overlay popups for HTML panels",
    long_about = r#"Builds the overlay markup a popup attaches to its panel and prints it.

Examples:
  panel-popup render                                   # Default "Working" popup
  panel-popup render "<p>{n} files</p>" --key n=12      # Template substitution
  panel-popup render --close-button --caption Dismiss  # With a dismiss button
  echo "<p>Busy</p>" | panel-popup render -            # Content from stdin"#
)]
pub struct Cli {
    /// Current working directory
    #[arg(short = 'c', long = "cwd", global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a popup and print the resulting document
    Render(RenderCommand),
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        // Change working directory if specified
        if let Some(cwd) = &self.cwd {
            std::env::set_current_dir(cwd)
                .map_err(|e| anyhow::anyhow!("Failed to change directory to {}: {}", cwd.display(), e))?;
            info!("Changed working directory to: {}", cwd.display());
        }

        let config = Config::init()?;
        debug!("Configuration initialized");

        match self.command {
            Commands::Render(render_cmd) => render_cmd.execute(&config),
        }
    }
}
