use std::path::{Path, PathBuf};
use std::sync::Arc;

use extensions_bridge::MessageChannel;
use overlay_controller::{SpellController, SpellControllerBuilder};

use super::output::OutputFormat;
use crate::config::Config;
use crate::errors::CliError;

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Fresh page controller wired to `channel` with the configured policy.
    pub fn controller(&self, channel: Arc<dyn MessageChannel>) -> Result<SpellController, CliError> {
        let controller = SpellControllerBuilder::new(self.config.interaction.clone())
            .with_channel(channel)
            .with_cache_policy(self.config.cache.clone())
            .with_classifier(self.config.classifier())
            .build()?;
        Ok(controller)
    }
}
