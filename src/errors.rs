//! Error handling module

use std::path::PathBuf;

use dom_overlay::NodeId;
use extensions_bridge::BridgeError;
use overlay_controller::ControllerError;
use soulspell_core_types::SoulError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no data directory available; set `state_file` in the config")]
    NoStateDir,
    #[error("nothing to check: text is empty")]
    EmptyText,
    #[error("node {0:?} is not an editable target")]
    NotEditable(NodeId),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{action} rejected: {reason}")]
    Rejected { action: &'static str, reason: String },
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl From<CliError> for SoulError {
    fn from(err: CliError) -> Self {
        SoulError::new(err.to_string())
    }
}
