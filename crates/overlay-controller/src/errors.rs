use dom_overlay::{NodeId, OverlayError};
use soulspell_core_types::SoulError;
use spell_model::StableId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{0} port required")]
    MissingPort(&'static str),
    #[error("no live highlight for {0}")]
    HighlightNotFound(StableId),
    #[error("no live highlight resolves to target {0:?}")]
    OwnerNotFound(NodeId),
    #[error("no displayed error matches {0}")]
    UnknownError(StableId),
    #[error("span {start}..{end} does not fit the current text")]
    StaleSpan { start: usize, end: usize },
    #[error("target {0:?} is not eligible for checking")]
    NotEligible(NodeId),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

impl From<ControllerError> for SoulError {
    fn from(err: ControllerError) -> Self {
        SoulError::new(err.to_string())
    }
}
