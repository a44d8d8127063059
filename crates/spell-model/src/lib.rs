//! Error model for remote spell-check results.
//!
//! A check produces a [`CheckResult`] holding [`SpellError`]s whose offsets
//! index into the exact text that was submitted. The parser is lenient by
//! contract and the cache is a small FIFO keyed by that text.

pub mod cache;
pub mod model;
pub mod parser;

pub use cache::{CacheKey, CachePolicy, ResultCache};
pub use model::{CheckResult, CorrectionCategory, SpellError, StableId};
pub use parser::{parse_response, ResponseParser, NO_ERROR_PHRASE};
