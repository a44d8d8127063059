//! SoulSpell library
//!
//! Exposes the configuration, page session driver and CLI commands for
//! integration testing.

pub mod cli;
pub mod config;
pub mod errors;
pub mod sample;
pub mod session;

pub use config::Config;
pub use errors::CliError;
pub use session::PageSession;
