use clap::Subcommand;

use super::check::CheckArgs;
use super::demo::DemoArgs;
use super::key::KeyArgs;
use super::toggle::ToggleArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Check a piece of text against the speller
    Check(CheckArgs),

    /// Render highlights on a built-in sample page and print its DOM
    Demo(DemoArgs),

    /// Manage the stored API key
    Key(KeyArgs),

    /// Turn checking on or off
    Toggle(ToggleArgs),

    /// Show configuration and setup state
    Info,
}
