//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod config;
mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use validate::handle_validate;
