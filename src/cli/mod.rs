//! Command-line interface components
//!
//! This module contains CLI-specific code for the AudioVault Fetcher
//! application, including argument parsing, command handlers and the
//! terminal prompt.

pub mod args;
pub mod commands;
pub mod prompt;

pub use args::{Cli, Commands, ConfigAction, ConfigArgs, GlobalArgs, ReportArgs, SearchArgs};
pub use commands::{
    apply_search_overrides, handle_config, handle_report, handle_search, run_search_workflow,
    WorkflowPaths,
};
pub use prompt::ConsolePrompt;
