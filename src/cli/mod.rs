//! CLI module for the focus timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `app`: The foreground countdown that ties the manager to storage and notification

pub mod app;
pub mod commands;
pub mod display;

pub use app::{run_countdown, RunOptions, RunOutcome};
pub use commands::{Cli, Commands, PrefsArgs, RunArgs};
pub use display::Display;
