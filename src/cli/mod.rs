//! Command-line interface for jits.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, EvalArgs, PlanArgs, RunArgs, TraceArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
