//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`].

pub mod completions;
pub mod dispatcher;
pub mod eval;
pub mod plan;
pub mod run;
pub mod trace;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
