//! External program execution.

pub mod command;

pub use command::{
    is_executable, is_not_found, run_program, split_command, CommandOptions, CommandResult,
};
