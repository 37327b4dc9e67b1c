//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Default root for run outputs.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// jits - dependency-ordered prompt orchestration.
#[derive(Debug, Parser)]
#[command(name = "jits")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute every step of a spec in dependency order
    Run(RunArgs),

    /// Show the execution order without running anything
    Plan(PlanArgs),

    /// Print the step logs of a previous run
    Trace(TraceArgs),

    /// Run the evaluation scripts declared by the spec
    Eval(EvalArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Path to the spec file
    pub spec: PathBuf,

    /// Generate responses with the model backend
    #[arg(long)]
    pub auto: bool,

    /// Enter each response by hand
    #[arg(long)]
    pub manual: bool,

    /// Root directory for run outputs
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Skip specified steps, reusing earlier responses (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Override the response flavor (freeform or code)
    #[arg(long)]
    pub flavor: Option<String>,

    /// Override the model
    #[arg(long)]
    pub model: Option<String>,

    /// API key for the model backend
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Path to the spec file
    pub spec: PathBuf,
}

/// Arguments for the `trace` command.
#[derive(Debug, Clone, clap::Args)]
pub struct TraceArgs {
    /// Path to the spec file
    pub spec: PathBuf,

    /// Root directory for run outputs
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

/// Arguments for the `eval` command.
#[derive(Debug, Clone, clap::Args)]
pub struct EvalArgs {
    /// Path to the spec file
    pub spec: PathBuf,

    /// Root directory for run outputs
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_skip_list() {
        let cli = Cli::parse_from(["jits", "run", "spec.yml", "--manual", "--skip", "a,b"]);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.manual);
                assert!(!args.auto);
                assert_eq!(args.skip, ["a", "b"]);
                assert_eq!(args.output_dir, PathBuf::from("outputs"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["jits", "plan", "spec.yml", "--quiet", "--no-color"]);
        assert!(cli.quiet);
        assert!(cli.no_color);
    }
}
