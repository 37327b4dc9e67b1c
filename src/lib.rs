//! jits - dependency-ordered prompt orchestration.
//!
//! A spec file declares named steps, each with a prompt, and ordering
//! constraints between them. jits schedules the steps, sends each prompt to
//! a generation backend (a chat-completions API or a human at the
//! terminal), and feeds earlier outputs into the prompts of later steps.
//!
//! # Modules
//!
//! - [`spec`] - Spec file loading, parsing, and validation
//! - [`graph`] - Dependency graph and topological scheduling
//! - [`context`] - Prompt assembly from dependency outputs
//! - [`backend`] - Automated and manual response sources
//! - [`steps`] - Step execution, run logs, and artifacts
//! - [`runner`] - Run orchestration
//! - [`evaluation`] - Per-step test scripts
//! - [`shell`] - External program execution
//! - [`cli`] - Command-line interface and argument parsing
//! - [`ui`] - Terminal output, spinners, and progress rendering
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use jits::graph::{build_graph, schedule};
//! use jits::spec::parse_spec;
//! use std::path::Path;
//!
//! let yaml = r#"
//! prompts:
//!   counter: { title: Count, prompt: "Count words" }
//!   reader: { title: Read, prompt: "Read a file" }
//! flow:
//!   - id: counter
//!     after: [reader]
//! "#;
//! let spec = parse_spec(yaml, Path::new("spec.yml")).unwrap();
//! let graph = build_graph(&spec.prompts, &spec.flow).unwrap();
//! let order = schedule(&graph).unwrap();
//! assert_eq!(order.as_slice(), &["reader", "counter"]);
//! ```

pub mod backend;
pub mod cli;
pub mod context;
pub mod error;
pub mod evaluation;
pub mod graph;
pub mod runner;
pub mod shell;
pub mod spec;
pub mod steps;
pub mod ui;

pub use error::{JitsError, Result};
