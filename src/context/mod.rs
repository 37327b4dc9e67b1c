//! Context assembly for dependent steps.
//!
//! A step's final prompt is its own prompt text plus whatever its declared
//! dependencies contributed, merged according to the run's
//! [`IntegrationStrategy`]:
//!
//! - [`IntegrationStrategy::Inline`] pastes dependency outputs as labeled
//!   reference blocks
//! - [`IntegrationStrategy::Module`] adds one synthetic import per dependency
//!
//! # Example
//!
//! ```
//! use jits::context::Assembler;
//! use jits::steps::{ArtifactMap, StepArtifact};
//!
//! let mut artifacts = ArtifactMap::new();
//! artifacts.insert("a".to_string(), StepArtifact::new("X=1"));
//!
//! let prompt = Assembler::default().assemble("print(X)", &["a".to_string()], &artifacts);
//! assert!(prompt.contains("# from a\nX=1"));
//! assert!(prompt.ends_with("print(X)"));
//! ```

pub mod assemble;
pub mod strategy;

pub use assemble::{
    apply_flavor, compose_prompt, import_lines, reference_blocks, Assembler, ContextBlock,
    PromptContext, CODE_ONLY_DIRECTIVE, INLINE_PREAMBLE, MODULE_PREAMBLE,
};
pub use strategy::{Flavor, IntegrationStrategy, Language};
