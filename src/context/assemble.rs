//! Prompt assembly.
//!
//! Everything here is a pure function of its inputs: a base prompt plus the
//! ordered context gathered from dependencies produce the final prompt text.

use crate::steps::ArtifactMap;

use super::strategy::{Flavor, IntegrationStrategy, Language};

/// Lead-in for inline reference code.
pub const INLINE_PREAMBLE: &str = "Use the following code as reference:";

/// Lead-in for synthetic imports.
pub const MODULE_PREAMBLE: &str =
    "Use the following module imports for previously defined functions:";

/// Directive appended to every base prompt in the code flavor.
pub const CODE_ONLY_DIRECTIVE: &str = "Respond with source code only. \
Do not include explanations, commentary, or markdown code fences.";

/// Output of one dependency, labeled with its step id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    pub label: String,
    pub body: String,
}

impl ContextBlock {
    /// Render as `# from {label}` followed by the body.
    pub fn render(&self) -> String {
        format!("# from {}\n{}", self.label, self.body)
    }
}

/// Context prepended to a base prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContext {
    /// Reference code blocks, separated by blank lines.
    Reference(Vec<ContextBlock>),
    /// Import statements, one per line.
    Imports(Vec<String>),
}

/// Build reference blocks for the dependencies that have an artifact.
///
/// Dependencies without a recorded artifact are left out.
pub fn reference_blocks(dependency_ids: &[String], artifacts: &ArtifactMap) -> Vec<ContextBlock> {
    dependency_ids
        .iter()
        .filter_map(|id| {
            artifacts.get(id).map(|artifact| ContextBlock {
                label: id.clone(),
                body: artifact.text.trim().to_string(),
            })
        })
        .collect()
}

/// Build one import statement per dependency, whether or not it produced a
/// module.
pub fn import_lines(dependency_ids: &[String], language: Language) -> Vec<String> {
    dependency_ids
        .iter()
        .map(|id| language.import_statement(id))
        .collect()
}

/// Prefix `base` with `context` inside a fenced block.
///
/// Reference context with no blocks leaves the prompt untouched. Imports are
/// always emitted, so a root step under the module strategy still gets the
/// preamble and an empty fenced block.
pub fn compose_prompt(base: &str, context: &PromptContext, language: Language) -> String {
    let (preamble, body) = match context {
        PromptContext::Reference(blocks) if !blocks.is_empty() => (
            INLINE_PREAMBLE,
            blocks
                .iter()
                .map(ContextBlock::render)
                .collect::<Vec<_>>()
                .join("\n\n"),
        ),
        PromptContext::Imports(lines) => (MODULE_PREAMBLE, lines.join("\n")),
        PromptContext::Reference(_) => return base.to_string(),
    };

    format!(
        "{}\n\n```{}\n{}\n```\n\n{}",
        preamble,
        language.fence_tag(),
        body,
        base
    )
}

/// Append the flavor's directive, if any, to a base prompt.
pub fn apply_flavor(base: &str, flavor: Flavor) -> String {
    match flavor {
        Flavor::Freeform => base.to_string(),
        Flavor::Code => format!("{}\n\n{}", base, CODE_ONLY_DIRECTIVE),
    }
}

/// Turns step prompts into final prompts for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    pub strategy: IntegrationStrategy,
    pub flavor: Flavor,
    pub language: Language,
}

impl Assembler {
    /// Create an assembler.
    pub fn new(strategy: IntegrationStrategy, flavor: Flavor, language: Language) -> Self {
        Self {
            strategy,
            flavor,
            language,
        }
    }

    /// Gather the context for `dependency_ids`.
    pub fn context(&self, dependency_ids: &[String], artifacts: &ArtifactMap) -> PromptContext {
        match self.strategy {
            IntegrationStrategy::Inline => {
                PromptContext::Reference(reference_blocks(dependency_ids, artifacts))
            }
            IntegrationStrategy::Module => {
                PromptContext::Imports(import_lines(dependency_ids, self.language))
            }
        }
    }

    /// Build the final prompt for a step.
    pub fn assemble(
        &self,
        prompt: &str,
        dependency_ids: &[String],
        artifacts: &ArtifactMap,
    ) -> String {
        let base = apply_flavor(prompt, self.flavor);
        let context = self.context(dependency_ids, artifacts);
        compose_prompt(&base, &context, self.language)
    }
}
