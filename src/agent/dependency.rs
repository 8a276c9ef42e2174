//! Dependency installer: asks the model to run one install command.

use super::prompts;
use super::turn::{AgentTurn, ChatAgent};
use crate::inference::ChatBackend;
use crate::tools::{Capability, ToolRegistry};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Which package source a dependency list targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    Npm,
    Shadcn,
}

impl InstallKind {
    /// Instruction telling the model which command shape to produce.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Npm => {
                "Please install the following npm packages by creating a single `pnpm add` command."
            }
            Self::Shadcn => {
                "Please add the following shadcn-ui components by creating a single \
                 `pnpm dlx shadcn-ui@latest add ... --y --overwrite` command."
            }
        }
    }
}

impl fmt::Display for InstallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Npm => write!(f, "NPM"),
            Self::Shadcn => write!(f, "ShadCN"),
        }
    }
}

pub struct DependencyAgent {
    backend: Arc<dyn ChatBackend>,
}

impl DependencyAgent {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Ask for one install command. The shell tool runs inside
    /// `project_path` whatever directory the model names.
    pub async fn install(
        &self,
        dependencies: &[String],
        project_path: &Path,
        instruction: &str,
    ) -> AgentTurn {
        let agent = ChatAgent::new(
            "DependencyAgent",
            prompts::DEPENDENCY_SYSTEM_PROMPT,
            ToolRegistry::from_names(&[Capability::ExecuteShellCommand.name()], project_path),
            self.backend.clone(),
        );
        let prompt = prompts::install_prompt(dependencies, project_path, instruction);
        agent.execute(&prompt).await
    }
}
