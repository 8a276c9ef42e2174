pub mod files;
pub mod scanner;
pub mod shell;
pub mod traits;

pub use files::{write_component, WriteComponentTool};
pub use scanner::read_directory_structure;
pub use shell::{run_shell, shell_quote, ShellOutput, ShellTool};
pub use traits::{Tool, ToolDefinition};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// The fixed set of capabilities an agent can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ExecuteShellCommand,
    WriteReactComponent,
}

impl Capability {
    /// Resolve a capability by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            shell::SHELL_TOOL_NAME => Some(Self::ExecuteShellCommand),
            files::WRITE_TOOL_NAME => Some(Self::WriteReactComponent),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ExecuteShellCommand => shell::SHELL_TOOL_NAME,
            Self::WriteReactComponent => files::WRITE_TOOL_NAME,
        }
    }

    /// Instantiate the capability, confined to `project_root`.
    fn build(self, project_root: &Path) -> Arc<dyn Tool> {
        match self {
            Self::ExecuteShellCommand => Arc::new(ShellTool::new(project_root)),
            Self::WriteReactComponent => Arc::new(WriteComponentTool::new(project_root)),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name → tool mapping plus the ordered schema list advertised to the model.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Registry with no tools; requests to the model omit the tools field.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from requested capability names, every tool bound to
    /// `project_root`. Unknown names are skipped.
    pub fn from_names(names: &[&str], project_root: &Path) -> Self {
        let tools = names
            .iter()
            .filter_map(|name| match Capability::from_name(name) {
                Some(cap) => Some(cap.build(project_root)),
                None => {
                    debug!("Ignoring unknown capability '{}'", name);
                    None
                }
            })
            .collect();
        Self::with_tools(tools)
    }

    /// Build from arbitrary tool objects. A later duplicate name replaces
    /// the earlier entry in lookups but both stay advertised.
    pub fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let index = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name().to_string(), i))
            .collect();
        Self { tools, index }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Schemas in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|t| t.name()))
            .finish()
    }
}
