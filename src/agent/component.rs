//! Component writer: asks the model to write one component file.

use super::prompts;
use super::turn::{AgentTurn, ChatAgent};
use crate::inference::ChatBackend;
use crate::tools::{Capability, ToolRegistry};
use crate::types::ComponentSpec;
use std::path::Path;
use std::sync::Arc;

pub struct ComponentAgent {
    system_prompt: String,
    backend: Arc<dyn ChatBackend>,
}

impl ComponentAgent {
    pub fn new(backend: Arc<dyn ChatBackend>, template_context: &str) -> Self {
        Self {
            system_prompt: prompts::component_system_prompt(template_context),
            backend,
        }
    }

    /// Ask for one component file. Writes land under `project_path/src`.
    pub async fn create_component(&self, spec: &ComponentSpec, project_path: &Path) -> AgentTurn {
        let agent = ChatAgent::new(
            "ComponentAgent",
            self.system_prompt.as_str(),
            ToolRegistry::from_names(&[Capability::WriteReactComponent.name()], project_path),
            self.backend.clone(),
        );
        let prompt = prompts::component_prompt(spec, project_path);
        agent.execute(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::scripted::ScriptedBackend;
    use serde_json::json;

    #[tokio::test]
    async fn writes_requested_component() {
        let dir = tempfile::tempdir().unwrap();
        let args = json!({
            "file_path": "components/Hero.tsx",
            "code": "export const Hero = () => <section />;",
            "project_path": dir.path().to_string_lossy(),
        })
        .to_string();
        let backend = Arc::new(
            ScriptedBackend::new().tool_calls(&[("write_react_component", args.as_str())]),
        );
        let agent = ComponentAgent::new(backend.clone(), "");

        let turn = agent
            .create_component(&ComponentSpec::new("components/Hero.tsx", "hero banner"), dir.path())
            .await;

        assert!(turn.all_tools_succeeded());
        let written = std::fs::read_to_string(dir.path().join("src/components/Hero.tsx")).unwrap();
        assert!(written.contains("Hero"));
        assert_eq!(backend.requests()[0].tool_names, vec!["write_react_component"]);
    }

    #[tokio::test]
    async fn write_for_another_project_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let args = json!({
            "file_path": "App.tsx",
            "code": "x",
            "project_path": elsewhere.path().to_string_lossy(),
        })
        .to_string();
        let backend = Arc::new(
            ScriptedBackend::new().tool_calls(&[("write_react_component", args.as_str())]),
        );
        let agent = ComponentAgent::new(backend, "");

        let turn = agent
            .create_component(&ComponentSpec::new("App.tsx", "root"), dir.path())
            .await;

        assert!(!turn.all_tools_succeeded());
        assert!(!elsewhere.path().join("src/App.tsx").exists());
    }

    #[tokio::test]
    async fn text_only_answer_produces_no_results() {
        let backend = Arc::new(ScriptedBackend::new().text("I cannot do that."));
        let agent = ComponentAgent::new(backend, "");
        let turn = agent
            .create_component(&ComponentSpec::new("App.tsx", "root"), Path::new("."))
            .await;
        assert!(turn.tool_results().is_empty());
        assert!(!turn.all_tools_succeeded());
    }
}
