//! Planner: turns a build request into a [`Plan`].

use super::prompts;
use super::turn::{AgentTurn, ChatAgent};
use crate::error::PlanError;
use crate::inference::ChatBackend;
use crate::tools::ToolRegistry;
use crate::types::Plan;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Plan fields some models serialize as `{"0": .., "1": ..}` instead of a list.
const LIST_FIELDS: &[&str] = &["npm_dependencies", "shadcn_dependencies", "components"];

pub struct PlannerAgent {
    agent: ChatAgent,
}

impl PlannerAgent {
    pub fn new(backend: Arc<dyn ChatBackend>, template_context: &str) -> Self {
        Self {
            agent: ChatAgent::new(
                "PlannerAgent",
                prompts::planner_system_prompt(template_context),
                ToolRegistry::empty(),
                backend,
            ),
        }
    }

    /// Ask the model for a plan and parse it.
    pub async fn create_plan(&self, context: &str) -> Result<Plan, PlanError> {
        let raw = match self.agent.execute(context).await {
            AgentTurn::Text(text) => text,
            AgentTurn::Unavailable(e) => return Err(PlanError::Unavailable(e.to_string())),
            AgentTurn::ToolResults(_) => {
                return Err(PlanError::Unavailable(
                    "planner answered with tool calls instead of JSON".into(),
                ))
            }
        };

        match parse_plan(&raw) {
            Ok(plan) => {
                info!(
                    "Plan '{}': {} npm, {} shadcn, {} components",
                    plan.codename,
                    plan.npm_dependencies.len(),
                    plan.shadcn_dependencies.len(),
                    plan.components.len()
                );
                Ok(plan)
            }
            Err(e) => {
                error!("Planner failed to produce a valid plan: {}\n{}", e, raw);
                Err(e)
            }
        }
    }
}

/// Drop a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Turn index-keyed maps in the list fields back into arrays, keeping the
/// map's own order. Already-array fields are left alone.
pub fn normalize_plan_lists(plan: &mut Value) {
    let Some(obj) = plan.as_object_mut() else {
        return;
    };
    for field in LIST_FIELDS {
        if let Some(value) = obj.get_mut(*field) {
            if let Value::Object(map) = value {
                let items = std::mem::take(map).into_iter().map(|(_, v)| v).collect();
                *value = Value::Array(items);
            }
        }
    }
}

/// Parse raw planner output into a validated plan.
pub fn parse_plan(raw: &str) -> Result<Plan, PlanError> {
    let malformed = |reason: String| PlanError::Malformed {
        raw: raw.to_string(),
        reason,
    };

    let mut value: Value =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("expected a JSON object".into()));
    }
    normalize_plan_lists(&mut value);

    let plan: Plan = serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
    plan.validate().map_err(|reason| PlanError::Invalid {
        raw: raw.to_string(),
        reason,
    })?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use crate::inference::scripted::ScriptedBackend;
    use crate::types::ComponentSpec;
    use serde_json::json;

    #[test]
    fn fenced_plan_is_parsed() {
        let plan = parse_plan("```json\n{\"codename\":\"x\",\"components\":[]}\n```").unwrap();
        assert_eq!(plan.codename, "x");
        assert!(plan.components.is_empty());
        assert!(plan.npm_dependencies.is_empty());
        assert!(plan.shadcn_dependencies.is_empty());
    }

    #[test]
    fn bare_fence_is_stripped() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }

    #[test]
    fn index_keyed_maps_become_lists_in_order() {
        let mut value = json!({
            "codename": "cozy_otter",
            "npm_dependencies": {"1": "b", "0": "a", "2": "c"},
            "shadcn_dependencies": ["button"],
            "components": {"0": {"file_path": "App.tsx", "description": "root"}}
        });
        normalize_plan_lists(&mut value);
        assert_eq!(value["npm_dependencies"], json!(["b", "a", "c"]));
        assert_eq!(value["shadcn_dependencies"], json!(["button"]));

        let snapshot = value.clone();
        normalize_plan_lists(&mut value);
        assert_eq!(value, snapshot);

        let plan: Plan = serde_json::from_value(value).unwrap();
        assert_eq!(plan.components, vec![ComponentSpec::new("App.tsx", "root")]);
    }

    #[test]
    fn invalid_json_keeps_raw_text() {
        let err = parse_plan("Sure! Here is your plan:").unwrap_err();
        assert_eq!(err.raw(), Some("Sure! Here is your plan:"));
        assert!(matches!(err, PlanError::Malformed { .. }));
    }

    #[test]
    fn missing_codename_is_rejected() {
        let err = parse_plan(r#"{"components": []}"#).unwrap_err();
        assert!(matches!(err, PlanError::Malformed { ref reason, .. } if reason.contains("codename")));
    }

    #[test]
    fn null_dependency_lists_are_accepted() {
        let plan = parse_plan(
            r#"{"codename": "x", "npm_dependencies": null, "shadcn_dependencies": ["card"], "components": []}"#,
        )
        .unwrap();
        assert!(plan.npm_dependencies.is_empty());
        assert_eq!(plan.shadcn_dependencies, vec!["card"]);
    }

    #[test]
    fn bad_component_entry_does_not_sink_the_plan() {
        let plan = parse_plan(
            r#"{"codename": "x", "components": [{"file_path": "App.tsx"}, {"file_path": 5}]}"#,
        )
        .unwrap();
        assert_eq!(plan.components.len(), 2);
        assert_eq!(plan.components[0].path(), Some("App.tsx"));
        assert_eq!(plan.components[1].path(), None);
    }

    #[test]
    fn missing_components_is_rejected() {
        assert!(parse_plan(r#"{"codename": "x"}"#).is_err());
    }

    #[test]
    fn unsafe_codename_is_rejected() {
        let err = parse_plan(r#"{"codename": "../etc", "components": []}"#).unwrap_err();
        assert!(matches!(err, PlanError::Invalid { .. }));
    }

    #[tokio::test]
    async fn create_plan_reports_unavailable_backend() {
        let backend = Arc::new(ScriptedBackend::new().failure(InferenceError::EmptyChoices));
        let planner = PlannerAgent::new(backend, "");
        let err = planner.create_plan("anything").await.unwrap_err();
        assert!(matches!(err, PlanError::Unavailable(_)));
    }

    #[tokio::test]
    async fn create_plan_sends_no_tools() {
        let backend = Arc::new(
            ScriptedBackend::new().text(r#"{"codename": "quiet_fox", "components": []}"#),
        );
        let planner = PlannerAgent::new(backend.clone(), "conventions");
        let plan = planner.create_plan("build me a blog").await.unwrap();

        assert_eq!(plan.codename, "quiet_fox");
        let req = &backend.requests()[0];
        assert!(req.tool_names.is_empty());
        assert!(req.messages[0].content.contains("conventions"));
    }
}
