//! Shared types used across the scaffolder.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Build state machine
// ---------------------------------------------------------------------------

/// Phases the coordinator moves through during one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    /// Nothing has happened yet.
    Idle,
    /// Waiting on the planner for a build plan.
    Planning,
    /// Cloning the template and installing base dependencies.
    Initializing,
    /// Expanding the plan into the task queue.
    Queueing,
    /// Working through queued tasks one at a time.
    Draining,
    /// Starting the preview server.
    Finalizing,
    /// All phases ran.
    Complete,
    /// Planning or initialization failed; nothing further runs.
    Halted,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Planning => write!(f, "planning"),
            Self::Initializing => write!(f, "initializing"),
            Self::Queueing => write!(f, "queueing"),
            Self::Draining => write!(f, "draining"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Complete => write!(f, "complete"),
            Self::Halted => write!(f, "halted"),
        }
    }
}

impl Default for BuildPhase {
    fn default() -> Self {
        Self::Idle
    }
}

// ---------------------------------------------------------------------------
// Inference types
// ---------------------------------------------------------------------------

/// A chat message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// A tool call requested by the model.
///
/// `arguments` is the raw JSON-encoded string from the wire; decoding it is
/// the dispatcher's job so a malformed payload fails only that call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Outcome of dispatching one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub output: String,
    pub success: bool,
}

/// First choice of a chat completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Structured build specification produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Project identifier; also the project directory name.
    pub codename: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub npm_dependencies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shadcn_dependencies: Vec<String>,
    pub components: Vec<ComponentSpec>,
}

/// An explicit `null` list means no entries.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Plan {
    /// Check that the codename can be used as a single directory name.
    pub fn validate(&self) -> Result<(), String> {
        if !is_filesystem_safe(&self.codename) {
            return Err(format!(
                "codename '{}' is not a filesystem-safe identifier",
                self.codename
            ));
        }
        Ok(())
    }
}

fn is_filesystem_safe(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// One component the component writer should produce.
///
/// Decoding never fails: a field that is absent or not a string reads as
/// `None`. A missing `file_path` makes the task unusable (it is skipped
/// while draining); a missing description is synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl<'de> Deserialize<'de> for ComponentSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Ok(Self {
            file_path: text("file_path"),
            description: text("description"),
        })
    }
}

impl ComponentSpec {
    pub fn new(file_path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            description: Some(description.into()),
        }
    }

    /// The file path if present and non-blank.
    pub fn path(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn description_or_default(&self) -> String {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => format!(
                "Create a component for {}.",
                self.path().unwrap_or("unknown")
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// One unit of queued build work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Task {
    NpmDependencies(Vec<String>),
    ShadcnDependencies(Vec<String>),
    Component(ComponentSpec),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::NpmDependencies(_) => TaskKind::NpmDependencies,
            Self::ShadcnDependencies(_) => TaskKind::ShadcnDependencies,
            Self::Component(_) => TaskKind::Component,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    NpmDependencies,
    ShadcnDependencies,
    Component,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NpmDependencies => write!(f, "npm_dependencies"),
            Self::ShadcnDependencies => write!(f, "shadcn_dependencies"),
            Self::Component => write!(f, "component"),
        }
    }
}

// ---------------------------------------------------------------------------
// Operator surface
// ---------------------------------------------------------------------------

/// Severity of an operator-facing log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_with_type_and_payload() {
        let task = Task::NpmDependencies(vec!["zustand".into()]);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "npm_dependencies");
        assert_eq!(json["payload"][0], "zustand");
    }

    #[test]
    fn missing_description_is_synthesized_from_path() {
        let spec = ComponentSpec {
            file_path: Some("components/Header.tsx".into()),
            description: None,
        };
        assert_eq!(
            spec.description_or_default(),
            "Create a component for components/Header.tsx."
        );
    }

    #[test]
    fn blank_file_path_counts_as_missing() {
        let spec = ComponentSpec {
            file_path: Some("   ".into()),
            description: Some("x".into()),
        };
        assert_eq!(spec.path(), None);
    }

    #[test]
    fn null_dependency_lists_read_as_empty() {
        let plan: Plan = serde_json::from_str(
            r#"{"codename": "x", "npm_dependencies": null, "shadcn_dependencies": null, "components": []}"#,
        )
        .unwrap();
        assert!(plan.npm_dependencies.is_empty());
        assert!(plan.shadcn_dependencies.is_empty());
    }

    #[test]
    fn unusable_component_fields_read_as_missing() {
        let specs: Vec<ComponentSpec> = serde_json::from_str(
            r#"[{"file_path": 5, "description": ["a"]}, "Header.tsx", {"file_path": "App.tsx"}]"#,
        )
        .unwrap();
        assert_eq!(specs[0], ComponentSpec::default());
        assert_eq!(specs[1], ComponentSpec::default());
        assert_eq!(specs[2].path(), Some("App.tsx"));
        assert_eq!(specs[2].description, None);
    }

    #[test]
    fn codename_validation() {
        let mut plan = Plan {
            codename: "cozy_otter".into(),
            npm_dependencies: vec![],
            shadcn_dependencies: vec![],
            components: vec![],
        };
        assert!(plan.validate().is_ok());

        for bad in ["", "..", "a/b", "with space", "../escape"] {
            plan.codename = bad.into();
            assert!(plan.validate().is_err(), "{bad:?} should be rejected");
        }
    }
}
