//! Component file writing capability.

use super::traits::{bind_args, Tool};
use crate::error::ToolError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::{Component, Path, PathBuf};
use tracing::info;

pub const WRITE_TOOL_NAME: &str = "write_react_component";

/// Source root every component lives under.
pub const SOURCE_DIR: &str = "src";

/// Normalise a model-supplied path so it lives under `src/`.
///
/// Absolute paths and `..` segments are refused.
pub fn normalize_component_path(file_path: &str) -> Result<PathBuf, ToolError> {
    let trimmed = file_path.trim();
    let relative = Path::new(trimmed);

    if trimmed.is_empty() {
        return Err(ToolError::MissingArgument("file_path"));
    }
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(ToolError::PathEscape(trimmed.to_string()));
    }

    let rooted = if trimmed.starts_with("src/") {
        relative.to_path_buf()
    } else {
        Path::new(SOURCE_DIR).join(relative)
    };
    Ok(rooted)
}

/// Write `code` to `file_path` (normalised under `src/`) inside `project_root`.
///
/// Creates intermediate directories and overwrites any existing file.
pub async fn write_component(
    project_root: &Path,
    file_path: &str,
    code: &str,
) -> Result<String, ToolError> {
    let relative = normalize_component_path(file_path)?;
    let full_path = project_root.join(&relative);

    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::io(format!("Error creating {}", parent.display()), e))?;
    }
    tokio::fs::write(&full_path, code)
        .await
        .map_err(|e| ToolError::io(format!("Error writing file {}", full_path.display()), e))?;

    info!("Wrote {} bytes to {}", code.len(), full_path.display());
    Ok(format!(
        "Successfully wrote component to {}",
        relative.display()
    ))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WriteArgs {
    file_path: String,
    code: String,
    #[serde(default)]
    project_path: Option<String>,
}

/// `write_react_component` exposed to agents, bound to one project root.
///
/// A `project_path` argument naming any other directory is refused.
#[derive(Debug, Clone)]
pub struct WriteComponentTool {
    project_root: PathBuf,
}

impl WriteComponentTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }
}

#[async_trait]
impl Tool for WriteComponentTool {
    fn name(&self) -> &str {
        WRITE_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Writes or overwrites a React component file (.tsx) inside the project's 'src' directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The relative path from the 'src' directory. E.g., 'components/MyComponent.tsx' or 'App.tsx'."
                },
                "code": {
                    "type": "string",
                    "description": "The complete, well-formed React/TSX code for the component."
                },
                "project_path": {
                    "type": "string",
                    "description": "Optional. The root path of the project workspace. Must be the project being built."
                }
            },
            "required": ["file_path", "code"]
        })
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<String, ToolError> {
        let args: WriteArgs = bind_args(args)?;
        if let Some(requested) = args.project_path.as_deref().map(str::trim) {
            if !requested.is_empty() && Path::new(requested) != self.project_root {
                return Err(ToolError::WrongProject {
                    requested: requested.to_string(),
                    project: self.project_root.clone(),
                });
            }
        }
        write_component(&self.project_root, &args.file_path, &args.code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted_under_src() {
        assert_eq!(
            normalize_component_path("components/Header.tsx").unwrap(),
            PathBuf::from("src/components/Header.tsx")
        );
        assert_eq!(
            normalize_component_path("  src/App.tsx ").unwrap(),
            PathBuf::from("src/App.tsx")
        );
    }

    #[test]
    fn escaping_paths_are_refused() {
        for bad in ["../outside.tsx", "/etc/passwd", "components/../../x.tsx"] {
            assert!(
                matches!(normalize_component_path(bad), Err(ToolError::PathEscape(_))),
                "{bad} should be refused"
            );
        }
    }

    #[tokio::test]
    async fn writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let msg = write_component(dir.path(), "components/ui/Card.tsx", "v1")
            .await
            .unwrap();
        assert_eq!(msg, "Successfully wrote component to src/components/ui/Card.tsx");

        write_component(dir.path(), "components/ui/Card.tsx", "v2")
            .await
            .unwrap();
        let body = std::fs::read_to_string(dir.path().join("src/components/ui/Card.tsx")).unwrap();
        assert_eq!(body, "v2");
    }

    #[tokio::test]
    async fn tool_requires_code() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteComponentTool::new(dir.path());
        let args = json!({"file_path": "App.tsx"});
        let err = tool
            .execute(args.as_object().cloned().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("code"));
    }

    #[tokio::test]
    async fn tool_writes_into_bound_project() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteComponentTool::new(dir.path());
        for args in [
            json!({"file_path": "App.tsx", "code": "a"}),
            json!({"file_path": "Nav.tsx", "code": "n", "project_path": dir.path().to_string_lossy()}),
        ] {
            tool.execute(args.as_object().cloned().unwrap()).await.unwrap();
        }
        assert!(dir.path().join("src/App.tsx").exists());
        assert!(dir.path().join("src/Nav.tsx").exists());
    }

    #[tokio::test]
    async fn tool_refuses_foreign_project_path() {
        let project = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let tool = WriteComponentTool::new(project.path());
        let args = json!({
            "file_path": "App.tsx",
            "code": "x",
            "project_path": elsewhere.path().to_string_lossy(),
        });

        let err = tool
            .execute(args.as_object().cloned().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::WrongProject { .. }));
        assert!(!elsewhere.path().join("src/App.tsx").exists());
        assert!(!project.path().join("src/App.tsx").exists());
    }
}
