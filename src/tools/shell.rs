//! Shell execution capability.

use super::traits::{bind_args, Tool};
use crate::error::ToolError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

pub const SHELL_TOOL_NAME: &str = "execute_shell_command";

/// Captured output of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Display for ShellOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Command '{}' executed successfully.", self.command)?;
        writeln!(f, "STDOUT:\n{}", self.stdout)?;
        if !self.stderr.is_empty() {
            writeln!(f, "STDERR:\n{}", self.stderr)?;
        }
        Ok(())
    }
}

/// Quote `value` as a single POSIX shell word.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Run `command` through `sh -c` inside `cwd`.
///
/// The directory must already exist. A nonzero exit status is an error
/// carrying both output streams.
pub async fn run_shell(command: &str, cwd: &Path) -> Result<ShellOutput, ToolError> {
    if !cwd.is_dir() {
        return Err(ToolError::MissingWorkingDir(cwd.to_path_buf()));
    }

    info!("Executing command: `{}` in directory: `{}`", command, cwd.display());

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .output()
        .await
        .map_err(|e| ToolError::io(format!("failed to spawn '{command}'"), e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(ToolError::CommandFailed {
            command: command.to_string(),
            code: output.status.code().unwrap_or(-1),
            stdout,
            stderr,
        });
    }

    debug!("Command `{}` produced {} bytes of stdout", command, stdout.len());
    Ok(ShellOutput {
        command: command.to_string(),
        stdout,
        stderr,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShellArgs {
    command: String,
    #[serde(default)]
    cwd_override: Option<String>,
}

/// `execute_shell_command` exposed to agents, confined to one project root.
#[derive(Debug, Clone)]
pub struct ShellTool {
    project_root: PathBuf,
}

impl ShellTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Working directory for a call: the project root, or a directory
    /// inside it named by `cwd_override`.
    fn working_dir(&self, cwd_override: Option<&str>) -> Result<PathBuf, ToolError> {
        let requested = match cwd_override.map(str::trim) {
            Some(dir) if !dir.is_empty() => Path::new(dir),
            _ => return Ok(self.project_root.clone()),
        };
        if requested
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ToolError::PathEscape(requested.display().to_string()));
        }
        if requested.is_absolute() {
            if requested.starts_with(&self.project_root) {
                return Ok(requested.to_path_buf());
            }
            return Err(ToolError::PathEscape(requested.display().to_string()));
        }
        Ok(self.project_root.join(requested))
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        SHELL_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Executes a shell command. Can override the working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to be executed."
                },
                "cwd_override": {
                    "type": "string",
                    "description": "Optional. The directory to run the command in. Defaults to project root."
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<String, ToolError> {
        let args: ShellArgs = bind_args(args)?;
        let cwd = self.working_dir(args.cwd_override.as_deref())?;
        let output = run_shell(&args.command, &cwd).await?;
        Ok(output.to_string())
    }
}
