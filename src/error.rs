//! Typed error taxonomy, one enum per recovery boundary.

use std::path::PathBuf;
use thiserror::Error;

/// A chat-completion round trip that produced nothing usable.
///
/// Recovered inside [`crate::agent::ChatAgent`]; never propagates further.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(String),

    #[error("inference request timed out after {0}s")]
    Timeout(u64),

    #[error("inference failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode inference response: {0}")]
    Decode(String),

    #[error("inference response contained no choices")]
    EmptyChoices,
}

/// Failure of a single capability invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Missing '{0}' argument")]
    MissingArgument(&'static str),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Working directory '{}' does not exist. Cannot run command.", .0.display())]
    MissingWorkingDir(PathBuf),

    #[error("Command '{command}' failed. Return code: {code}\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("refusing to write outside the project source tree: {0}")]
    PathEscape(String),

    #[error("project_path '{requested}' is not the project being built ({})", .project.display())]
    WrongProject { requested: String, project: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// The planner could not produce a usable plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("planner returned no text: {0}")]
    Unavailable(String),

    #[error("planner output is not a valid plan: {reason}")]
    Malformed { raw: String, reason: String },

    #[error("plan rejected: {reason}")]
    Invalid { raw: String, reason: String },
}

impl PlanError {
    /// The offending planner output, for operator diagnosis.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Unavailable(_) => None,
            Self::Malformed { raw, .. } | Self::Invalid { raw, .. } => Some(raw),
        }
    }
}

/// A project initialization sub-step failed.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to reset project directory {}: {source}", .path.display())]
    Clobber {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to clone base repo: {0}")]
    Clone(#[source] ToolError),

    #[error("failed to create tsconfig.json: {0}")]
    Config(String),

    #[error("failed to install base dependencies: {0}")]
    Install(#[source] ToolError),
}

/// The preview server could not be started.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("dev command is empty")]
    EmptyCommand,

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Conditions that halt a build before the task queue runs.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("planning failed: {0}")]
    Planning(#[from] PlanError),

    #[error("Please provide a valid repository URL: {0}")]
    InvalidRepo(String),

    #[error("initialization failed: {0}")]
    Initialization(#[from] InitError),
}
