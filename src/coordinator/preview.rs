//! Long-running dev server owned by the coordinator.

use crate::error::PreviewError;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// A running preview process. Killed on [`PreviewServer::stop`] or on drop.
#[derive(Debug)]
pub struct PreviewServer {
    child: Child,
    command: String,
    url: String,
    stopped: bool,
}

impl PreviewServer {
    /// Spawn `command` detached from our stdio, inside `cwd`.
    pub fn start(command: &str, cwd: &Path, url: &str) -> Result<Self, PreviewError> {
        if command.trim().is_empty() {
            return Err(PreviewError::EmptyCommand);
        }

        // exec so the kill reaches the server rather than the wrapping shell
        let child = Command::new("sh")
            .arg("-c")
            .arg(format!("exec {command}"))
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PreviewError::Spawn {
                command: command.to_string(),
                source,
            })?;

        info!(
            "Started preview `{}` (pid {:?}) in {}",
            command,
            child.id(),
            cwd.display()
        );
        Ok(Self {
            child,
            command: command.to_string(),
            url: url.to_string(),
            stopped: false,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the process is still alive.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kill the process and wait for it to exit.
    pub async fn stop(&mut self) {
        if self.stopped {
            return;
        }
        info!("Shutting down the dev server.");
        if let Err(e) = self.child.kill().await {
            warn!("Failed to stop preview `{}`: {}", self.command, e);
        }
        self.stopped = true;
    }
}

impl Drop for PreviewServer {
    fn drop(&mut self) {
        if !self.stopped {
            info!("Shutting down the dev server.");
            let _ = self.child.start_kill();
        }
    }
}
