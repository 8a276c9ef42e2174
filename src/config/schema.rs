//! Configuration schema for uiforge.toml.

use crate::tools::shell_quote;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder value shipped in sample `.env` files.
const PLACEHOLDER_KEY: &str = "your-openrouter-api-key";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Chat-completion API base URL (OpenAI-compatible).
    pub api_url: String,

    /// Bearer token for the chat-completion API.
    pub api_key: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Sent as `HTTP-Referer` for OpenRouter rankings.
    pub site_url: String,

    /// Sent as `X-Title` for OpenRouter rankings.
    pub site_name: String,

    pub temperature: f64,

    /// Upper bound on one chat-completion round trip.
    pub request_timeout_secs: u64,

    /// Directory under which project directories are created.
    pub workspace_dir: String,

    /// Markdown document describing the base template's conventions.
    pub template_context_path: String,

    /// Clone command run inside the empty project directory. `{repo}` is
    /// replaced with the base repository URL.
    pub clone_command: String,

    /// Base dependency install, run after cloning.
    pub install_command: String,

    /// Long-running preview server command.
    pub dev_command: String,

    /// Where the preview server is reachable once started.
    pub preview_url: String,

    /// Hosts accepted for the base repository URL.
    pub allowed_repo_hosts: Vec<String>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1".into(),
            api_key: String::new(),
            model: "deepseek/deepseek-chat-v3.1:free".into(),
            site_url: String::new(),
            site_name: String::new(),
            temperature: 0.2,
            request_timeout_secs: 180,
            workspace_dir: ".".into(),
            template_context_path: "template_context.md".into(),
            clone_command: "git clone {repo} .".into(),
            install_command: "pnpm install".into(),
            dev_command: "pnpm run dev".into(),
            preview_url: "http://localhost:5173".into(),
            allowed_repo_hosts: vec![
                "github.com".into(),
                "gitlab.com".into(),
                "bitbucket.org".into(),
            ],
        }
    }
}

impl ForgeConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).into_owned())
    }

    /// Resolved workspace directory.
    pub fn resolved_workspace_dir(&self) -> PathBuf {
        self.resolve_path(&self.workspace_dir)
    }

    /// Resolved template context document.
    pub fn resolved_template_context_path(&self) -> PathBuf {
        self.resolve_path(&self.template_context_path)
    }

    /// Clone command with the repository URL substituted as one quoted word.
    pub fn clone_command_for(&self, repo_url: &str) -> String {
        self.clone_command.replace("{repo}", &shell_quote(repo_url))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENROUTER_API_KEY") {
            self.api_key = key;
        }
        if let Some(url) = lookup("YOUR_SITE_URL") {
            self.site_url = url;
        }
        if let Some(name) = lookup("YOUR_SITE_NAME") {
            self.site_name = name;
        }
        if let Some(model) = lookup("UIFORGE_MODEL") {
            self.model = model;
        }
    }

    /// Refuse to start a build without a usable API key.
    pub fn validate_credentials(&self) -> Result<()> {
        let key = self.api_key.trim();
        if key.is_empty() || key.contains(PLACEHOLDER_KEY) {
            bail!("Please configure OPENROUTER_API_KEY (in .env or uiforge.toml)");
        }
        Ok(())
    }
}
