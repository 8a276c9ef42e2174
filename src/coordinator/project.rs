//! Project directory setup: clobber, clone, tsconfig, base install.

use crate::config::ForgeConfig;
use crate::error::InitError;
use crate::tools::run_shell;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info};

pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Vite + React compiler options with the `@/*` → `./src/*` alias.
pub fn tsconfig() -> Value {
    json!({
        "compilerOptions": {
            "target": "ES2020",
            "useDefineForClassFields": true,
            "lib": ["ES2020", "DOM", "DOM.Iterable"],
            "module": "ESNext",
            "skipLibCheck": true,
            "moduleResolution": "bundler",
            "allowImportingTsExtensions": true,
            "resolveJsonModule": true,
            "isolatedModules": true,
            "noEmit": true,
            "jsx": "react-jsx",
            "strict": true,
            "noUnusedLocals": true,
            "noUnusedParameters": true,
            "noFallthroughCasesInSwitch": true,
            "baseUrl": ".",
            "paths": { "@/*": ["./src/*"] }
        },
        "include": ["src"],
        "references": [{ "path": "./tsconfig.node.json" }]
    })
}

/// Destroy any existing directory at `path` and create it empty.
pub async fn reset_project_dir(path: &Path) -> Result<(), InitError> {
    let clobber = |source: std::io::Error| InitError::Clobber {
        path: path.to_path_buf(),
        source,
    };
    if path.exists() {
        debug!("Removing existing project directory {}", path.display());
        tokio::fs::remove_dir_all(path).await.map_err(clobber)?;
    }
    tokio::fs::create_dir_all(path).await.map_err(clobber)
}

pub async fn write_tsconfig(project_root: &Path) -> Result<(), InitError> {
    let body = serde_json::to_string_pretty(&tsconfig())
        .map_err(|e| InitError::Config(e.to_string()))?;
    tokio::fs::write(project_root.join(TSCONFIG_FILE), body)
        .await
        .map_err(|e| InitError::Config(e.to_string()))
}

/// Prepare a fresh project at `project_path` from `repo_url`.
///
/// Any prior contents are destroyed, not merged. Stops at the first failing
/// sub-step; nothing is rolled back.
pub async fn initialize_project(
    config: &ForgeConfig,
    project_path: &Path,
    repo_url: &str,
) -> Result<(), InitError> {
    reset_project_dir(project_path).await?;

    run_shell(&config.clone_command_for(repo_url), project_path)
        .await
        .map_err(InitError::Clone)?;
    info!("Cloned {} into {}", repo_url, project_path.display());

    write_tsconfig(project_path).await?;

    run_shell(&config.install_command, project_path)
        .await
        .map_err(InitError::Install)?;
    info!("Base dependencies installed in {}", project_path.display());

    Ok(())
}

/// Characters a shell would treat as anything other than a plain word.
const SHELL_METACHARACTERS: &[char] = &[
    ';', '|', '&', '$', '`', '<', '>', '(', ')', '\'', '"', '\\', '*', '?', '!', '{', '}', '[', ']',
    '#', '~',
];

/// Accept only http(s) URLs on one of `allowed_hosts` with a repository path
/// and no whitespace, control, or shell metacharacters.
pub fn validate_repo_url(url: &str, allowed_hosts: &[String]) -> Result<(), String> {
    let url = url.trim();
    if let Some(bad) = url
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || SHELL_METACHARACTERS.contains(c))
    {
        return Err(format!("'{url}' contains the disallowed character {bad:?}"));
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| format!("'{url}' is not an http(s) URL"))?;

    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let host = host.trim_start_matches("www.");
    if !allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return Err(format!(
            "host '{host}' is not one of: {}",
            allowed_hosts.join(", ")
        ));
    }
    if path.trim_matches('/').is_empty() {
        return Err(format!("'{url}' does not name a repository"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config(clone: &str) -> ForgeConfig {
        ForgeConfig {
            clone_command: clone.into(),
            install_command: "true".into(),
            ..ForgeConfig::default()
        }
    }

    #[tokio::test]
    async fn reinitializing_destroys_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("cozy_otter");
        std::fs::create_dir_all(project.join("src")).unwrap();
        std::fs::write(project.join("src/Stale.tsx"), "old").unwrap();

        initialize_project(&offline_config("echo {repo} > origin.txt"), &project, "https://github.com/a/b")
            .await
            .unwrap();

        assert!(!project.join("src/Stale.tsx").exists());
        assert!(project.join(TSCONFIG_FILE).exists());
        let origin = std::fs::read_to_string(project.join("origin.txt")).unwrap();
        assert_eq!(origin.trim(), "https://github.com/a/b");
    }

    #[tokio::test]
    async fn clone_failure_stops_before_tsconfig() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("p");

        let err = initialize_project(&offline_config("false"), &project, "https://github.com/a/b")
            .await
            .unwrap_err();
        assert!(matches!(err, InitError::Clone(_)));
        assert!(!project.join(TSCONFIG_FILE).exists());
    }

    #[tokio::test]
    async fn install_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = offline_config("true");
        cfg.install_command = "exit 7".into();
        let err = initialize_project(&cfg, &dir.path().join("p"), "https://github.com/a/b")
            .await
            .unwrap_err();
        assert!(matches!(err, InitError::Install(_)));
    }

    #[test]
    fn tsconfig_has_src_alias() {
        let cfg = tsconfig();
        assert_eq!(cfg["compilerOptions"]["paths"]["@/*"][0], "./src/*");
        assert_eq!(cfg["include"][0], "src");
    }

    #[test]
    fn repo_url_validation() {
        let hosts = ForgeConfig::default().allowed_repo_hosts;
        assert!(validate_repo_url("https://github.com/dan5py/react-vite-shadcn-ui", &hosts).is_ok());
        assert!(validate_repo_url("https://www.github.com/a/b.git", &hosts).is_ok());
        assert!(validate_repo_url("github.com/a/b", &hosts).is_err());
        assert!(validate_repo_url("https://example.com/a/b", &hosts).is_err());
        assert!(validate_repo_url("https://github.com/", &hosts).is_err());
    }

    #[test]
    fn repo_url_with_shell_syntax_is_rejected() {
        let hosts = ForgeConfig::default().allowed_repo_hosts;
        for bad in [
            "https://github.com/a/b;touch INJECTED",
            "https://github.com/a/b && rm -rf x",
            "https://github.com/a/$(id)",
            "https://github.com/a/b`id`",
            "https://github.com/a/b|cat",
            "https://github.com/a/b\nid",
            "https://github.com/a/'b'",
        ] {
            assert!(validate_repo_url(bad, &hosts).is_err(), "{bad} should be rejected");
        }
    }

    #[tokio::test]
    async fn repo_url_reaches_clone_as_one_word() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("p");
        let url = "https://github.com/a/b;touch INJECTED";

        initialize_project(&offline_config("echo {repo} > origin.txt"), &project, url)
            .await
            .unwrap();

        assert!(!project.join("INJECTED").exists());
        let origin = std::fs::read_to_string(project.join("origin.txt")).unwrap();
        assert_eq!(origin.trim(), url);
    }
}
