pub mod schema;

pub use schema::ForgeConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config location (~/.config/uiforge/uiforge.toml or platform equivalent).
pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "uiforge")
        .map(|d| d.config_dir().join("uiforge.toml"))
        .unwrap_or_else(|| PathBuf::from("uiforge.toml"))
}

/// Written above the serialized settings by [`save_config`].
const CONFIG_HEADER: &str = "# uiforge settings. Secrets belong in .env (OPENROUTER_API_KEY).\n\n";

/// Load config from `path`. A missing file means all defaults; an unknown
/// key is an error naming the file.
pub fn load_config(path: &Path) -> Result<ForgeConfig> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(ForgeConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Invalid uiforge config in {}", path.display()))
}

/// Write `config` to `path` as TOML, creating parent directories. The API
/// key is never written.
pub fn save_config(config: &ForgeConfig, path: &Path) -> Result<()> {
    let shareable = ForgeConfig {
        api_key: String::new(),
        ..config.clone()
    };
    let body = toml::to_string_pretty(&shareable).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, format!("{CONFIG_HEADER}{body}"))
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("uiforge.toml");

        let mut cfg = ForgeConfig::default();
        cfg.workspace_dir = "/tmp/builds".into();
        save_config(&cfg, &path).unwrap();

        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn saved_file_omits_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uiforge.toml");
        let cfg = ForgeConfig {
            api_key: "sk-or-secret".into(),
            ..ForgeConfig::default()
        };
        save_config(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# uiforge settings."));
        assert!(!written.contains("sk-or-secret"));
        assert!(load_config(&path).unwrap().api_key.is_empty());
    }

    #[test]
    fn unknown_key_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uiforge.toml");
        std::fs::write(&path, "modle = \"x/y\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("modle"));
        assert!(err.to_string().contains(&*path.to_string_lossy()));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, ForgeConfig::default());
    }
}
