pub mod schema;

pub use schema::AdvisorConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the config file inside the home directory.
pub const CONFIG_FILE: &str = "advisor.toml";

/// Default advisor home directory (~/.career-advisor).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".career-advisor"))
        .unwrap_or_else(|| PathBuf::from(".career-advisor"))
}

/// Home directory from a `--home` argument (`~` expanded), else the default.
pub fn resolve_home_dir(arg: Option<&str>) -> PathBuf {
    match arg {
        Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
        None => default_home_dir(),
    }
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<AdvisorConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read advisor config file")?;
        let config: AdvisorConfig =
            toml::from_str(&contents).context("Failed to parse advisor config (TOML)")?;
        Ok(config)
    } else {
        Ok(AdvisorConfig::default())
    }
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &AdvisorConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_dir_defaults_and_overrides() {
        assert!(resolve_home_dir(None).ends_with(".career-advisor"));
        assert_eq!(resolve_home_dir(None), default_home_dir());
        assert_eq!(
            resolve_home_dir(Some("/srv/advisor")),
            PathBuf::from("/srv/advisor")
        );
        assert!(!resolve_home_dir(Some("~/advisor"))
            .to_string_lossy()
            .starts_with('~'));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(cfg, AdvisorConfig::default());
        assert_eq!(cfg.max_rounds, 10);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let cfg = AdvisorConfig {
            model: "gpt-4o-mini".into(),
            max_rounds: 4,
            ..AdvisorConfig::default()
        };
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model = \"claude-sonnet-4-5\"\ncontext_limit = 5\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.model, "claude-sonnet-4-5");
        assert_eq!(cfg.context_limit, 5);
        assert_eq!(cfg.tool_timeout_secs, 10);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "max_rounds = \"ten\"").unwrap();
        assert!(load_config(&path).is_err());
    }
}
