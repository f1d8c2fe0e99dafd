use serde::{Deserialize, Serialize};
use std::path::Path;

use super::naming::{CasingCorrection, CasingCorrections};
use super::plan::PlanOptions;
use crate::error::{Error, Result};

/// Per-root config file name.
pub const CONFIG_FILE: &str = "wp-psr4.json";

/// Portable migration settings read from `wp-psr4.json` in the migration root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Appended after the built-in `Wordpress` → `WordPress` rule.
    #[serde(default)]
    pub casing_corrections: Vec<CasingCorrection>,

    #[serde(default = "default_use_git")]
    pub use_git: bool,
}

fn default_extension() -> String {
    "php".to_string()
}

fn default_use_git() -> bool {
    true
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            exclude: Vec::new(),
            casing_corrections: Vec::new(),
            use_git: default_use_git(),
        }
    }
}

/// Overrides coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub exclude: Vec<String>,
    pub no_git: bool,
}

impl MigrateConfig {
    /// Read `wp-psr4.json` from `root`. Missing file means defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("read {}", config_path.display())),
            )
        })?;

        Self::from_json(&content, &config_path.display().to_string())
    }

    pub fn from_json(content: &str, path: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| Error::config_invalid_json(path, e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let extension = self.extension.trim();
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            return Err(Error::config_invalid_value(
                "extension",
                Some(self.extension.clone()),
                "Extension must be a bare suffix such as 'php'",
            ));
        }

        if let Some(rule) = self.casing_corrections.iter().find(|r| r.from.is_empty()) {
            return Err(Error::config_invalid_value(
                "casing_corrections",
                Some(rule.to.clone()),
                "Correction rules need a non-empty 'from'",
            ));
        }

        Ok(())
    }

    /// Layer CLI overrides on top: excludes append, `--no-git` wins.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.exclude.extend(overrides.exclude);
        if overrides.no_git {
            self.use_git = false;
        }
        self
    }

    pub fn plan_options(&self) -> PlanOptions {
        let mut corrections = CasingCorrections::default();
        corrections.extend(self.casing_corrections.iter().cloned());

        PlanOptions {
            extension: self.extension.trim().to_string(),
            exclude: self.exclude.clone(),
            corrections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = MigrateConfig::load(dir.path()).unwrap();
        assert_eq!(config.extension, "php");
        assert!(config.use_git);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config =
            MigrateConfig::from_json(r#"{"exclude": ["tests/fixtures"]}"#, "wp-psr4.json").unwrap();
        assert_eq!(config.exclude, vec!["tests/fixtures".to_string()]);
        assert_eq!(config.extension, "php");
        assert!(config.use_git);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = MigrateConfig::from_json(r#"{"exclud": []}"#, "wp-psr4.json").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn dotted_extension_is_rejected() {
        let err = MigrateConfig::from_json(r#"{"extension": ".php"}"#, "wp-psr4.json").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn overrides_append_excludes_and_disable_git() {
        let config = MigrateConfig::from_json(r#"{"exclude": ["a"]}"#, "wp-psr4.json")
            .unwrap()
            .with_overrides(ConfigOverrides {
                exclude: vec!["b".to_string()],
                no_git: true,
            });
        assert_eq!(config.exclude, vec!["a".to_string(), "b".to_string()]);
        assert!(!config.use_git);
    }

    #[test]
    fn configured_corrections_follow_defaults() {
        let config = MigrateConfig::from_json(
            r#"{"casing_corrections": [{"from": "Woocommerce", "to": "WooCommerce"}]}"#,
            "wp-psr4.json",
        )
        .unwrap();
        let options = config.plan_options();
        assert_eq!(options.corrections.rules().len(), 2);
        assert_eq!(
            options.corrections.apply("WordpressWoocommerce"),
            "WordPressWooCommerce"
        );
    }

    #[test]
    fn load_reads_file_from_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"use_git": false}"#).unwrap();
        let config = MigrateConfig::load(dir.path()).unwrap();
        assert!(!config.use_git);
    }
}
