use lessonkit_editor::{DuplicatePolicy, EditorOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "lessonkit.config.json";

/// Lessonkit configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Prefix for ids generated when blocks are inserted
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// How operations treat an id carried by several nodes
    #[serde(default)]
    pub duplicate_ids: DuplicatePolicy,

    /// Maximum number of undo levels (0 = unlimited)
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_id_prefix() -> String {
    "lk".to_string()
}

fn default_max_undo_levels() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            duplicate_ids: self.duplicate_ids,
            id_prefix: self.id_prefix.clone(),
            max_undo_levels: self.max_undo_levels,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            duplicate_ids: DuplicatePolicy::default(),
            max_undo_levels: default_max_undo_levels(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "idPrefix": "unit4",
            "duplicateIds": "reject",
            "maxUndoLevels": 0,
            "logLevel": "debug"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.id_prefix, "unit4");
        assert_eq!(config.duplicate_ids, DuplicatePolicy::Reject);
        assert_eq!(config.max_undo_levels, 0);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "idPrefix": "x" }"#).unwrap();
        assert_eq!(config.id_prefix, "x");
        assert_eq!(config.duplicate_ids, DuplicatePolicy::FirstMatch);
        assert_eq!(config.max_undo_levels, 100);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config.id_prefix, "lk");
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "duplicateIds": "reject" }"#).unwrap();

        let config = Config::load(&dir.path().display().to_string()).unwrap();
        let options = config.editor_options();
        assert_eq!(options.duplicate_ids, DuplicatePolicy::Reject);
        assert_eq!(options.id_prefix, "lk");
    }
}
