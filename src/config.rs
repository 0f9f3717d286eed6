use std::path::{Path, PathBuf};

use crate::checkpoint::{Capacity, KBest, KLatest};
use crate::error::ConfigError;

/// Checkpoint retention settings, loadable from TOML.
///
/// ```toml
/// checkpoint_dir = "exp/pwg/checkpoints"
/// keep_best_n = 5
/// keep_latest_n = -1   # keep every snapshot
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub checkpoint_dir: PathBuf,
    pub keep_best_n: Capacity,
    pub keep_latest_n: Capacity,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        RetentionConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_best_n: Capacity::Bounded(5),
            keep_latest_n: Capacity::Bounded(5),
        }
    }
}

impl RetentionConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: RetentionConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "checkpoint_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&RetentionConfig::default()).expect("default config serializes")
    }

    /// Path of the checkpoint written at `step`.
    pub fn checkpoint_path(&self, step: usize) -> PathBuf {
        self.checkpoint_dir.join(format!("checkpoint_{:07}", step))
    }

    /// Best-K retainer over checkpoint paths. Evicted checkpoints are removed
    /// from disk; the caller installs the save hook.
    pub fn best_retainer(&self) -> KBest<PathBuf> {
        KBest::for_paths(self.keep_best_n)
    }

    /// Latest-K retainer over checkpoint paths. Evicted checkpoints are removed
    /// from disk; the caller installs the save hook.
    pub fn latest_retainer(&self) -> KLatest<PathBuf> {
        KLatest::for_paths(self.keep_latest_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = RetentionConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RetentionConfig = toml::from_str("keep_best_n = 3").unwrap();
        assert_eq!(config.keep_best_n, Capacity::Bounded(3));
        assert_eq!(config.keep_latest_n, Capacity::Bounded(5));
        assert_eq!(config.checkpoint_dir, PathBuf::from("checkpoints"));
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: RetentionConfig = toml::from_str("").unwrap();
        assert_eq!(config, RetentionConfig::default());
    }

    #[test]
    fn test_unbounded_sentinel() {
        let config: RetentionConfig = toml::from_str("keep_latest_n = -1").unwrap();
        assert_eq!(config.keep_latest_n, Capacity::Unbounded);
    }

    #[test]
    fn test_negative_max_size_rejected() {
        let err = toml::from_str::<RetentionConfig>("keep_best_n = -4").unwrap_err();
        assert!(
            err.to_string().contains("invalid max size -4"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_validation_rejects_empty_dir() {
        let config = RetentionConfig {
            checkpoint_dir: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            RetentionConfig::load_or_default(Path::new("nonexistent_retention.toml")).unwrap();
        assert_eq!(config, RetentionConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retention.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
checkpoint_dir = "exp/default/checkpoints"
keep_best_n = 2
"#
        )
        .unwrap();

        let config = RetentionConfig::load(&path).unwrap();
        assert_eq!(config.checkpoint_dir, PathBuf::from("exp/default/checkpoints"));
        assert_eq!(config.keep_best_n, Capacity::Bounded(2));
        assert_eq!(config.keep_latest_n, Capacity::Bounded(5));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = RetentionConfig::load(Path::new("nonexistent_retention.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }), "got: {err}");
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = RetentionConfig::default_toml();
        let config: RetentionConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, RetentionConfig::default());
    }

    #[test]
    fn test_checkpoint_path() {
        let config = RetentionConfig::default();
        assert_eq!(
            config.checkpoint_path(1200),
            PathBuf::from("checkpoints/checkpoint_0001200")
        );
    }

    #[test]
    fn test_retainers_use_configured_capacity() {
        let config = RetentionConfig {
            keep_best_n: Capacity::Bounded(2),
            keep_latest_n: Capacity::Unbounded,
            ..Default::default()
        };
        assert_eq!(config.best_retainer().capacity(), Capacity::Bounded(2));
        assert_eq!(config.latest_retainer().capacity(), Capacity::Unbounded);
    }
}
