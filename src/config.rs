use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for exif-carry.
///
/// Controls how output JPEGs are written and how many files are converted
/// at once.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_carry::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.output.quality = 90;
/// config.batch.jobs = 4;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output file behavior (quality, naming, overwrite, dry run).
    pub output: OutputConfig,
    /// Batch driver settings.
    pub batch: BatchConfig,
}

/// How converted files are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Extension given to output files, without the dot.
    pub extension: String,
    /// If `false`, a file whose output already exists fails instead of being replaced.
    pub overwrite: bool,
    /// If `true`, decode and report without writing any output.
    pub dry_run: bool,
}

/// Batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of files converted concurrently. `1` converts sequentially.
    pub jobs: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 75,
            extension: "jpeg".to_string(),
            overwrite: true,
            dry_run: false,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

impl Config {
    /// Resolve the config file path: same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Reject values the converter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.output.quality) {
            anyhow::bail!("JPEG quality must be between 1 and 100, got {}", self.output.quality);
        }
        if self.output.extension.trim_start_matches('.').is_empty() {
            anyhow::bail!("Output extension must not be empty");
        }
        if self.batch.jobs == 0 {
            anyhow::bail!("Batch jobs must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.output.quality, 75);
        assert_eq!(config.output.extension, "jpeg");
        assert!(config.output.overwrite);
        assert!(!config.output.dry_run);
        assert_eq!(config.batch.jobs, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_quality() {
        let mut config = Config::default();
        config.output.quality = 0;
        assert!(config.validate().is_err());
        config.output.quality = 101;
        assert!(config.validate().is_err());
        config.output.quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_extension() {
        let mut config = Config::default();
        config.output.extension = ".".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_jobs() {
        let mut config = Config::default();
        config.batch.jobs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(dir.path().join("missing.json").as_path())).unwrap();
        assert_eq!(config.output.quality, 75);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.output.quality = 92;
        config.output.extension = "jpg".to_string();
        config.batch.jobs = 3;
        config.save(Some(path.as_path())).unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.output.quality, 92);
        assert_eq!(loaded.output.extension, "jpg");
        assert_eq!(loaded.batch.jobs, 3);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output": { "quality": 60 } }"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.output.quality, 60);
        assert_eq!(config.output.extension, "jpeg");
        assert_eq!(config.batch.jobs, 1);
    }

    #[test]
    fn invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output": { "quality": 0 } }"#).unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());

        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());
    }
}
