use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the config looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "metaclean.json";

/// Top-level configuration for metaclean.
///
/// Controls where cleaned copies are written, how they are encoded, and
/// which files directory mode picks up.
///
/// # Loading
///
/// ```rust,no_run
/// use metaclean::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("metaclean.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.output.suffix = "_safe".into();
/// config.output.jpeg_quality = 90;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output naming and encoding.
    pub output: OutputConfig,
    /// Directory mode filtering.
    pub scan: ScanConfig,
}

/// Output naming and encoding behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Inserted before the extension when no output path is given.
    pub suffix: String,
    /// JPEG encoder quality (1-100).
    pub jpeg_quality: u8,
    /// Inspect the encoded output and refuse to write it if metadata blocks survived.
    pub verify_output: bool,
}

/// Which files directory mode picks up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "_cleaned".to_string(),
            jpeg_quality: 75,
            verify_output: true,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: crate::pipeline::DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join(CONFIG_FILE_NAME))
    }

    /// Load config from the given path, or from the default location.
    ///
    /// A missing file is not an error: defaults are returned instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::debug!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        config.normalize();
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(config_path)
    }

    /// Clamp out-of-range values and lowercase the extension list.
    fn normalize(&mut self) {
        self.output.jpeg_quality = self.output.jpeg_quality.clamp(1, 100);
        for ext in &mut self.scan.extensions {
            *ext = ext.trim_start_matches('.').to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.output.suffix, "_cleaned");
        assert_eq!(config.output.jpeg_quality, 75);
        assert!(config.output.verify_output);
        assert_eq!(config.scan.extensions, vec!["jpg", "jpeg", "png", "webp"]);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metaclean.json");

        let mut config = Config::default();
        config.output.suffix = "_safe".to_string();
        config.output.verify_output = false;
        let written = config.save(Some(&path)).unwrap();
        assert_eq!(written, path);

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_defaults_and_normalizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metaclean.json");
        std::fs::write(
            &path,
            r#"{"output": {"jpeg_quality": 0}, "scan": {"extensions": [".JPG", "Tiff"]}}"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output.suffix, "_cleaned");
        assert_eq!(config.output.jpeg_quality, 1);
        assert_eq!(config.scan.extensions, vec!["jpg", "tiff"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metaclean.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
