/// Application configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sonora_playback::PlaybackConfig;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibrarySettings {
    #[serde(default = "default_library_path")]
    pub path: PathBuf,

    /// Scan the library for audio files at startup
    #[serde(default)]
    pub scan_on_start: bool,
}

/// Which rendering backend opens tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Probe local files for their duration
    #[default]
    Probe,

    /// Open anything; tracks last the fallback duration
    Simulated,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Probe => f.write_str("probe"),
            BackendKind::Simulated => f.write_str("simulated"),
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            path: default_library_path(),
            scan_on_start: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables use the `SONORA_` prefix and `__` between
    /// sections, e.g. `SONORA_PLAYBACK__POLL_INTERVAL_MS=50`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(
                config::File::from(path.to_path_buf()).format(config::FileFormat::Toml),
            );
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SONORA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Apply command-line flags on top of the loaded values
    pub fn with_overrides(
        mut self,
        library: Option<PathBuf>,
        backend: Option<BackendKind>,
        scan: bool,
    ) -> Self {
        if let Some(library) = library {
            self.library.path = library;
        }
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self.library.scan_on_start |= scan;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.library.path.as_os_str().is_empty() {
            return Err(CliError::Config("library path is empty".to_string()));
        }

        self.playback
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}

fn default_library_path() -> PathBuf {
    PathBuf::from("./music")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonora_playback::RepeatMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.library.path, PathBuf::from("./music"));
        assert!(!config.library.scan_on_start);
        assert_eq!(config.backend, BackendKind::Probe);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_partial_toml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sonora.toml");
        fs::write(
            &path,
            r#"
backend = "simulated"

[library]
path = "/srv/music"

[playback]
poll_interval_ms = 50
repeat = "all"
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backend, BackendKind::Simulated);
        assert_eq!(config.library.path, PathBuf::from("/srv/music"));
        assert_eq!(config.playback.poll_interval_ms, 50);
        assert_eq!(config.playback.repeat, RepeatMode::All);
        assert_eq!(config.playback.fallback_duration_secs, 180.0);
    }

    #[test]
    fn missing_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&temp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn overrides_win_over_loaded_values() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/lib")),
            Some(BackendKind::Simulated),
            true,
        );
        assert_eq!(config.library.path, PathBuf::from("/tmp/lib"));
        assert_eq!(config.backend, BackendKind::Simulated);
        assert!(config.library.scan_on_start);

        let untouched = config.clone().with_overrides(None, None, false);
        assert_eq!(untouched, config);
    }

    #[test]
    fn validate_rejects_bad_playback_values() {
        let mut config = AppConfig::default();
        config.playback.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        let mut config = AppConfig::default();
        config.library.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_rendering_round_trips() {
        let config = AppConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[playback]"));

        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
