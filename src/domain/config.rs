use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Configuration for talking to the story backend.
///
/// This struct holds the backend address and the request timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Base URL of the backend, for example `http://127.0.0.1:8000`.
    ///
    /// The stories collection lives at `{base_url}/stories/`.
    base_url: String,

    /// Request timeout in seconds. Zero disables the timeout.
    timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// The conventional location of the config file below `root`.
    #[must_use]
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(".story").join("config.toml")
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration, falling back to the defaults if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// Parent directories are created if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets the backend base URL.
    ///
    /// Trailing slashes are stripped.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
    }

    /// Returns the request timeout, or `None` if disabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    /// Sets the request timeout in seconds. Zero disables it.
    pub const fn set_timeout_secs(&mut self, secs: u64) {
        self.timeout_secs = secs;
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_base_url")]
        base_url: String,

        /// Request timeout in seconds.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                base_url,
                timeout_secs,
            } => {
                let mut config = Self {
                    base_url: String::new(),
                    timeout_secs,
                };
                config.set_base_url(base_url);
                config
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            base_url: config.base_url,
            timeout_secs: config.timeout_secs,
        }
    }
}
