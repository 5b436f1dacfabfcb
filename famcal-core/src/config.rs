//! famcal configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use ::config::{Config, File, FileFormat};
use serde::Deserialize;

use crate::error::{FamCalError, FamCalResult};

static DEFAULT_DATA_FILE: &str = "~/.local/share/famcal/events.json";
static DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_PORT: u16 = 4097;

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Configuration at ~/.config/famcal/config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct FamCalConfig {
    /// Where the event store keeps its documents
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// IANA zone used to place events on calendar days
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for FamCalConfig {
    fn default() -> Self {
        FamCalConfig {
            data_file: default_data_file(),
            timezone: default_timezone(),
            port: default_port(),
        }
    }
}

impl FamCalConfig {
    pub fn config_path() -> FamCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FamCalError::Config("Could not determine config directory".into()))?
            .join("famcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/famcal/config.toml, writing a commented-out default
    /// file first if there is none.
    pub fn load() -> FamCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> FamCalResult<Self> {
        let config: FamCalConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .build()
            .map_err(|e| FamCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FamCalError::Config(e.to_string()))?;

        // Fail early on a bad zone rather than on first render
        config.tz()?;
        Ok(config)
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_file.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn tz(&self) -> FamCalResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| FamCalError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> FamCalResult<()> {
        let contents = format!(
            "\
# famcal configuration

# Where events are stored:
# data_file = \"{}\"

# Time zone used to place events on calendar days:
# timezone = \"{}\"

# Port the server listens on:
# port = {}
",
            DEFAULT_DATA_FILE, DEFAULT_TIMEZONE, DEFAULT_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FamCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FamCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
