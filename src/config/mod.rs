use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use crate::error::KeyError;
use crate::material::{DEFAULT_HMAC_MAX, DEFAULT_HMAC_MIN, SizePolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid log level {0:?}")]
    LogLevel(String),

    #[error("invalid size policy: {0}")]
    Policy(#[from] KeyError),
}

/// 配置文件（TOML），所有字段可省略
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output_dir: Option<PathBuf>,
    pub hmac: HmacConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HmacConfig {
    pub min: usize,
    pub max: usize,
}

impl Default for HmacConfig {
    fn default() -> Self {
        HmacConfig {
            min: DEFAULT_HMAC_MIN,
            max: DEFAULT_HMAC_MAX,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn size_policy(&self) -> Result<SizePolicy, ConfigError> {
        Ok(SizePolicy::new(self.hmac.min, self.hmac.max)?)
    }

    /// 未配置时默认 Warn
    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        match &self.log.level {
            Some(level) => {
                LevelFilter::from_str(level).map_err(|_| ConfigError::LogLevel(level.clone()))
            }
            None => Ok(LevelFilter::Warn),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.size_policy().unwrap(), SizePolicy::default());
        assert_eq!(config.log_level().unwrap(), LevelFilter::Warn);
        assert_eq!(config.output_dir(), PathBuf::from("."));
        assert!(config.log.file.is_none());
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            output_dir = "keys"

            [hmac]
            min = 20
            max = 64

            [log]
            level = "debug"
            file = "keymat.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir(), PathBuf::from("keys"));
        assert_eq!(config.size_policy().unwrap().hmac_range(), 20..=64);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
        assert_eq!(config.log.file, Some(PathBuf::from("keymat.log")));
    }

    #[test]
    fn partial_hmac_section_keeps_other_default() {
        let config = Config::from_toml("[hmac]\nmax = 40\n").unwrap();
        assert_eq!(config.size_policy().unwrap().hmac_range(), 15..=40);
    }

    #[test]
    fn rejects_bad_values() {
        let config = Config::from_toml("[hmac]\nmin = 60\n").unwrap();
        assert!(matches!(config.size_policy(), Err(ConfigError::Policy(_))));

        let config = Config::from_toml("[log]\nlevel = \"loud\"\n").unwrap();
        assert!(matches!(config.log_level(), Err(ConfigError::LogLevel(_))));

        assert!(matches!(
            Config::from_toml("unknown = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file() {
        let err = Config::load(Path::new("/nonexistent/keymat.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
