use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::bencode::DEFAULT_MAX_DEPTH;

pub const CONFIG_FILE: &str = "rusbit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("Invalid config {path}: {source}")]
	Parse {
		path: PathBuf,
		source: toml::de::Error,
	},
}

/// Limits applied while loading and decoding a torrent file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub max_file_size: u64, // bytes
	pub max_depth: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			max_file_size: 10 * 1024 * 1024,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

impl Config {
	/// Reads `rusbit.toml` from the working directory, falling back to the
	/// defaults when it does not exist. Nothing is ever written.
	pub fn load() -> Result<Self, ConfigError> {
		let config_path = Path::new(CONFIG_FILE);
		if config_path.exists() {
			Self::from_path(config_path)
		} else {
			Ok(Self::default())
		}
	}

	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		toml::from_str(&contents).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.max_file_size, 10 * 1024 * 1024);
		assert_eq!(config.max_depth, 512);
	}

	#[test]
	fn test_partial_file_keeps_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "max_depth = 64").unwrap();

		let config = Config::from_path(file.path()).unwrap();
		assert_eq!(config.max_depth, 64);
		assert_eq!(config.max_file_size, Config::default().max_file_size);
	}

	#[test]
	fn test_round_trips_through_toml() {
		let config = Config {
			max_file_size: 1024,
			max_depth: 8,
		};
		let text = toml::to_string(&config).unwrap();
		assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
	}

	#[test]
	fn test_invalid_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "max_depth = \"deep\"").unwrap();

		let err = Config::from_path(file.path()).unwrap_err();
		assert!(matches!(err, ConfigError::Parse { .. }));
	}

	#[test]
	fn test_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let err = Config::from_path(&dir.path().join("nope.toml")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}
