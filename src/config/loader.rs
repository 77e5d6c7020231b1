//! Reading `codegen-cpp.toml`: parse, validate, and find the nearest one.

use crate::config::schema::{CodegenConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// A configuration that could not be used. Text passed to [`load_from_str`]
/// has no path until [`load_from_path`] attaches one.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: not valid TOML: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    #[error("{}: unusable settings: {source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "inline configuration".to_string(),
    }
}

impl ConfigError {
    fn located(self, file: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(file.to_path_buf()),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(file.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

/// File name looked up by [`discover`].
pub const CONFIG_FILE_NAME: &str = "codegen-cpp.toml";

/// Parse and validate configuration text.
pub fn load_from_str(input: &str) -> Result<CodegenConfig, ConfigError> {
    let config: CodegenConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<CodegenConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.located(path))
}

/// Nearest [`CONFIG_FILE_NAME`] in `dir` or one of its ancestors.
pub fn find_config(dir: impl AsRef<Path>) -> Option<PathBuf> {
    dir.as_ref()
        .ancestors()
        .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load the nearest configuration, or the defaults when there is none.
pub fn discover(dir: impl AsRef<Path>) -> Result<CodegenConfig, ConfigError> {
    match find_config(dir) {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            load_from_path(path)
        }
        None => Ok(CodegenConfig::default()),
    }
}
