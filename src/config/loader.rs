//! Configuration loading from disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::OriginConfig;
use crate::config::store::ConfigStore;
use crate::config::validation::{validate_origins, ValidationError};

/// Error type for configuration loading. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate the origins file.
pub fn load_origins(path: &Path) -> Result<ConfigStore, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_origins(&content)
}

/// Parse and validate origins from a JSON document.
pub fn parse_origins(content: &str) -> Result<ConfigStore, ConfigError> {
    let origins: HashMap<String, OriginConfig> = serde_json::from_str(content)?;
    validate_origins(&origins).map_err(ConfigError::Validation)?;
    Ok(ConfigStore::new(origins))
}
