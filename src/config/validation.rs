//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of the origins file (serde handles syntactic)
//! - Reject an empty origin set
//! - Check that addresses parse and required strings are non-empty
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: origins → Result<(), Vec<ValidationError>>
//! - Runs before the store is handed to the server

use std::collections::HashMap;
use std::fmt;

use lettre::Address;

use crate::config::schema::OriginConfig;

/// A single semantic problem found in the origins file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The file defines no origins at all.
    NoOrigins,
    /// An origin key is the empty string.
    EmptyOrigin,
    /// A required string field is empty.
    EmptyField { origin: String, field: &'static str },
    /// A field that must hold an email address does not parse as one.
    InvalidAddress { origin: String, field: &'static str },
    /// SMTP port 0.
    InvalidPort { origin: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoOrigins => write!(f, "no origins configured"),
            ValidationError::EmptyOrigin => write!(f, "origin key must not be empty"),
            ValidationError::EmptyField { origin, field } => {
                write!(f, "{origin}: `{field}` must not be empty")
            }
            ValidationError::InvalidAddress { origin, field } => {
                write!(f, "{origin}: `{field}` is not a valid email address")
            }
            ValidationError::InvalidPort { origin } => {
                write!(f, "{origin}: `smtp.port` must be non-zero")
            }
        }
    }
}

/// Validate a parsed origins map.
pub fn validate_origins(origins: &HashMap<String, OriginConfig>) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if origins.is_empty() {
        errors.push(ValidationError::NoOrigins);
    }

    for (origin, cfg) in origins {
        if origin.is_empty() {
            errors.push(ValidationError::EmptyOrigin);
        }

        let required = [
            ("name", &cfg.name),
            ("smtp.host", &cfg.smtp.host),
            ("smtp.pass", &cfg.smtp.pass),
        ];
        for (field, value) in required {
            if value.is_empty() {
                errors.push(ValidationError::EmptyField {
                    origin: origin.clone(),
                    field,
                });
            }
        }

        for (field, value) in [("toEmail", &cfg.to_email), ("smtp.user", &cfg.smtp.user)] {
            if value.parse::<Address>().is_err() {
                errors.push(ValidationError::InvalidAddress {
                    origin: origin.clone(),
                    field,
                });
            }
        }

        if cfg.smtp.port == 0 {
            errors.push(ValidationError::InvalidPort {
                origin: origin.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
