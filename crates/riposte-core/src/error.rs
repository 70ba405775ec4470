//! Error types.
//!
//! Only setup and persistence can fail. Gameplay outcomes such as a whiffed
//! attack, a hit absorbed by a dead target or a rejected command are ordinary
//! values ([`HitOutcome`](crate::rules::HitOutcome),
//! [`CommandOutcome`](crate::session::CommandOutcome)), never errors.

use thiserror::Error;

/// Invalid session configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric field is outside its allowed range.
    #[error("{scope}.{field} must be {expected}, got {value}")]
    OutOfRange {
        /// Which config block the field belongs to.
        scope: &'static str,
        /// Field name.
        field: &'static str,
        /// Human-readable allowed range.
        expected: &'static str,
        /// Offending value.
        value: f32,
    },

    /// A duration range has `min > max`.
    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange {
        /// Field name.
        field: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// Every opponent action has weight zero, so nothing can be chosen.
    #[error("opponent action weights sum to zero")]
    NoActionWeight,

    /// The config file is not valid JSON for [`SessionConfig`](crate::config::SessionConfig).
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A session could not be constructed.
///
/// Setup errors are fatal for the session being built and are never retried.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A required collaborator was not bound before `build()`.
    #[error("missing binding: {binding}")]
    InvalidActorReference {
        /// Name of the missing collaborator.
        binding: &'static str,
    },

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Reading or writing persisted level progress failed.
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Filesystem failure.
    #[error("progress file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The progress file is corrupt.
    #[error("progress file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = ConfigError::OutOfRange {
            scope: "player",
            field: "max_health",
            expected: "> 0",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "player.max_health must be > 0, got -1");
    }

    #[test]
    fn setup_error_wraps_config_error() {
        let err: SetupError = ConfigError::NoActionWeight.into();
        assert!(matches!(err, SetupError::Config(ConfigError::NoActionWeight)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: opponent action weights sum to zero"
        );
    }

    #[test]
    fn missing_binding_message() {
        let err = SetupError::InvalidActorReference {
            binding: "presentation",
        };
        assert_eq!(err.to_string(), "missing binding: presentation");
    }
}
