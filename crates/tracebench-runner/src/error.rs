//! Error types for sweep planning and configuration.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Axis of the sweep a test id component belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Config,
    Mode,
    Task,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::Mode => "mode",
            Self::Task => "task",
        };
        f.write_str(name)
    }
}

/// Usage errors raised before any test case runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    /// The addressed id does not have exactly three `:`-separated parts
    #[error("Invalid test id '{test_id}': expected format config:mode:task")]
    MalformedTestId { test_id: String },

    /// One component of the addressed id is not a known axis value
    #[error("Invalid {axis} '{value}'. Available: {}", .valid.join(", "))]
    UnknownAxisValue {
        axis: Axis,
        value: String,
        valid: Vec<String>,
    },
}

impl SweepError {
    pub fn unknown_axis_value<V: Into<String>>(axis: Axis, value: V, valid: &[String]) -> Self {
        Self::UnknownAxisValue {
            axis,
            value: value.into(),
            valid: valid.to_vec(),
        }
    }
}

/// Sweep configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read sweep config: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse sweep config: {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid sweep config: {field} - {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_axis_value_lists_valid_values() {
        let valid = vec!["fast".to_string(), "balanced".to_string()];
        let err = SweepError::unknown_axis_value(Axis::Mode, "slow", &valid);
        assert_eq!(err.to_string(), "Invalid mode 'slow'. Available: fast, balanced");
    }

    #[test]
    fn test_malformed_test_id_message() {
        let err = SweepError::MalformedTestId {
            test_id: "a:b".to_string(),
        };
        assert!(err.to_string().contains("config:mode:task"));
    }
}
