//! # Error Types
//!
//! Structured error types for envelope_core. Every error the engine raises is a
//! deterministic function of its inputs, so callers can match on the variant
//! (or on [`CalcError::error_code`]) and decide how to report it.
//!
//! ## Example
//!
//! ```rust
//! use envelope_core::errors::{CalcError, CalcResult};
//!
//! fn validate_height(height_m: f64) -> CalcResult<()> {
//!     if height_m <= 0.0 {
//!         return Err(CalcError::invalid_geometry(format!(
//!             "building height must be positive, got {}",
//!             height_m
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_height(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for envelope_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for load calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Zone ordering or elevations violate the geometry invariants
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// A selection needs a manual value that was not supplied
    #[error("Missing parameter '{parameter}': {reason}")]
    MissingParameter { parameter: String, reason: String },

    /// The requested (ULS, SLS) pair has no formula for this surface
    #[error("Unsupported combination for {surface}: ULS '{uls}' with SLS '{sls}'")]
    UnsupportedCombination {
        surface: String,
        uls: String,
        sls: String,
    },

    /// A load has not been computed for the zone (or, without a zone, the
    /// building) a combination or report step needs
    #[error("Missing {load} load data{}", zone_suffix(.zone_num))]
    MissingLoadData { load: String, zone_num: Option<u32> },

    /// The requested input mode is not supported
    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },

    /// The location provider has no record for the address
    #[error("Location not found: {address}")]
    LocationNotFound { address: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn zone_suffix(zone_num: &Option<u32>) -> String {
    match zone_num {
        Some(n) => format!(" for height zone {}", n),
        None => String::new(),
    }
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidGeometry error
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        CalcError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create a MissingParameter error
    pub fn missing_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::MissingParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedCombination error
    pub fn unsupported_combination(
        surface: impl Into<String>,
        uls: impl Into<String>,
        sls: impl Into<String>,
    ) -> Self {
        CalcError::UnsupportedCombination {
            surface: surface.into(),
            uls: uls.into(),
            sls: sls.into(),
        }
    }

    /// Create a MissingLoadData error for a height zone
    pub fn missing_load_data(load: impl Into<String>, zone_num: u32) -> Self {
        CalcError::MissingLoadData {
            load: load.into(),
            zone_num: Some(zone_num),
        }
    }

    /// Create a MissingLoadData error for a building-level load (snow)
    pub fn missing_building_load(load: impl Into<String>) -> Self {
        CalcError::MissingLoadData {
            load: load.into(),
            zone_num: None,
        }
    }

    /// Create a NotImplemented error
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        CalcError::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create a LocationNotFound error
    pub fn location_not_found(address: impl Into<String>) -> Self {
        CalcError::LocationNotFound {
            address: address.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    ///
    /// Only failures of the external collaborators qualify; engine errors
    /// repeat for identical inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalcError::FileLocked { .. } | CalcError::LocationNotFound { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            CalcError::MissingParameter { .. } => "MISSING_PARAMETER",
            CalcError::UnsupportedCombination { .. } => "UNSUPPORTED_COMBINATION",
            CalcError::MissingLoadData { .. } => "MISSING_LOAD_DATA",
            CalcError::NotImplemented { .. } => "NOT_IMPLEMENTED",
            CalcError::LocationNotFound { .. } => "LOCATION_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::unsupported_combination("wall", "1.4D", "1.0D");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UnsupportedCombination"));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::invalid_geometry("x").error_code(), "INVALID_GEOMETRY");
        assert_eq!(CalcError::missing_parameter("ce", "x").error_code(), "MISSING_PARAMETER");
        assert_eq!(CalcError::missing_load_data("wind", 3).error_code(), "MISSING_LOAD_DATA");
        assert_eq!(CalcError::not_implemented("x").error_code(), "NOT_IMPLEMENTED");
    }

    #[test]
    fn test_engine_errors_not_recoverable() {
        assert!(!CalcError::invalid_geometry("x").is_recoverable());
        assert!(!CalcError::unsupported_combination("roof", "a", "b").is_recoverable());
        assert!(CalcError::location_not_found("Nowhere").is_recoverable());
        assert!(CalcError::file_locked("a", "b", "c").is_recoverable());
    }

    #[test]
    fn test_missing_load_message() {
        let error = CalcError::missing_load_data("seismic", 2);
        assert_eq!(error.to_string(), "Missing seismic load data for height zone 2");
        let error = CalcError::missing_building_load("snow");
        assert_eq!(error.to_string(), "Missing snow load data");
        assert_eq!(error.error_code(), "MISSING_LOAD_DATA");
    }
}
