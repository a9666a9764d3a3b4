//! Error handling for the datmap library
//!
//! Absent keys are never errors: lookups and removals report them through
//! `Option` results. The error type below covers the conditions that can
//! actually fail an operation.

use thiserror::Error;

/// Main error type for the datmap library
#[derive(Error, Debug)]
pub enum DatmapError {
    /// Array growth would exceed the addressable state space
    #[error("state space exhausted: {requested} slots requested, limit {limit}")]
    StateSpace {
        /// Number of slots the operation needed
        requested: usize,
        /// Configured slot limit
        limit: usize,
    },

    /// Structural invariant violation detected during relocation or reclamation
    #[error("trie corruption: {message}")]
    Corruption {
        /// Description of the violated invariant
        message: String,
    },

    /// Configuration or parameter errors
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl DatmapError {
    /// Create a state-space exhaustion error
    pub fn state_space(requested: usize, limit: usize) -> Self {
        Self::StateSpace { requested, limit }
    }

    /// Create a corruption error
    pub fn corruption<S: Into<String>>(message: S) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// A state-space failure aborts only the attempted insertion; the map
    /// remains valid and usable. Corruption is fatal to the instance.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::StateSpace { .. } => true,
            Self::Corruption { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::StateSpace { .. } => "state_space",
            Self::Corruption { .. } => "corruption",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DatmapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DatmapError::state_space(1 << 31, 1 << 30);
        assert_eq!(err.category(), "state_space");
        assert!(err.is_recoverable());

        let err = DatmapError::corruption("dangling parent pointer");
        assert_eq!(err.category(), "corruption");
        assert!(!err.is_recoverable());

        let err = DatmapError::configuration("growth factor must exceed 1.0");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = DatmapError::state_space(2048, 1024);
        let display = format!("{}", err);
        assert!(display.contains("state space exhausted"));
        assert!(display.contains("2048"));
        assert!(display.contains("1024"));

        let err = DatmapError::corruption("check/base mismatch");
        let display = format!("{}", err);
        assert!(display.contains("trie corruption"));
        assert!(display.contains("check/base mismatch"));
    }

    #[test]
    fn test_error_debug() {
        let err = DatmapError::configuration("debug test");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Configuration"));
        assert!(debug_str.contains("debug test"));
    }
}
