//! Error types for active text.

use thiserror::Error;

/// Main error type for active text operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Pattern failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    PatternCompile {
        /// Pattern source
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Caller-supplied filter failed
    #[error("Filter for {kind} failed: {message}")]
    Filter {
        /// Kind the filter was installed for
        kind: String,
        /// Failure message
        message: String,
    },

    /// Unknown element kind name
    #[error("Invalid element kind: {0}")]
    InvalidKind(String),

    /// Range outside of the text
    #[error("Invalid range: {location}+{length} exceeds text length {text_length}")]
    InvalidRange {
        /// Range start
        location: usize,
        /// Range length
        length: usize,
        /// Text length in UTF-16 code units
        text_length: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parse errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_compile_error() {
        let err = Error::PatternCompile {
            pattern: "([".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid pattern '([': unclosed group");
    }

    #[test]
    fn test_filter_error() {
        let err = Error::Filter {
            kind: "mention".to_string(),
            message: "lookup failed".to_string(),
        };
        assert_eq!(err.to_string(), "Filter for mention failed: lookup failed");
    }

    #[test]
    fn test_invalid_kind_error() {
        let err = Error::InvalidKind("phone".to_string());
        assert_eq!(err.to_string(), "Invalid element kind: phone");
    }

    #[test]
    fn test_invalid_range_error() {
        let err = Error::InvalidRange {
            location: 4,
            length: 10,
            text_length: 8,
        };
        assert_eq!(
            err.to_string(),
            "Invalid range: 4+10 exceeds text length 8"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::Config("url_max_length must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: url_max_length must be > 0"
        );
    }

    #[test]
    fn test_other_error() {
        let err = Error::Other("unknown error".to_string());
        assert_eq!(err.to_string(), "unknown error");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<i32>>("{ not: [a list").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_error_debug() {
        let err = Error::InvalidKind("test".to_string());
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("InvalidKind"));
    }
}
