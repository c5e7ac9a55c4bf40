//! Error types for wheel naming, tagging, and metadata validation.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid wheel-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WheelError {
    /// The package name does not match the normalized name pattern.
    #[error("invalid package name \"{value}\": {reason}")]
    InvalidPackageName {
        /// The rejected name.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A compatibility tag token is empty or contains a separator.
    #[error("invalid {dimension} tag \"{value}\": {reason}")]
    InvalidTag {
        /// The tag dimension the token was supplied for.
        dimension: &'static str,
        /// The rejected token.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A tag dimension was supplied without any tokens.
    #[error("no {dimension} tags supplied; at least one is required")]
    EmptyTagSet {
        /// The tag dimension that was empty.
        dimension: &'static str,
    },

    /// The description content type is not one of the accepted values.
    #[error("unknown description content type \"{value}\"; expected one of: {expected}")]
    UnknownContentType {
        /// The rejected content type.
        value: String,
        /// Comma-separated list of accepted content types.
        expected: String,
    },

    /// The staged directory layout cannot be turned into a wheel.
    #[error("invalid wheel layout: {reason}")]
    InvalidLayout {
        /// Description of the layout problem.
        reason: String,
    },

    /// A METADATA document could not be parsed.
    #[error("malformed METADATA: {reason}")]
    MalformedMetadata {
        /// Description of the parse failure.
        reason: String,
    },

    /// A RECORD document could not be parsed.
    #[error("malformed RECORD line {line}: {reason}")]
    MalformedRecord {
        /// One-based line number of the offending entry.
        line: usize,
        /// Description of the parse failure.
        reason: String,
    },
}

/// Result type alias using [`WheelError`].
pub type Result<T> = std::result::Result<T, WheelError>;
