//! Error types for the anybin2wheel CLI.
//!
//! Wraps library errors and maps each one to a process exit status:
//! rejected input exits with 2, failed builds with 1.

use anybin2wheel_core::wheel::error::WheelError;
use anybin2wheel_core::wheel::packaging_error::PackagingError;
use anybin2wheel_core::wheel::verification::VerificationError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Exit status for rejected input.
pub const EXIT_INVALID_INPUT: i32 = 2;

/// Exit status for a build that failed after validation.
pub const EXIT_BUILD_FAILED: i32 = 1;

/// Errors returned by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// A name, tag or metadata value failed validation.
    #[error(transparent)]
    Invalid(#[from] WheelError),

    /// `--description-file` could not be read.
    #[error("cannot read description file {path}: {source}")]
    DescriptionFile {
        /// The path given on the command line.
        path: Utf8PathBuf,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    DistDir {
        /// The directory given with `--dist-dir`.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Building the wheel failed.
    #[error(transparent)]
    Packaging(#[from] PackagingError),

    /// The wheel path could not be written to stdout.
    #[error("cannot write output: {source}")]
    WriteFailed {
        /// The underlying write error.
        #[source]
        source: std::io::Error,
    },

    /// The finished wheel does not match its RECORD.
    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),
}

impl CliError {
    /// Return the process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Invalid(_)
            | Self::DescriptionFile { .. }
            | Self::Packaging(
                PackagingError::ExecutableNotFound(_)
                | PackagingError::NotAFile(_)
                | PackagingError::NonUtf8Path(_),
            ) => EXIT_INVALID_INPUT,
            Self::DistDir { .. }
            | Self::Packaging(_)
            | Self::WriteFailed { .. }
            | Self::Verification(_) => EXIT_BUILD_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io;
    use std::path::PathBuf;

    fn invalid_name() -> CliError {
        CliError::Invalid(WheelError::InvalidPackageName {
            value: "bad name!".to_owned(),
            reason: "contains ' '".to_owned(),
        })
    }

    #[rstest]
    #[case(invalid_name(), EXIT_INVALID_INPUT)]
    #[case(
        CliError::Packaging(PackagingError::ExecutableNotFound(PathBuf::from("x"))),
        EXIT_INVALID_INPUT
    )]
    #[case(
        CliError::Packaging(PackagingError::Io(io::Error::other("disk"))),
        EXIT_BUILD_FAILED
    )]
    #[case(
        CliError::DistDir {
            path: Utf8PathBuf::from("dist"),
            source: io::Error::other("read-only"),
        },
        EXIT_BUILD_FAILED
    )]
    #[case(
        CliError::WriteFailed {
            source: io::ErrorKind::BrokenPipe.into(),
        },
        EXIT_BUILD_FAILED
    )]
    #[case(
        CliError::Verification(VerificationError::Unrecorded("x".to_owned())),
        EXIT_BUILD_FAILED
    )]
    fn exit_codes(#[case] err: CliError, #[case] expected: i32) {
        assert_eq!(err.exit_code(), expected);
    }

    #[test]
    fn validation_message_is_passed_through() {
        assert_eq!(
            invalid_name().to_string(),
            "invalid package name \"bad name!\": contains ' '"
        );
    }
}
