//! Error types for wheel packaging operations.
//!
//! Covers I/O failures, archive encoding problems, validation errors, and
//! internal consistency violations that can occur while assembling a wheel.

use super::error::WheelError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors arising from wheel packaging operations.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// An I/O operation failed (reading sources, writing the archive).
    #[error("I/O error during packaging: {0}")]
    Io(#[from] std::io::Error),

    /// The zip encoder reported an error.
    #[error("archive encoding error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An input value failed validation.
    #[error(transparent)]
    Invalid(#[from] WheelError),

    /// A staged directory could not be traversed.
    #[error("cannot walk staged directory {}: {source}", .root.display())]
    Walk {
        /// The staged directory being walked.
        root: PathBuf,
        /// The traversal error, including symlink loops.
        #[source]
        source: walkdir::Error,
    },

    /// The executable to package does not exist.
    #[error("executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// The executable path exists but is not a regular file.
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// A staged path is not valid UTF-8 and cannot be named in the archive.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// The output directory cannot hold the archive.
    #[error("output directory {} is not writable: {reason}", .path.display())]
    OutputDirNotWritable {
        /// The output directory.
        path: PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// Two members map to the same archive path.
    #[error("duplicate archive member: {0}")]
    DuplicateMember(String),

    /// RECORD does not list exactly one entry per written member.
    #[error("RECORD lists {recorded} entries but {written} members were written")]
    RecordMismatch {
        /// Entries in RECORD, including its own.
        recorded: usize,
        /// Members written to the archive, including RECORD.
        written: usize,
    },

    /// The finished archive could not be moved to its final path.
    #[error("failed to move archive into place at {}: {source}", .path.display())]
    Persist {
        /// The final archive path.
        path: PathBuf,
        /// The underlying rename error.
        #[source]
        source: std::io::Error,
    },
}
