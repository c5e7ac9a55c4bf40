//! Verification of a finished wheel against its RECORD.
//!
//! Re-reads every member, recomputes its digest and size, and checks that
//! RECORD and the archive list exactly the same paths.

use super::error::WheelError;
use super::record::{Record, hash_reader};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

/// Errors found while verifying a wheel.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The wheel could not be read.
    #[error("I/O error during verification: {0}")]
    Io(#[from] io::Error),

    /// The wheel is not a readable zip archive.
    #[error("archive decoding error: {0}")]
    Zip(#[from] ZipError),

    /// No `.dist-info/RECORD` member exists.
    #[error("{} has no .dist-info/RECORD member", .0.display())]
    MissingRecord(PathBuf),

    /// RECORD exists but cannot be parsed.
    #[error(transparent)]
    MalformedRecord(#[from] WheelError),

    /// A member's digest differs from its RECORD entry.
    #[error("digest mismatch for {path}: RECORD has {recorded}, member hashes to {actual}")]
    DigestMismatch {
        /// Archive path of the member.
        path: String,
        /// Hash listed in RECORD.
        recorded: String,
        /// Hash of the member bytes.
        actual: String,
    },

    /// A member's size differs from its RECORD entry.
    #[error("size mismatch for {path}: RECORD has {recorded} bytes, member has {actual}")]
    SizeMismatch {
        /// Archive path of the member.
        path: String,
        /// Size listed in RECORD.
        recorded: u64,
        /// Size of the member bytes.
        actual: u64,
    },

    /// A member other than RECORD has no hash in RECORD.
    #[error("RECORD entry for {0} has no hash")]
    Unhashed(String),

    /// A member is missing from RECORD.
    #[error("member {0} is not listed in RECORD")]
    Unrecorded(String),

    /// RECORD lists a path the archive does not contain.
    #[error("RECORD lists {0} but the archive has no such member")]
    MissingMember(String),
}

/// A wheel whose members all match RECORD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedWheel {
    /// Member paths in archive order.
    pub members: Vec<String>,
    /// The parsed RECORD.
    pub record: Record,
}

/// Check every member of the wheel at `path` against its RECORD.
///
/// # Errors
///
/// Returns the first [`VerificationError`] found.
pub fn verify_wheel(path: &Path) -> Result<VerifiedWheel, VerificationError> {
    let mut archive = ZipArchive::new(fs::File::open(path)?)?;
    let members = member_names(&mut archive)?;
    let record_path = members
        .iter()
        .find(|name| is_record_path(name))
        .cloned()
        .ok_or_else(|| VerificationError::MissingRecord(path.to_path_buf()))?;

    let mut text = String::new();
    archive.by_name(&record_path)?.read_to_string(&mut text)?;
    let record = Record::parse(&text)?;

    for member in &members {
        let entry = record
            .get(member)
            .ok_or_else(|| VerificationError::Unrecorded(member.clone()))?;
        if *member == record_path {
            continue;
        }
        let recorded_hash = entry
            .hash()
            .ok_or_else(|| VerificationError::Unhashed(member.clone()))?;
        let (actual_hash, actual_size) = hash_reader(archive.by_name(member)?)?;
        if &actual_hash != recorded_hash {
            return Err(VerificationError::DigestMismatch {
                path: member.clone(),
                recorded: recorded_hash.to_string(),
                actual: actual_hash.to_string(),
            });
        }
        let recorded_size = entry.size().unwrap_or_default();
        if recorded_size != actual_size {
            return Err(VerificationError::SizeMismatch {
                path: member.clone(),
                recorded: recorded_size,
                actual: actual_size,
            });
        }
        debug!("verified {member}");
    }

    let present: HashSet<&str> = members.iter().map(String::as_str).collect();
    if let Some(missing) = record
        .entries()
        .iter()
        .find(|entry| !present.contains(entry.path()))
    {
        return Err(VerificationError::MissingMember(missing.path().to_owned()));
    }
    Ok(VerifiedWheel { members, record })
}

/// List file members in archive order, skipping directory entries.
fn member_names<R: io::Read + io::Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<String>, VerificationError> {
    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive.by_index(index)?;
        if !file.is_dir() {
            names.push(file.name().to_owned());
        }
    }
    Ok(names)
}

/// Whether `name` is `<dir>.dist-info/RECORD` at the archive root.
fn is_record_path(name: &str) -> bool {
    name.split_once('/')
        .is_some_and(|(dir, file)| dir.ends_with(".dist-info") && file == "RECORD")
}
