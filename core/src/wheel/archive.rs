//! Wheel archive writer.
//!
//! Writes every planned member into a zip archive with fixed timestamps,
//! hashes each member into RECORD as it is written, appends WHEEL and then
//! RECORD, and finally renames the finished archive into the output
//! directory. The archive is assembled in a hidden temporary file next to
//! its destination, so the final path only ever holds a complete wheel.

use super::layout::{ArchiveMember, FILE_MODE, WheelLayout, plan_members};
use super::naming::WheelName;
use super::packaging_error::PackagingError;
use super::record::{CHUNK_SIZE, Record, RecordEntry, RecordHash, RecordHasher};
use super::wheel_info::WheelInfo;
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Prefix of the temporary file the archive is assembled in.
const PARTIAL_PREFIX: &str = ".";

/// Suffix of the temporary file the archive is assembled in.
const PARTIAL_SUFFIX: &str = ".whl.part";

/// Identity of the wheel being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelSpec {
    /// Name, version and tags; determines the filename.
    pub name: WheelName,
    /// Generator identity written to WHEEL.
    pub generator: String,
}

impl WheelSpec {
    /// Describe a wheel produced by `generator`.
    #[must_use]
    pub fn new(name: WheelName, generator: impl Into<String>) -> Self {
        Self {
            name,
            generator: generator.into(),
        }
    }
}

/// Output produced by [`build_wheel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltWheel {
    /// Final path of the wheel.
    pub path: PathBuf,
    /// The RECORD written into the wheel, including its own entry.
    pub record: Record,
}

/// Build a wheel from a staged layout and move it into `output_dir`.
///
/// # Errors
///
/// Returns [`PackagingError::OutputDirNotWritable`] when the temporary
/// archive cannot be created in `output_dir`, [`PackagingError::Invalid`]
/// for an unusable layout, [`PackagingError::Walk`] when a staged
/// directory cannot be traversed, [`PackagingError::Io`] or
/// [`PackagingError::Zip`] when writing fails,
/// [`PackagingError::DuplicateMember`] or
/// [`PackagingError::RecordMismatch`] on internal inconsistencies, and
/// [`PackagingError::Persist`] when the final rename fails. On every error
/// the temporary archive is removed.
pub fn build_wheel(
    layout: &WheelLayout,
    spec: &WheelSpec,
    output_dir: &Path,
) -> Result<BuiltWheel, PackagingError> {
    let plan = plan_members(layout, &spec.name)?;
    let wheel_info = WheelInfo::new(
        spec.generator.clone(),
        plan.root_is_purelib,
        spec.name.tags(),
    );
    let dist_info_dir = spec.name.dist_info_dir();

    let mut partial = create_partial(output_dir)?;
    debug!(
        "assembling {} in {}",
        spec.name,
        partial.path().display()
    );

    let mut writer = WheelWriter::new(partial.as_file_mut());
    for member in &plan.members {
        writer.add_file(member)?;
    }
    writer.add_bytes(
        &format!("{dist_info_dir}/WHEEL"),
        wheel_info.render().as_bytes(),
        FILE_MODE,
    )?;
    let record = writer.finish(&spec.name.record_path())?;
    partial.as_file().sync_all()?;

    let final_path = output_dir.join(spec.name.filename());
    partial
        .persist(&final_path)
        .map_err(|err| PackagingError::Persist {
            path: final_path.clone(),
            source: err.error,
        })?;
    info!("wrote {}", final_path.display());
    Ok(BuiltWheel {
        path: final_path,
        record,
    })
}

/// Create the hidden temporary archive inside `output_dir`.
fn create_partial(output_dir: &Path) -> Result<tempfile::NamedTempFile, PackagingError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(PARTIAL_PREFIX).suffix(PARTIAL_SUFFIX);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(FILE_MODE));
    }
    builder
        .tempfile_in(output_dir)
        .map_err(|err| PackagingError::OutputDirNotWritable {
            path: output_dir.to_path_buf(),
            reason: err.to_string(),
        })
}

/// Zip writer that records every member it writes.
struct WheelWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    record: Record,
    written: HashSet<String>,
}

impl<W: Write + Seek> WheelWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            record: Record::new(),
            written: HashSet::new(),
        }
    }

    /// Options for one member: deflate, fixed 1980-01-01 timestamp.
    fn options(mode: u32) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(mode)
    }

    fn start(&mut self, archive_path: &str, mode: u32) -> Result<(), PackagingError> {
        if !self.written.insert(archive_path.to_owned()) {
            return Err(PackagingError::DuplicateMember(archive_path.to_owned()));
        }
        self.zip
            .start_file(archive_path, Self::options(mode))?;
        Ok(())
    }

    /// Stream a staged file into the archive, hashing it on the way.
    fn add_file(&mut self, member: &ArchiveMember) -> Result<(), PackagingError> {
        let mut source = fs::File::open(&member.source)?;
        self.start(&member.archive_path, member.mode)?;
        let mut hasher = RecordHasher::new();
        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            let bytes_read = source.read(&mut buffer)?;
            let Some(chunk) = buffer.get(..bytes_read) else {
                break;
            };
            if chunk.is_empty() {
                break;
            }
            hasher.update(chunk);
            self.zip.write_all(chunk)?;
        }
        let (hash, size) = hasher.finish();
        debug!("added {} ({size} bytes)", member.archive_path);
        self.record
            .push(RecordEntry::new(member.archive_path.clone(), hash, size));
        Ok(())
    }

    /// Write an in-memory member.
    fn add_bytes(&mut self, archive_path: &str, bytes: &[u8], mode: u32) -> Result<(), PackagingError> {
        self.start(archive_path, mode)?;
        self.zip.write_all(bytes)?;
        debug!("added {archive_path} ({} bytes)", bytes.len());
        self.record.push(RecordEntry::new(
            archive_path,
            RecordHash::of_bytes(bytes),
            bytes.len() as u64,
        ));
        Ok(())
    }

    /// Append RECORD with its own empty entry and close the archive.
    fn finish(mut self, record_path: &str) -> Result<Record, PackagingError> {
        self.record.push(RecordEntry::unverified(record_path));
        let text = self.record.render();
        self.start(record_path, FILE_MODE)?;
        self.zip.write_all(text.as_bytes())?;
        self.zip.finish()?;

        if self.record.len() != self.written.len() {
            return Err(PackagingError::RecordMismatch {
                recorded: self.record.len(),
                written: self.written.len(),
            });
        }
        Ok(self.record)
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
