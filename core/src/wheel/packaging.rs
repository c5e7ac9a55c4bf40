//! Packaging of a single executable into a wheel.
//!
//! Stages the composed METADATA and the executable into a scratch
//! directory laid out as `platlib/.dist-info/` and `scripts/`, then hands
//! the layout to [`build_wheel`]. The scratch directory is removed on every
//! exit path and the caller's executable is never modified.

use super::archive::{BuiltWheel, WheelSpec, build_wheel};
use super::layout::{LayoutCategory, WheelLayout};
use super::metadata::DistributionRecord;
use super::naming::WheelName;
use super::packaging_error::PackagingError;
use super::record::Record;
use super::tags::TagTriple;
use super::wheel_info::default_generator;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Input parameters for [`package_executable`].
#[derive(Debug, Clone)]
pub struct PackageParams {
    /// The executable to ship under `scripts/`.
    pub executable: PathBuf,
    /// Name, version and metadata fields.
    pub record: DistributionRecord,
    /// Compatibility tags; the platform is chosen by the caller.
    pub tags: TagTriple,
    /// Directory the wheel is written to. Must already exist.
    pub output_dir: PathBuf,
}

/// Output produced by [`package_executable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutput {
    /// Path to the created wheel.
    pub archive_path: PathBuf,
    /// Name, version and tags of the wheel.
    pub wheel_name: WheelName,
    /// RECORD entries written into the wheel.
    pub record: Record,
}

/// How an executable ended up in the scratch directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMethod {
    /// The scratch path is a hard link to the source.
    HardLink,
    /// The source was copied.
    Copy,
}

/// Places the executable into the scratch `scripts` directory.
#[cfg_attr(test, mockall::automock)]
pub trait ExecutableStager {
    /// Make the content of `source` available at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be staged.
    fn stage(&self, source: &Path, dest: &Path) -> io::Result<StageMethod>;
}

/// Hard-links the executable, copying it when linking is not possible
/// (for example across filesystems).
///
/// Symlinks are resolved first, so the staged file always holds the
/// target's content rather than a link that may dangle once moved.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOrCopy;

impl ExecutableStager for LinkOrCopy {
    fn stage(&self, source: &Path, dest: &Path) -> io::Result<StageMethod> {
        let resolved = fs::canonicalize(source)?;
        if resolved != source {
            debug!("{} resolves to {}", source.display(), resolved.display());
        }
        match fs::hard_link(&resolved, dest) {
            Ok(()) => Ok(StageMethod::HardLink),
            Err(link_err) => {
                warn!(
                    "cannot hard-link {} ({link_err}); copying instead",
                    resolved.display()
                );
                fs::copy(&resolved, dest)?;
                Ok(StageMethod::Copy)
            }
        }
    }
}

/// Package an executable into a wheel in `params.output_dir`.
///
/// # Errors
///
/// Returns [`PackagingError::ExecutableNotFound`] or
/// [`PackagingError::NotAFile`] before anything is created, and any error
/// from staging or [`build_wheel`] afterwards.
///
/// # Examples
///
/// ```no_run
/// use anybin2wheel_core::wheel::metadata::DistributionRecord;
/// use anybin2wheel_core::wheel::package_name::PackageName;
/// use anybin2wheel_core::wheel::packaging::{PackageParams, package_executable};
/// use anybin2wheel_core::wheel::tags::resolve;
///
/// let name = PackageName::try_from("mytool").unwrap();
/// let output = package_executable(&PackageParams {
///     executable: "target/release/mytool".into(),
///     record: DistributionRecord::new(name, "1.0.0"),
///     tags: resolve(&["py3"], &["none"], &["linux_x86_64"]).unwrap(),
///     output_dir: "dist".into(),
/// })
/// .unwrap();
/// println!("{}", output.archive_path.display());
/// ```
pub fn package_executable(params: &PackageParams) -> Result<PackageOutput, PackagingError> {
    package_executable_with(params, &LinkOrCopy)
}

/// Package an executable using `stager` to place it in the scratch tree.
///
/// # Errors
///
/// See [`package_executable`].
pub fn package_executable_with(
    params: &PackageParams,
    stager: &dyn ExecutableStager,
) -> Result<PackageOutput, PackagingError> {
    let script_name = check_executable(&params.executable)?;
    let wheel_name = WheelName::new(
        params.record.name().clone(),
        params.record.version(),
        params.tags.clone(),
    );

    let scratch = tempfile::TempDir::new()?;
    let platlib = scratch.path().join(LayoutCategory::Platlib.as_str());
    let scripts = scratch.path().join(LayoutCategory::Scripts.as_str());
    let dist_info = platlib.join(".dist-info");
    fs::create_dir_all(&dist_info)?;
    fs::create_dir_all(&scripts)?;

    fs::write(dist_info.join("METADATA"), params.record.compose())?;
    let method = stager.stage(&params.executable, &scripts.join(script_name))?;
    debug!(
        "staged {} into {} ({method:?})",
        params.executable.display(),
        scratch.path().display()
    );

    let layout = WheelLayout::new()
        .with_category(LayoutCategory::Platlib, platlib)
        .with_category(LayoutCategory::Scripts, scripts);
    let spec = WheelSpec::new(wheel_name.clone(), default_generator());
    let BuiltWheel { path, record } = build_wheel(&layout, &spec, &params.output_dir)?;

    Ok(PackageOutput {
        archive_path: path,
        wheel_name,
        record,
    })
}

/// Check that `executable` is an existing regular file and return its
/// base name.
///
/// # Errors
///
/// Returns [`PackagingError::ExecutableNotFound`],
/// [`PackagingError::NotAFile`], [`PackagingError::NonUtf8Path`] for a
/// name that cannot appear in the archive, or [`PackagingError::Io`].
pub fn check_executable(executable: &Path) -> Result<&str, PackagingError> {
    let meta = match fs::metadata(executable) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(PackagingError::ExecutableNotFound(executable.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    if !meta.is_file() {
        return Err(PackagingError::NotAFile(executable.to_path_buf()));
    }
    executable
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PackagingError::NonUtf8Path(executable.to_path_buf()))
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
