//! Staged directory layout and archive member planning.
//!
//! A build is described by one staged directory per layout category. The
//! library category (`platlib` or `purelib`) is unpacked at the archive root
//! and must contain a `.dist-info` directory; every other category lands
//! under `{name}-{version}.data/{category}/`.

use super::error::WheelError;
use super::naming::WheelName;
use super::packaging_error::PackagingError;
use camino::Utf8Path;
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Mode for members installed as plain files.
pub const FILE_MODE: u32 = 0o644;

/// Mode for members installed as executables.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Suffix identifying the staged metadata directory.
const DIST_INFO_SUFFIX: &str = ".dist-info";

/// Metadata files the archive writer generates itself; staged copies are
/// ignored.
const GENERATED_METADATA: [&str; 4] = ["RECORD", "INSTALLER", "SHARED", "WHEEL"];

/// Top-level staging directories and how installers treat their contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayoutCategory {
    /// Pure-Python library root.
    Purelib,
    /// Platform-specific library root.
    Platlib,
    /// Files installed onto the script path.
    Scripts,
    /// Files installed under the data prefix.
    Data,
    /// C headers.
    Headers,
}

impl LayoutCategory {
    /// Return the directory name used inside `.data`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purelib => "purelib",
            Self::Platlib => "platlib",
            Self::Scripts => "scripts",
            Self::Data => "data",
            Self::Headers => "headers",
        }
    }

    /// Whether this category is unpacked at the archive root.
    #[must_use]
    pub const fn is_library(self) -> bool {
        matches!(self, Self::Purelib | Self::Platlib)
    }
}

impl fmt::Display for LayoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staged source directory per layout category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WheelLayout {
    roots: BTreeMap<LayoutCategory, PathBuf>,
}

impl WheelLayout {
    /// Create an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the staged directory for `category`.
    #[must_use]
    pub fn with_category(mut self, category: LayoutCategory, dir: impl Into<PathBuf>) -> Self {
        self.roots.insert(category, dir.into());
        self
    }

    /// Return the staged directory for `category`.
    #[must_use]
    pub fn get(&self, category: LayoutCategory) -> Option<&Path> {
        self.roots.get(&category).map(PathBuf::as_path)
    }

    /// Return the single library category and its directory.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::InvalidLayout`] unless exactly one of
    /// `purelib` and `platlib` is present.
    pub fn library_root(&self) -> Result<(LayoutCategory, &Path), WheelError> {
        let mut libraries = self
            .roots
            .iter()
            .filter(|(category, _)| category.is_library());
        match (libraries.next(), libraries.next()) {
            (Some((category, dir)), None) => Ok((*category, dir.as_path())),
            (None, _) => Err(WheelError::InvalidLayout {
                reason: "a purelib or platlib directory is required".to_owned(),
            }),
            (Some(_), Some(_)) => Err(WheelError::InvalidLayout {
                reason: "purelib and platlib cannot both be given".to_owned(),
            }),
        }
    }
}

/// One file destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Forward-slash path inside the archive.
    pub archive_path: String,
    /// File to read the content from.
    pub source: PathBuf,
    /// Unix permission bits stored for the member.
    pub mode: u32,
}

/// The ordered members of a wheel, excluding the generated WHEEL and
/// RECORD files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPlan {
    /// Members in the order they are written.
    pub members: Vec<ArchiveMember>,
    /// Whether the library root is `purelib`.
    pub root_is_purelib: bool,
}

/// Walk every staged directory and produce the deterministic member order.
///
/// Members are sorted by path depth and then by archive path, with
/// `.dist-info` members after everything else.
///
/// # Errors
///
/// Returns [`PackagingError::Invalid`] for an unusable layout,
/// [`PackagingError::NonUtf8Path`] for a path that cannot be named in the
/// archive, and [`PackagingError::Walk`] when a staged directory cannot be
/// traversed or contains a symlink loop.
pub fn plan_members(layout: &WheelLayout, name: &WheelName) -> Result<MemberPlan, PackagingError> {
    let (library, library_dir) = layout.library_root()?;
    let dist_info_source = find_dist_info(library_dir)?;
    let data_dir = name.data_dir();
    let dist_info_dir = name.dist_info_dir();

    let mut members = Vec::new();
    for (category, root) in &layout.roots {
        if category.is_library() {
            continue;
        }
        for source in walk_files(root)? {
            let relative = archive_relative(root, &source)?;
            let mode = member_mode(*category, &source)?;
            members.push(ArchiveMember {
                archive_path: format!("{data_dir}/{category}/{relative}"),
                source,
                mode,
            });
        }
    }

    for source in walk_files(library_dir)? {
        if source.starts_with(&dist_info_source) {
            continue;
        }
        let relative = archive_relative(library_dir, &source)?;
        members.push(ArchiveMember {
            archive_path: relative,
            source,
            mode: FILE_MODE,
        });
    }

    for source in list_files(&dist_info_source)? {
        let file_name = archive_relative(&dist_info_source, &source)?;
        if GENERATED_METADATA.contains(&file_name.as_str()) {
            debug!("ignoring staged {file_name}; it is generated");
            continue;
        }
        members.push(ArchiveMember {
            archive_path: format!("{dist_info_dir}/{file_name}"),
            source,
            mode: FILE_MODE,
        });
    }

    members.sort_by(|a, b| sort_key(&a.archive_path).cmp(&sort_key(&b.archive_path)));
    for member in &members {
        debug!(
            "planned {} ({:o}) from {}",
            member.archive_path,
            member.mode,
            member.source.display()
        );
    }
    Ok(MemberPlan {
        members,
        root_is_purelib: library == LayoutCategory::Purelib,
    })
}

/// Ordering key: `.dist-info` last, then depth, then path.
fn sort_key(archive_path: &str) -> (bool, usize, &str) {
    (
        archive_path.contains(DIST_INFO_SUFFIX),
        archive_path.matches('/').count(),
        archive_path,
    )
}

/// Locate the single top-level `.dist-info` directory of a library root.
fn find_dist_info(library_dir: &Path) -> Result<PathBuf, PackagingError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(library_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| walk_error(library_dir, source))?;
        if entry.file_type().is_dir()
            && entry
                .file_name()
                .to_string_lossy()
                .ends_with(DIST_INFO_SUFFIX)
        {
            found.push(entry.into_path());
        }
    }
    match found.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(WheelError::InvalidLayout {
            reason: format!("no .dist-info directory in {}", library_dir.display()),
        }
        .into()),
        _ => Err(WheelError::InvalidLayout {
            reason: format!(
                "more than one .dist-info directory in {}",
                library_dir.display()
            ),
        }
        .into()),
    }
}

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, PackagingError> {
    collect_files(WalkDir::new(dir).max_depth(1), dir)
}

/// Every regular file under `dir`, recursively, sorted by path.
///
/// Symlinks are followed; a link back to an ancestor is reported as a
/// [`PackagingError::Walk`] naming both ends of the loop.
fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, PackagingError> {
    collect_files(WalkDir::new(dir), dir)
}

fn collect_files(walker: WalkDir, root: &Path) -> Result<Vec<PathBuf>, PackagingError> {
    let mut files = Vec::new();
    for entry in walker.follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| walk_error(root, source))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn walk_error(root: &Path, source: walkdir::Error) -> PackagingError {
    PackagingError::Walk {
        root: root.to_path_buf(),
        source,
    }
}

/// Express `path` relative to `root` as a forward-slash UTF-8 string.
fn archive_relative(root: &Path, path: &Path) -> Result<String, PackagingError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PackagingError::NonUtf8Path(path.to_path_buf()))?;
    let relative = Utf8Path::from_path(relative)
        .ok_or_else(|| PackagingError::NonUtf8Path(path.to_path_buf()))?;
    Ok(relative
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Unix mode stored for a member of `category`.
///
/// Scripts keep their executable bit; everything else is a plain file.
fn member_mode(category: LayoutCategory, source: &Path) -> Result<u32, PackagingError> {
    if category == LayoutCategory::Scripts && is_executable(&fs::metadata(source)?) {
        Ok(EXECUTABLE_MODE)
    } else {
        Ok(FILE_MODE)
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::package_name::PackageName;
    use crate::wheel::tags::resolve;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn wheel_name() -> WheelName {
        WheelName::new(
            PackageName::try_from("my-tool").expect("valid"),
            "1.0",
            resolve(&["py3"], &["none"], &["any"]).expect("valid"),
        )
    }

    #[fixture]
    fn staged() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("platlib/.dist-info")).expect("mkdir");
        fs::write(root.join("platlib/.dist-info/METADATA"), b"meta").expect("write");
        fs::write(root.join("platlib/.dist-info/RECORD"), b"stale").expect("write");
        fs::create_dir_all(root.join("platlib/pkg/sub")).expect("mkdir");
        fs::write(root.join("platlib/pkg/sub/deep.txt"), b"deep").expect("write");
        fs::write(root.join("platlib/top.txt"), b"top").expect("write");
        fs::create_dir_all(root.join("scripts")).expect("mkdir");
        fs::write(root.join("scripts/tool"), b"#!bin").expect("write");
        dir
    }

    fn layout_for(dir: &TempDir) -> WheelLayout {
        WheelLayout::new()
            .with_category(LayoutCategory::Platlib, dir.path().join("platlib"))
            .with_category(LayoutCategory::Scripts, dir.path().join("scripts"))
    }

    #[rstest]
    fn plan_orders_by_depth_with_dist_info_last(staged: TempDir, wheel_name: WheelName) {
        let plan = plan_members(&layout_for(&staged), &wheel_name).expect("plan");
        let paths: Vec<&str> = plan
            .members
            .iter()
            .map(|m| m.archive_path.as_str())
            .collect();
        assert_eq!(
            paths,
            [
                "top.txt",
                "my_tool-1.0.data/scripts/tool",
                "pkg/sub/deep.txt",
                "my_tool-1.0.dist-info/METADATA",
            ]
        );
        assert!(!plan.root_is_purelib);
    }

    #[cfg(unix)]
    #[rstest]
    fn scripts_keep_their_executable_bit(staged: TempDir, wheel_name: WheelName) {
        use std::os::unix::fs::PermissionsExt;

        let script = staged.path().join("scripts/tool");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o700)).expect("chmod");
        let plan = plan_members(&layout_for(&staged), &wheel_name).expect("plan");
        let modes: BTreeMap<&str, u32> = plan
            .members
            .iter()
            .map(|m| (m.archive_path.as_str(), m.mode))
            .collect();
        assert_eq!(modes["my_tool-1.0.data/scripts/tool"], EXECUTABLE_MODE);
        assert_eq!(modes["top.txt"], FILE_MODE);

        fs::set_permissions(&script, fs::Permissions::from_mode(0o600)).expect("chmod");
        let plan = plan_members(&layout_for(&staged), &wheel_name).expect("plan");
        let script_member = plan
            .members
            .iter()
            .find(|m| m.archive_path.ends_with("scripts/tool"))
            .expect("script planned");
        assert_eq!(script_member.mode, FILE_MODE);
    }

    #[rstest]
    fn missing_library_root_is_rejected(staged: TempDir, wheel_name: WheelName) {
        let layout =
            WheelLayout::new().with_category(LayoutCategory::Scripts, staged.path().join("scripts"));
        let err = plan_members(&layout, &wheel_name).expect_err("no library root");
        assert!(matches!(
            err,
            PackagingError::Invalid(WheelError::InvalidLayout { .. })
        ));
    }

    #[rstest]
    fn both_library_roots_are_rejected(staged: TempDir) {
        let layout = layout_for(&staged)
            .with_category(LayoutCategory::Purelib, staged.path().join("platlib"));
        assert!(layout.library_root().is_err());
    }

    #[rstest]
    fn missing_dist_info_is_rejected(wheel_name: WheelName) {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("purelib")).expect("mkdir");
        let layout =
            WheelLayout::new().with_category(LayoutCategory::Purelib, dir.path().join("purelib"));
        let err = plan_members(&layout, &wheel_name).expect_err("no dist-info");
        assert!(err.to_string().contains("no .dist-info directory"));
    }

    #[rstest]
    fn purelib_root_is_reported(wheel_name: WheelName) {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("purelib/x.dist-info")).expect("mkdir");
        let layout =
            WheelLayout::new().with_category(LayoutCategory::Purelib, dir.path().join("purelib"));
        let plan = plan_members(&layout, &wheel_name).expect("plan");
        assert!(plan.root_is_purelib);
        assert!(plan.members.is_empty());
    }

    #[cfg(unix)]
    #[rstest]
    fn symlinked_files_are_followed(staged: TempDir, wheel_name: WheelName) {
        let data = staged.path().join("data");
        fs::create_dir_all(&data).expect("mkdir");
        fs::write(staged.path().join("shared.cfg"), b"cfg").expect("write");
        std::os::unix::fs::symlink("../shared.cfg", data.join("tool.cfg")).expect("symlink");
        let layout = layout_for(&staged).with_category(LayoutCategory::Data, data.clone());

        let plan = plan_members(&layout, &wheel_name).expect("plan");
        let member = plan
            .members
            .iter()
            .find(|m| m.archive_path == "my_tool-1.0.data/data/tool.cfg")
            .expect("linked file planned");
        assert_eq!(member.source, data.join("tool.cfg"));
    }

    #[cfg(unix)]
    #[rstest]
    fn symlink_cycle_names_the_staged_root(staged: TempDir, wheel_name: WheelName) {
        let data = staged.path().join("data");
        fs::create_dir_all(data.join("sub")).expect("mkdir");
        std::os::unix::fs::symlink("..", data.join("sub/loop")).expect("symlink");
        let layout = layout_for(&staged).with_category(LayoutCategory::Data, data.clone());

        let err = plan_members(&layout, &wheel_name).expect_err("cycle detected");
        match err {
            PackagingError::Walk { root, source } => {
                assert_eq!(root, data);
                assert!(source.loop_ancestor().is_some(), "expected a loop: {source}");
            }
            other => panic!("expected a walk error, got {other:?}"),
        }
    }

    #[test]
    fn sort_key_places_dist_info_after_deeper_paths() {
        assert!(sort_key("a/b/c/d") < sort_key("x.dist-info/METADATA"));
        assert!(sort_key("b") < sort_key("a/b"));
    }
}
