//! Wheel naming policy.
//!
//! Constructs the deterministic wheel filename
//! `{name}-{version}-{interpreter}-{abi}-{platform}.whl` together with the
//! `.dist-info` and `.data` directory names used inside the archive.

use super::package_name::PackageName;
use super::tags::TagTriple;
use std::fmt;

/// The fixed file extension for wheel archives.
pub const WHEEL_EXTENSION: &str = ".whl";

/// A fully-qualified wheel name.
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::naming::WheelName;
/// use anybin2wheel_core::wheel::package_name::PackageName;
/// use anybin2wheel_core::wheel::tags::resolve;
///
/// let name: PackageName = "My-Tool".try_into().expect("valid name");
/// let tags = resolve(&["py3"], &["none"], &["any"]).expect("valid tags");
///
/// let wheel = WheelName::new(name, "1.0.0", tags);
/// assert_eq!(wheel.filename(), "My_Tool-1.0.0-py3-none-any.whl");
/// assert_eq!(wheel.dist_info_dir(), "My_Tool-1.0.0.dist-info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    name: PackageName,
    version: String,
    tags: TagTriple,
}

impl WheelName {
    /// Create a wheel name from validated components.
    ///
    /// The version is opaque and used verbatim.
    #[must_use]
    pub fn new(name: PackageName, version: impl Into<String>, tags: TagTriple) -> Self {
        Self {
            name,
            version: version.into(),
            tags,
        }
    }

    /// Return the package name component.
    #[must_use]
    pub const fn name(&self) -> &PackageName {
        &self.name
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the compatibility tags.
    #[must_use]
    pub const fn tags(&self) -> &TagTriple {
        &self.tags
    }

    /// Return `{name}-{version}` with the name in filename form.
    #[must_use]
    pub fn distribution(&self) -> String {
        format!("{}-{}", self.name.filename_component(), self.version)
    }

    /// Return the metadata directory name inside the archive.
    #[must_use]
    pub fn dist_info_dir(&self) -> String {
        format!("{}.dist-info", self.distribution())
    }

    /// Return the data directory name inside the archive.
    #[must_use]
    pub fn data_dir(&self) -> String {
        format!("{}.data", self.distribution())
    }

    /// Return the archive-relative path of the RECORD file.
    #[must_use]
    pub fn record_path(&self) -> String {
        format!("{}/RECORD", self.dist_info_dir())
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}{}",
            self.distribution(),
            self.tags.filename_tag(),
            WHEEL_EXTENSION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::tags::resolve;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sample_name() -> WheelName {
        WheelName::new(
            PackageName::try_from("My-Tool").expect("valid name"),
            "1.0.0",
            resolve(&["py3"], &["none"], &["any"]).expect("valid tags"),
        )
    }

    #[rstest]
    fn filename_replaces_hyphens_in_name_only(sample_name: WheelName) {
        assert_eq!(sample_name.filename(), "My_Tool-1.0.0-py3-none-any.whl");
    }

    #[rstest]
    fn filename_matches_display(sample_name: WheelName) {
        assert_eq!(sample_name.filename(), sample_name.to_string());
    }

    #[rstest]
    fn internal_directories_share_the_distribution_prefix(sample_name: WheelName) {
        assert_eq!(sample_name.distribution(), "My_Tool-1.0.0");
        assert_eq!(sample_name.dist_info_dir(), "My_Tool-1.0.0.dist-info");
        assert_eq!(sample_name.data_dir(), "My_Tool-1.0.0.data");
        assert_eq!(sample_name.record_path(), "My_Tool-1.0.0.dist-info/RECORD");
    }

    #[rstest]
    fn accessors_return_components(sample_name: WheelName) {
        assert_eq!(sample_name.name().as_str(), "My-Tool");
        assert_eq!(sample_name.version(), "1.0.0");
        assert_eq!(sample_name.tags().tag_string(), "py3-none-any");
    }

    #[test]
    fn different_platforms_produce_different_names() {
        let name = PackageName::try_from("tool").expect("valid");
        let linux = WheelName::new(
            name.clone(),
            "2.0",
            resolve(&["py3"], &["none"], &["linux_x86_64"]).expect("valid"),
        );
        let windows = WheelName::new(
            name,
            "2.0",
            resolve(&["py3"], &["none"], &["win_amd64"]).expect("valid"),
        );
        assert_ne!(linux.filename(), windows.filename());
    }
}
