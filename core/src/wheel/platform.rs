//! Host platform tag derivation.
//!
//! The tag resolver never reads host state itself. Callers that want the
//! "current platform" default call [`host_platform_tag`] and pass the result
//! in explicitly, which keeps the engine testable on any host.

use super::error::Result;
use super::tags::{TagDimension, TagSet};

/// Return the platform tag for the host this binary was compiled for.
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::platform::host_platform_tag;
///
/// let tag = host_platform_tag();
/// assert!(!tag.contains('-'));
/// assert!(!tag.contains('.'));
/// ```
#[must_use]
pub fn host_platform_tag() -> String {
    platform_tag(std::env::consts::OS, std::env::consts::ARCH)
}

/// Return the host platform tag as a validated [`TagSet`].
///
/// # Errors
///
/// Returns [`super::error::WheelError::InvalidTag`] if the derived tag is
/// not a valid token, which only happens on unusual hosts.
pub fn host_platform_tags() -> Result<TagSet> {
    TagSet::new(TagDimension::Platform, [host_platform_tag()])
}

/// Map an operating system and CPU architecture, as reported by
/// [`std::env::consts`], to a wheel platform tag.
#[must_use]
pub fn platform_tag(os: &str, arch: &str) -> String {
    let tag = match (os, arch) {
        ("windows", "x86_64") => "win_amd64".to_owned(),
        ("windows", "aarch64") => "win_arm64".to_owned(),
        ("windows", "x86") => "win32".to_owned(),
        ("macos", "aarch64") => "macosx_11_0_arm64".to_owned(),
        ("macos", "x86_64") => "macosx_10_12_x86_64".to_owned(),
        ("linux", arch) => format!("linux_{}", linux_machine(arch)),
        (os, arch) => format!("{os}_{arch}"),
    };
    sanitise(&tag)
}

/// Translate Rust architecture names to the `uname -m` spelling used in
/// Linux platform tags.
fn linux_machine(arch: &str) -> &str {
    match arch {
        "x86" => "i686",
        "arm" => "armv7l",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Replace tag separators with `_`.
fn sanitise(tag: &str) -> String {
    tag.chars()
        .map(|c| if c == '-' || c == '.' { '_' } else { c })
        .collect()
}
