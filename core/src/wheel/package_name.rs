//! Package name newtype for wheel metadata and filenames.
//!
//! Validates names against the core metadata name format: ASCII letters,
//! digits, `.`, `_` and `-`, starting and ending with a letter or digit.
//! Matching is case-insensitive and the name is kept exactly as supplied.

use super::error::{Result, WheelError};
use std::fmt;

/// Characters allowed between the first and last character of a name.
const SEPARATORS: [char; 3] = ['.', '_', '-'];

/// A validated distribution package name.
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::package_name::PackageName;
///
/// let name: PackageName = "My-Tool".try_into().unwrap();
/// assert_eq!(name.as_str(), "My-Tool");
/// assert_eq!(name.filename_component(), "My_Tool");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    /// Return the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Return the name as it appears in wheel filenames and in the
    /// `.dist-info` / `.data` directory names.
    ///
    /// `-` is the field separator in wheel filenames, so it becomes `_`.
    #[must_use]
    pub fn filename_component(&self) -> String {
        self.0.replace('-', "_")
    }
}

impl TryFrom<&str> for PackageName {
    type Error = WheelError;

    fn try_from(value: &str) -> Result<Self> {
        validate_package_name(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for PackageName {
    type Error = WheelError;

    fn try_from(value: String) -> Result<Self> {
        validate_package_name(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed package name.
fn validate_package_name(value: &str) -> Result<()> {
    let invalid = |reason: String| WheelError::InvalidPackageName {
        value: value.to_owned(),
        reason,
    };

    let (Some(first), Some(last)) = (value.chars().next(), value.chars().last()) else {
        return Err(invalid("name must not be empty".to_owned()));
    };
    if let Some(bad) = value
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !SEPARATORS.contains(c))
    {
        return Err(invalid(format!(
            "character '{bad}' is not allowed; use ASCII letters, digits, '.', '_' or '-'"
        )));
    }
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(invalid(
            "name must start and end with an ASCII letter or digit".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::single_letter("a")]
    #[case::single_digit("7")]
    #[case::mixed_case("My-Tool")]
    #[case::all_separators("ruff.bin_x-86")]
    #[case::repeated_separators("a--b")]
    fn accepts_valid_names(#[case] name: &str) {
        let parsed = PackageName::try_from(name).expect("valid name");
        assert_eq!(parsed.as_str(), name);
    }

    #[rstest]
    #[case::empty("")]
    #[case::space_and_bang("bad name!")]
    #[case::leading_separator("-tool")]
    #[case::trailing_separator("tool.")]
    #[case::non_ascii("t\u{f6}ol")]
    #[case::slash("tool/evil")]
    fn rejects_invalid_names(#[case] name: &str) {
        let err = PackageName::try_from(name).expect_err("invalid name");
        assert!(
            matches!(err, WheelError::InvalidPackageName { ref value, .. } if value == name),
            "expected InvalidPackageName for {name:?}, got {err:?}"
        );
    }

    #[test]
    fn error_message_names_offending_character() {
        let err = PackageName::try_from("bad name!").expect_err("invalid name");
        assert!(err.to_string().contains("' '"), "message: {err}");
    }

    #[test]
    fn filename_component_replaces_hyphens_only() {
        let name = PackageName::try_from("My-Tool.cli_x").expect("valid");
        assert_eq!(name.filename_component(), "My_Tool.cli_x");
    }

    #[test]
    fn from_owned_string_accepts_valid() {
        let name = PackageName::try_from(String::from("ripgrep"));
        assert!(name.is_ok());
    }

    #[test]
    fn display_shows_inner_value() {
        let name = PackageName::try_from("ripgrep").expect("valid");
        assert_eq!(format!("{name}"), "ripgrep");
    }
}
