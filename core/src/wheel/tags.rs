//! Compatibility tag resolution.
//!
//! A wheel is tagged along three dimensions: interpreter, ABI and platform.
//! Each dimension holds one or more tokens joined with `.`, and the three
//! dimensions are joined with `-`. Tokens therefore may contain neither
//! separator; they are restricted to ASCII letters, digits and `_`.

use super::error::{Result, WheelError};
use std::fmt;

/// Interpreter tokens used when the caller supplies none.
pub const DEFAULT_INTERPRETER_TAGS: [&str; 2] = ["py2", "py3"];

/// ABI token used when the caller supplies none.
pub const DEFAULT_ABI_TAG: &str = "none";

/// Separator between tokens of one dimension.
const TOKEN_SEPARATOR: char = '.';

/// Separator between dimensions.
const DIMENSION_SEPARATOR: char = '-';

/// One of the three compatibility dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagDimension {
    /// Interpreter compatibility, e.g. `py3`.
    Interpreter,
    /// Binary interface compatibility, e.g. `none`.
    Abi,
    /// Platform compatibility, e.g. `linux_x86_64`.
    Platform,
}

impl TagDimension {
    /// Human-readable dimension name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interpreter => "interpreter",
            Self::Abi => "ABI",
            Self::Platform => "platform",
        }
    }
}

impl fmt::Display for TagDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, non-empty set of validated tokens for one dimension.
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::tags::{TagDimension, TagSet};
///
/// let py = TagSet::parse(TagDimension::Interpreter, "py2.py3").unwrap();
/// assert_eq!(py.tokens(), ["py2", "py3"]);
/// assert_eq!(py.to_string(), "py2.py3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagSet {
    dimension: TagDimension,
    tokens: Vec<String>,
}

impl TagSet {
    /// Build a tag set from individual tokens.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::EmptyTagSet`] when `tokens` is empty and
    /// [`WheelError::InvalidTag`] when a token is empty, contains a
    /// character other than ASCII letters, digits or `_`, or repeats an
    /// earlier token.
    pub fn new<I, S>(dimension: TagDimension, tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut validated: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            validate_token(dimension, token)?;
            if validated.iter().any(|seen| seen == token) {
                return Err(WheelError::InvalidTag {
                    dimension: dimension.as_str(),
                    value: token.to_owned(),
                    reason: "token is listed more than once".to_owned(),
                });
            }
            validated.push(token.to_owned());
        }
        if validated.is_empty() {
            return Err(WheelError::EmptyTagSet {
                dimension: dimension.as_str(),
            });
        }
        Ok(Self {
            dimension,
            tokens: validated,
        })
    }

    /// Parse the dotted form used on the command line, e.g. `py2.py3`.
    ///
    /// # Errors
    ///
    /// Same as [`TagSet::new`].
    pub fn parse(dimension: TagDimension, dotted: &str) -> Result<Self> {
        Self::new(dimension, dotted.split(TOKEN_SEPARATOR))
    }

    /// The universal interpreter set `py2.py3`.
    #[must_use]
    pub fn universal_interpreter() -> Self {
        Self {
            dimension: TagDimension::Interpreter,
            tokens: DEFAULT_INTERPRETER_TAGS.map(str::to_owned).to_vec(),
        }
    }

    /// The ABI set `none`: a bundled executable makes no assumption about
    /// an embedding interpreter's binary interface.
    #[must_use]
    pub fn no_abi() -> Self {
        Self {
            dimension: TagDimension::Abi,
            tokens: vec![DEFAULT_ABI_TAG.to_owned()],
        }
    }

    /// Return the dimension these tokens belong to.
    #[must_use]
    pub const fn dimension(&self) -> TagDimension {
        self.dimension
    }

    /// Return the tokens in the order they were supplied.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                write!(f, "{TOKEN_SEPARATOR}")?;
            }
            f.write_str(token)?;
            first = false;
        }
        Ok(())
    }
}

/// The resolved interpreter, ABI and platform tag sets of a wheel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagTriple {
    interpreter: TagSet,
    abi: TagSet,
    platform: TagSet,
}

impl TagTriple {
    /// Combine three tag sets.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::InvalidTag`] when a set was built for a
    /// different dimension than the slot it is passed in.
    pub fn new(interpreter: TagSet, abi: TagSet, platform: TagSet) -> Result<Self> {
        for (set, expected) in [
            (&interpreter, TagDimension::Interpreter),
            (&abi, TagDimension::Abi),
            (&platform, TagDimension::Platform),
        ] {
            if set.dimension != expected {
                return Err(WheelError::InvalidTag {
                    dimension: expected.as_str(),
                    value: set.to_string(),
                    reason: format!("tag set was built for the {} dimension", set.dimension),
                });
            }
        }
        Ok(Self {
            interpreter,
            abi,
            platform,
        })
    }

    /// Combine the default interpreter and ABI sets with `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::InvalidTag`] when `platform` was built for
    /// another dimension.
    pub fn with_defaults(platform: TagSet) -> Result<Self> {
        Self::new(TagSet::universal_interpreter(), TagSet::no_abi(), platform)
    }

    /// Return the interpreter tag set.
    #[must_use]
    pub const fn interpreter(&self) -> &TagSet {
        &self.interpreter
    }

    /// Return the ABI tag set.
    #[must_use]
    pub const fn abi(&self) -> &TagSet {
        &self.abi
    }

    /// Return the platform tag set.
    #[must_use]
    pub const fn platform(&self) -> &TagSet {
        &self.platform
    }

    /// Return the compressed tag string, e.g. `py2.py3-none-any`.
    #[must_use]
    pub fn tag_string(&self) -> String {
        self.to_string()
    }

    /// Return the tag string as embedded in the wheel filename.
    ///
    /// Tokens never contain `-`, so this equals [`TagTriple::tag_string`].
    #[must_use]
    pub fn filename_tag(&self) -> String {
        self.tag_string()
    }

    /// Expand the compressed tag set into every concrete
    /// `interpreter-abi-platform` combination, in input order.
    #[must_use]
    pub fn expanded(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for py in self.interpreter.tokens() {
            for abi in self.abi.tokens() {
                for plat in self.platform.tokens() {
                    tags.push(format!(
                        "{py}{DIMENSION_SEPARATOR}{abi}{DIMENSION_SEPARATOR}{plat}"
                    ));
                }
            }
        }
        tags
    }
}

impl fmt::Display for TagTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DIMENSION_SEPARATOR}{}{DIMENSION_SEPARATOR}{}",
            self.interpreter, self.abi, self.platform
        )
    }
}

/// Validate and combine the three dimensions into a [`TagTriple`].
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::tags::resolve;
///
/// let tags = resolve(&["py2", "py3"], &["none"], &["linux_x86_64"]).unwrap();
/// assert_eq!(tags.tag_string(), "py2.py3-none-linux_x86_64");
/// ```
///
/// # Errors
///
/// Returns [`WheelError::EmptyTagSet`] or [`WheelError::InvalidTag`] when a
/// dimension fails validation.
pub fn resolve<S: AsRef<str>>(interpreter: &[S], abi: &[S], platform: &[S]) -> Result<TagTriple> {
    Ok(TagTriple {
        interpreter: TagSet::new(TagDimension::Interpreter, interpreter)?,
        abi: TagSet::new(TagDimension::Abi, abi)?,
        platform: TagSet::new(TagDimension::Platform, platform)?,
    })
}

/// Validate a single tag token.
fn validate_token(dimension: TagDimension, token: &str) -> Result<()> {
    let invalid = |reason: String| WheelError::InvalidTag {
        dimension: dimension.as_str(),
        value: token.to_owned(),
        reason,
    };
    if token.is_empty() {
        return Err(invalid("token must not be empty".to_owned()));
    }
    if let Some(bad) = token
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
    {
        return Err(invalid(format!(
            "character '{bad}' is not allowed; use ASCII letters, digits or '_'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::single_tokens(&["py3"], &["none"], &["any"], "py3-none-any")]
    #[case::universal(&["py2", "py3"], &["none"], &["linux_x86_64"], "py2.py3-none-linux_x86_64")]
    #[case::multi_platform(
        &["py3"],
        &["none"],
        &["macosx_11_0_arm64", "macosx_10_12_x86_64"],
        "py3-none-macosx_11_0_arm64.macosx_10_12_x86_64"
    )]
    fn resolve_joins_dimensions(
        #[case] py: &[&str],
        #[case] abi: &[&str],
        #[case] plat: &[&str],
        #[case] expected: &str,
    ) {
        let tags = resolve(py, abi, plat).expect("valid tags");
        assert_eq!(tags.tag_string(), expected);
        assert_eq!(tags.filename_tag(), expected);
    }

    #[rstest]
    #[case::hyphen("linux-x86_64")]
    #[case::dot("py3.11")]
    #[case::empty("")]
    #[case::space("py 3")]
    fn rejects_tokens_with_separators(#[case] token: &str) {
        let err = TagSet::new(TagDimension::Platform, [token]).expect_err("invalid token");
        assert!(
            matches!(err, WheelError::InvalidTag { dimension: "platform", .. }),
            "expected InvalidTag, got {err:?}"
        );
    }

    #[test]
    fn rejects_empty_dimension() {
        let empty: [&str; 0] = [];
        let err = TagSet::new(TagDimension::Abi, empty).expect_err("empty set");
        assert_eq!(err, WheelError::EmptyTagSet { dimension: "ABI" });
    }

    #[test]
    fn rejects_duplicate_tokens() {
        let result = TagSet::parse(TagDimension::Interpreter, "py3.py3");
        assert!(result.is_err());
    }

    #[test]
    fn parse_splits_on_dots() {
        let set = TagSet::parse(TagDimension::Interpreter, "py2.py3").expect("valid");
        assert_eq!(set.tokens(), ["py2", "py3"]);
    }

    #[test]
    fn parse_rejects_trailing_dot() {
        assert!(TagSet::parse(TagDimension::Interpreter, "py3.").is_err());
    }

    #[test]
    fn defaults_are_universal_and_abi_free() {
        let platform = TagSet::parse(TagDimension::Platform, "any").expect("valid");
        let tags = TagTriple::with_defaults(platform).expect("platform set");
        assert_eq!(tags.tag_string(), "py2.py3-none-any");
    }

    #[test]
    fn defaults_reject_a_non_platform_set() {
        let err = TagTriple::with_defaults(TagSet::universal_interpreter())
            .expect_err("interpreter set in the platform slot");
        assert!(
            matches!(err, WheelError::InvalidTag { dimension: "platform", .. }),
            "expected InvalidTag, got {err:?}"
        );
    }

    #[test]
    fn new_rejects_sets_in_the_wrong_slot() {
        let py = TagSet::universal_interpreter();
        let result = TagTriple::new(py.clone(), py.clone(), py);
        assert!(result.is_err());
    }

    #[test]
    fn expanded_lists_every_combination_in_order() {
        let tags = resolve(&["py2", "py3"], &["none"], &["any", "win32"]).expect("valid");
        assert_eq!(
            tags.expanded(),
            [
                "py2-none-any",
                "py2-none-win32",
                "py3-none-any",
                "py3-none-win32"
            ]
        );
    }
}
