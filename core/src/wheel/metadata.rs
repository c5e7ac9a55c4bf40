//! Distribution metadata composition and parsing.
//!
//! The METADATA file is an RFC 822 style header block, one `Field: value`
//! line per present field, followed by a blank line and the long description
//! as a free-form body. Putting the description in the body avoids header
//! folding, so Markdown and reStructuredText survive untouched.

use super::error::{Result, WheelError};
use super::package_name::PackageName;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Core metadata version emitted in the first header line.
pub const METADATA_VERSION: &str = "2.1";

/// Indentation of folded header continuation lines.
const FOLD_INDENT: &str = "        ";

/// Optional metadata fields, declared in the order they are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataField {
    /// One-line summary.
    Summary,
    /// Project home page URL.
    HomePage,
    /// Author name.
    Author,
    /// Author contact address.
    AuthorEmail,
    /// Maintainer name.
    Maintainer,
    /// Maintainer contact address.
    MaintainerEmail,
    /// License text or identifier.
    License,
    /// Media type of the description body.
    DescriptionContentType,
}

impl MetadataField {
    /// Every optional field in emission order.
    pub const ALL: [Self; 8] = [
        Self::Summary,
        Self::HomePage,
        Self::Author,
        Self::AuthorEmail,
        Self::Maintainer,
        Self::MaintainerEmail,
        Self::License,
        Self::DescriptionContentType,
    ];

    /// The header name written to METADATA.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::HomePage => "Home-page",
            Self::Author => "Author",
            Self::AuthorEmail => "Author-email",
            Self::Maintainer => "Maintainer",
            Self::MaintainerEmail => "Maintainer-email",
            Self::License => "License",
            Self::DescriptionContentType => "Description-Content-Type",
        }
    }

    /// Look up a field by header name, ignoring ASCII case.
    #[must_use]
    pub fn from_header_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.header_name().eq_ignore_ascii_case(name))
    }
}

/// Accepted media types for the description body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DescriptionContentType {
    /// `text/markdown`
    #[default]
    Markdown,
    /// `text/x-rst`
    ReStructuredText,
    /// `text/plain`
    Plain,
}

impl DescriptionContentType {
    /// Every accepted content type.
    pub const ALL: [Self; 3] = [Self::Markdown, Self::ReStructuredText, Self::Plain];

    /// Return the media type string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::ReStructuredText => "text/x-rst",
            Self::Plain => "text/plain",
        }
    }
}

impl FromStr for DescriptionContentType {
    type Err = WheelError;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ct| ct.as_str() == value)
            .ok_or_else(|| WheelError::UnknownContentType {
                value: value.to_owned(),
                expected: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

impl fmt::Display for DescriptionContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metadata describing a distribution.
///
/// Optional fields live in a map keyed by [`MetadataField`], so an absent
/// field and one set to an empty string stay distinguishable. Neither is
/// written to the header block.
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::metadata::{DistributionRecord, MetadataField};
/// use anybin2wheel_core::wheel::package_name::PackageName;
///
/// let name: PackageName = "ripgrep".try_into().unwrap();
/// let record = DistributionRecord::new(name, "14.1.0")
///     .with_field(MetadataField::Summary, "Search tool")
///     .with_description("# ripgrep\n");
///
/// let text = record.compose();
/// assert!(text.starts_with("Metadata-Version: 2.1\nName: ripgrep\n"));
/// assert!(text.ends_with("\n\n# ripgrep\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRecord {
    name: PackageName,
    version: String,
    fields: BTreeMap<MetadataField, String>,
    description: String,
}

impl DistributionRecord {
    /// Create a record with only the required name and version.
    #[must_use]
    pub fn new(name: PackageName, version: impl Into<String>) -> Self {
        Self {
            name,
            version: version.into(),
            fields: BTreeMap::new(),
            description: String::new(),
        }
    }

    /// Set an optional field.
    #[must_use]
    pub fn with_field(mut self, field: MetadataField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Set an optional field when `value` is present.
    #[must_use]
    pub fn with_optional_field(self, field: MetadataField, value: Option<String>) -> Self {
        match value {
            Some(value) => self.with_field(field, value),
            None => self,
        }
    }

    /// Set the description content type.
    #[must_use]
    pub fn with_content_type(self, content_type: DescriptionContentType) -> Self {
        self.with_field(MetadataField::DescriptionContentType, content_type.as_str())
    }

    /// Set the long description body.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Return the package name.
    #[must_use]
    pub const fn name(&self) -> &PackageName {
        &self.name
    }

    /// Return the version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return an optional field, `None` when it was never set.
    #[must_use]
    pub fn field(&self, field: MetadataField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Return the long description body.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Serialize the record to METADATA text.
    #[must_use]
    pub fn compose(&self) -> String {
        let mut out = String::new();
        push_header(&mut out, "Metadata-Version", METADATA_VERSION);
        push_header(&mut out, "Name", self.name.as_str());
        push_header(&mut out, "Version", &self.version);
        for (field, value) in &self.fields {
            push_header(&mut out, field.header_name(), value);
        }
        out.push('\n');
        out.push_str(&self.description);
        out
    }

    /// Parse METADATA text produced by [`DistributionRecord::compose`].
    ///
    /// Unknown headers are ignored. Folded header values are unfolded and
    /// the body after the first blank line is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::MalformedMetadata`] when a header line has no
    /// colon or the `Name` or `Version` header is missing, and
    /// [`WheelError::InvalidPackageName`] when the name fails validation.
    pub fn parse(text: &str) -> Result<Self> {
        let (head, body) = text
            .split_once("\n\n")
            .unwrap_or_else(|| (text.strip_suffix('\n').unwrap_or(text), ""));

        let mut headers: Vec<(String, String)> = Vec::new();
        for line in head.split('\n') {
            if line.starts_with([' ', '\t']) {
                let Some((_, value)) = headers.last_mut() else {
                    return Err(malformed("continuation line before any header"));
                };
                value.push('\n');
                match line.strip_prefix(FOLD_INDENT) {
                    Some(folded) => value.push_str(folded),
                    None => value.push_str(line.trim_start()),
                }
                continue;
            }
            let Some((name, value)) = line.split_once(':') else {
                return Err(malformed(&format!("header line without colon: {line:?}")));
            };
            let value = value.strip_prefix(' ').unwrap_or(value);
            headers.push((name.trim().to_owned(), value.to_owned()));
        }

        let mut name = None;
        let mut version = None;
        let mut fields = BTreeMap::new();
        for (header, value) in headers {
            if header.eq_ignore_ascii_case("Name") {
                name = Some(value);
            } else if header.eq_ignore_ascii_case("Version") {
                version = Some(value);
            } else if let Some(field) = MetadataField::from_header_name(&header) {
                fields.insert(field, value);
            }
        }

        let name = name.ok_or_else(|| malformed("missing Name header"))?;
        let version = version.ok_or_else(|| malformed("missing Version header"))?;
        Ok(Self {
            name: PackageName::try_from(name)?,
            version,
            fields,
            description: body.to_owned(),
        })
    }
}

/// Serialize a record to METADATA bytes.
#[must_use]
pub fn compose(record: &DistributionRecord) -> Vec<u8> {
    record.compose().into_bytes()
}

/// Append one header line, folding embedded newlines. Empty values are
/// skipped entirely.
fn push_header(out: &mut String, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    out.push_str(name);
    out.push_str(": ");
    let mut lines = value.split('\n');
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(FOLD_INDENT);
        out.push_str(line);
    }
    out.push('\n');
}

fn malformed(reason: &str) -> WheelError {
    WheelError::MalformedMetadata {
        reason: reason.to_owned(),
    }
}
