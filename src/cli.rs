//! CLI argument definitions for anybin2wheel.
//!
//! Defines the command line with clap and turns parsed arguments into the
//! validated inputs the packaging library expects. Nothing here touches the
//! file system except reading `--description-file`.

use crate::error::CliError;
use anybin2wheel_core::wheel::metadata::{DescriptionContentType, DistributionRecord, MetadataField};
use anybin2wheel_core::wheel::package_name::PackageName;
use anybin2wheel_core::wheel::platform::host_platform_tag;
use anybin2wheel_core::wheel::tags::{TagDimension, TagSet, TagTriple};
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use std::fs;

/// Project home linked from the generated description.
pub const PROJECT_URL: &str = "https://github.com/sergeykolosov/anybin2wheel";

/// Package any executable as a Python wheel.
#[derive(Parser, Debug, Clone)]
#[command(name = "anybin2wheel")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package a binary for the current platform:\n",
    "    $ anybin2wheel target/release/mytool mytool 1.0.0\n\n",
    "  Package a cross-compiled binary into dist/:\n",
    "    $ anybin2wheel -d dist -p win_amd64 mytool.exe mytool 1.0.0\n",
))]
pub struct Cli {
    /// Path to the executable to be packaged.
    pub binary: Utf8PathBuf,

    /// Name of the package.
    pub name: String,

    /// Version of the package.
    #[arg(id = "package_version", value_name = "VERSION")]
    pub version: String,

    /// Destination directory for the wheel.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dist_dir: Utf8PathBuf,

    /// Platform tag for the package [default: current platform].
    #[arg(short, long, value_name = "TAG")]
    pub plat_name: Option<String>,

    /// Python compatibility tag.
    #[arg(long, value_name = "TAG", default_value = "py2.py3")]
    pub python_tag: String,

    /// ABI compatibility tag.
    #[arg(long, value_name = "TAG", default_value = "none")]
    pub abi_tag: String,

    /// Package metadata: summary [default: "Wheel distribution for <binary>"].
    #[arg(long)]
    pub summary: Option<String>,

    /// Package metadata: description.
    #[arg(long)]
    pub description: Option<String>,

    /// Package metadata: description content type.
    #[arg(long, value_enum, default_value_t = ContentTypeArg::Markdown)]
    pub description_content_type: ContentTypeArg,

    /// Package metadata: read description from a file.
    #[arg(long, value_name = "PATH")]
    pub description_file: Option<Utf8PathBuf>,

    /// Package metadata: home page URL.
    #[arg(long)]
    pub home_page: Option<String>,

    /// Package metadata: author.
    #[arg(long)]
    pub author: Option<String>,

    /// Package metadata: author email.
    #[arg(long)]
    pub author_email: Option<String>,

    /// Package metadata: maintainer.
    #[arg(long)]
    pub maintainer: Option<String>,

    /// Package metadata: maintainer email.
    #[arg(long)]
    pub maintainer_email: Option<String>,

    /// Package metadata: license.
    #[arg(long)]
    pub license: Option<String>,

    /// Re-read the finished wheel and check every member against RECORD.
    #[arg(long)]
    pub verify: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Accepted values for `--description-content-type`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypeArg {
    /// Markdown.
    #[value(name = "text/markdown")]
    Markdown,
    /// reStructuredText.
    #[value(name = "text/x-rst")]
    Rst,
    /// Plain text.
    #[value(name = "text/plain")]
    Plain,
}

impl From<ContentTypeArg> for DescriptionContentType {
    fn from(value: ContentTypeArg) -> Self {
        match value {
            ContentTypeArg::Markdown => Self::Markdown,
            ContentTypeArg::Rst => Self::ReStructuredText,
            ContentTypeArg::Plain => Self::Plain,
        }
    }
}

impl Cli {
    /// Build the distribution record from the name, version and metadata
    /// options.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Invalid`] for a bad package name and
    /// [`CliError::DescriptionFile`] when `--description-file` cannot be
    /// read.
    pub fn distribution_record(&self) -> Result<DistributionRecord, CliError> {
        let name = PackageName::try_from(self.name.as_str())?;
        let summary = self
            .summary
            .clone()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| format!("Wheel distribution for {}", self.binary_stem()));
        let description = match &self.description_file {
            Some(path) => fs::read_to_string(path).map_err(|source| CliError::DescriptionFile {
                path: path.clone(),
                source,
            })?,
            None => self
                .description
                .clone()
                .unwrap_or_else(|| default_description(&name)),
        };

        Ok(DistributionRecord::new(name, self.version.clone())
            .with_field(MetadataField::Summary, summary)
            .with_optional_field(MetadataField::HomePage, self.home_page.clone())
            .with_optional_field(MetadataField::Author, self.author.clone())
            .with_optional_field(MetadataField::AuthorEmail, self.author_email.clone())
            .with_optional_field(MetadataField::Maintainer, self.maintainer.clone())
            .with_optional_field(MetadataField::MaintainerEmail, self.maintainer_email.clone())
            .with_optional_field(MetadataField::License, self.license.clone())
            .with_content_type(self.description_content_type.into())
            .with_description(description))
    }

    /// Resolve the compatibility tags, defaulting the platform to the host.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Invalid`] when a tag token is malformed.
    pub fn tags(&self) -> Result<TagTriple, CliError> {
        let platform = self.plat_name.clone().unwrap_or_else(host_platform_tag);
        TagTriple::new(
            TagSet::parse(TagDimension::Interpreter, &self.python_tag)?,
            TagSet::parse(TagDimension::Abi, &self.abi_tag)?,
            TagSet::parse(TagDimension::Platform, &platform)?,
        )
        .map_err(CliError::from)
    }

    /// The executable's file name without its extension.
    fn binary_stem(&self) -> &str {
        self.binary.file_stem().unwrap_or_default()
    }
}

/// The Markdown description used when none is given.
fn default_description(name: &PackageName) -> String {
    format!(
        "# {name}\nAn executable packaged to be distributed as a wheel using [anybin2wheel]({PROJECT_URL}).\n"
    )
}
