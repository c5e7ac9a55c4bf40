//! The `WHEEL` format descriptor written into `.dist-info`.

use super::tags::TagTriple;

/// Wheel format version written as `Wheel-Version`.
pub const WHEEL_FORMAT_VERSION: (u32, u32) = (1, 0);

/// Name used in the `Generator` header.
pub const GENERATOR_NAME: &str = "anybin2wheel";

/// Return the generator identity of this build, e.g. `anybin2wheel 0.1.0`.
#[must_use]
pub fn default_generator() -> String {
    format!("{GENERATOR_NAME} {}", env!("CARGO_PKG_VERSION"))
}

/// Contents of the `WHEEL` file.
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::tags::resolve;
/// use anybin2wheel_core::wheel::wheel_info::WheelInfo;
///
/// let tags = resolve(&["py3"], &["none"], &["any"]).unwrap();
/// let info = WheelInfo::new("anybin2wheel 0.1.0", false, &tags);
/// assert_eq!(
///     info.render(),
///     "Wheel-Version: 1.0\nGenerator: anybin2wheel 0.1.0\nRoot-Is-Purelib: false\nTag: py3-none-any\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelInfo {
    generator: String,
    root_is_purelib: bool,
    tags: Vec<String>,
}

impl WheelInfo {
    /// Describe a wheel built by `generator` with the given tags.
    #[must_use]
    pub fn new(generator: impl Into<String>, root_is_purelib: bool, tags: &TagTriple) -> Self {
        Self {
            generator: generator.into(),
            root_is_purelib,
            tags: tags.expanded(),
        }
    }

    /// Render the descriptor, one header per line.
    #[must_use]
    pub fn render(&self) -> String {
        let (major, minor) = WHEEL_FORMAT_VERSION;
        let mut out = format!(
            "Wheel-Version: {major}.{minor}\nGenerator: {}\nRoot-Is-Purelib: {}\n",
            self.generator, self.root_is_purelib
        );
        for tag in &self.tags {
            out.push_str("Tag: ");
            out.push_str(tag);
            out.push('\n');
        }
        out
    }
}
