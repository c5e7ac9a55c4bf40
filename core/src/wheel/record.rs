//! RECORD manifest generation and parsing.
//!
//! Every archive member except RECORD itself is listed as
//! `path,sha256=<digest>,<size>`, where the digest is URL-safe base64 with
//! the `=` padding removed. RECORD lists itself last with empty hash and
//! size fields.

use super::error::{Result, WheelError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Hash algorithm name written before the digest.
pub const RECORD_HASH_ALGORITHM: &str = "sha256";

/// Length of an unpadded base64 SHA-256 digest.
const ENCODED_DIGEST_LEN: usize = 43;

/// Size of the buffer used when streaming member content.
pub(crate) const CHUNK_SIZE: usize = 8192;

/// A validated `sha256=<urlsafe-b64-nopad>` hash field.
///
/// # Examples
///
/// ```
/// use anybin2wheel_core::wheel::record::RecordHash;
///
/// let hash = RecordHash::of_bytes(b"");
/// assert_eq!(
///     hash.as_str(),
///     "sha256=47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordHash(String);

impl RecordHash {
    /// Build a hash field from a raw SHA-256 digest.
    #[must_use]
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(format!(
            "{RECORD_HASH_ALGORITHM}={}",
            URL_SAFE_NO_PAD.encode(digest)
        ))
    }

    /// Hash an in-memory buffer.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_digest(&Sha256::digest(bytes))
    }

    /// Return the full `algorithm=digest` field.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the encoded digest without the algorithm prefix.
    #[must_use]
    pub fn encoded_digest(&self) -> &str {
        match self.0.split_once('=') {
            Some((_, digest)) => digest,
            None => &self.0,
        }
    }

    /// Decode the digest back to raw bytes.
    ///
    /// # Errors
    ///
    /// Returns the base64 decode error; validated values always decode.
    pub fn decode_digest(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        URL_SAFE_NO_PAD.decode(self.encoded_digest())
    }
}

impl TryFrom<&str> for RecordHash {
    type Error = WheelError;

    fn try_from(value: &str) -> Result<Self> {
        validate_record_hash(value)
            .map_err(|reason| WheelError::MalformedRecord { line: 0, reason })?;
        Ok(Self(value.to_owned()))
    }
}

impl fmt::Display for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental hasher that also counts bytes.
#[derive(Clone, Default)]
pub struct RecordHasher {
    hasher: Sha256,
    len: u64,
}

impl RecordHasher {
    /// Start a new hash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of member content.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.len += chunk.len() as u64;
    }

    /// Finish and return the hash field and byte length.
    #[must_use]
    pub fn finish(self) -> (RecordHash, u64) {
        (RecordHash::from_digest(&self.hasher.finalize()), self.len)
    }
}

/// Hash everything `reader` yields, in fixed-size chunks.
///
/// # Errors
///
/// Returns any read error.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<(RecordHash, u64)> {
    let mut hasher = RecordHasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        let Some(chunk) = buffer.get(..bytes_read) else {
            break;
        };
        if chunk.is_empty() {
            break;
        }
        hasher.update(chunk);
    }
    Ok(hasher.finish())
}

/// Hash the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> io::Result<(RecordHash, u64)> {
    hash_reader(fs::File::open(path)?)
}

/// One RECORD line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    path: String,
    hash: Option<RecordHash>,
    size: Option<u64>,
}

impl RecordEntry {
    /// An entry whose content installers verify.
    #[must_use]
    pub fn new(path: impl Into<String>, hash: RecordHash, size: u64) -> Self {
        Self {
            path: path.into(),
            hash: Some(hash),
            size: Some(size),
        }
    }

    /// An entry with empty hash and size, as used for RECORD itself.
    #[must_use]
    pub fn unverified(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: None,
            size: None,
        }
    }

    /// Return the archive-relative path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return the hash field, if any.
    #[must_use]
    pub const fn hash(&self) -> Option<&RecordHash> {
        self.hash.as_ref()
    }

    /// Return the byte length, if any.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Render the entry as a CSV line without a terminator.
    fn render(&self) -> String {
        format!(
            "{},{},{}",
            csv_field(&self.path),
            self.hash.as_ref().map_or("", RecordHash::as_str),
            self.size.map(|size| size.to_string()).unwrap_or_default()
        )
    }
}

/// The RECORD manifest, in archive insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<RecordEntry>,
}

impl Record {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: RecordEntry) {
        self.entries.push(entry);
    }

    /// Return the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&RecordEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    /// Render the manifest text, one `\n`-terminated line per entry.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.render() + "\n")
            .collect()
    }

    /// Parse RECORD text.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::MalformedRecord`] when a line does not have
    /// exactly three fields, the hash is malformed, the size is not a
    /// number, or only one of hash and size is present.
    pub fn parse(text: &str) -> Result<Self> {
        let mut record = Self::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.is_empty() {
                continue;
            }
            let malformed = |reason: String| WheelError::MalformedRecord {
                line: line_no,
                reason,
            };
            let fields = split_csv_line(line).map_err(|reason| malformed(reason.to_owned()))?;
            let [path, hash, size] = fields.as_slice() else {
                return Err(malformed(format!("expected 3 fields, got {}", fields.len())));
            };
            let entry = match (hash.is_empty(), size.is_empty()) {
                (true, true) => RecordEntry::unverified(path.clone()),
                (false, false) => {
                    validate_record_hash(hash).map_err(&malformed)?;
                    let size = size
                        .parse::<u64>()
                        .map_err(|err| malformed(format!("invalid size {size:?}: {err}")))?;
                    RecordEntry::new(path.clone(), RecordHash(hash.clone()), size)
                }
                _ => {
                    return Err(malformed(
                        "hash and size must both be present or both be empty".to_owned(),
                    ));
                }
            };
            record.push(entry);
        }
        Ok(record)
    }
}

/// Check the `sha256=<digest>` shape of a hash field.
fn validate_record_hash(value: &str) -> std::result::Result<(), String> {
    let Some((algorithm, digest)) = value.split_once('=') else {
        return Err(format!("hash {value:?} has no algorithm prefix"));
    };
    if algorithm != RECORD_HASH_ALGORITHM {
        return Err(format!(
            "unsupported hash algorithm {algorithm:?}; expected {RECORD_HASH_ALGORITHM}"
        ));
    }
    if digest.len() != ENCODED_DIGEST_LEN {
        return Err(format!(
            "expected {ENCODED_DIGEST_LEN} digest characters, got {}",
            digest.len()
        ));
    }
    if let Some(bad) = digest
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(format!("character '{bad}' is not URL-safe base64"));
    }
    Ok(())
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// Split one CSV line into fields, honouring double-quoted fields.
fn split_csv_line(line: &str) -> std::result::Result<Vec<String>, &'static str> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    while let Some(c) = chars.next() {
        match (in_quotes, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            (true, '"') => in_quotes = false,
            (false, '"') if field.is_empty() => in_quotes = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (_, c) => field.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field");
    }
    fields.push(field);
    Ok(fields)
}
