//! Content fingerprints and the object names derived from them.

use crate::filetype::FileExtension;
use sha2::{Digest, Sha256};

/// Hex characters of the SHA-256 digest kept in a fingerprint.
pub const FINGERPRINT_LEN: usize = 12;

/// Truncated SHA-256 of a blob, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let mut hex = hex::encode(hasher.finalize());
        hex.truncate(FINGERPRINT_LEN);
        ContentFingerprint(hex)
    }

    fn parse(text: &str) -> Option<Self> {
        let well_formed = text.len() == FINGERPRINT_LEN
            && text
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| ContentFingerprint(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Durable, public name of a stored blob: `<fingerprint><extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredObjectKey {
    fingerprint: ContentFingerprint,
    extension: FileExtension,
}

impl StoredObjectKey {
    pub fn new(fingerprint: ContentFingerprint, extension: FileExtension) -> Self {
        StoredObjectKey {
            fingerprint,
            extension,
        }
    }

    /// Accept exactly twelve lowercase hex characters, a dot and an allowed
    /// extension. Anything else is `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let fingerprint = ContentFingerprint::parse(name.get(..FINGERPRINT_LEN)?)?;
        let extension = FileExtension::from_suffix(name.get(FINGERPRINT_LEN..)?)?;
        Some(StoredObjectKey::new(fingerprint, extension))
    }

    pub fn fingerprint(&self) -> &ContentFingerprint {
        &self.fingerprint
    }

    pub fn extension(&self) -> FileExtension {
        self.extension
    }
}

impl std::fmt::Display for StoredObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.fingerprint.as_str(), self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_truncated_sha256() {
        // sha256("hello world") = b94d27b9934d3e08a52e52d7da7dabfa...
        assert_eq!(ContentFingerprint::of(b"hello world").as_str(), "b94d27b9934d");
        assert_eq!(ContentFingerprint::of(b"").as_str(), "e3b0c44298fc");
    }

    #[test]
    fn test_key_display_and_parse_agree() {
        let ext = FileExtension::from_suffix(".png").unwrap();
        let key = StoredObjectKey::new(ContentFingerprint::of(b"hello world"), ext);
        assert_eq!(key.to_string(), "b94d27b9934d.png");
        assert_eq!(StoredObjectKey::parse("b94d27b9934d.png"), Some(key));
    }

    #[test]
    fn test_parse_rejects_deviations() {
        for name in [
            "deadbeef0123.exe",
            "DEADBEEF0123.png",
            "deadbeef0123.PNG",
            "deadbeef012.png",
            "deadbeef01234.png",
            "deadbeef012g.png",
            "deadbeef0123png",
            "deadbeef0123.png/",
            "../etc/passwd",
            "",
            "ééééééééééé.png",
        ] {
            assert!(StoredObjectKey::parse(name).is_none(), "{}", name);
        }
        assert!(StoredObjectKey::parse("deadbeef0123.jpeg").is_some());
    }
}
