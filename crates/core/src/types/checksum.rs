//! Content fingerprint of a command

use crate::constants::CHECKSUM_LEN;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display};
use std::ops::Deref;

/// A 64-character content fingerprint
///
/// Two commands with the same checksum are the same command as far as the
/// remote cache is concerned, whatever their textual origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Fingerprint the given content with SHA-256
    #[must_use]
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Accept a value read back from the target.
    ///
    /// Returns `None` when the value does not have the fixed length.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() == CHECKSUM_LEN {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// Get the inner string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Checksum {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_of_is_sha256_hex() {
        let checksum = Checksum::of("");
        assert_eq!(
            checksum.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(checksum.len(), CHECKSUM_LEN);
    }

    #[test]
    fn test_checksum_is_deterministic() {
        assert_eq!(Checksum::of("apt-get update"), Checksum::of("apt-get update"));
        assert_ne!(Checksum::of("apt-get update"), Checksum::of("apt-get  update"));
    }

    #[test]
    fn test_parse_enforces_length() {
        let valid = "b".repeat(64);
        assert_eq!(Checksum::parse(&valid).map(|c| c.to_string()), Some(valid));
        assert!(Checksum::parse("deadbeef").is_none());
        assert!(Checksum::parse(&"c".repeat(65)).is_none());
        assert!(Checksum::parse("").is_none());
    }

    #[test]
    fn test_short_form() {
        let checksum = Checksum::of("echo hi");
        assert_eq!(checksum.short(), &checksum.as_str()[..12]);
    }
}
