//! Content fingerprints used as dedup and identity keys

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::document::Document;

/// Hash algorithm used to fingerprint document content.
///
/// The choice only affects dedup keys; it is not a security property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    /// Hex fingerprint of content after null-byte normalization
    pub fn fingerprint(&self, content: &str) -> String {
        let cleaned = clean_content(content);

        match self {
            Self::Md5 => hex::encode(Md5::digest(cleaned.as_bytes())),
            Self::Sha256 => hex::encode(Sha256::digest(cleaned.as_bytes())),
            Self::Blake3 => blake3::hash(cleaned.as_bytes()).to_hex().to_string(),
        }
    }

    /// Identity of a document: its explicit id, else the content fingerprint
    pub fn identity(&self, document: &Document) -> String {
        match document.id {
            Some(ref id) => id.clone(),
            None => self.fingerprint(&document.content),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Replace null bytes with U+FFFD, which many backends cannot store
pub fn clean_content(content: &str) -> String {
    content.replace('\0', "\u{FFFD}")
}
