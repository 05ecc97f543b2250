// src/dedup/fingerprint.rs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable identity of a piece of delivered content.
///
/// SHA-256 of the text with surrounding whitespace trimmed and inner runs of
/// whitespace collapsed, so formatting noise from the upstream source does not
/// make a repeat look novel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(content: &str) -> Self {
        let normalized = normalize(content);
        let digest = Sha256::digest(normalized.as_bytes());
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}
