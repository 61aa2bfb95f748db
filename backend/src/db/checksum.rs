//! Checksum of uploaded spreadsheets.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of raw spreadsheet bytes.
///
/// # Returns
/// Lowercase hexadecimal string of the digest.
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
