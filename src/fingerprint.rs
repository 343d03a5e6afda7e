//! Content fingerprints for tile deduplication
//!
//! A fingerprint is the first 128 bits of a SHA-256 digest over the tile's
//! size and RGBA bytes. Position is never part of the digest, so two tiles
//! with identical pixels always share a fingerprint.

use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a fingerprint in bytes
pub const FINGERPRINT_LEN: usize = 16;

/// 128-bit content digest of a tile
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Fingerprint an RGBA tile.
    pub fn of(tile: &RgbaImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tile.width().to_le_bytes());
        hasher.update(tile.height().to_le_bytes());
        hasher.update(tile.as_raw());
        let digest = hasher.finalize();

        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Self(bytes)
    }

    /// Lowercase hex representation (32 characters).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}
