//! Streaming digest and verification for payload assets.
//!
//! Payloads run to tens of megabytes, so hashing is incremental over
//! fixed-size chunks and never buffers the whole stream. Digests are
//! SHA-256, hex-encoded lowercase with no separators.

mod error;
mod hasher;

pub use error::{Result, VerifyError};
pub use hasher::{Hasher, Sha256Hasher};

use std::io::Read;

const CHUNK_SIZE: usize = 8 * 1024;

/// Hash `reader` to exhaustion with a caller-supplied hasher.
pub fn digest_stream_with<R: Read, H: Hasher>(mut reader: R, mut hasher: H) -> Result<Vec<u8>> {
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// SHA-256 digest of `reader`, as a lowercase hex string.
pub fn digest_stream<R: Read>(reader: R) -> Result<String> {
    let raw = digest_stream_with(reader, Sha256Hasher::new())?;
    Ok(hex::encode(raw))
}

/// Verify that `reader` hashes to `expected_hex`.
///
/// A clean read with a wrong digest returns [`VerifyError::Mismatch`];
/// an unreadable stream returns [`VerifyError::Io`].
pub fn verify_stream<R: Read>(reader: R, expected_hex: &str) -> Result<()> {
    let actual = digest_stream(reader)?;
    let expected = expected_hex.to_ascii_lowercase();
    if actual == expected {
        Ok(())
    } else {
        Err(VerifyError::Mismatch { expected, actual })
    }
}
