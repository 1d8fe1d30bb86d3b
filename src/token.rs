//! Audit token value type and its fixed-length byte encoding.
//!
//! # Security
//! - Encoding is bijective: equal tokens encode identically, distinct
//!   tokens never alias.
//! - Decoding rejects any input that is not exactly [`ENCODED_LEN`] bytes
//!   and never partially succeeds.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Encoded token length: four u32 fields, little-endian.
pub const ENCODED_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("malformed token encoding: expected {expected} bytes, got {actual}")]
    MalformedEncoding { expected: usize, actual: usize },
}

/// Kernel-issued identity snapshot for one peer process.
///
/// Values are meaningful as of the extraction instant only. An equal `pid`
/// with a different `pid_generation` means the PID was reused by a new
/// process after the original peer exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditToken {
    /// Process ID of the remote endpoint.
    pub pid: u32,
    /// Start/generation counter disambiguating PID reuse.
    pub pid_generation: u32,
    /// Effective user ID at connect time.
    pub uid: u32,
    /// Effective group ID at connect time.
    pub gid: u32,
}

impl AuditToken {
    /// Encode to the flat byte form: `pid`, `pid_generation`, `uid`, `gid`,
    /// each as a little-endian u32.
    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut buf = [0u8; ENCODED_LEN];
        buf[0..4].copy_from_slice(&self.pid.to_le_bytes());
        buf[4..8].copy_from_slice(&self.pid_generation.to_le_bytes());
        buf[8..12].copy_from_slice(&self.uid.to_le_bytes());
        buf[12..16].copy_from_slice(&self.gid.to_le_bytes());
        buf
    }

    /// Decode from the flat byte form. Inverse of [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let buf: &[u8; ENCODED_LEN] =
            bytes
                .try_into()
                .map_err(|_| EncodingError::MalformedEncoding {
                    expected: ENCODED_LEN,
                    actual: bytes.len(),
                })?;
        let field = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        Ok(Self {
            pid: field(0),
            pid_generation: field(4),
            uid: field(8),
            gid: field(12),
        })
    }
}

impl fmt::Display for AuditToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.encode()))
    }
}
