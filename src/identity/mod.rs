//! Connection identity extraction.
//!
//! The IPC channel's public surface hides who is on the other end; the
//! kernel still tracks it per connection. This module reads that metadata
//! for a live connection handle and snapshots it into an [`AuditToken`].
//!
//! # Security
//! - Extraction is a one-shot synchronous read with no retry: retrying
//!   after a failure races connection teardown and could observe a reused
//!   resource.
//! - Failure never degrades to a default token. "No identity" must stay
//!   visible to the caller so the trust boundary stays closed.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;

use thiserror::Error;

use crate::token::AuditToken;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("peer identity unavailable: {0}")]
    Unavailable(String),
}

/// Capability to read the kernel-issued identity of a connection's peer.
///
/// Implemented for every fd-backed handle on Unix. Platforms without a
/// peer introspection accessor keep the trait but always fail, so callers
/// see one uniform contract instead of a missing capability.
pub trait IdentityReadable {
    /// Snapshot the peer's identity as of this call.
    ///
    /// The handle must refer to an established connection; handles that
    /// never completed a connect, or whose metadata can no longer be read,
    /// fail with [`ExtractionError::Unavailable`].
    fn peer_identity(&self) -> Result<AuditToken, ExtractionError>;
}

/// Extract the audit token for a live connection handle.
///
/// Call this synchronously between accept and teardown, once per
/// connection. The transport owns the ordering guarantee against teardown.
pub fn extract<C: IdentityReadable + ?Sized>(conn: &C) -> Result<AuditToken, ExtractionError> {
    conn.peer_identity()
}

#[cfg(unix)]
impl<T: std::os::fd::AsFd> IdentityReadable for T {
    fn peer_identity(&self) -> Result<AuditToken, ExtractionError> {
        let fd = self.as_fd();

        #[cfg(target_os = "linux")]
        let result = linux::read_identity(fd);

        #[cfg(target_os = "macos")]
        let result = macos::read_identity(fd);

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        let result: Result<AuditToken, ExtractionError> = {
            let _ = fd;
            Err(ExtractionError::Unavailable(
                "no peer identity accessor on this platform".into(),
            ))
        };

        match &result {
            Ok(token) => tracing::debug!(
                pid = token.pid,
                uid = token.uid,
                gid = token.gid,
                "extracted peer identity"
            ),
            Err(e) => tracing::warn!(error = %e, "peer identity extraction failed"),
        }
        result
    }
}

#[cfg(not(unix))]
impl<T> IdentityReadable for T {
    fn peer_identity(&self) -> Result<AuditToken, ExtractionError> {
        Err(ExtractionError::Unavailable(
            "no peer identity accessor on this platform".into(),
        ))
    }
}

/// XOR-fold a 64-bit kernel start timestamp into the 32-bit generation
/// field. Values with an equal high half stay distinct whenever the low
/// halves differ, which covers every realistic PID-reuse window.
#[cfg(any(target_os = "linux", target_os = "macos"))]
pub(crate) fn fold_u64(value: u64) -> u32 {
    (value as u32) ^ ((value >> 32) as u32)
}
