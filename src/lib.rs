//! Peer identity core for privileged IPC services.
//!
//! A privileged endpoint that accepts IPC connections must know, for each
//! connection, which OS process is on the other end - as a kernel-issued
//! credential, not a claimed name. The channel's public surface hides that
//! metadata; the kernel still tracks it per connection. This crate covers
//! exactly that layer:
//!
//! - **Extraction**: read the kernel's identity metadata for a live
//!   connection handle and snapshot it into an [`AuditToken`].
//! - **Encoding**: convert the token to and from a fixed 16-byte form
//!   suitable for storage, comparison, and logging.
//!
//! # Security Boundaries
//!
//! - Tokens are never synthesized: extraction either returns the kernel's
//!   answer or fails with [`ExtractionError`]. There is no zero token.
//! - A token is a snapshot at extraction time, not a live view. PID reuse
//!   after the remote process exits is visible in the generation field.
//! - Trust decisions (signature checks, access control) belong to the
//!   policy layer consuming the token, not to this crate.

pub mod identity;
pub mod token;

pub use identity::{extract, ExtractionError, IdentityReadable};
pub use token::{AuditToken, EncodingError, ENCODED_LEN};
