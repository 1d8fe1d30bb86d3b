//! Linux accessor: `SO_PEERCRED` plus `/proc` start time.
//!
//! `SO_PEERCRED` returns the pid/euid/egid the kernel captured at
//! connect(2) time. The pid alone can be reused after the peer exits, so
//! the generation field comes from the process start time in
//! `/proc/<pid>/stat` (clock ticks since boot).

use std::fs;
use std::os::fd::BorrowedFd;

use nix::sys::socket::sockopt::{AcceptConn, PeerCredentials};
use nix::sys::socket::getsockopt;

use super::ExtractionError;
use crate::token::AuditToken;

pub(super) fn read_identity(fd: BorrowedFd<'_>) -> Result<AuditToken, ExtractionError> {
    // A listener's credential slot is seeded by the process that called
    // listen(2), i.e. ourselves. Trusting SO_PEERCRED there would report
    // the service's own identity as the peer's.
    let listening = getsockopt(&fd, AcceptConn)
        .map_err(|e| ExtractionError::Unavailable(format!("SO_ACCEPTCONN failed: {e}")))?;
    if listening {
        return Err(ExtractionError::Unavailable(
            "handle is a listening socket, not a connection".into(),
        ));
    }

    let creds = getsockopt(&fd, PeerCredentials)
        .map_err(|e| ExtractionError::Unavailable(format!("SO_PEERCRED failed: {e}")))?;

    // The kernel reports pid 0 for sockets that never completed a connect.
    // That is "no peer", not a token.
    if creds.pid() <= 0 {
        return Err(ExtractionError::Unavailable(
            "socket has no connected peer".into(),
        ));
    }

    let pid_generation = start_time(creds.pid())?;

    Ok(AuditToken {
        pid: creds.pid() as u32,
        pid_generation,
        uid: creds.uid(),
        gid: creds.gid(),
    })
}

/// Process start time in clock ticks since boot, folded to 32 bits.
///
/// Fails if the peer has already exited: a token with a fabricated
/// generation would defeat the PID-reuse check downstream.
fn start_time(pid: nix::libc::pid_t) -> Result<u32, ExtractionError> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat"))
        .map_err(|e| ExtractionError::Unavailable(format!("peer start time unreadable: {e}")))?;

    // comm may contain spaces or parentheses; fields are positional only
    // after the closing paren.
    let after_comm = stat
        .rsplit_once(')')
        .map(|(_, rest)| rest)
        .ok_or_else(|| ExtractionError::Unavailable("malformed /proc stat entry".into()))?;

    // starttime is field 22 overall; pid and comm sit before the paren, so
    // it is the 20th whitespace-separated field here.
    let ticks: u64 = after_comm
        .split_ascii_whitespace()
        .nth(19)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ExtractionError::Unavailable("malformed /proc stat entry".into()))?;

    Ok(super::fold_u64(ticks))
}
