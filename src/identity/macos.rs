//! macOS accessor: `SOL_LOCAL` socket options plus BSD process info.
//!
//! `LOCAL_PEERCRED` yields the effective credentials the kernel captured
//! at connect time and `LOCAL_PEERPID` the peer pid. The generation field
//! comes from the process start timestamp reported by
//! `proc_pidinfo(PROC_PIDTBSDINFO)`.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, BorrowedFd};

use super::ExtractionError;
use crate::token::AuditToken;

pub(super) fn read_identity(fd: BorrowedFd<'_>) -> Result<AuditToken, ExtractionError> {
    let raw = fd.as_raw_fd();

    // A listening socket has no peer; refuse it before asking for
    // credentials so a misuse can never mirror our own identity.
    let mut listening: libc::c_int = 0;
    let mut opt_len = mem::size_of::<libc::c_int>() as libc::socklen_t;
    let rc = unsafe {
        libc::getsockopt(
            raw,
            libc::SOL_SOCKET,
            libc::SO_ACCEPTCONN,
            &mut listening as *mut libc::c_int as *mut libc::c_void,
            &mut opt_len,
        )
    };
    if rc != 0 {
        return Err(ExtractionError::Unavailable(format!(
            "SO_ACCEPTCONN failed: {}",
            io::Error::last_os_error()
        )));
    }
    if listening != 0 {
        return Err(ExtractionError::Unavailable(
            "handle is a listening socket, not a connection".into(),
        ));
    }

    let mut cred: libc::xucred = unsafe { mem::zeroed() };
    let mut cred_len = mem::size_of::<libc::xucred>() as libc::socklen_t;
    let rc = unsafe {
        libc::getsockopt(
            raw,
            libc::SOL_LOCAL,
            libc::LOCAL_PEERCRED,
            &mut cred as *mut libc::xucred as *mut libc::c_void,
            &mut cred_len,
        )
    };
    if rc != 0 {
        return Err(ExtractionError::Unavailable(format!(
            "LOCAL_PEERCRED failed: {}",
            io::Error::last_os_error()
        )));
    }
    if cred.cr_version != libc::XUCRED_VERSION || cred.cr_ngroups < 1 {
        return Err(ExtractionError::Unavailable(
            "unsupported xucred layout".into(),
        ));
    }

    let mut pid: libc::pid_t = 0;
    let mut pid_len = mem::size_of::<libc::pid_t>() as libc::socklen_t;
    let rc = unsafe {
        libc::getsockopt(
            raw,
            libc::SOL_LOCAL,
            libc::LOCAL_PEERPID,
            &mut pid as *mut libc::pid_t as *mut libc::c_void,
            &mut pid_len,
        )
    };
    if rc != 0 || pid <= 0 {
        return Err(ExtractionError::Unavailable(
            "socket has no connected peer".into(),
        ));
    }

    let pid_generation = start_time(pid)?;

    Ok(AuditToken {
        pid: pid as u32,
        pid_generation,
        uid: cred.cr_uid,
        gid: cred.cr_groups[0],
    })
}

/// Peer start timestamp in microseconds, folded to 32 bits.
///
/// Fails if the peer has already exited: a token with a fabricated
/// generation would defeat the PID-reuse check downstream.
fn start_time(pid: libc::pid_t) -> Result<u32, ExtractionError> {
    let mut info: libc::proc_bsdinfo = unsafe { mem::zeroed() };
    let size = mem::size_of::<libc::proc_bsdinfo>() as libc::c_int;
    let rc = unsafe {
        libc::proc_pidinfo(
            pid,
            libc::PROC_PIDTBSDINFO,
            0,
            &mut info as *mut libc::proc_bsdinfo as *mut libc::c_void,
            size,
        )
    };
    if rc != size {
        return Err(ExtractionError::Unavailable(
            "peer start time unreadable".into(),
        ));
    }

    let micros = info
        .pbi_start_tvsec
        .wrapping_mul(1_000_000)
        .wrapping_add(info.pbi_start_tvusec);
    Ok(super::fold_u64(micros))
}

#[cfg(test)]
mod tests {
    use std::os::unix::net::{UnixListener, UnixStream};

    use super::super::extract;

    #[test]
    fn test_pair_extraction_reports_own_process() {
        let (left, right) = UnixStream::pair().unwrap();

        let token = extract(&left).unwrap();
        assert_eq!(token.pid, std::process::id());
        assert_eq!(token.uid, nix::unistd::geteuid().as_raw());

        let other = extract(&right).unwrap();
        assert_eq!(token, other);
    }

    #[test]
    fn test_listener_fd_is_refused_not_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let listener = UnixListener::bind(dir.path().join("ident.sock")).unwrap();
        assert!(extract(&listener).is_err());
    }
}
