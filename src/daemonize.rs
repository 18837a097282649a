#![allow(unsafe_code)]

//! Minimal UNIX daemonisation: fork, detach from the controlling terminal,
//! and redirect the standard streams to `/dev/null`.
//!
//! Must run before the Tokio runtime starts — forking a process with a
//! live thread pool only carries the calling thread into the child,
//! leaving every other worker thread (and anything it held a lock on)
//! behind. `main` calls [`daemonize`] first and only builds the
//! `#[tokio::main]` runtime afterward.
//!
//! No daemonisation crate appears anywhere in the reference corpus this
//! project draws its dependency stack from; `fork`/`setsid` are called
//! directly against `libc`, the same way the corpus reaches for raw libc
//! calls wherever `getifaddrs` and `socket2` don't cover a platform detail.

use std::io;

/// Forks the process, detaches the child from its controlling terminal,
/// and redirects stdin/stdout/stderr to `/dev/null`. The parent exits
/// immediately with status 0. Returns in the child only.
pub fn daemonize() -> io::Result<()> {
    // SAFETY: `fork` is async-signal-safe and has no preconditions beyond
    // being called before any other thread exists; this runs at the very
    // start of `main`, before the Tokio runtime (and its thread pool) is
    // built.
    let pid = unsafe { libc::fork() };
    if pid < 0 {
        return Err(io::Error::last_os_error());
    }
    if pid > 0 {
        std::process::exit(0);
    }

    // SAFETY: called once, in the child, before any other thread exists.
    if unsafe { libc::setsid() } < 0 {
        return Err(io::Error::last_os_error());
    }

    redirect_stdio_to_dev_null()
}

fn redirect_stdio_to_dev_null() -> io::Result<()> {
    use std::ffi::CString;

    let path = CString::new("/dev/null").expect("static path has no interior NUL");

    // SAFETY: `path` is a valid, NUL-terminated C string for the duration
    // of the call; `open`/`dup2`/`close` are standard POSIX calls used
    // here exactly per their documented contracts.
    unsafe {
        let fd = libc::open(path.as_ptr(), libc::O_RDWR);
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        for target in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            if libc::dup2(fd, target) < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        if fd > libc::STDERR_FILENO {
            libc::close(fd);
        }
    }

    Ok(())
}
