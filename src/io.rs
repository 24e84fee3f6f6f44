//! Non-blocking drain-style I/O helpers.
//!
//! Ports `atomic_read`/`atomic_write` from `util.c`: repeatedly issue the
//! underlying call until the buffer is exhausted, the kernel would block, or
//! the peer is gone. Any error outside that taxonomy is treated as fatal —
//! in a load generator, an unclassified errno means either a bug or a
//! misconfigured target, and silently continuing would skew the
//! measurements.

use std::io::{self, Read, Write};

use tracing::error;

/// Drains as much of `buf` as possible into `stream` without blocking.
///
/// Returns `(bytes_written, hup)`. `hup` is set once the peer is gone
/// (broken pipe, connection reset, or a zero-length transfer) — callers
/// must stop writing to this stream.
#[inline]
pub fn atomic_write(stream: &mut impl Write, buf: &[u8]) -> (usize, bool) {
    atomic_io(buf.len(), |chunk_start| stream.write(&buf[chunk_start..]))
}

/// Reads as much as will fit in `buf` without blocking.
///
/// Returns `(bytes_read, hup)` with the same `hup` semantics as
/// [`atomic_write`].
#[inline]
pub fn atomic_read(stream: &mut impl Read, buf: &mut [u8]) -> (usize, bool) {
    atomic_io(buf.len(), |chunk_start| stream.read(&mut buf[chunk_start..]))
}

/// Shared drain loop for [`atomic_read`] and [`atomic_write`].
///
/// `transfer` is called with the number of bytes already moved and should
/// attempt to move the remainder, returning the same `io::Result<usize>`
/// contract as `Read::read`/`Write::write`.
#[inline]
fn atomic_io(count: usize, mut transfer: impl FnMut(usize) -> io::Result<usize>) -> (usize, bool) {
    let mut total = 0;

    loop {
        if total == count {
            return (total, false);
        }

        match transfer(total) {
            Ok(0) => return (total, true),
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return (total, false),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_hup(&e) => return (total, true),
            Err(e) => fatal(&format!("unclassified I/O error: {e}")),
        }
    }
}

fn is_hup(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset)
}

/// Logs a fatal condition and aborts the worker process.
///
/// Unlike a panic, this cannot be caught or unwound past — it matches the
/// original's `perror(); abort();` pairing exactly.
pub fn fatal(msg: &str) -> ! {
    error!("{msg}");
    std::process::abort();
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn atomic_write_reports_full_length_on_success() {
        let mut sink = Vec::new();
        let (n, hup) = atomic_write(&mut sink, b"hello world");
        assert_eq!(n, 11);
        assert!(!hup);
        assert_eq!(sink, b"hello world");
    }

    #[test]
    fn atomic_read_reports_hup_on_eof() {
        let mut source = Cursor::new(Vec::new());
        let mut buf = [0u8; 16];
        let (n, hup) = atomic_read(&mut source, &mut buf);
        assert_eq!(n, 0);
        assert!(hup);
    }

    #[test]
    fn atomic_read_drains_available_bytes() {
        let mut source = Cursor::new(b"abcdef".to_vec());
        let mut buf = [0u8; 3];
        let (n, hup) = atomic_read(&mut source, &mut buf);
        assert_eq!(n, 3);
        assert!(!hup);
        assert_eq!(&buf, b"abc");
    }
}
