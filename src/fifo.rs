// Copyright (C) 2026 The logpipe developers
//
// This file is part of logpipe.
//
// logpipe is free software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// logpipe is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even
// the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details.
//
// You should have received a copy of the GNU General Public License along with logpipe.  If not,
// see <http://www.gnu.org/licenses/>.

//! Named pipe management.
//!
//! [`Fifo::ensure`] makes sure there is a FIFO at a given path, creating one if need be, and
//! [`Fifo::open`] opens it for reading.
//!
//! A reader sees end-of-file whenever the last writer closes a FIFO, and writers that open with
//! `O_NONBLOCK` get `ENXIO` while there's no reader at all. So a [`Fifo`] holds the read end open
//! for as long as it lives, along with a write end of its own that is never written. With that
//! write end in place, reads block until data arrives instead of returning end-of-file.

use crate::{
    byte_utils::c_path,
    error::{Error, Result},
};

use backtrace::Backtrace;

use std::{
    fs::{File, OpenOptions},
    io::Read,
    os::unix::{
        fs::{FileTypeExt, OpenOptionsExt, PermissionsExt},
        io::AsRawFd,
    },
    path::{Path, PathBuf},
};

/// Anyone may write to (or read from) a FIFO we create
pub const FIFO_MODE: u32 = 0o666;

/// What [`Fifo::ensure`] found at the path
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FifoStatus {
    /// There was nothing there, so we made a FIFO
    Created,
    /// There was already a FIFO there; it was left untouched
    Existing,
}

/// The read end of a named pipe
///
/// Dropping a [`Fifo`] closes both ends.
#[derive(Debug)]
pub struct Fifo {
    path: PathBuf,
    file: File,
    // Never written; keeps the pipe from ever having zero writers
    _writer: File,
}

impl Fifo {
    /// Ensure a FIFO exists at `path`.
    ///
    /// If nothing exists at `path`, create a FIFO with mode `0666`. If a FIFO already exists, do
    /// nothing. If something else exists there, fail with [`Error::PathConflict`] (& leave the
    /// thing be).
    pub fn ensure<P: AsRef<Path>>(path: P) -> Result<FifoStatus> {
        let path = path.as_ref();
        match std::fs::metadata(path) {
            Ok(meta) if meta.file_type().is_fifo() => Ok(FifoStatus::Existing),
            Ok(_) => Err(Error::PathConflict {
                path: path.to_path_buf(),
                back: Backtrace::new(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                make_fifo(path).map_err(|err| Error::MakeFifo {
                    path: path.to_path_buf(),
                    source: err,
                    back: Backtrace::new(),
                })?;
                Ok(FifoStatus::Created)
            }
            Err(err) => Err(Error::MakeFifo {
                path: path.to_path_buf(),
                source: err,
                back: Backtrace::new(),
            }),
        }
    }
    /// Open the FIFO at `path` for reading.
    ///
    /// This returns right away, whether or not anyone has the FIFO open for writing; subsequent
    /// reads block until there is data.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Fifo> {
        let path = path.as_ref();
        let open_error = |err| Error::OpenFifo {
            path: path.to_path_buf(),
            source: err,
            back: Backtrace::new(),
        };
        // Non-blocking, so as not to wait on a writer; once our own write end is open the read
        // end goes back to blocking.
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(open_error)?;
        let writer = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(open_error)?;
        set_blocking(&file).map_err(open_error)?;
        Ok(Fifo {
            path: path.to_path_buf(),
            file,
            _writer: writer,
        })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for Fifo {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

fn set_blocking(file: &File) -> std::io::Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: `fd` is an open descriptor owned by `file` for the duration of both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) } < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

fn make_fifo(path: &Path) -> std::io::Result<()> {
    let cpath = c_path(path)?;
    // SAFETY: `cpath` is a valid, NUL-terminated string that outlives the call.
    if unsafe { libc::mkfifo(cpath.as_ptr(), FIFO_MODE as libc::mode_t) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // `mkfifo(3)` honors the umask; insist on the full mode.
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(FIFO_MODE))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_log");
        assert_eq!(Fifo::ensure(&path).unwrap(), FifoStatus::Created);
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.file_type().is_fifo());
        assert_eq!(meta.permissions().mode() & 0o777, 0o666);
    }

    #[test]
    fn test_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_log");
        Fifo::ensure(&path).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
        assert_eq!(Fifo::ensure(&path).unwrap(), FifoStatus::Existing);
        // Left untouched
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.file_type().is_fifo());
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_log");
        std::fs::write(&path, b"precious").unwrap();
        match Fifo::ensure(&path) {
            Err(Error::PathConflict { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"precious");

        assert!(matches!(
            Fifo::ensure(dir.path()),
            Err(Error::PathConflict { .. })
        ));
    }

    #[test]
    fn test_no_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/access_log");
        assert!(matches!(Fifo::ensure(&path), Err(Error::MakeFifo { .. })));
        assert!(matches!(Fifo::open(&path), Err(Error::OpenFifo { .. })));
    }

    #[test]
    fn test_open_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_log");
        Fifo::ensure(&path).unwrap();

        // No writer yet, and we don't wait for one
        let mut fifo = Fifo::open(&path).unwrap();
        assert_eq!(fifo.path(), path.as_path());

        std::fs::write(&path, b"hello\n").unwrap();
        let mut buf = [0u8; 6];
        fifo.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello\n");
    }

    /// After a writer hangs up, a non-blocking writer can still attach, and the reader is still
    /// waiting for it (rather than looking at end-of-file).
    #[test]
    fn test_writer_reattach() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_log");
        Fifo::ensure(&path).unwrap();
        let mut fifo = Fifo::open(&path).unwrap();

        std::fs::write(&path, b"a\n").unwrap();
        let mut buf = [0u8; 2];
        fifo.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"a\n");

        let mut writer = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .unwrap();
        std::io::Write::write_all(&mut writer, b"b\n").unwrap();
        drop(writer);
        fifo.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"b\n");
    }
}
