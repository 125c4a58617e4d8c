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

//! The syslog transport layer.
//!
//! This module defines the [`Transport`] trait that all implementations must support, as well
//! as two implementations over Unix domain sockets: one speaking datagrams ([`UnixSocket`]) and
//! one speaking streams ([`UnixSocketStream`]). [logpipe](crate) only ever talks to the syslog
//! daemon on the local host.
//!
//! # Examples
//!
//! To connect to whatever the local host offers:
//!
//! ```no_run
//! use logpipe::transport::connect_local;
//! let transpo = connect_local().unwrap();
//! ```
//!
//! To a specific socket:
//!
//! ```rust
//! use logpipe::transport::UnixSocket;
//! let transpo = UnixSocket::new("/i/am/not/there.s");
//! assert!(transpo.is_err()); // no such socket, after all
//! ```

use crate::error::{Error, Result};

use backtrace::Backtrace;
use tracing::debug;

use std::{
    os::unix::net::{UnixDatagram, UnixStream},
    path::Path,
};

/// Where syslog daemons customarily listen, in the order we try them
pub const LOCAL_SOCKETS: [&str; 3] = ["/dev/log", "/var/run/syslog", "/var/run/log"];

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all transport layers must support.
pub trait Transport {
    /// Send one complete syslog packet on this transport mechanism.
    fn send(&self, buf: &[u8]) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }
}

fn transport_error(err: std::io::Error) -> Error {
    Error::Transport {
        source: Box::new(err),
        back: Backtrace::new(),
    }
}

/// Sending syslog messages via Unix socket (datagram)
pub struct UnixSocket {
    socket: UnixDatagram,
}

impl UnixSocket {
    /// Construct a [`Transport`] implementation via Unix datagram sockets at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<UnixSocket> {
        let sock = UnixDatagram::unbound().map_err(transport_error)?;
        sock.connect(path).map_err(transport_error)?;
        Ok(UnixSocket { socket: sock })
    }
}

impl Transport for UnixSocket {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        self.socket.send(buf).map_err(transport_error)
    }
}

/// Sending syslog messages via Unix socket (stream)
///
/// Packets are newline-terminated, since a stream has no other way of delimiting them.
pub struct UnixSocketStream {
    socket: UnixStream,
}

impl UnixSocketStream {
    /// Construct a [`Transport`] implementation via Unix stream sockets at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<UnixSocketStream> {
        Ok(UnixSocketStream {
            socket: UnixStream::connect(path).map_err(transport_error)?,
        })
    }
}

impl Transport for UnixSocketStream {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        use std::io::Write;
        // `Write` is implemented for `&UnixStream` as well as `UnixStream`, which lets us write
        // through a shared reference.
        let mut writer: &UnixStream = &self.socket;
        writer.write_all(buf).map_err(transport_error)?;
        if buf.last() != Some(&b'\n') {
            writer.write_all(b"\n").map_err(transport_error)?;
        }
        writer.flush().map_err(transport_error)?;
        Ok(buf.len())
    }
}

/// Connect to the first of `paths` that accepts us, trying a datagram socket first & then a
/// stream socket at each.
pub fn connect_to<P: AsRef<Path>>(paths: &[P]) -> Result<Box<dyn Transport + Send>> {
    let mut last_err = None;
    for path in paths {
        let path = path.as_ref();
        match UnixSocket::new(path) {
            Ok(sock) => {
                debug!(socket = %path.display(), "connected to syslog (datagram)");
                return Ok(Box::new(sock));
            }
            Err(err) => last_err = Some(err),
        }
        match UnixSocketStream::new(path) {
            Ok(sock) => {
                debug!(socket = %path.display(), "connected to syslog (stream)");
                return Ok(Box::new(sock));
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| Error::Transport {
        source: "no syslog sockets to try".into(),
        back: Backtrace::new(),
    }))
}

/// Connect to the local syslog daemon.
pub fn connect_local() -> Result<Box<dyn Transport + Send>> {
    connect_to(&LOCAL_SOCKETS)
}

#[cfg(test)]
mod test {
    use super::*;

    use std::os::unix::net::UnixListener;

    #[test]
    fn test_datagram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        let server = UnixDatagram::bind(&path).unwrap();

        let transpo = UnixSocket::new(&path).unwrap();
        assert_eq!(transpo.send(b"<14>hello").unwrap(), 9);

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<14>hello");
    }

    #[test]
    fn test_stream() {
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        let listener = UnixListener::bind(&path).unwrap();

        let transpo = UnixSocketStream::new(&path).unwrap();
        let (mut conn, _) = listener.accept().unwrap();
        transpo.send(b"<14>one").unwrap();
        transpo.send(b"<14>two\n").unwrap();
        drop(transpo);

        let mut text = String::new();
        conn.read_to_string(&mut text).unwrap();
        assert_eq!(text, "<14>one\n<14>two\n");
    }

    #[test]
    fn test_connect_to() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let stream = dir.path().join("stream");
        let _listener = UnixListener::bind(&stream).unwrap();

        // A datagram connect to a stream listener fails, so we fall back to a stream
        let transpo = connect_to(&[&missing, &stream]).unwrap();
        assert!(transpo.send(b"<14>hello").is_ok());

        assert!(matches!(
            connect_to(&[&missing]),
            Err(Error::Transport { .. })
        ));
        assert!(matches!(
            connect_to::<&Path>(&[]),
            Err(Error::Transport { .. })
        ));
    }
}
