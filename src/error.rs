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
//! [logpipe](crate) errors

use backtrace::Backtrace;

use std::path::PathBuf;

/// [logpipe](crate) error type
///
/// Like its sibling crates, [logpipe](crate) eschews libraries like [thiserror], [anyhow] &
/// [Snafu] in favor of a straightforward enumeration with a few match arms chosen on the basis of
/// what the caller will need to respond. Broadly, the variants fall into three groups:
///
/// - configuration errors: the operator needs to fix `/etc/logpipe.conf`
/// - path conflicts: something other than a FIFO is sitting where a FIFO should be
/// - I/O errors: creating or reading the FIFO, or talking to the syslog daemon, failed
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [Snafu]: https://docs.rs/snafu/latest/snafu
#[non_exhaustive]
pub enum Error {
    /// Failed to read the configuration file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
        back: Backtrace,
    },
    /// Failed to parse the configuration file
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
        back: Backtrace,
    },
    /// A pipe was configured with no path
    NoPath { back: Backtrace },
    /// A pipe was configured with no facility
    NoFacility { path: PathBuf, back: Backtrace },
    /// A pipe was configured with a facility name we don't recognize
    UnknownFacility {
        path: PathBuf,
        name: String,
        back: Backtrace,
    },
    /// A pipe was configured with no severity
    NoSeverity { path: PathBuf, back: Backtrace },
    /// A pipe was configured with a severity name we don't recognize
    UnknownSeverity {
        path: PathBuf,
        name: String,
        back: Backtrace,
    },
    /// Unable to derive a default tag from the current executable
    NoTag { path: PathBuf, back: Backtrace },
    /// The path exists, but is not a named pipe
    PathConflict { path: PathBuf, back: Backtrace },
    /// Failed to create the named pipe
    MakeFifo {
        path: PathBuf,
        source: std::io::Error,
        back: Backtrace,
    },
    /// Failed to open the named pipe for reading
    OpenFifo {
        path: PathBuf,
        source: std::io::Error,
        back: Backtrace,
    },
    /// Failed to read from the named pipe
    Read {
        path: PathBuf,
        source: std::io::Error,
        back: Backtrace,
    },
    /// General transport layer error (connecting or sending to the syslog daemon)
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// Failed to start a worker thread
    Spawn {
        path: PathBuf,
        source: std::io::Error,
        back: Backtrace,
    },
    /// A worker thread exited without reporting a result
    WorkerPanicked { path: PathBuf, back: Backtrace },
}

impl Error {
    /// True if this error means the configuration needs fixing; the caller is expected to print
    /// the usage template & exit.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigRead { .. }
                | Error::ConfigParse { .. }
                | Error::NoPath { .. }
                | Error::NoFacility { .. }
                | Error::UnknownFacility { .. }
                | Error::NoSeverity { .. }
                | Error::UnknownSeverity { .. }
        )
    }
    fn backtrace(&self) -> &Backtrace {
        match self {
            Error::ConfigRead { back, .. }
            | Error::ConfigParse { back, .. }
            | Error::NoPath { back }
            | Error::NoFacility { back, .. }
            | Error::UnknownFacility { back, .. }
            | Error::NoSeverity { back, .. }
            | Error::UnknownSeverity { back, .. }
            | Error::NoTag { back, .. }
            | Error::PathConflict { back, .. }
            | Error::MakeFifo { back, .. }
            | Error::OpenFifo { back, .. }
            | Error::Read { back, .. }
            | Error::Transport { back, .. }
            | Error::Spawn { back, .. }
            | Error::WorkerPanicked { back, .. } => back,
        }
    }
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ConfigRead { path, source, .. } => {
                write!(f, "Couldn't read configuration file {:?}: {}", path, source)
            }
            Error::ConfigParse { path, source, .. } => {
                write!(f, "Couldn't parse configuration file {:?}: {}", path, source)
            }
            Error::NoPath { .. } => write!(f, "Configuration error: a pipe has no path set"),
            Error::NoFacility { path, .. } => {
                write!(f, "Configuration error: {:?} has no facility set", path)
            }
            Error::UnknownFacility { path, name, .. } => write!(
                f,
                "Configuration error: {:?} has unknown facility ({})",
                path, name
            ),
            Error::NoSeverity { path, .. } => {
                write!(f, "Configuration error: {:?} has no severity set", path)
            }
            Error::UnknownSeverity { path, name, .. } => write!(
                f,
                "Configuration error: {:?} has unknown severity ({})",
                path, name
            ),
            Error::NoTag { path, .. } => write!(
                f,
                "{:?} has no tag set, and none could be derived from the executable name",
                path
            ),
            Error::PathConflict { path, .. } => {
                write!(f, "{:?} exists, but it's not a named pipe (FIFO)", path)
            }
            Error::MakeFifo { path, source, .. } => {
                write!(f, "Creating named pipe {:?} failed: {}", path, source)
            }
            Error::OpenFifo { path, source, .. } => {
                write!(f, "Opening named pipe {:?} failed: {}", path, source)
            }
            Error::Read { path, source, .. } => {
                write!(f, "Reading from pipe {:?} failed: {}", path, source)
            }
            Error::Transport { source, .. } => write!(f, "Writing to syslog failed: {}", source),
            Error::Spawn { path, source, .. } => {
                write!(f, "Starting the worker for {:?} failed: {}", path, source)
            }
            Error::WorkerPanicked { path, .. } => {
                write!(f, "The worker for {:?} exited without a result", path)
            }
            _ => write!(f, "Other logpipe error"),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}\n{:#?}", self, self.backtrace())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigRead { source, .. }
            | Error::MakeFifo { source, .. }
            | Error::OpenFifo { source, .. }
            | Error::Read { source, .. }
            | Error::Spawn { source, .. } => Some(source),
            Error::ConfigParse { source, .. } => Some(source),
            Error::Transport { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
