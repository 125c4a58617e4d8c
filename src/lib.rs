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
//! Forward lines written to named pipes ([FIFO]s) to a [`syslog`] daemon
//!
//! [FIFO]: https://man7.org/linux/man-pages/man7/fifo.7.html
//! [`syslog`]: https://en.wikipedia.org/wiki/Syslog
//!
//! # Introduction
//!
//! Plenty of programs can only be told to log to a file: give them a path & they'll append lines
//! to it. If you'd rather those lines wound up in syslog (and from there in whatever log
//! collection your hosts feed), you can hand such a program the path to a named pipe instead,
//! and have something on the other end of the pipe pass each line along. That something is
//! [logpipe](crate).
//!
//! For each pipe it is configured to watch, [logpipe](crate) will:
//!
//! 1. make sure there is a FIFO at the configured path (creating one, mode `0666`, if need be;
//!    refusing to go on if there's a regular file or some such sitting there)
//!
//! 2. connect to the local syslog daemon (over `/dev/log`, or wherever the host keeps it)
//!
//! 3. read the FIFO a line at a time, sending each non-empty line to syslog at the configured
//!    facility & severity, tagged with the configured tag
//!
//! Each pipe is serviced by its own thread, so a slow or idle pipe never holds up another.
//!
//! # Usage
//!
//! The binary reads `/etc/logpipe.conf`:
//!
//! ```toml
//! [[pipe]]
//! path = "/tmp/access_log"
//! facility = "local6"
//! severity = "info"
//! tag = "nginx"
//! ```
//!
//! The library can be driven directly, too:
//!
//! ```no_run
//! use logpipe::{config::PipeSpec, supervisor::Supervisor};
//!
//! let specs = vec![PipeSpec::new("/tmp/access_log", "local6", "info", "nginx").unwrap()];
//! // Blocks for as long as the workers run
//! let report = Supervisor::new(specs).run().unwrap();
//! ```

#[path = "byte-utils.rs"]
mod byte_utils;

pub mod config;
pub mod error;
pub mod facility;
pub mod fifo;
pub mod forwarder;
pub mod reader;
pub mod supervisor;
pub mod transport;
pub mod worker;
