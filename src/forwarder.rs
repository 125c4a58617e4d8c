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

//! Writing records to the local syslog daemon
//! ==========================================
//!
//! # Introduction
//!
//! A [`LogForwarder`] pairs a tag with a [`Transport`] and turns each record handed to it into a
//! syslog packet in the form local syslog clients have always used (cf. RFC [3164]):
//!
//! ```text
//! <PRI>Mmm dd hh:mm:ss TAG[PID]: MSG
//! ```
//!
//! There is no HOSTNAME field; when the daemon receives a message over its local socket it knows
//! perfectly well which host it came from, and will add that itself. [rsyslog], listening on
//! `/dev/log`, parses this format with its "special parser".
//!
//! [3164]: https://datatracker.ietf.org/doc/html/rfc3164
//! [rsyslog]: https://www.rsyslog.com/

use crate::{
    error::Result,
    facility::Priority,
    transport::{connect_local, Transport},
};

use bytes::{BufMut, BytesMut};
use chrono::prelude::*;

/// Format & send records under a fixed tag
pub struct LogForwarder<T: Transport> {
    tag: String,
    pid: u32,
    transport: T,
}

impl LogForwarder<Box<dyn Transport + Send>> {
    /// Connect to the local syslog daemon; every record written through the result will be
    /// tagged with `tag`.
    pub fn open(tag: &str) -> Result<Self> {
        Ok(LogForwarder::with_transport(tag, connect_local()?))
    }
}

impl<T: Transport> LogForwarder<T> {
    pub fn with_transport(tag: &str, transport: T) -> Self {
        LogForwarder {
            tag: tag.to_owned(),
            pid: std::process::id(),
            transport,
        }
    }
    pub fn tag(&self) -> &str {
        &self.tag
    }
    /// Send `record` at priority `pri`. Failures are returned, not retried.
    pub fn write(&self, pri: Priority, record: &[u8]) -> Result<usize> {
        self.transport.send(&self.format(pri, record, Local::now()))
    }
    fn format<Tz: TimeZone>(
        &self,
        pri: Priority,
        record: &[u8],
        timestamp: DateTime<Tz>,
    ) -> BytesMut
    where
        Tz::Offset: std::fmt::Display,
    {
        let header = format!(
            "<{}>{} {}[{}]: ",
            pri,
            timestamp.format("%b %_d %H:%M:%S"),
            self.tag,
            self.pid
        );
        let mut buf = BytesMut::with_capacity(header.len() + record.len());
        buf.put_slice(header.as_bytes());
        buf.put_slice(record);
        buf
    }
}
