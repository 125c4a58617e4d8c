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

//! The per-pipe forwarding loop.
//!
//! A [`Worker`] owns everything needed to service one [`PipeSpec`]: the FIFO on the filesystem
//! and a connection to the syslog daemon. Its life goes:
//!
//! 1. resolving: done before the [`Worker`] exists, when the [`PipeSpec`] is validated
//! 2. opening: [`Worker::open`] makes sure the FIFO exists, opens it & connects to syslog
//! 3. forwarding: [`Worker::run`] reads records from the FIFO & writes each non-empty one to
//!    syslog, forever
//!
//! The FIFO is opened once and held for the life of the [`Worker`], so writers can come & go
//! (including writers that open with `O_NONBLOCK`, which would fail with `ENXIO` were there no
//! reader). The only way out of [`Worker::run`] is an error.

use crate::{
    config::PipeSpec,
    error::{Error, Result},
    fifo::{Fifo, FifoStatus},
    forwarder::LogForwarder,
    reader::LineReader,
    transport::Transport,
};

use backtrace::Backtrace;
use tracing::{debug, info, trace};

use std::io::Read;

/// What one call to [`Worker::step`] did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A record was sent to syslog
    Forwarded,
    /// An empty record was read & dropped
    Skipped,
    /// The reader hit end-of-stream
    EndOfStream,
}

/// Forward the records written to one named pipe to syslog
pub struct Worker<T: Transport, R: Read = Fifo> {
    spec: PipeSpec,
    reader: LineReader<R>,
    forwarder: LogForwarder<T>,
}

impl Worker<Box<dyn Transport + Send>> {
    /// Make sure `spec`'s FIFO exists, open it & connect to the local syslog daemon.
    pub fn open(spec: PipeSpec) -> Result<Self> {
        let fifo = open_fifo(&spec)?;
        let forwarder = LogForwarder::open(spec.tag())?;
        Ok(Worker::assemble(spec, fifo, forwarder))
    }
}

impl<T: Transport> Worker<T> {
    /// Make sure `spec`'s FIFO exists & open it; records will be sent through `transport`,
    /// tagged with `spec`'s tag.
    pub fn with_transport(spec: PipeSpec, transport: T) -> Result<Self> {
        let fifo = open_fifo(&spec)?;
        let forwarder = LogForwarder::with_transport(spec.tag(), transport);
        Ok(Worker::assemble(spec, fifo, forwarder))
    }
    /// Forward records from the FIFO to syslog for as long as we can; this only returns on error.
    pub fn run(mut self) -> Result<()> {
        info!(
            facility = self.spec.facility().name(),
            severity = self.spec.level().name(),
            tag = self.forwarder.tag(),
            "forwarding"
        );
        let mut forwarded = 0usize;
        loop {
            match self.step()? {
                Step::Forwarded => forwarded += 1,
                Step::Skipped => (),
                // We hold a write end, so this shouldn't happen; if it does, the next read
                // blocks like any other.
                Step::EndOfStream => debug!(forwarded, "end-of-stream"),
            }
        }
    }
}

impl<T: Transport, R: Read> Worker<T, R> {
    fn assemble(spec: PipeSpec, reader: R, forwarder: LogForwarder<T>) -> Self {
        Worker {
            spec,
            reader: LineReader::new(reader),
            forwarder,
        }
    }
    pub fn spec(&self) -> &PipeSpec {
        &self.spec
    }
    /// Read the next record & forward it, unless it's empty.
    ///
    /// Records go out in the order they were read. Read & transport failures are returned.
    pub fn step(&mut self) -> Result<Step> {
        let record = self.reader.next_record().map_err(|err| Error::Read {
            path: self.spec.path().to_path_buf(),
            source: err,
            back: Backtrace::new(),
        })?;
        match record {
            None => Ok(Step::EndOfStream),
            Some(record) if record.is_empty() => Ok(Step::Skipped),
            Some(record) => {
                trace!(len = record.len(), "forwarding record");
                self.forwarder.write(self.spec.priority(), &record)?;
                Ok(Step::Forwarded)
            }
        }
    }
}

fn open_fifo(spec: &PipeSpec) -> Result<Fifo> {
    if Fifo::ensure(spec.path())? == FifoStatus::Created {
        info!(path = %spec.path().display(), "created named pipe");
    }
    Fifo::open(spec.path())
}

/// Service `spec` until something goes wrong.
pub fn run(spec: PipeSpec) -> Result<()> {
    Worker::open(spec)?.run()
}
