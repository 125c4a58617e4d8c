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

//! Newline-delimited records.

use bytes::{Bytes, BytesMut};

use std::io::Read;

const DELIMITER: u8 = b'\n';

/// How much we ask the underlying reader for at a time (a Linux pipe buffer is 64K, but most
/// writes into a FIFO are a single log line)
const CHUNK: usize = 8192;

/// Split a byte stream into records on `\n`
///
/// [`LineReader::next_record`] returns each record without its delimiter. At end-of-stream, any
/// unterminated remainder is returned as one final record, followed by `Ok(None)`. End-of-stream
/// isn't sticky: the next call reads from the underlying source again, so a source that produces
/// more data later (a pipe that gets a new writer, say) picks up where it left off. Empty lines
/// come back as empty records; it's up to the caller to skip them.
pub struct LineReader<R: Read> {
    inner: R,
    buf: BytesMut,
    // `buf[..scanned]` is known not to contain a delimiter
    scanned: usize,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> LineReader<R> {
        LineReader {
            inner,
            buf: BytesMut::with_capacity(CHUNK),
            scanned: 0,
            eof: false,
        }
    }
    /// Return the next record, `Ok(None)` at end-of-stream, or the underlying read error.
    pub fn next_record(&mut self) -> std::io::Result<Option<Bytes>> {
        loop {
            if let Some(idx) = self.buf[self.scanned..]
                .iter()
                .position(|&x| x == DELIMITER)
            {
                let mut record = self.buf.split_to(self.scanned + idx + 1);
                record.truncate(self.scanned + idx);
                self.scanned = 0;
                return Ok(Some(record.freeze()));
            }
            self.scanned = self.buf.len();

            if self.eof {
                if self.buf.is_empty() {
                    self.eof = false;
                    return Ok(None);
                }
                self.scanned = 0;
                return Ok(Some(self.buf.split().freeze()));
            }

            self.fill()?;
        }
    }
    pub fn get_ref(&self) -> &R {
        &self.inner
    }
    fn fill(&mut self) -> std::io::Result<()> {
        let start = self.buf.len();
        self.buf.resize(start + CHUNK, 0);
        let result = loop {
            match self.inner.read(&mut self.buf[start..]) {
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                result => break result,
            }
        };
        match result {
            Ok(0) => {
                self.buf.truncate(start);
                self.eof = true;
                Ok(())
            }
            Ok(n) => {
                self.buf.truncate(start + n);
                Ok(())
            }
            Err(err) => {
                self.buf.truncate(start);
                Err(err)
            }
        }
    }
}
