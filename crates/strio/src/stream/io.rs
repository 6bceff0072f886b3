//! `std::io` adapters, so a stream plugs into readers and writers.
//!
//! Bytes go through as binary: `Write` never converts encodings and `Read`
//! behaves like [`Stream::read`] with an explicit length.

use std::io::{self, SeekFrom};

use crate::{Stream, Whence, error::StreamError};

impl io::Read for &Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let stream: &Stream = self;
        if buf.is_empty() {
            return Ok(0);
        }
        let len = i64::try_from(buf.len()).unwrap_or(i64::MAX);
        match Stream::read(stream, Some(len))? {
            Some(bytes) => {
                buf[..bytes.len()].copy_from_slice(bytes.as_bytes());
                Ok(bytes.len())
            }
            None => Ok(0),
        }
    }
}

impl io::Write for &Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let stream: &Stream = self;
        Ok(Stream::write(stream, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for &Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let stream: &Stream = self;
        let (offset, whence) = match pos {
            SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| {
                    StreamError::invalid_argument("position beyond the maximum stream length")
                })?;
                (n, Whence::Start)
            }
            SeekFrom::Current(n) => (n, Whence::Current),
            SeekFrom::End(n) => (n, Whence::End),
        };
        Stream::seek(stream, offset, whence)?;
        Ok(stream.pos()? as u64)
    }
}

impl io::Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}

impl io::Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        io::Seek::seek(&mut &*self, pos)
    }
}
