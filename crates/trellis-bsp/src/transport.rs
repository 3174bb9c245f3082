//! `Content-Length` framing over byte streams.
//!
//! Every message is prefixed with a header block:
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <payload>
//! ```

use std::io::{self, BufRead, Write};

use thiserror::Error;

const CONTENT_LENGTH: &str = "Content-Length";

/// Largest payload a [`FrameReader`] accepts unless configured otherwise.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Errors raised while reading or writing frames.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A header block ended without a `Content-Length` header.
    #[error("missing Content-Length header")]
    MissingContentLength,
    /// A header line could not be parsed.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// The announced payload exceeds the reader's limit.
    #[error("frame of {length} bytes exceeds the {limit} byte limit")]
    FrameTooLarge {
        /// Length announced by the `Content-Length` header.
        length: usize,
        /// Limit in force.
        limit: usize,
    },
}

/// Reads framed payloads from a buffered stream.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    max_frame_len: usize,
}

impl<R: BufRead> FrameReader<R> {
    /// Wraps `reader`, accepting payloads up to [`DEFAULT_MAX_FRAME_LEN`].
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self::with_max_frame_len(reader, DEFAULT_MAX_FRAME_LEN)
    }

    /// Wraps `reader`, accepting payloads up to `max_frame_len` bytes.
    #[must_use]
    pub const fn with_max_frame_len(reader: R, max_frame_len: usize) -> Self {
        Self {
            reader,
            max_frame_len,
        }
    }

    /// Reads the next payload. Returns `Ok(None)` on a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the stream fails, ends inside a frame,
    /// carries malformed headers, or announces a payload above the limit.
    pub fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(length) = self.read_headers()? else {
            return Ok(None);
        };
        if length > self.max_frame_len {
            return Err(TransportError::FrameTooLarge {
                length,
                limit: self.max_frame_len,
            });
        }
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(length)
            .map_err(|error| io::Error::new(io::ErrorKind::OutOfMemory, error))?;
        payload.resize(length, 0);
        self.reader.read_exact(&mut payload)?;
        Ok(Some(payload))
    }

    fn read_headers(&mut self) -> Result<Option<usize>, TransportError> {
        let mut content_length = None;
        let mut seen_any = false;
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                if seen_any {
                    return Err(TransportError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "stream closed while reading headers",
                    )));
                }
                return Ok(None);
            }
            seen_any = true;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }
            let (name, value) = trimmed
                .split_once(':')
                .ok_or_else(|| TransportError::InvalidHeader(trimmed.to_owned()))?;
            if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
                let length = value
                    .trim()
                    .parse()
                    .map_err(|_| TransportError::InvalidHeader(trimmed.to_owned()))?;
                content_length = Some(length);
            }
        }
        content_length
            .map(Some)
            .ok_or(TransportError::MissingContentLength)
    }
}

/// Writes framed payloads to a stream.
#[derive(Debug)]
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    /// Wraps `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one framed payload and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] when writing fails.
    pub fn write_frame(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        write!(self.writer, "{CONTENT_LENGTH}: {}\r\n\r\n", payload.len())?;
        self.writer.write_all(payload)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
