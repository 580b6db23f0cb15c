//! Newline-delimited text framing.
//!
//! Outbound lines use [`LinesCodec`]: exactly one `\n` is appended with no
//! escaping of embedded newlines. Inbound lines use [`LineDecoder`], which
//! ends a line at `\n`, `\r`, or `\r\n` and decodes it as UTF-8, replacing
//! malformed sequences with U+FFFD.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio_util::codec::{Decoder, FramedWrite, LinesCodec};

use crate::error::ReadError;

/// Smallest accepted maximum line length in bytes.
pub const MIN_LINE_LENGTH: usize = 1;

/// Default maximum inbound line length (64 KiB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

const READ_CHUNK: usize = 8 * 1024;

pub(crate) fn clamp_line_length(value: usize) -> usize { value.max(MIN_LINE_LENGTH) }

/// Sink writing one `\n`-terminated line per item and flushing on `send`.
pub type LineWriter<W> = FramedWrite<W, LinesCodec>;

/// Wrap `inner` in a [`LineWriter`].
///
/// # Examples
///
/// ```
/// use futures::SinkExt;
/// use linewire::codec::line_writer;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), tokio_util::codec::LinesCodecError> {
/// let mut writer = line_writer(Vec::new());
/// writer.send("hello").await?;
/// assert_eq!(writer.get_ref().as_slice(), b"hello\n");
/// # Ok(())
/// # }
/// ```
pub fn line_writer<W: AsyncWrite>(inner: W) -> LineWriter<W> {
    FramedWrite::new(inner, LinesCodec::new())
}

/// Decoder for inbound lines.
///
/// A line longer than the limit yields [`ReadError::LineTooLong`] once and is
/// discarded up to its terminator; decoding then resumes with the next line.
#[derive(Clone, Debug)]
pub struct LineDecoder {
    max_line_length: usize,
    /// Bytes already scanned for a terminator.
    next_index: usize,
    discarding: bool,
    /// The previous line ended with `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
}

impl LineDecoder {
    /// Create a decoder that rejects lines longer than `max_line_length`
    /// bytes.
    #[must_use]
    pub fn new(max_line_length: usize) -> Self {
        Self {
            max_line_length: clamp_line_length(max_line_length),
            next_index: 0,
            discarding: false,
            skip_lf: false,
        }
    }

    /// Maximum accepted line length in bytes.
    #[must_use]
    pub fn max_line_length(&self) -> usize { self.max_line_length }

    fn consume_terminator(&mut self, src: &mut BytesMut) {
        self.skip_lf = src[0] == b'\r';
        src.advance(1);
        self.next_index = 0;
    }
}

fn lossy(bytes: &[u8]) -> String { String::from_utf8_lossy(bytes).into_owned() }

impl Decoder for LineDecoder {
    type Item = String;
    type Error = ReadError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.skip_lf {
                let Some(&first) = src.first() else {
                    return Ok(None);
                };
                if first == b'\n' {
                    src.advance(1);
                }
                self.skip_lf = false;
            }

            let read_to = src.len().min(self.max_line_length.saturating_add(1));
            let terminator = src[self.next_index..read_to]
                .iter()
                .position(|b| matches!(b, b'\n' | b'\r'))
                .map(|offset| offset + self.next_index);

            match (self.discarding, terminator) {
                (true, Some(end)) => {
                    src.advance(end);
                    self.consume_terminator(src);
                    self.discarding = false;
                }
                (true, None) => {
                    src.advance(read_to);
                    self.next_index = 0;
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(end)) => {
                    let line = src.split_to(end);
                    self.consume_terminator(src);
                    return Ok(Some(lossy(&line)));
                }
                (false, None) if src.len() > self.max_line_length => {
                    self.discarding = true;
                    self.next_index = 0;
                    return Err(ReadError::LineTooLong {
                        max: self.max_line_length,
                    });
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.skip_lf = false;
        self.next_index = 0;
        if self.discarding || src.is_empty() {
            self.discarding = false;
            src.clear();
            return Ok(None);
        }
        let line = src.split();
        Ok(Some(lossy(&line)))
    }
}

/// Reads inbound lines from an async byte source.
///
/// Unlike a `FramedRead`, a decode error does not end the stream: after an
/// over-long line is reported, reading resumes at the next line. Bytes left
/// without a terminator at end of stream are yielded as a final line.
pub struct LineReader<R> {
    inner: R,
    decoder: LineDecoder,
    buffer: BytesMut,
}

impl<R> LineReader<R> {
    /// Create a reader that rejects lines longer than `max_line_length` bytes.
    #[must_use]
    pub fn new(inner: R, max_line_length: usize) -> Self {
        Self {
            inner,
            decoder: LineDecoder::new(max_line_length),
            buffer: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Maximum accepted line length in bytes.
    #[must_use]
    pub fn max_line_length(&self) -> usize { self.decoder.max_line_length() }

    /// Consume the reader, returning the underlying source.
    pub fn into_inner(self) -> R { self.inner }
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Read the next line, without its terminator.
    ///
    /// Returns `Ok(None)` at end of stream. Empty lines are returned as empty
    /// strings; filtering them is the caller's concern.
    ///
    /// This method is cancel safe: dropping the future before it completes
    /// loses no buffered bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::LineTooLong`] when a line exceeds the limit (the
    /// reader remains usable) and [`ReadError::Io`] when the source fails.
    pub async fn next_line(&mut self) -> Result<Option<String>, ReadError> {
        loop {
            if let Some(line) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(line));
            }

            self.buffer.reserve(READ_CHUNK);
            if self.inner.read_buf(&mut self.buffer).await? == 0 {
                return self.decoder.decode_eof(&mut self.buffer);
            }
        }
    }
}
