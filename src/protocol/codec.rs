//! Newline-delimited framing with a hard line limit.
//!
//! Wraps `LinesCodec` so that an over-long or non-UTF-8 line becomes a frame
//! the server can answer, instead of an error that ends the stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// One unit read from the input stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineFrame {
    /// A complete line, without its terminator
    Line(String),
    /// A line longer than the limit; the rest of it is discarded
    Oversized,
    /// A line that is not valid UTF-8
    Malformed(String),
}

/// Line codec bounded to `max_length` bytes per line.
///
/// Once a line passes the limit no more of it is buffered; input is skipped
/// up to the next newline.
#[derive(Debug)]
pub struct LineCodec {
    inner: LinesCodec,
}

impl LineCodec {
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
        }
    }

    fn frame(result: Result<Option<String>, LinesCodecError>) -> std::io::Result<Option<LineFrame>> {
        match result {
            Ok(line) => Ok(line.map(LineFrame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(LineFrame::Oversized)),
            // The offending line is already consumed when decoding fails
            Err(LinesCodecError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                Ok(Some(LineFrame::Malformed(e.to_string())))
            }
            Err(LinesCodecError::Io(e)) => Err(e),
        }
    }
}

impl Decoder for LineCodec {
    type Item = LineFrame;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::io::Result<Option<Self::Item>> {
        Self::frame(self.inner.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> std::io::Result<Option<Self::Item>> {
        Self::frame(self.inner.decode_eof(src))
    }
}
