//! Tokio codecs for the line-oriented event stream.
//!
//! Both codecs wrap [`LinesCodec`] with a length limit, so an endless line
//! cannot grow the buffer without bound.
//!
//! ```text
//! stdin  ─► FramedRead<_, CommandCodec> ─► Command
//! Event  ─► FramedWrite<_, EventCodec>  ─► stdout (JSON + '\n')
//! ```
//!
//! The command direction never fails on bad input: overlong lines, invalid
//! UTF-8 and unrecognized text are dropped and decoding continues. Only
//! real I/O errors are returned.

use bytes::{BufMut, BytesMut};
use rollcall_core::constants::MAX_COMMAND_LINE;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use tracing::{debug, trace};

use crate::{Command, Event, ProtocolError, Result};

/// Default maximum length of one event line when decoding.
const DEFAULT_MAX_EVENT_LINE: usize = 8 * 1024;

/// Codec for outbound events: one JSON object per line.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use tokio_util::codec::Encoder;
/// use rollcall_protocol::{Event, EventCodec};
///
/// let mut codec = EventCodec::new();
/// let mut buffer = BytesMut::new();
/// codec.encode(Event::boot(), &mut buffer).unwrap();
///
/// assert_eq!(&buffer[..], b"{\"event\":\"boot\",\"status\":\"ok\"}\n");
/// ```
#[derive(Debug)]
pub struct EventCodec {
    lines: LinesCodec,
    max_line: usize,
}

impl EventCodec {
    /// Create a new codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_line(DEFAULT_MAX_EVENT_LINE)
    }

    /// Create a new codec with a custom decode line limit.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_line),
            max_line,
        }
    }

    fn map_lines_error(&self, error: LinesCodecError) -> ProtocolError {
        match error {
            LinesCodecError::MaxLineLengthExceeded => ProtocolError::LineTooLong {
                max: self.max_line,
            },
            LinesCodecError::Io(e) => ProtocolError::Io(e),
        }
    }
}

impl Default for EventCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<Event> for EventCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Event, dst: &mut BytesMut) -> Result<()> {
        let line = item.to_json()?;
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

impl Decoder for EventCodec {
    type Item = Event;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Event>> {
        loop {
            match self.lines.decode(src) {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Event::from_json(&line).map(Some),
                Ok(None) => return Ok(None),
                Err(e) => return Err(self.map_lines_error(e)),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Event>> {
        match self.decode(src)? {
            Some(event) => Ok(Some(event)),
            None => match self.lines.decode_eof(src) {
                Ok(Some(line)) if !line.trim().is_empty() => Event::from_json(&line).map(Some),
                Ok(_) => Ok(None),
                Err(e) => Err(self.map_lines_error(e)),
            },
        }
    }
}

/// Codec for inbound commands: one command per line.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use tokio_util::codec::Decoder;
/// use rollcall_protocol::{Command, CommandCodec};
///
/// let mut codec = CommandCodec::new();
/// let mut buffer = BytesMut::from(&b"hello\nSYNC\n"[..]);
///
/// assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Command::Sync));
/// assert_eq!(codec.decode(&mut buffer).unwrap(), None);
/// ```
#[derive(Debug)]
pub struct CommandCodec {
    lines: LinesCodec,
}

impl CommandCodec {
    /// Create a new codec limited to
    /// [`MAX_COMMAND_LINE`](rollcall_core::constants::MAX_COMMAND_LINE) bytes per line.
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_COMMAND_LINE),
        }
    }

    /// Pull lines until one parses as a command or the input runs dry.
    fn next_command(
        &mut self,
        src: &mut BytesMut,
        eof: bool,
    ) -> Result<Option<Command>> {
        loop {
            let next = if eof {
                self.lines.decode_eof(src)
            } else {
                self.lines.decode(src)
            };

            match next {
                Ok(Some(line)) => match Command::parse(&line) {
                    Some(command) => return Ok(Some(command)),
                    None => trace!(line = %line, "Ignoring unrecognized line"),
                },
                Ok(None) => return Ok(None),
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    debug!(max = MAX_COMMAND_LINE, "Discarding overlong command line");
                }
                Err(LinesCodecError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                    debug!("Discarding command line with invalid UTF-8");
                }
                Err(LinesCodecError::Io(e)) => return Err(ProtocolError::Io(e)),
            }
        }
    }
}

impl Default for CommandCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for CommandCodec {
    type Item = Command;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Command>> {
        self.next_command(src, false)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Command>> {
        self.next_command(src, true)
    }
}

impl Encoder<Command> for CommandCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        let line = item.to_string();
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
