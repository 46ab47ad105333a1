//! Packet encoding and decoding for the pigpio socket protocol
//!
//! Every message starts with a 16-byte header of four little-endian u32
//! fields: `command, p1, p2, p3`. Requests that carry bulk data declare its
//! length in `p3` and append the bytes directly after the header. Responses
//! reuse the header; `p3` read as i32 is the result, and for extended
//! responses a positive result is also the number of payload bytes that
//! follow.

use thiserror::Error;

use crate::command::{Command, ReplyShape};

/// Size of the fixed packet header in bytes
pub const HEADER_LEN: usize = 16;

/// Largest extension payload accepted in either direction
pub const MAX_EXTENSION_LEN: usize = 65_536;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Header truncated: expected 16 bytes, got {0}")]
    ShortHeader(usize),
    #[error("Payload truncated: declared {declared} bytes, got {received}")]
    Truncated { declared: usize, received: usize },
    #[error("Payload of {0} bytes exceeds the 65536 byte limit")]
    PayloadTooLarge(usize),
    #[error("Unexpected {0} trailing bytes after a header-only response")]
    UnexpectedPayload(usize),
    #[error("Response echoes command {received}, expected {expected}")]
    CommandMismatch { expected: u32, received: u32 },
    #[error("Unexpected value {value} returned by {command}")]
    UnexpectedValue { command: Command, value: i64 },
}

/// Decoded 16-byte header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub command: u32,
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
}

impl Header {
    /// The fourth field as the daemon's signed result
    pub fn result(&self) -> i32 {
        self.p3 as i32
    }

    /// Number of payload bytes that follow this header for a reply of the
    /// given shape. Negative results never carry a payload.
    pub fn payload_len(&self, shape: ReplyShape) -> Result<usize, ProtocolError> {
        match shape {
            ReplyShape::Plain => Ok(0),
            ReplyShape::Extended => {
                let result = self.result();
                if result <= 0 {
                    return Ok(0);
                }
                let len = result as usize;
                if len > MAX_EXTENSION_LEN {
                    return Err(ProtocolError::PayloadTooLarge(len));
                }
                Ok(len)
            }
        }
    }
}

/// Decode a header from exactly 16 bytes
pub fn decode_header(bytes: &[u8; HEADER_LEN]) -> Header {
    let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Header {
        command: word(0),
        p1: word(4),
        p2: word(8),
        p3: word(12),
    }
}

/// A request or response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    header: Header,
    extension: Vec<u8>,
}

impl Packet {
    /// Build a request with no extension (`p3 = 0`)
    pub fn request(command: Command, p1: u32, p2: u32) -> Self {
        Self {
            header: Header {
                command: command.code(),
                p1,
                p2,
                p3: 0,
            },
            extension: Vec::new(),
        }
    }

    /// Append a little-endian u32 word to the extension
    pub fn with_u32(self, value: u32) -> Self {
        self.with_bytes(&value.to_le_bytes())
    }

    /// Append raw bytes to the extension, updating the declared length
    pub fn with_bytes(mut self, bytes: &[u8]) -> Self {
        self.extension.extend_from_slice(bytes);
        self.header.p3 = self.extension.len() as u32;
        self
    }

    /// Append a string's bytes (no terminator) to the extension
    pub fn with_str(self, value: &str) -> Self {
        self.with_bytes(value.as_bytes())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn command(&self) -> u32 {
        self.header.command
    }

    pub fn p1(&self) -> u32 {
        self.header.p1
    }

    pub fn p2(&self) -> u32 {
        self.header.p2
    }

    pub fn p3(&self) -> u32 {
        self.header.p3
    }

    /// The signed result carried by a response
    pub fn result(&self) -> i32 {
        self.header.result()
    }

    pub fn extension(&self) -> &[u8] {
        &self.extension
    }

    /// Encode into wire bytes: header followed by the extension
    pub fn encode(&self) -> Vec<u8> {
        encode(
            self.header.command,
            self.header.p1,
            self.header.p2,
            self.header.p3,
            &self.extension,
        )
    }
}

/// Encode a packet from its raw fields
pub fn encode(command: u32, p1: u32, p2: u32, p3: u32, extension: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + extension.len());
    bytes.extend_from_slice(&command.to_le_bytes());
    bytes.extend_from_slice(&p1.to_le_bytes());
    bytes.extend_from_slice(&p2.to_le_bytes());
    bytes.extend_from_slice(&p3.to_le_bytes());
    bytes.extend_from_slice(extension);
    bytes
}

/// Decode a response. The payload is only read for extended replies.
pub fn decode(bytes: &[u8], shape: ReplyShape) -> Result<Packet, ProtocolError> {
    let head: &[u8; HEADER_LEN] = bytes
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(ProtocolError::ShortHeader(bytes.len()))?;
    let header = decode_header(head);
    let rest = &bytes[HEADER_LEN..];

    let declared = header.payload_len(shape)?;
    if rest.len() < declared {
        return Err(ProtocolError::Truncated {
            declared,
            received: rest.len(),
        });
    }
    if rest.len() > declared {
        return Err(ProtocolError::UnexpectedPayload(rest.len() - declared));
    }

    Ok(Packet {
        header,
        extension: rest.to_vec(),
    })
}
