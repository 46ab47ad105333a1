//! pigpio core - wire format and local rules for the pigpio socket protocol
//!
//! This crate has no I/O. It provides:
//! - The packet codec (16-byte header plus optional extension)
//! - The command table and which commands carry payload replies
//! - The daemon's status code table
//! - Pre-flight validation of command parameters
//! - Value types (pin modes, pulls, levels, typed resource handles)

pub mod command;
pub mod packet;
pub mod status;
pub mod types;
pub mod validate;

pub use command::{Command, ReplyShape};
pub use packet::{decode, decode_header, encode, Header, Packet, ProtocolError, HEADER_LEN, MAX_EXTENSION_LEN};
pub use status::{DaemonStatus, StatusKind};
pub use types::{HandleKind, I2cHandle, Level, PinMode, Pull, ResourceHandle, SerialHandle, SpiHandle};
pub use validate::{Constraint, ValidationError};

/// Default TCP port of the pigpio daemon
pub const DEFAULT_PORT: u16 = 8888;

/// Default daemon host
pub const DEFAULT_HOST: &str = "localhost";
