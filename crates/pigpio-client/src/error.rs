//! Client error taxonomy and daemon status mapping

use pigpio_core::{status, Command, DaemonStatus, ProtocolError, ValidationError};
use std::fmt;
use thiserror::Error;

use crate::session::SessionState;

/// Transport phase that failed or timed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Write,
    Read,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connect => write!(f, "connect"),
            Phase::Write => write!(f, "write"),
            Phase::Read => write!(f, "read"),
        }
    }
}

/// Socket-level failures
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Timed out during {0}")]
    TimedOut(Phase),
    #[error("Connection closed by daemon")]
    Closed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by every session operation
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Session is not ready (state: {0})")]
    NotReady(SessionState),
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("{command} failed: {status}")]
    Command {
        command: Command,
        status: DaemonStatus,
    },
    #[error("{command} failed with unrecognized status {code}")]
    UnknownCommand { command: Command, code: i32 },
}

/// Flat discriminant of [`ClientError`] for callers that only branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotReady,
    Connection,
    Protocol,
    Command,
    UnknownCommand,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::NotReady(_) => ErrorKind::NotReady,
            ClientError::Connection(_) => ErrorKind::Connection,
            ClientError::Protocol(_) => ErrorKind::Protocol,
            ClientError::Command { .. } => ErrorKind::Command,
            ClientError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
        }
    }

    /// Daemon status for recognized command failures
    pub fn status(&self) -> Option<&DaemonStatus> {
        match self {
            ClientError::Command { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Whether this error leaves the session unusable
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Connection(_) | ClientError::Protocol(_))
    }
}

/// Map a response result to a value or a daemon failure.
///
/// Non-negative results are returned unchanged. Negative results are looked
/// up in the daemon's status table.
pub fn check_result(command: Command, result: i32) -> Result<u32, ClientError> {
    if result >= 0 {
        return Ok(result as u32);
    }
    match status::lookup(result) {
        Some(status) => Err(ClientError::Command { command, status }),
        None => Err(ClientError::UnknownCommand {
            command,
            code: result,
        }),
    }
}
