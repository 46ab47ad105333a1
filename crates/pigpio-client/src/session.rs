//! Session lifecycle and the serialized request/response path
//!
//! A session owns one transport and moves through:
//!
//! ```text
//! Unconnected -> Connecting -> Connected -> Ready
//!       any state --(I/O or protocol failure)--> Faulted
//!       any state --(close)--> Closed
//! ```
//!
//! `Ready` is reached after the version handshake succeeds. Only `Ready`
//! sessions dispatch commands; everything else fails fast without touching
//! the transport. The transport sits behind an async mutex that is held for
//! the whole request/response pair, so concurrent callers never interleave
//! bytes on the stream.

use pigpio_core::{
    decode, validate, Command, Constraint, HandleKind, Packet, ProtocolError, ResourceHandle,
    StatusKind, ValidationError,
};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::{check_result, ClientError};
use crate::registry::HandleRegistry;
use crate::transport::{TcpTransport, Transport};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unconnected,
    Connecting,
    Connected,
    Ready,
    Faulted,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unconnected => "unconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Ready => "ready",
            SessionState::Faulted => "faulted",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A connection to one daemon
pub struct Session<T = TcpTransport> {
    config: ClientConfig,
    link: tokio::sync::Mutex<Option<T>>,
    state: Mutex<SessionState>,
    version: AtomicU32,
    handles: HandleRegistry,
}

/// Marks the session faulted and forgets its handles if an exchange future
/// is dropped mid-flight
struct FaultOnDrop<'a> {
    state: &'a Mutex<SessionState>,
    handles: &'a HandleRegistry,
    armed: bool,
}

impl FaultOnDrop<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FaultOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            *state = SessionState::Faulted;
            drop(state);
            let dropped = self.handles.drain();
            warn!(
                handles = dropped.len(),
                "Exchange abandoned before the response was read, session faulted"
            );
        }
    }
}

impl<T: Transport> Session<T> {
    /// Create an unconnected session
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            link: tokio::sync::Mutex::new(None),
            state: Mutex::new(SessionState::Unconnected),
            version: AtomicU32::new(0),
            handles: HandleRegistry::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// Handles opened through this session and not yet closed
    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Daemon version reported by the handshake
    pub fn daemon_version(&self) -> Option<u32> {
        match self.state() {
            SessionState::Ready => Some(self.version.load(Ordering::Acquire)),
            _ => None,
        }
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if *state != next {
            debug!(from = %*state, to = %next, "Session state change");
            *state = next;
        }
    }

    /// Fail with `NotReady` unless the session can dispatch
    pub(crate) fn ensure_ready(&self) -> Result<(), ClientError> {
        match self.state() {
            SessionState::Ready => Ok(()),
            other => Err(ClientError::NotReady(other)),
        }
    }

    /// Attach a connected transport and perform the version handshake.
    ///
    /// Any previous transport is shut down and its handles forgotten.
    /// Returns the daemon version.
    pub async fn attach(&self, transport: T) -> Result<u32, ClientError> {
        let mut link = self.link.lock().await;
        self.teardown(&mut link).await;
        self.handshake(&mut link, transport).await
    }

    async fn handshake(&self, link: &mut Option<T>, transport: T) -> Result<u32, ClientError> {
        *link = Some(transport);
        self.set_state(SessionState::Connected);

        let request = Packet::request(Command::Version, 0, 0);
        let response = self.round_trip(link, &request, Command::Version).await?;
        let version = response.p3();

        self.version.store(version, Ordering::Release);
        self.set_state(SessionState::Ready);
        info!(version, "Session ready");
        Ok(version)
    }

    /// Shut down the current transport, if any, and forget its handles
    async fn teardown(&self, link: &mut Option<T>) {
        if let Some(mut transport) = link.take() {
            if let Err(e) = transport.shutdown().await {
                debug!(error = %e, "Transport shutdown failed");
            }
        }
        let dropped = self.handles.drain();
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "Forgot handles of previous connection");
        }
    }

    /// Write one request and read its response. Transport and protocol
    /// failures fault the session and drop the transport.
    async fn round_trip(
        &self,
        link: &mut Option<T>,
        request: &Packet,
        command: Command,
    ) -> Result<Packet, ClientError> {
        let transport = link.as_mut().ok_or(ClientError::NotReady(self.state()))?;
        let guard = FaultOnDrop {
            state: &self.state,
            handles: &self.handles,
            armed: true,
        };
        let outcome = transact(transport, request, command).await;
        guard.disarm();

        if let Err(e) = &outcome {
            warn!(command = %command, error = %e, "Exchange failed, session faulted");
            *link = None;
            self.set_state(SessionState::Faulted);
            self.handles.drain();
        }
        outcome
    }

    /// Send a request on a ready session and return the raw response.
    /// The result field is not interpreted.
    pub(crate) async fn exchange(&self, command: Command, request: Packet) -> Result<Packet, ClientError> {
        self.ensure_ready()?;
        let mut link = self.link.lock().await;
        // Another caller may have faulted or closed the session while we waited
        self.ensure_ready()?;

        trace!(
            command = %command,
            p1 = request.p1(),
            p2 = request.p2(),
            p3 = request.p3(),
            "Request"
        );
        let response = self.round_trip(&mut link, &request, command).await?;
        trace!(
            command = %command,
            result = response.result(),
            payload = response.extension().len(),
            "Response"
        );
        Ok(response)
    }

    /// Send a request and map a negative result to a daemon error
    pub(crate) async fn dispatch(&self, command: Command, request: Packet) -> Result<Packet, ClientError> {
        let response = self.exchange(command, request).await?;
        check_result(command, response.result())?;
        Ok(response)
    }

    /// Send a request and return its non-negative result
    pub(crate) async fn value(&self, command: Command, request: Packet) -> Result<u32, ClientError> {
        let response = self.exchange(command, request).await?;
        check_result(command, response.result())
    }

    /// Reject handles this session did not open, in strict mode
    pub(crate) fn check_handle<H: ResourceHandle>(&self, handle: H) -> Result<(), ClientError> {
        if self.config.strict_handles && !self.handles.is_valid(H::KIND, handle.id()) {
            return Err(ValidationError::new("handle", handle.id(), Constraint::NotOpen(H::KIND)).into());
        }
        Ok(())
    }

    /// Register the handle returned by an open command
    pub(crate) fn opened(&self, kind: HandleKind, handle: u32) {
        self.handles.register(kind, handle);
    }

    /// Close a handle. Closing a handle this session does not hold is a
    /// no-op in strict mode.
    pub(crate) async fn close_handle<H: ResourceHandle>(
        &self,
        command: Command,
        handle: H,
    ) -> Result<(), ClientError> {
        self.ensure_ready()?;
        if self.config.strict_handles && !self.handles.is_valid(H::KIND, handle.id()) {
            debug!(kind = %H::KIND, handle = handle.id(), "Handle not open, nothing to close");
            return Ok(());
        }

        let outcome = self
            .dispatch(command, Packet::request(command, handle.id(), 0))
            .await;
        // A bad-handle reply means the daemon no longer knows this handle
        let gone = match &outcome {
            Ok(_) => true,
            Err(e) => e.status().map(|s| s.kind) == Some(StatusKind::BadHandle),
        };
        if gone {
            self.handles.release(H::KIND, handle.id());
        }
        outcome.map(|_| ())
    }

    /// Close outstanding handles, shut the transport down and move to
    /// `Closed`. Failures closing individual handles are logged only.
    pub async fn close(&self) -> Result<(), ClientError> {
        let mut link = self.link.lock().await;

        if self.state() == SessionState::Ready && self.config.close_handles_on_shutdown {
            for (kind, handle) in self.handles.outstanding() {
                let command = match kind {
                    HandleKind::I2c => Command::I2cClose,
                    HandleKind::Spi => Command::SpiClose,
                    HandleKind::Serial => Command::SerialClose,
                };
                let request = Packet::request(command, handle, 0);
                match self
                    .round_trip(&mut link, &request, command)
                    .await
                    .and_then(|r| check_result(command, r.result()))
                {
                    Ok(_) => debug!(kind = %kind, handle, "Closed handle on shutdown"),
                    Err(e) => {
                        warn!(kind = %kind, handle, error = %e, "Failed to close handle on shutdown");
                        if e.is_fatal() {
                            break;
                        }
                    }
                }
            }
        }

        let leaked = self.handles.outstanding();
        if !leaked.is_empty() {
            debug!(count = leaked.len(), "Handles left open on the daemon");
        }
        self.handles.drain();

        let shutdown = match link.take() {
            Some(mut transport) => transport.shutdown().await,
            None => Ok(()),
        };
        self.set_state(SessionState::Closed);
        info!("Session closed");
        shutdown
    }
}

impl Session<TcpTransport> {
    /// Connect to the daemon described by `config` and perform the handshake
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let session = Self::new(config);
        session.open().await?;
        Ok(session)
    }

    /// (Re)open the TCP connection. Returns the daemon version.
    pub async fn open(&self) -> Result<u32, ClientError> {
        let mut link = self.link.lock().await;
        self.teardown(&mut link).await;
        self.set_state(SessionState::Connecting);
        info!(addr = %self.config.address(), "Connecting");

        let transport = match TcpTransport::connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
            self.config.io_timeout(),
        )
        .await
        {
            Ok(transport) => transport,
            Err(e) => {
                self.set_state(SessionState::Faulted);
                return Err(e);
            }
        };

        self.handshake(&mut link, transport).await
    }
}

/// One request/response pair. The reply must echo the request's command.
async fn transact<T: Transport>(
    transport: &mut T,
    request: &Packet,
    command: Command,
) -> Result<Packet, ClientError> {
    let shape = command.reply_shape();
    let bytes = transport.exchange(&request.encode(), shape).await?;
    let response = decode(&bytes, shape)?;
    if response.command() != command.code() {
        return Err(ProtocolError::CommandMismatch {
            expected: command.code(),
            received: response.command(),
        }
        .into());
    }
    Ok(response)
}

/// Connect to a daemon at `host:port` with default settings
pub async fn connect(host: &str, port: u16) -> Result<Session, ClientError> {
    Session::connect(ClientConfig::new(host, port)).await
}

/// Copy a reply payload into `buffer[offset..offset + length]`.
///
/// At most `min(declared, received, length)` bytes are copied; the declared
/// length is returned. Callers validate `offset + length` beforehand.
pub(crate) fn copy_payload(
    command: Command,
    response: &Packet,
    buffer: &mut [u8],
    offset: usize,
    length: usize,
) -> usize {
    let declared = response.result().max(0) as usize;
    let payload = response.extension();
    let count = declared.min(payload.len()).min(length);

    buffer[offset..offset + count].copy_from_slice(&payload[..count]);
    if count < declared {
        warn!(
            command = %command,
            declared,
            received = payload.len(),
            copied = count,
            "Reply payload larger than the caller's buffer, truncated"
        );
    }
    declared
}

/// Narrow a daemon result to a byte or word
pub(crate) fn narrow<N: TryFrom<u32>>(command: Command, value: u32) -> Result<N, ClientError> {
    N::try_from(value).map_err(|_| {
        ProtocolError::UnexpectedValue {
            command,
            value: value.into(),
        }
        .into()
    })
}

/// Validate a `(buffer, offset, length)` triple
pub(crate) fn check_buffer(parameter: &'static str, buffer: &[u8], offset: usize, length: usize) -> Result<(), ClientError> {
    validate::buffer(parameter, buffer.len(), offset, length)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigpio_core::encode;

    #[test]
    fn test_copy_payload_bounded_by_length() {
        let response = decode(
            &encode(65, 4, 0x10, 16, &[0xab; 16]),
            pigpio_core::ReplyShape::Extended,
        )
        .unwrap();
        let mut buffer = [0u8; 12];
        let declared = copy_payload(Command::I2cReadBlockData, &response, &mut buffer, 2, 10);
        assert_eq!(declared, 16);
        assert_eq!(&buffer[..2], &[0, 0]);
        assert_eq!(&buffer[2..], &[0xab; 10]);
    }

    #[test]
    fn test_copy_payload_negative_result() {
        let response = decode(
            &encode(80, 1, 4, (-87i32) as u32, &[]),
            pigpio_core::ReplyShape::Extended,
        )
        .unwrap();
        let mut buffer = [0u8; 4];
        assert_eq!(copy_payload(Command::SerialRead, &response, &mut buffer, 0, 4), 0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Faulted.to_string(), "faulted");
    }
}
