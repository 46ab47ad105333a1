//! Byte-level request/response transport
//!
//! A transport writes one encoded request and reads back exactly one
//! response: the 16-byte header, plus the declared payload when the command
//! has an extended reply. It knows nothing about what the bytes mean.

use pigpio_core::{decode_header, ProtocolError, ReplyShape, HEADER_LEN};
use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{ClientError, ConnectionError, Phase};

/// Capability the session dispatches through
pub trait Transport: Send {
    /// Send a full request and return the full response bytes
    fn exchange(
        &mut self,
        request: &[u8],
        shape: ReplyShape,
    ) -> impl Future<Output = Result<Vec<u8>, ClientError>> + Send;

    /// Close the underlying connection
    fn shutdown(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Transport over any async byte stream
pub struct StreamTransport<S> {
    stream: S,
    io_timeout: Duration,
}

/// Transport over a TCP connection to the daemon
pub type TcpTransport = StreamTransport<TcpStream>;

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, io_timeout: Duration) -> Self {
        Self { stream, io_timeout }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    async fn read_response(&mut self, shape: ReplyShape) -> Result<Vec<u8>, ClientError> {
        let mut header = [0u8; HEADER_LEN];
        let filled = read_full(&mut self.stream, &mut header).await?;
        if filled < HEADER_LEN {
            debug!(received = filled, "Connection closed before response header");
            return Err(ConnectionError::Closed.into());
        }

        let declared = decode_header(&header).payload_len(shape)?;
        let mut response = vec![0u8; HEADER_LEN + declared];
        response[..HEADER_LEN].copy_from_slice(&header);

        if declared > 0 {
            let received = read_full(&mut self.stream, &mut response[HEADER_LEN..]).await?;
            if received < declared {
                return Err(ProtocolError::Truncated { declared, received }.into());
            }
        }

        Ok(response)
    }
}

impl TcpTransport {
    /// Open a TCP connection to the daemon
    pub async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let addr = format!("{}:{}", host, port);
        debug!(addr = %addr, "Connecting to daemon");

        let stream = timeout(connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ConnectionError::TimedOut(Phase::Connect))?
            .map_err(|source| ConnectionError::Connect {
                addr: addr.clone(),
                source,
            })?;
        stream.set_nodelay(true).map_err(ConnectionError::Io)?;

        Ok(Self::new(stream, io_timeout))
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn exchange(&mut self, request: &[u8], shape: ReplyShape) -> Result<Vec<u8>, ClientError> {
        trace!(len = request.len(), "Writing request");

        timeout(self.io_timeout, async {
            self.stream.write_all(request).await?;
            self.stream.flush().await
        })
        .await
        .map_err(|_| ConnectionError::TimedOut(Phase::Write))?
        .map_err(ConnectionError::Io)?;

        let io_timeout = self.io_timeout;
        let response = timeout(io_timeout, self.read_response(shape))
            .await
            .map_err(|_| ConnectionError::TimedOut(Phase::Read))??;

        trace!(len = response.len(), "Read response");
        Ok(response)
    }

    async fn shutdown(&mut self) -> Result<(), ClientError> {
        self.stream
            .shutdown()
            .await
            .map_err(|e| ConnectionError::Io(e).into())
    }
}

/// Read until `buf` is full or the peer closes. Returns the bytes read.
async fn read_full<S>(stream: &mut S, buf: &mut [u8]) -> Result<usize, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ConnectionError::Io(e)),
        }
    }
    Ok(filled)
}
