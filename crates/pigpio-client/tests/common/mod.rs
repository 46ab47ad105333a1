//! Shared fixtures: a scripted in-memory transport and a fake daemon

#![allow(dead_code)]

use pigpio_client::{ClientConfig, ClientError, ConnectionError, Session, StreamTransport, Transport};
use pigpio_core::{decode_header, encode, Command, Header, ReplyShape, HEADER_LEN};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

pub const DAEMON_VERSION: u32 = 79;

/// One scripted reaction to a request
pub enum Reply {
    Bytes(Vec<u8>),
    Closed,
}

/// Everything the transport saw
#[derive(Clone, Default)]
pub struct Wire {
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    shutdowns: Arc<AtomicUsize>,
}

impl Wire {
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests written after the version handshake
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.requests().into_iter().skip(1).collect()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

/// Transport that replays canned replies and records every request
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    wire: Wire,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> (Self, Wire) {
        let wire = Wire::default();
        let transport = Self {
            replies: replies.into(),
            wire: wire.clone(),
        };
        (transport, wire)
    }
}

impl Transport for ScriptedTransport {
    async fn exchange(&mut self, request: &[u8], _shape: ReplyShape) -> Result<Vec<u8>, ClientError> {
        self.wire.requests.lock().unwrap().push(request.to_vec());
        match self.replies.pop_front() {
            Some(Reply::Bytes(bytes)) => Ok(bytes),
            Some(Reply::Closed) | None => Err(ConnectionError::Closed.into()),
        }
    }

    async fn shutdown(&mut self) -> Result<(), ClientError> {
        self.wire.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Plain reply echoing `command`
pub fn reply(command: Command, p1: u32, p2: u32, result: i32) -> Reply {
    Reply::Bytes(encode(command.code(), p1, p2, result as u32, &[]))
}

/// Extended reply whose result is the payload length
pub fn reply_ext(command: Command, p1: u32, p2: u32, payload: &[u8]) -> Reply {
    Reply::Bytes(encode(command.code(), p1, p2, payload.len() as u32, payload))
}

pub fn version_reply() -> Reply {
    reply(Command::Version, 0, 0, DAEMON_VERSION as i32)
}

/// A ready session whose transport answers the handshake and then `script`
pub async fn ready_session(script: Vec<Reply>) -> (Session<ScriptedTransport>, Wire) {
    ready_session_with(ClientConfig::default(), script).await
}

pub async fn ready_session_with(config: ClientConfig, script: Vec<Reply>) -> (Session<ScriptedTransport>, Wire) {
    let mut replies = vec![version_reply()];
    replies.extend(script);
    let (transport, wire) = ScriptedTransport::new(replies);

    let session = Session::new(config);
    session.attach(transport).await.unwrap();
    (session, wire)
}

/// Serve requests on `stream` until the client hangs up. `respond` returns
/// the reply for a request header, or `None` to stay silent.
pub fn spawn_daemon<F>(mut stream: DuplexStream, respond: F) -> tokio::task::JoinHandle<()>
where
    F: Fn(&Header) -> Option<Vec<u8>> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let mut head = [0u8; HEADER_LEN];
            if stream.read_exact(&mut head).await.is_err() {
                break;
            }
            let header = decode_header(&head);
            let mut extension = vec![0u8; header.p3 as usize];
            if stream.read_exact(&mut extension).await.is_err() {
                break;
            }
            if let Some(bytes) = respond(&header) {
                if stream.write_all(&bytes).await.is_err() {
                    break;
                }
            }
        }
    })
}

/// Session attached to an in-memory stream served by `respond`
pub async fn duplex_session<F>(
    respond: F,
) -> (Session<StreamTransport<DuplexStream>>, tokio::task::JoinHandle<()>)
where
    F: Fn(&Header) -> Option<Vec<u8>> + Send + 'static,
{
    duplex_session_with(Duration::from_secs(5), respond).await
}

pub async fn duplex_session_with<F>(
    io_timeout: Duration,
    respond: F,
) -> (Session<StreamTransport<DuplexStream>>, tokio::task::JoinHandle<()>)
where
    F: Fn(&Header) -> Option<Vec<u8>> + Send + 'static,
{
    let (client, daemon) = tokio::io::duplex(4096);
    let task = spawn_daemon(daemon, respond);

    let session = Session::new(ClientConfig::default());
    session
        .attach(StreamTransport::new(client, io_timeout))
        .await
        .unwrap();
    (session, task)
}
