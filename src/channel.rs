//! Transport between bots, the orchestrator, and engine instances.
//!
//! The relay consumes two capability traits: [`EngineLink`] (client side of
//! one engine session) and [`AgentGate`] (listening endpoint one bot connects
//! to). The TCP implementations below frame every message as a 4-byte
//! little-endian length prefix followed by a JSON body.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::proto::{Request, Response};

/// Upper bound on a single wire frame.
const MAX_FRAME_LEN: usize = 1 << 20;
const HEADER_LEN: usize = 4;

/// Client side of one engine instance's session.
pub trait EngineLink: Send {
    /// Send a request to the engine.
    fn send(&mut self, request: &Request) -> anyhow::Result<()>;

    /// Block for the engine's next response, up to `timeout`.
    ///
    /// `Ok(None)` means nothing arrived in time; an error means the frame was
    /// garbled or the session died.
    fn receive(&mut self, timeout: Duration) -> anyhow::Result<Option<Response>>;

    /// False once the session is known dead.
    fn is_connected(&self) -> bool;
}

/// Listening endpoint one bot connects to.
pub trait AgentGate: Send {
    /// True when a complete request is waiting.
    fn has_pending_request(&mut self) -> bool;

    /// Pop the next pending request, if any.
    fn take_request(&mut self) -> Option<Request>;

    /// Deliver a response to the connected bot.
    fn send_response(&mut self, response: &Response) -> anyhow::Result<()>;

    /// False until a bot connects, and again once it is gone.
    fn is_connected(&self) -> bool;
}

/// The per-slot pairing of a bot-facing gate and an engine session.
///
/// Owned exclusively by that slot's relay while it runs.
pub struct RelayChannel<G, L> {
    /// Slot index this channel belongs to.
    pub slot: usize,
    /// Bot-facing endpoint.
    pub gate: G,
    /// Engine session.
    pub link: L,
}

fn write_frame<T: Serialize>(stream: &mut TcpStream, message: &T) -> io::Result<()> {
    let body = serde_json::to_vec(message).map_err(io::Error::other)?;
    let header = (body.len() as u32).to_le_bytes();
    stream.write_all(&header)?;
    stream.write_all(&body)
}

fn read_frame<T: DeserializeOwned>(stream: &mut TcpStream) -> io::Result<T> {
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header)?;
    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds the cap"),
        ));
    }
    let mut body = vec![0u8; len];
    stream.read_exact(&mut body)?;
    serde_json::from_slice(&body).map_err(io::Error::other)
}

/// TCP session to one engine instance.
#[derive(Debug)]
pub struct TcpEngineLink {
    stream: TcpStream,
    alive: bool,
}

impl TcpEngineLink {
    /// Connect to an engine listening on `host:port`, retrying until `timeout`.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> anyhow::Result<TcpEngineLink> {
        let deadline = Instant::now() + timeout;
        loop {
            match TcpStream::connect((host, port)) {
                Ok(stream) => {
                    stream.set_nodelay(true).ok();
                    return Ok(TcpEngineLink {
                        stream,
                        alive: true,
                    });
                }
                Err(e) if Instant::now() < deadline => {
                    debug!(port, error = %e, "engine not accepting yet");
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("engine at {host}:{port} never came up"));
                }
            }
        }
    }
}

impl EngineLink for TcpEngineLink {
    fn send(&mut self, request: &Request) -> anyhow::Result<()> {
        if let Err(e) = write_frame(&mut self.stream, request) {
            self.alive = false;
            return Err(e).context("engine session lost while sending");
        }
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> anyhow::Result<Option<Response>> {
        self.stream
            .set_read_timeout(Some(timeout))
            .context("setting engine read timeout")?;
        match read_frame(&mut self.stream) {
            Ok(response) => Ok(Some(response)),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) => {
                self.alive = false;
                Err(e).context("engine session lost while receiving")
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.alive
    }
}

/// Listening TCP endpoint for one bot. Accepts a single peer.
#[derive(Debug)]
pub struct TcpAgentGate {
    listener: TcpListener,
    stream: Option<TcpStream>,
    pending: Option<Request>,
}

impl TcpAgentGate {
    /// Bind the bot-facing endpoint on `host:port`.
    pub fn bind(host: &str, port: u16) -> anyhow::Result<TcpAgentGate> {
        let listener = TcpListener::bind((host, port))
            .with_context(|| format!("could not bind bot endpoint on {host}:{port}"))?;
        listener
            .set_nonblocking(true)
            .context("setting listener non-blocking")?;
        Ok(TcpAgentGate {
            listener,
            stream: None,
            pending: None,
        })
    }

    /// Port the endpoint is bound on.
    pub fn port(&self) -> u16 {
        self.listener.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    fn poll_accept(&mut self) {
        if self.stream.is_some() {
            return;
        }
        match self.listener.accept() {
            Ok((stream, addr)) => {
                debug!(%addr, "bot connected");
                if stream.set_nonblocking(true).is_ok() {
                    stream.set_nodelay(true).ok();
                    self.stream = Some(stream);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => warn!(error = %e, "accept failed on bot endpoint"),
        }
    }

    fn poll_request(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        match peek_frame(stream) {
            Ok(Some(request)) => self.pending = Some(request),
            Ok(None) => {}
            Err(e) => {
                debug!(error = %e, "bot connection lost");
                self.stream = None;
            }
        }
    }
}

/// Consume a frame only once all of its bytes are buffered, so a slow writer
/// never wedges the pump.
fn peek_frame(stream: &mut TcpStream) -> io::Result<Option<Request>> {
    let mut header = [0u8; HEADER_LEN];
    let n = match stream.peek(&mut header) {
        Ok(0) => return Err(io::ErrorKind::ConnectionAborted.into()),
        Ok(n) => n,
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
        Err(e) => return Err(e),
    };
    if n < HEADER_LEN {
        return Ok(None);
    }
    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds the cap"),
        ));
    }
    let total = HEADER_LEN + len;
    let mut buffered = vec![0u8; total];
    match stream.peek(&mut buffered) {
        Ok(n) if n < total => Ok(None),
        Ok(_) => {
            stream.read_exact(&mut buffered)?;
            serde_json::from_slice(&buffered[HEADER_LEN..])
                .map(Some)
                .map_err(io::Error::other)
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}

impl AgentGate for TcpAgentGate {
    fn has_pending_request(&mut self) -> bool {
        self.poll_accept();
        self.poll_request();
        self.pending.is_some()
    }

    fn take_request(&mut self) -> Option<Request> {
        if !self.has_pending_request() {
            return None;
        }
        self.pending.take()
    }

    fn send_response(&mut self, response: &Response) -> anyhow::Result<()> {
        let Some(stream) = self.stream.as_mut() else {
            anyhow::bail!("no bot connected");
        };
        stream
            .set_nonblocking(false)
            .context("setting blocking for response write")?;
        let sent = write_frame(stream, response);
        if let Some(stream) = self.stream.as_mut() {
            stream.set_nonblocking(true).ok();
        }
        if let Err(e) = sent {
            self.stream = None;
            return Err(e).context("bot connection lost while responding");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
