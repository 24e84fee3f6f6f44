//! Idle connection state machine: connect, then hold the socket open.
//!
//! Idle connections exist purely to exert sustained socket-count pressure on
//! the target; they never write, never read, and never notice if the peer
//! closes them first (no read watcher is ever registered).

use std::net::SocketAddr;

use mio::{net::TcpStream, Interest, Registry, Token};
use tracing::debug;

use crate::io::fatal;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Start,
    Connecting,
    Connected,
}

/// One held-open connection.
#[derive(Debug)]
pub struct IdleConnection {
    token: Token,
    addr: SocketAddr,
    stream: Option<TcpStream>,
    state: State,
}

impl IdleConnection {
    pub fn new(token: Token, addr: SocketAddr) -> Self {
        Self { token, addr, stream: None, state: State::Start }
    }

    /// Drives the FSM from `Start`. Must be called once, before the first
    /// readiness event for this connection's token.
    pub fn kick_off(&mut self, registry: &Registry) {
        debug_assert_eq!(self.state, State::Start);
        self.advance(registry);
    }

    /// Advances the FSM in response to a readiness event for this
    /// connection's token. Returns `true` if this call completed the
    /// connect (transitioned into `Connected`).
    pub fn advance(&mut self, registry: &Registry) -> bool {
        match self.state {
            State::Start => {
                let stream = TcpStream::connect(self.addr)
                    .unwrap_or_else(|e| fatal(&format!("idle connect() failed: {e}")));
                let mut stream = stream;
                registry
                    .register(&mut stream, self.token, Interest::WRITABLE)
                    .unwrap_or_else(|e| fatal(&format!("idle register() failed: {e}")));
                self.stream = Some(stream);
                self.state = State::Connecting;
                debug!(token = ?self.token, "idle: connecting");
                false
            }
            State::Connecting => {
                if let Some(stream) = self.stream.as_mut() {
                    let _ = registry.deregister(stream);
                }
                self.state = State::Connected;
                debug!(token = ?self.token, "idle: connected");
                true
            }
            State::Connected => {
                // No further I/O is ever performed; a stray readiness event
                // here would indicate a bug in the driver's dispatch.
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == State::Connected
    }

    /// Closes the held socket. Called only at driver teardown.
    pub fn close(mut self) {
        self.stream.take();
    }
}
