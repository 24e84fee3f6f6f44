//! Active connection state machine: connect, send a request verbatim, read
//! until the peer closes, recording TTC and TTFB along the way.
//!
//! Each state handler returns a [`Flow`] telling the driver whether to wait
//! for the next readiness event (`Yield`) or to re-enter this same
//! connection immediately (`Continue`). This is what lets a single mio
//! event — say, the connect's writability notification — cascade straight
//! through a write and into a hup without the driver polling again, exactly
//! as the original C driver's same-tick fallthroughs do.

use std::{net::SocketAddr, sync::Arc};

use mio::{net::TcpStream, Interest, Registry, Token};
use tracing::{debug, warn};

use crate::{
    io::{atomic_read, atomic_write, fatal},
    time::{TimingResult, TimingSpan, NOT_OBSERVED},
};

const READ_CHUNK: usize = 4096;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Start,
    Connecting,
    WriteRequest,
    ReadResponse,
    Done,
}

/// Whether the driver should wait for a new readiness event or re-enter
/// this connection's handler immediately.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Yield,
    Continue,
}

pub struct ActiveConnection {
    token: Token,
    addr: SocketAddr,
    stream: Option<TcpStream>,
    state: State,
    request: Arc<[u8]>,
    offset: usize,
    ttc_timer: TimingSpan,
    ttc: i64,
    ttfb: i64,
}

impl ActiveConnection {
    pub fn new(token: Token, addr: SocketAddr, request: Arc<[u8]>) -> Self {
        Self {
            token,
            addr,
            stream: None,
            state: State::Start,
            request,
            offset: 0,
            ttc_timer: TimingSpan::start(),
            ttc: NOT_OBSERVED,
            ttfb: NOT_OBSERVED,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub fn result(&self) -> TimingResult {
        TimingResult { ttc: self.ttc, ttfb: self.ttfb }
    }

    /// Drives the FSM from `Start`. Must be called exactly once, before the
    /// first readiness event for this connection's token.
    pub fn kick_off(&mut self, registry: &Registry) {
        debug_assert_eq!(self.state, State::Start);
        self.run(registry);
    }

    /// Advances the FSM in response to a readiness event for this
    /// connection's token, looping internally while the handler reports
    /// `Flow::Continue`.
    pub fn advance(&mut self, registry: &Registry) {
        self.run(registry);
    }

    fn run(&mut self, registry: &Registry) {
        loop {
            let flow = match self.state {
                State::Start => self.handle_start(registry),
                State::Connecting => self.handle_connecting(),
                State::WriteRequest => self.handle_write_request(registry),
                State::ReadResponse => self.handle_read_response(registry),
                State::Done => return,
            };
            if flow == Flow::Yield {
                return;
            }
        }
    }

    fn handle_start(&mut self, registry: &Registry) -> Flow {
        self.ttc_timer = TimingSpan::start();
        let mut stream = TcpStream::connect(self.addr)
            .unwrap_or_else(|e| fatal(&format!("active connect() failed: {e}")));
        registry
            .register(&mut stream, self.token, Interest::WRITABLE)
            .unwrap_or_else(|e| fatal(&format!("active register() failed: {e}")));
        self.stream = Some(stream);
        self.state = State::Connecting;
        debug!(token = ?self.token, "active: connecting");
        Flow::Yield
    }

    /// Deregisters the watcher (if still registered) and drops the socket,
    /// closing the fd immediately rather than deferring it to driver
    /// teardown.
    fn close(&mut self, registry: &Registry) {
        if let Some(mut stream) = self.stream.take() {
            let _ = registry.deregister(&mut stream);
        }
    }

    fn handle_connecting(&mut self) -> Flow {
        self.ttc = self.ttc_timer.stop();
        self.state = State::WriteRequest;
        Flow::Continue
    }

    fn handle_write_request(&mut self, registry: &Registry) -> Flow {
        let stream = self.stream.as_mut().expect("stream present in WriteRequest");
        let (n, hup) = atomic_write(stream, &self.request[self.offset..]);
        self.offset += n;

        if hup {
            warn!(token = ?self.token, "active: hup while writing request");
            self.state = State::Done;
            self.close(registry);
            return Flow::Continue;
        }

        if self.offset < self.request.len() {
            return Flow::Yield;
        }

        let _ = stream.shutdown(std::net::Shutdown::Write);
        registry
            .reregister(stream, self.token, Interest::READABLE)
            .unwrap_or_else(|e| fatal(&format!("active reregister() failed: {e}")));
        self.state = State::ReadResponse;
        debug!(token = ?self.token, "active: request sent, awaiting response");
        Flow::Yield
    }

    fn handle_read_response(&mut self, registry: &Registry) -> Flow {
        let stream = self.stream.as_mut().expect("stream present in ReadResponse");
        let mut buf = [0u8; READ_CHUNK];

        loop {
            let (n, hup) = atomic_read(stream, &mut buf);

            if n > 0 && self.ttfb == NOT_OBSERVED {
                self.ttfb = self.ttc_timer.stop();
            }

            if hup {
                self.state = State::Done;
                self.close(registry);
                return Flow::Continue;
            }

            if n == 0 {
                return Flow::Yield;
            }
        }
    }
}
