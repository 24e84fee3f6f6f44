//! Single-threaded, single-`Poll` event loop that drives one worker's share
//! of idle and active connections to completion.
//!
//! mio, unlike the `libev`-based original, has no "no watchers registered"
//! signal to stop a run loop on — `ev_run` there simply returns once nothing
//! is left active. Here the driver tracks quiescence explicitly with a
//! counter per phase and stops polling once every connection in that phase
//! has reached its terminal state.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use mio::{Events, Poll, Token};
use tracing::debug;

use crate::{
    active::ActiveConnection,
    idle::IdleConnection,
    io::fatal,
    time::TimingResult,
};

/// A self-contained shard of the overall load: `nidle` held-open connections
/// plus `nactive` connections that each send one request and record timing.
pub struct Driver {
    poll: Poll,
    addr: SocketAddr,
    nidle: usize,
    nactive: usize,
}

impl Driver {
    pub fn new(addr: SocketAddr, nidle: usize, nactive: usize) -> Self {
        let poll = Poll::new().unwrap_or_else(|e| fatal(&format!("Poll::new() failed: {e}")));
        Self { poll, addr, nidle, nactive }
    }

    fn idle_token(i: usize) -> Token {
        Token(i)
    }

    fn active_token(&self, i: usize) -> Token {
        Token(self.nidle + i)
    }

    /// Runs the idle phase to quiescence, then the active phase to
    /// quiescence, returning one [`TimingResult`] per active connection in
    /// creation order.
    pub fn run(&mut self, request: Arc<[u8]>) -> Vec<TimingResult> {
        let mut idles: Vec<IdleConnection> =
            (0..self.nidle).map(|i| IdleConnection::new(Self::idle_token(i), self.addr)).collect();

        let registry = self.poll.registry().try_clone().unwrap_or_else(|e| {
            fatal(&format!("Registry::try_clone() failed: {e}"))
        });
        for conn in idles.iter_mut() {
            conn.kick_off(&registry);
        }
        self.run_phase(self.nidle, |events| {
            let mut connected = 0;
            for ev in events.iter() {
                let idx = ev.token().0;
                if idx < idles.len() && idles[idx].advance(&registry) {
                    connected += 1;
                }
            }
            connected
        });
        debug!(nidle = self.nidle, "idle phase quiesced");

        let mut actives: Vec<ActiveConnection> = (0..self.nactive)
            .map(|i| ActiveConnection::new(self.active_token(i), self.addr, Arc::clone(&request)))
            .collect();
        for conn in actives.iter_mut() {
            conn.kick_off(&registry);
        }
        let nidle = self.nidle;
        self.run_phase(self.nactive, |events| {
            let mut done = 0;
            for ev in events.iter() {
                let idx = ev.token().0.wrapping_sub(nidle);
                if idx < actives.len() {
                    let conn = &mut actives[idx];
                    let was_done = conn.is_done();
                    conn.advance(&registry);
                    if !was_done && conn.is_done() {
                        done += 1;
                    }
                }
            }
            done
        });
        debug!(nactive = self.nactive, "active phase quiesced");

        for conn in idles {
            conn.close();
        }

        actives.iter().map(ActiveConnection::result).collect()
    }

    /// Polls `self.poll` until `dispatch` has reported `target` total
    /// transitions into the phase's terminal state.
    fn run_phase(&mut self, target: usize, mut dispatch: impl FnMut(&Events) -> usize) {
        if target == 0 {
            return;
        }

        let mut events = Events::with_capacity(1024);
        let mut settled = 0;

        while settled < target {
            self.poll
                .poll(&mut events, Some(Duration::from_secs(30)))
                .unwrap_or_else(|e| fatal(&format!("Poll::poll() failed: {e}")));
            settled += dispatch(&events);
        }
    }
}
