//! Binds one [`Driver`] to one OS thread.

use std::{net::SocketAddr, sync::Arc, thread::JoinHandle};

use crate::{driver::Driver, time::TimingResult};

/// Spawns a thread that runs `nidle`/`nactive` worth of connections against
/// `addr`, returning a handle that yields the active connections' timing
/// results when joined.
pub fn spawn(addr: SocketAddr, nidle: usize, nactive: usize, request: Arc<[u8]>) -> JoinHandle<Vec<TimingResult>> {
    std::thread::spawn(move || {
        let mut driver = Driver::new(addr, nidle, nactive);
        driver.run(request)
    })
}
