//! Orchestrator: shards the requested connection counts across worker
//! threads and collects their results.

use std::{net::SocketAddr, sync::Arc};

use crate::{time::TimingResult, worker};

/// Runs `nactive` active and `nidle` idle connections against `addr`,
/// split evenly (by floor division) across `nthreads` worker threads.
///
/// Any remainder from the division is dropped, not assigned to an extra
/// thread — matching the original implementation, which leaves the same
/// remainder unhandled (`driver_init` is invoked with `nactive / nthreads`
/// for every thread).
///
/// Returns one `Vec<TimingResult>` per worker, in thread-index order; each
/// inner vector is in per-worker connection creation order.
pub fn run(
    addr: SocketAddr,
    nactive: usize,
    nidle: usize,
    nthreads: usize,
    request: Arc<[u8]>,
) -> Vec<Vec<TimingResult>> {
    let active_per_thread = nactive / nthreads;
    let idle_per_thread = nidle / nthreads;

    let handles: Vec<_> = (0..nthreads)
        .map(|_| worker::spawn(addr, idle_per_thread, active_per_thread, Arc::clone(&request)))
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().expect("worker thread panicked"))
        .collect()
}
