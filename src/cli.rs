//! Command-line surface.

use clap::Parser;

use crate::error::SwarmError;

/// HTTP/1.1 load generator measuring per-request connect and
/// first-byte latency.
#[derive(Parser, Debug)]
#[command(name = "swarm", version, about)]
pub struct Cli {
    /// Number of idle connections held open for the duration of the run.
    #[arg(short = 'i', long = "idle", default_value_t = 0)]
    pub nidle: usize,

    /// Number of worker threads. Defaults to the available parallelism.
    #[arg(short = 't', long = "threads")]
    pub nthreads: Option<usize>,

    /// Number of connections that each send one request and are timed.
    pub nactive: usize,

    /// Target host.
    pub host: String,

    /// Target port.
    pub port: u16,

    /// Request target, e.g. `/` or `/status`.
    pub url: String,
}

impl Cli {
    /// Resolves the default thread count (available parallelism, as the
    /// original falls back to `sysconf(_SC_NPROCESSORS_ONLN)`) and validates
    /// it. `nactive`/`nidle` need no range check here: `usize` already
    /// rejects what the original's `< 0` checks guarded against.
    pub fn nthreads(&self) -> Result<usize, SwarmError> {
        let nthreads = match self.nthreads {
            Some(n) => n,
            None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        };

        if nthreads == 0 {
            return Err(SwarmError::InvalidNthreads);
        }

        Ok(nthreads)
    }
}
