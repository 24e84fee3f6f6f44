//! swarm is a multi-threaded HTTP/1.1 load generator. It opens a configurable
//! number of concurrent connections against a single target, issues one
//! request per connection, drains the response, and records time-to-connect
//! (TTC) and time-to-first-byte (TTFB) latency samples. An additional pool
//! of idle (connected-but-silent) connections can be held open alongside the
//! measured ones to exert sustained socket pressure on the target.
//!
//! The crate is organized bottom-up, following the shape of the C
//! implementation it replaces:
//!
//! - [`io`] — non-blocking, drain-to-`EAGAIN` read/write helpers shared by
//!   every connection state machine.
//! - [`idle`] / [`active`] — the two connection state machines.
//! - [`driver`] — owns one `mio::Poll` and runs a worker's share of idle and
//!   active connections to quiescence.
//! - [`worker`] — binds one `Driver` to one OS thread.
//! - [`swarm`] — shards the requested counts across workers and collects
//!   results.
//! - [`cli`], [`request`], [`resolve`], [`error`] — the glue layer: argument
//!   parsing, request-byte construction, address resolution, and the
//!   recoverable error type, none of which are part of the core engine.

pub mod active;
pub mod cli;
pub mod driver;
pub mod error;
pub mod idle;
pub mod io;
pub mod request;
pub mod resolve;
pub mod swarm;
pub mod time;
pub mod worker;
