//! Recoverable failure modes: argument validation and address resolution.
//!
//! Everything else the core does (connect failures, unclassified I/O
//! errors) is fatal by design and never reaches this enum — see
//! [`crate::io::fatal`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("nthreads must be greater than 0")]
    InvalidNthreads,

    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve { host: String, port: u16, source: std::io::Error },

    #[error("{host}:{port} resolved to no addresses")]
    NoAddress { host: String, port: u16 },
}
