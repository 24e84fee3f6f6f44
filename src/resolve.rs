//! Address resolution glue. Out-of-core per spec: just enough to turn a
//! `(host, port)` pair into a `SocketAddr` the driver layer can dial.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::error::SwarmError;

pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, SwarmError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| SwarmError::Resolve { host: host.to_string(), port, source })?;

    addrs.next().ok_or_else(|| SwarmError::NoAddress { host: host.to_string(), port })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_loopback_literal() {
        let addr = resolve("127.0.0.1", 8080).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }
}
