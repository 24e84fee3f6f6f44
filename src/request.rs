//! Builds the literal HTTP/1.1 request byte buffer shared read-only across
//! every connection.

use std::sync::Arc;

/// Builds `GET <url> HTTP/1.1\r\nHost: <host>:<port>\r\nConnection:
/// close\r\n\r\n` as a single immutable buffer, shareable across worker
/// threads without copying.
pub fn build(host: &str, port: u16, url: &str) -> Arc<[u8]> {
    let text = format!("GET {url} HTTP/1.1\r\nHost: {host}:{port}\r\nConnection: close\r\n\r\n");
    Arc::from(text.into_bytes().into_boxed_slice())
}
