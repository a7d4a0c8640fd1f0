//! Daytime protocol client.
//!
//! Connects to a daytime service, reads the full reply until the peer
//! closes the connection, then classifies and parses it. All failure is
//! reported through [`GetOutcome`]; the public surface never panics and
//! never returns `Err`.

use crate::message::{self, DaytimeFormat, DaytimeMessage};
use bytes::BytesMut;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use tracing::{debug, trace};

/// Per-read chunk size. Reads are concatenated without an overall cap; a
/// daytime reply is one short line and the peer closes promptly.
const READ_CHUNK_SIZE: usize = 1024;

/// Result of the most recent [`DaytimeClient::get`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetOutcome {
    /// Message fetched and parsed.
    Ok,
    /// Resolution or connect failed; parsing was not attempted.
    FetchError,
    /// Message fetched but did not match the selected layout.
    ParseError,
}

/// A client session against one daytime service.
///
/// Each [`get`](DaytimeClient::get) call overwrites the previous raw
/// message, parsed fields, and outcome; no history is retained.
#[derive(Debug)]
pub struct DaytimeClient {
    host: String,
    port: u16,
    format: DaytimeFormat,
    message: String,
    fields: Option<DaytimeMessage>,
    last_outcome: GetOutcome,
}

impl DaytimeClient {
    /// Create a client for `host` on the well-known daytime port with
    /// layout auto-detection.
    pub fn new(host: impl Into<String>) -> Self {
        DaytimeClient {
            host: host.into(),
            port: crate::config::DAYTIME_SERVICE_PORT,
            format: DaytimeFormat::Unknown,
            message: String::new(),
            fields: None,
            last_outcome: GetOutcome::Ok,
        }
    }

    /// Override the target port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Pre-select the message layout instead of auto-detecting.
    pub fn format(mut self, format: DaytimeFormat) -> Self {
        self.format = format;
        self
    }

    /// Fetch one daytime message and parse it.
    pub fn get(&mut self) -> GetOutcome {
        self.fields = None;

        match self.fetch() {
            Ok(raw) => self.message = raw,
            Err(e) => {
                debug!(host = %self.host, port = self.port, error = %e, "daytime fetch failed");
                self.last_outcome = GetOutcome::FetchError;
                return self.last_outcome;
            }
        }

        match message::parse(&self.message, self.format) {
            Ok(parsed) => {
                self.fields = Some(parsed);
                self.last_outcome = GetOutcome::Ok;
            }
            Err(e) => {
                debug!(error = %e, "daytime message did not parse");
                self.last_outcome = GetOutcome::ParseError;
            }
        }

        self.last_outcome
    }

    /// Raw message from the most recent successful fetch, empty if none.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Parsed fields from the most recent successful `get`.
    pub fn fields(&self) -> Option<&DaytimeMessage> {
        self.fields.as_ref()
    }

    /// Outcome of the most recent `get` call.
    pub fn last_outcome(&self) -> GetOutcome {
        self.last_outcome
    }

    /// Connect and read the full reply until the peer closes.
    fn fetch(&self) -> io::Result<String> {
        let mut stream = connect_ipv4(&self.host, self.port)?;

        let mut buffer = BytesMut::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    trace!(bytes = n, "read chunk");
                    buffer.extend_from_slice(&chunk[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // A read error ends accumulation; bytes already
                    // received still count as the reply.
                    debug!(error = %e, "read ended early");
                    break;
                }
            }
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Resolve `host` and connect to the first reachable IPv4 address.
fn connect_ipv4(host: &str, port: u16) -> io::Result<TcpStream> {
    let candidates: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()?
        .filter(SocketAddr::is_ipv4)
        .collect();

    if candidates.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no IPv4 address found for {}", host),
        ));
    }

    let mut last_error = None;
    for addr in candidates {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                debug!(peer = %addr, "connected to daytime service");
                return Ok(stream);
            }
            Err(e) => last_error = Some(e),
        }
    }

    // Non-empty candidate list, so a connect error was recorded.
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::ConnectionRefused, "connect failed")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    /// Serve `chunks` to a single connection, then close it.
    fn one_shot_server(chunks: Vec<&'static [u8]>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            for chunk in chunks {
                stream.write_all(chunk).expect("write");
                stream.flush().expect("flush");
                thread::sleep(Duration::from_millis(5));
            }
        });
        addr
    }

    #[test]
    fn test_get_parses_rfc_reply() {
        let addr = one_shot_server(vec![b"Thu Jun 13 10:22:04 2024\r\n"]);
        let mut client = DaytimeClient::new("127.0.0.1").port(addr.port());

        assert_eq!(client.get(), GetOutcome::Ok);
        assert_eq!(client.message(), "Thu Jun 13 10:22:04 2024\r\n");
        assert_eq!(client.last_outcome(), GetOutcome::Ok);

        let fields = client.fields().expect("fields");
        assert_eq!(fields.format(), DaytimeFormat::Rfc);
        assert_eq!(fields.date(), "Jun 13 2024");
        assert_eq!(fields.time(), "10:22:04");
    }

    #[test]
    fn test_get_parses_nist_reply() {
        let addr =
            one_shot_server(vec![b"\n60474 24-06-13 13:22:04 50 0 0 50.0 UTC(NIST) *\n"]);
        let mut client = DaytimeClient::new("127.0.0.1").port(addr.port());

        assert_eq!(client.get(), GetOutcome::Ok);
        match client.fields() {
            Some(DaytimeMessage::Nist(fields)) => {
                assert_eq!(fields.modified_julian_date, Some(60474));
                assert_eq!(fields.ref_id, "UTC(NIST)");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fragmented_reply_is_concatenated() {
        let addr = one_shot_server(vec![b"Thu Jun 13 ", b"10:22:04 2024\r\n"]);
        let mut client = DaytimeClient::new("127.0.0.1").port(addr.port());

        assert_eq!(client.get(), GetOutcome::Ok);
        assert_eq!(client.message(), "Thu Jun 13 10:22:04 2024\r\n");
    }

    #[test]
    fn test_fetch_error_when_nothing_listens() {
        // Bind then drop to find a port with no listener behind it.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr")
        };

        let mut client = DaytimeClient::new("127.0.0.1").port(addr.port());
        assert_eq!(client.get(), GetOutcome::FetchError);
        assert_eq!(client.last_outcome(), GetOutcome::FetchError);
        assert!(client.fields().is_none());
    }

    #[test]
    fn test_parse_error_on_garbage_reply() {
        let addr = one_shot_server(vec![b"hello\r\n"]);
        let mut client = DaytimeClient::new("127.0.0.1").port(addr.port());

        assert_eq!(client.get(), GetOutcome::ParseError);
        // Raw message is still retained for inspection.
        assert_eq!(client.message(), "hello\r\n");
        assert!(client.fields().is_none());
    }

    #[test]
    fn test_forced_format_applies() {
        let addr = one_shot_server(vec![b"Thu Jun 13 10:22:04 2024\r\n"]);
        let mut client = DaytimeClient::new("127.0.0.1")
            .port(addr.port())
            .format(DaytimeFormat::Nist);

        // Five tokens cannot satisfy the eight-field NIST layout.
        assert_eq!(client.get(), GetOutcome::ParseError);
    }
}
