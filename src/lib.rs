//! RFC 867 Daytime Protocol client and server.
//!
//! The Daytime Protocol is a minimal TCP service: a server writes one
//! human-readable timestamp line to each accepted connection and closes it;
//! a client connects, reads until EOF, and parses the line.
//!
//! - [`server::DaytimeServer`] — single-threaded accept loop with an
//!   `Idle -> Listening -> Aborted` lifecycle and responsive shutdown.
//! - [`client::DaytimeClient`] — fetches one message and classifies it as
//!   either the generic RFC layout or the eight-field NIST layout.
//! - [`message`] — format detection and the two layout parsers.

pub mod client;
pub mod config;
pub mod message;
pub mod server;
