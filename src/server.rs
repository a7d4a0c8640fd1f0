//! Daytime protocol server.
//!
//! Readiness-based model: poll tells us when the listener is ready, then we
//! accept and serve one connection at a time. Each accepted connection gets
//! a single timestamp line and is closed; there is no per-connection state.
//!
//! Lifecycle is `Idle -> Listening -> Aborted` (terminal). [`ServerHandle::stop`]
//! may be called from any thread; it flips the state atomically and wakes
//! the poll so shutdown does not wait on the next connection.

use chrono::{DateTime, Local};
use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token, Waker};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const LISTENER_TOKEN: Token = Token(0);
const STOP_TOKEN: Token = Token(1);

/// ctime()-style timestamp layout; 24 characters for four-digit years.
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// How long a single response write may retry before the connection is
/// dropped as unresponsive.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Server lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerState {
    /// No listening socket bound yet; a failed startup returns here.
    Idle = 0,
    /// Accept loop is running.
    Listening = 1,
    /// Terminal: stopped or hit an unrecoverable socket error.
    Aborted = 2,
}

impl ServerState {
    fn from_u8(value: u8) -> ServerState {
        match value {
            0 => ServerState::Idle,
            1 => ServerState::Listening,
            _ => ServerState::Aborted,
        }
    }
}

/// State shared between the accept loop and [`ServerHandle`]s.
struct Shared {
    state: AtomicU8,
    local_addr: Mutex<Option<SocketAddr>>,
    waker: Mutex<Option<Waker>>,
}

impl Shared {
    fn state(&self) -> ServerState {
        ServerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: ServerState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

/// Cloneable observer/controller for a running [`DaytimeServer`].
#[derive(Clone)]
pub struct ServerHandle {
    shared: Arc<Shared>,
}

impl ServerHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.shared.state()
    }

    /// Bound address once the server is listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.shared.local_addr.lock().unwrap()
    }

    /// Request shutdown. Safe to call from any thread; the accept loop
    /// exits promptly even if it is blocked in poll.
    pub fn stop(&self) {
        self.shared.set_state(ServerState::Aborted);
        if let Some(waker) = self.shared.waker.lock().unwrap().as_ref() {
            if let Err(e) = waker.wake() {
                warn!(error = %e, "failed to wake daytime accept loop");
            }
        }
    }
}

/// An RFC 867 daytime server.
///
/// Binds `0.0.0.0` on the configured port and writes one timestamp line per
/// accepted connection. Single-threaded: connections are served in accept
/// order, one at a time.
pub struct DaytimeServer {
    port: u16,
    shared: Arc<Shared>,
}

impl DaytimeServer {
    /// Create a server in the `Idle` state.
    pub fn new(port: u16) -> Self {
        DaytimeServer {
            port,
            shared: Arc::new(Shared {
                state: AtomicU8::new(ServerState::Idle as u8),
                local_addr: Mutex::new(None),
                waker: Mutex::new(None),
            }),
        }
    }

    /// Handle for observing state and requesting shutdown.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.shared.state()
    }

    /// Bind, listen, and serve until stopped or an accept error occurs.
    ///
    /// Bind/listen failures leave the server `Idle` and may be retried.
    /// Once the loop has run, the server is `Aborted` and cannot be
    /// restarted. The listening socket lives only within this call and is
    /// released on every exit path.
    pub fn run(&self) -> io::Result<()> {
        if self.state() != ServerState::Idle {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "daytime server cannot be restarted",
            ));
        }

        let std_listener = self.bind_and_listen()?;

        let mut poll = Poll::new()?;
        let mut listener = TcpListener::from_std(std_listener);
        poll.registry()
            .register(&mut listener, LISTENER_TOKEN, Interest::READABLE)?;
        let waker = Waker::new(poll.registry(), STOP_TOKEN)?;
        *self.shared.waker.lock().unwrap() = Some(waker);
        *self.shared.local_addr.lock().unwrap() = listener.local_addr().ok();

        // A stop issued before this point wins and the loop never starts.
        let started = self
            .shared
            .state
            .compare_exchange(
                ServerState::Idle as u8,
                ServerState::Listening as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();

        let result = if started {
            info!(port = self.port, "daytime server listening");
            self.accept_loop(&mut poll, &listener)
        } else {
            debug!("stopped before the accept loop started");
            Ok(())
        };

        *self.shared.waker.lock().unwrap() = None;
        result
    }

    /// Build the listening socket: IPv4, all interfaces, maximum backlog.
    fn bind_and_listen(&self) -> io::Result<std::net::TcpListener> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port));
        if let Err(e) = socket.bind(&addr.into()) {
            error!(port = self.port, error = %e, "failed to bind daytime listener");
            return Err(e);
        }
        if let Err(e) = socket.listen(libc::SOMAXCONN) {
            error!(port = self.port, error = %e, "failed to listen on daytime socket");
            return Err(e);
        }

        Ok(socket.into())
    }

    fn accept_loop(&self, poll: &mut Poll, listener: &TcpListener) -> io::Result<()> {
        let mut events = Events::with_capacity(16);

        while self.state() != ServerState::Aborted {
            if let Err(e) = poll.poll(&mut events, None) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                error!(error = %e, "poll failed, aborting daytime server");
                self.shared.set_state(ServerState::Aborted);
                return Err(e);
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER_TOKEN => self.serve_ready(listener)?,
                    // Stop request; the loop condition re-checks state.
                    STOP_TOKEN => {}
                    Token(_) => {}
                }
            }
        }

        debug!("stop requested, accept loop exiting");
        Ok(())
    }

    /// Accept and serve until the listener would block.
    fn serve_ready(&self, listener: &TcpListener) -> io::Result<()> {
        loop {
            match listener.accept() {
                Ok((mut stream, peer)) => {
                    debug!(peer = %peer, "connection accepted");
                    let line = daytime_line(Local::now());
                    if let Err(e) = write_all_nonblocking(&mut stream, line.as_bytes()) {
                        warn!(peer = %peer, error = %e, "failed to write daytime line");
                    }
                    // One line per connection; dropping the stream closes it.
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(error = %e, "accept failed, aborting daytime server");
                    self.shared.set_state(ServerState::Aborted);
                    return Err(e);
                }
            }
        }
    }
}

/// Render the daytime response line for `now`.
fn daytime_line(now: DateTime<Local>) -> String {
    format!("{}\r\n", now.format(TIMESTAMP_FORMAT))
}

/// Write `data` fully to a non-blocking stream.
///
/// The 26-byte response normally lands in one call, so a brief sleep-retry
/// window stands in for write-readiness polling.
fn write_all_nonblocking(stream: &mut TcpStream, mut data: &[u8]) -> io::Result<()> {
    let deadline = Instant::now() + WRITE_TIMEOUT;

    while !data.is_empty() {
        match stream.write(data) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => data = &data[n..],
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Err(io::ErrorKind::TimedOut.into());
                }
                thread::sleep(WRITE_RETRY_DELAY);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    stream.flush()
}
