//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;

use super::Connection;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// State shared between the accept loop and connection threads
struct Shared {
    engine: Arc<Engine>,

    /// Set once shutdown is requested
    shutdown: AtomicBool,

    /// Number of live connections
    active: AtomicUsize,

    /// Clones of live sockets, so shutdown can unblock their readers
    streams: Mutex<HashMap<u64, TcpStream>>,

    next_id: AtomicU64,
}

/// TCP server for RankKV
pub struct Server {
    config: Config,
    listener: TcpListener,
    shared: Arc<Shared>,
}

/// Cloneable handle that stops a running [`Server`]
#[derive(Clone)]
pub struct ServerHandle {
    shared: Arc<Shared>,
}

impl ServerHandle {
    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.shared.active.load(Ordering::Acquire)
    }
}

impl Server {
    /// Validate the config and bind the listen address
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking accept lets the loop notice shutdown requests
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            listener,
            shared: Arc::new(Shared {
                engine,
                shutdown: AtomicBool::new(false),
                active: AtomicUsize::new(0),
                streams: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.handle().shutdown();
    }

    /// Start the server (blocking)
    ///
    /// Returns after shutdown is requested and every connection thread has
    /// finished.
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        let wait_group = WaitGroup::new();

        while !self.shared.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.spawn_connection(stream, peer, wait_group.clone()),
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL_INTERVAL),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("accept() failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        let open = self.shared.active.load(Ordering::Acquire);
        tracing::info!("Shutting down, closing {} connection(s)", open);
        for stream in self.shared.streams.lock().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        wait_group.wait();

        tracing::info!("Server stopped");
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr, wait_group: WaitGroup) {
        if self.shared.active.load(Ordering::Acquire) >= self.config.max_connections {
            tracing::warn!(
                "Rejecting {}: connection limit {} reached",
                peer,
                self.config.max_connections
            );
            return;
        }

        // Accepted sockets may inherit non-blocking mode from the listener
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping {}: {}", peer, e);
            return;
        }

        let registered = match stream.try_clone() {
            Ok(clone) => clone,
            Err(e) => {
                tracing::warn!("Dropping {}: {}", peer, e);
                return;
            }
        };

        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared.streams.lock().insert(id, registered);
        self.shared.active.fetch_add(1, Ordering::AcqRel);

        let shared = Arc::clone(&self.shared);
        let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let result = Connection::new(stream, Arc::clone(&shared.engine)).and_then(|mut conn| {
                    conn.set_timeouts(read_ms, write_ms)?;
                    conn.handle()
                });
                if let Err(e) = result {
                    tracing::debug!("Connection {} closed with error: {}", peer, e);
                }

                shared.streams.lock().remove(&id);
                shared.active.fetch_sub(1, Ordering::AcqRel);
                drop(wait_group);
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn connection thread for {}: {}", peer, e);
            self.shared.streams.lock().remove(&id);
            self.shared.active.fetch_sub(1, Ordering::AcqRel);
        }
    }
}
