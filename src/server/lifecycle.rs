//! Server start/stop and run-state tracking
//!
//! All socket I/O runs on one current-thread tokio runtime. Exactly one
//! thread drives that loop: the caller of [`Server::start_blocking`], or
//! the worker spawned by [`Server::start_non_blocking`]. File reads go
//! through the runtime's blocking pool.

use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::Config;
use crate::server::listener;
use crate::static_files::Router;

/// How long a stopping runtime waits for in-flight blocking file I/O.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Lifecycle misuse reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerError {
    AlreadyRunning,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::AlreadyRunning => f.write_str("server is already running"),
        }
    }
}

impl std::error::Error for ServerError {}

#[derive(Default)]
struct State {
    running: bool,
    /// Bumped on every start so a finished run cannot clear a newer one
    generation: u64,
    shutdown: Option<watch::Sender<bool>>,
    worker: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

/// Run-state shared with the thread driving the loop.
struct Shared {
    state: Mutex<State>,
    /// Signalled when a run has fully ended and its socket is closed
    ended: Condvar,
    /// Mirror of `running` for async observers
    running: watch::Sender<bool>,
}

/// A static file server bound to one port.
///
/// `Server` is `Sync`: `stop` may be called from any thread, including
/// while another thread is inside `start_blocking`.
pub struct Server {
    config: Config,
    router: Arc<Router>,
    shared: Arc<Shared>,
}

/// What a run needs once the socket is bound.
struct Launch {
    listener: StdTcpListener,
    shutdown: watch::Receiver<bool>,
    generation: u64,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let router = Arc::new(Router::from_config(&config.static_files));
        Self {
            config,
            router,
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                ended: Condvar::new(),
                running: watch::channel(false).0,
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.shared.lock().local_addr
    }

    /// Follows the run state; the value turns `false` once a run has ended.
    pub fn watch_running(&self) -> watch::Receiver<bool> {
        self.shared.running.subscribe()
    }

    /// Runs the server on the calling thread until [`Server::stop`] is
    /// called or the event loop fails.
    pub fn start_blocking(&self) -> anyhow::Result<()> {
        let launch = self.begin()?;
        let _ended = RunGuard {
            shared: self.shared.clone(),
            generation: launch.generation,
        };

        run_event_loop(launch, self.router.clone(), self.config.server.read_timeout())
    }

    /// Binds, then runs the event loop on a background worker thread and
    /// returns immediately.
    pub fn start_non_blocking(&self) -> anyhow::Result<()> {
        let launch = self.begin()?;
        let generation = launch.generation;

        let router = self.router.clone();
        let read_timeout = self.config.server.read_timeout();
        let shared = self.shared.clone();

        let spawned = thread::Builder::new()
            .name("docroot-io".to_string())
            .spawn(move || {
                let _ended = RunGuard { shared, generation };
                if let Err(e) = run_event_loop(launch, router, read_timeout) {
                    error!("Server error: {:#}", e);
                }
            });

        match spawned {
            Ok(handle) => {
                self.shared.lock().worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.mark_stopped(generation);
                Err(e).context("failed to spawn server worker")
            }
        }
    }

    /// Stops accepting, halts the event loop and returns once the run has
    /// ended and the listening socket is closed, in either start mode.
    ///
    /// Safe to call when already stopped. Connections still in flight are
    /// abandoned.
    pub fn stop(&self) {
        let (shutdown, worker, generation) = {
            let mut state = self.shared.lock();
            if !state.running && state.worker.is_none() {
                return;
            }
            (state.shutdown.take(), state.worker.take(), state.generation)
        };

        if let Some(tx) = shutdown {
            let _ = tx.send(true);
        }

        if let Some(worker) = worker {
            reap(worker);
        }

        // A blocking run has no worker to join; wait for it to report
        let state = self.shared.lock();
        let _state = self
            .shared
            .ended
            .wait_while(state, |s| s.running && s.generation == generation)
            .unwrap_or_else(PoisonError::into_inner);
        info!("Server stopped");
    }

    /// Moves to Running and binds the listening socket. Leaves the state
    /// untouched on failure.
    fn begin(&self) -> anyhow::Result<Launch> {
        let mut state = self.shared.lock();
        if state.running {
            return Err(ServerError::AlreadyRunning.into());
        }

        // Reap a worker whose loop already ended on its own
        if let Some(worker) = state.worker.take() {
            reap(worker);
        }

        let addr = self.config.server.listen_addr();
        let listener = StdTcpListener::bind(addr)
            .with_context(|| format!("failed to bind {}", addr))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let (tx, rx) = watch::channel(false);
        state.running = true;
        state.generation += 1;
        state.shutdown = Some(tx);
        state.local_addr = Some(local_addr);
        self.shared.running.send_replace(true);

        info!("Server starting on {}", local_addr);

        Ok(Launch {
            listener,
            shutdown: rx,
            generation: state.generation,
        })
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_event_loop(
    launch: Launch,
    router: Arc<Router>,
    read_timeout: Option<Duration>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build event loop")?;

    let Launch {
        listener: std_listener,
        shutdown,
        ..
    } = launch;

    let result: anyhow::Result<()> = runtime.block_on(async move {
        let tcp = TcpListener::from_std(std_listener)?;
        listener::run(tcp, router, read_timeout, shutdown).await
    });

    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called after the loop has returned and its listener is dropped.
    fn mark_stopped(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation == generation {
            state.running = false;
            state.shutdown = None;
            state.local_addr = None;
            self.running.send_replace(false);
        }
        self.ended.notify_all();
    }
}

/// Reports the end of a run when dropped, also when the loop panics.
struct RunGuard {
    shared: Arc<Shared>,
    generation: u64,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.shared.mark_stopped(self.generation);
    }
}

fn reap(worker: JoinHandle<()>) {
    if worker.join().is_err() {
        error!("Server worker panicked");
    }
}
