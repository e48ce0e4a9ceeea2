//! Server lifecycle: bind, serve, drain, stop.
//!
//! ```text
//! Starting ──bind ok──▶ Listening ──shutdown──▶ Draining ──done/timeout──▶ Stopped
//!     │
//!     └──bind error──▶ ServiceError::Bind (fatal)
//! ```
//!
//! While draining the listener no longer accepts connections. In-flight
//! requests get until the drain timeout to finish; after that the server
//! task is aborted and `run` still returns `Ok`.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tracing::{info, warn};

use crate::api::{router_with_timeout, AppState};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::items::MemoryStore;
use crate::utils::shutdown_signal;

/// Lifecycle phase of a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Binding the listener.
    Starting,
    /// Accepting connections.
    Listening,
    /// Shutdown requested; waiting for in-flight requests.
    Draining,
    /// Server finished.
    Stopped,
}

/// A bound HTTP server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    router: Router,
    drain_timeout: Duration,
    phase: watch::Sender<Phase>,
}

impl Server {
    /// Bind `addr` and prepare to serve `router`.
    pub async fn bind(addr: SocketAddr, router: Router, drain_timeout: Duration) -> Result<Self> {
        info!(%addr, "Starting HTTP server");
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind { addr, source })?;
        Ok(Self::from_listener(listener, router, drain_timeout))
    }

    /// Serve on an already bound listener.
    pub fn from_listener(listener: TcpListener, router: Router, drain_timeout: Duration) -> Self {
        let (phase, _) = watch::channel(Phase::Starting);
        Self {
            listener,
            router,
            drain_timeout,
            phase,
        }
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Subscribe to phase changes.
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Serve until `shutdown` resolves, then drain for at most the drain timeout.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            router,
            drain_timeout,
            phase,
        } = self;

        let addr = listener.local_addr()?;
        let (drain_tx, mut drain_rx) = oneshot::channel::<()>();
        let graceful = async move {
            shutdown.await;
            drain_tx.send(()).ok();
        };

        let mut server = tokio::spawn(
            axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .into_future(),
        );
        phase.send_replace(Phase::Listening);
        info!(%addr, "Listening for HTTP traffic");

        tokio::select! {
            joined = &mut server => {
                phase.send_replace(Phase::Stopped);
                joined??;
                return Ok(());
            }
            _ = &mut drain_rx => {}
        }

        phase.send_replace(Phase::Draining);
        info!(timeout_ms = drain_timeout.as_millis() as u64, "Draining in-flight requests");

        match tokio::time::timeout(drain_timeout, &mut server).await {
            Ok(joined) => {
                if let Err(e) = joined? {
                    warn!("Server error while draining: {}", e);
                }
            }
            Err(_) => {
                warn!("Drain timeout elapsed; abandoning in-flight requests");
                server.abort();
            }
        }

        phase.send_replace(Phase::Stopped);
        info!("shutting down");
        Ok(())
    }
}

/// Application state for `config`: a seeded or empty in-memory store.
pub fn initial_state(config: &Config) -> AppState {
    let store = if config.seed_items {
        MemoryStore::seeded()
    } else {
        MemoryStore::new()
    };
    AppState::new(Arc::new(store))
}

/// Run the service described by `config` until SIGINT/SIGTERM.
pub async fn run(config: &Config, state: AppState) -> Result<()> {
    let addr = config.socket_addr()?;
    let router = router_with_timeout(state, config.request_timeout);

    Server::bind(addr, router, config.graceful_timeout)
        .await?
        .run(shutdown_signal())
        .await
}
