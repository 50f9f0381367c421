// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared lifecycle helper for the two embedded HTTP servers (proxy and
//! report endpoint): spawn, and a graceful-then-forced shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{Error, Result};

/// A running server, bound and serving, with a handle to stop it.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// Bind `addr` and start serving `app` in the background. `addr`'s port
    /// may be `0`, in which case the OS assigns one; read it back from
    /// [`ServerHandle::addr`].
    pub async fn spawn(addr: SocketAddr, app: Router) -> Result<Self> {
        let listener = Self::bind(addr).await?;
        Ok(Self::serve(listener, app))
    }

    /// Bind `addr` without serving yet. Used when the caller needs to know
    /// the OS-assigned port (e.g. to build a `report-uri` endpoint URL)
    /// before the router it will serve even exists.
    pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
        TcpListener::bind(addr).await.map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })
    }

    /// Start serving `app` over an already-bound `listener`.
    pub fn serve(listener: TcpListener, app: Router) -> Self {
        let bound_addr = listener
            .local_addr()
            .expect("a bound listener always has a local address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let join = tokio::spawn(async move {
            if let Err(err) = server.await {
                let err = Error::server(err.to_string());
                tracing::error!("server on {} exited with error: {}", bound_addr, err);
            }
        });

        Self {
            addr: bound_addr,
            shutdown_tx: Some(shutdown_tx),
            join,
        }
    }

    /// Signal shutdown, wait `grace` for a clean exit, then abort the task
    /// and wait up to `force` more.
    pub async fn stop(mut self, grace: Duration, force: Duration) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        let finished = tokio::select! {
            _ = &mut self.join => true,
            _ = tokio::time::sleep(grace) => false,
        };

        if !finished {
            warn!("server on {} did not stop within grace period, forcing", self.addr);
            self.join.abort();
            let _ = tokio::time::timeout(force, &mut self.join).await;
        }
    }
}
