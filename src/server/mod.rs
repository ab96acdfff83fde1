//! TCP listener and connection lifecycle.
//!
//! [`BridgeServer`] owns the accept loop. Each accepted socket is handed
//! to a supervised handler task; the server itself never touches command
//! semantics beyond passing the shared [`CommandRouter`] along.

mod connection;
mod error;
mod supervisor;

use std::{net::SocketAddr, sync::Arc};

use log::{error, info};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use self::{error::ServerError, supervisor::{ConnectionId, ConnectionSupervisor}};
use crate::{config::ServerConfig, router::CommandRouter};

/// Accepts bridge connections and supervises their handlers.
pub struct BridgeServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
    router: Arc<CommandRouter>,
    supervisor: Arc<ConnectionSupervisor>,
}

impl BridgeServer {
    /// Bind the configured listen address.
    ///
    /// # Errors
    /// Returns [`ServerError::Bind`] when the address is unavailable.
    pub async fn bind(config: ServerConfig, router: CommandRouter) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.listen_addr)
            .await
            .map_err(ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        info!("listening: addr={local_addr}");
        Ok(Self {
            listener,
            local_addr,
            config,
            router: Arc::new(router),
            supervisor: Arc::new(ConnectionSupervisor::new()),
        })
    }

    /// The address the listener actually bound, useful when binding port 0.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr { self.local_addr }

    /// Live connection count.
    #[must_use]
    pub fn active_connections(&self) -> usize { self.supervisor.active() }

    /// Run until Ctrl-C.
    pub async fn run(self) {
        self.run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {e}");
            }
        })
        .await;
    }

    /// Run the accept loop until `shutdown` resolves, then drain handlers.
    pub async fn run_with_shutdown<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let token = CancellationToken::new();
        let accept = self.accept_loop(&token);
        tokio::pin!(shutdown);

        tokio::select! {
            () = accept => {}
            () = &mut shutdown => {
                info!("shutdown requested, draining connections");
            }
        }

        token.cancel();
        self.supervisor.drain(self.config.shutdown_grace).await;
        info!("server stopped");
    }

    async fn accept_loop(&self, token: &CancellationToken) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let router = Arc::clone(&self.router);
                    let child = token.child_token();
                    let recv_buffer = self.config.recv_buffer;
                    let id = self.supervisor.spawn(peer, move |id| {
                        connection::handle(id, stream, router, child, recv_buffer)
                    });
                    info!("connection accepted: id={id}, peer={peer}");
                }
                Err(e) => {
                    // Transient accept failures (e.g. fd exhaustion) should
                    // not take the listener down.
                    error!("accept failed: error={e}");
                    tokio::time::sleep(self.config.accept_retry_delay).await;
                }
            }
        }
    }
}
