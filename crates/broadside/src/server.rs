//! `BroadsideServer` builder and server loop.
//!
//! This is the entry point for running a Broadside server. It ties
//! together all the layers: transport → protocol → session → room.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use broadside_protocol::{Codec, JsonCodec};
use broadside_room::{RoomConfig, RoomManager};
use broadside_session::{SessionConfig, SessionManager};
use broadside_transport::{
    DEFAULT_MAX_FRAME_LEN, TcpTransport, Transport, TransportError,
};
use tokio::sync::Mutex;

use crate::BroadsideError;
use crate::handler::handle_connection;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:65432";

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Each lock is
/// held for one registry operation at a time; gameplay traffic goes
/// straight to room actors and never touches `rooms`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Broadside server.
///
/// # Example
///
/// ```rust,no_run
/// use broadside::prelude::*;
///
/// # async fn run() -> Result<(), BroadsideError> {
/// let server = BroadsideServer::builder()
///     .bind("0.0.0.0:65432")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BroadsideServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    room_config: RoomConfig,
    max_frame_len: usize,
}

impl BroadsideServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_config: SessionConfig::default(),
            room_config: RoomConfig::default(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the largest frame payload accepted from a client. A client
    /// that announces a bigger frame is disconnected.
    pub fn max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `TcpTransport`.
    pub async fn build(self) -> Result<BroadsideServer<JsonCodec>, BroadsideError> {
        let transport = TcpTransport::bind(&self.bind_addr)
            .await?
            .with_max_frame_len(self.max_frame_len);

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new(self.session_config)),
            rooms: Mutex::new(RoomManager::new(self.room_config)),
            codec: JsonCodec,
        });

        Ok(BroadsideServer { transport, state })
    }
}

impl Default for BroadsideServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Broadside server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct BroadsideServer<C: Codec> {
    transport: TcpTransport,
    state: Arc<ServerState<C>>,
}

impl BroadsideServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> BroadsideServerBuilder {
        BroadsideServerBuilder::new()
    }
}

impl<C: Codec> BroadsideServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), BroadsideError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` resolves.
    ///
    /// Each accepted connection gets its own handler task. Once the signal
    /// fires the listener stops accepting; connections already being
    /// served keep running until their peers disconnect.
    pub async fn run_until(
        mut self,
        signal: impl Future<Output = ()>,
    ) -> Result<(), BroadsideError> {
        tokio::pin!(signal);
        tracing::info!(addr = ?self.local_addr().ok(), "Broadside server running");

        loop {
            tokio::select! {
                biased;

                () = &mut signal => {
                    self.transport.shutdown().await?;
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(TransportError::Shutdown) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        tracing::info!("Broadside server stopped");
        Ok(())
    }
}
