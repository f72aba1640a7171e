//! Client side of the Broadside protocol.
//!
//! [`BroadsideClient`] speaks the same framed JSON as the server and is
//! what a front end (or a test) uses to play.

use broadside_protocol::{ClientMessage, Codec, JsonCodec, ServerMessage};
use broadside_transport::{Connection, TcpConnection};
use tokio::net::ToSocketAddrs;

use crate::BroadsideError;

/// A connection to a Broadside server.
///
/// ```rust,no_run
/// use broadside::prelude::*;
///
/// # async fn play() -> Result<(), BroadsideError> {
/// let client = BroadsideClient::connect("127.0.0.1:65432").await?;
/// let Some(ServerMessage::Id { player_id }) = client.recv().await? else {
///     return Ok(());
/// };
/// client.send(&ClientMessage::RandomMatch).await?;
/// # let _ = player_id;
/// # Ok(())
/// # }
/// ```
pub struct BroadsideClient {
    conn: TcpConnection,
    codec: JsonCodec,
}

impl BroadsideClient {
    /// Connects to a server.
    pub async fn connect(
        addr: impl ToSocketAddrs,
    ) -> Result<Self, BroadsideError> {
        let conn = TcpConnection::connect(addr).await?;
        tracing::debug!(id = %conn.id(), peer = %conn.peer_addr(), "connected");
        Ok(Self {
            conn,
            codec: JsonCodec,
        })
    }

    /// Sends one message as one frame.
    pub async fn send(&self, msg: &ClientMessage) -> Result<(), BroadsideError> {
        let bytes = self.codec.encode(msg)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    /// Receives the next message from the server.
    ///
    /// Frames that don't decode are skipped. Returns `Ok(None)` once the
    /// server closes the connection.
    pub async fn recv(&self) -> Result<Option<ServerMessage>, BroadsideError> {
        loop {
            let Some(data) = self.conn.recv().await? else {
                return Ok(None);
            };
            match self.codec.decode(&data) {
                Ok(msg) => return Ok(Some(msg)),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping malformed frame");
                }
            }
        }
    }

    /// Closes the sending side; the server sees EOF and cleans up.
    pub async fn close(&self) -> Result<(), BroadsideError> {
        self.conn.close().await?;
        Ok(())
    }
}
