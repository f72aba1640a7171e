//! Room actor: an isolated Tokio task that owns one [`Game`].
//!
//! Each room runs in its own task and talks to the outside world through
//! an mpsc channel, so two rooms never contend for a lock and commands to
//! one room are applied strictly in arrival order.

use std::collections::HashMap;

use broadside_protocol::{
    PlayerId, Recipient, RoomId, RoomType, ServerMessage, ShipLayout,
};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{Game, Outbound, RoomError, RoomState};

/// Channel sender for delivering server messages to a player's
/// connection writer.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget.
pub(crate) enum RoomCommand {
    /// Seat a player.
    Join {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Free a player's seat. Replies with the number of players left.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Submit a fleet.
    Ready {
        sender: PlayerId,
        ships: Vec<ShipLayout>,
    },

    /// Shoot at the opponent.
    Fire { sender: PlayerId, x: u8, y: u8 },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    /// The room's id.
    pub room_id: RoomId,
    /// Private or public.
    pub room_type: RoomType,
    /// Current phase.
    pub state: RoomState,
    /// Number of seated players.
    pub player_count: usize,
    /// Whose turn it is, while playing.
    pub turn: Option<PlayerId>,
}

impl RoomInfo {
    /// Returns `true` if a `random_match` may place a player here.
    pub fn is_open_for_matchmaking(&self) -> bool {
        self.room_type == RoomType::Public
            && self.state.is_joinable()
            && self.player_count < crate::MAX_PLAYERS
    }
}

/// Handle to a running room actor.
///
/// Cheap to clone; it wraps an `mpsc::Sender` and a `watch::Receiver`.
/// The `RoomManager` holds one per room, and each connection caches a
/// clone of the room it sits in.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    room_type: RoomType,
    sender: mpsc::Sender<RoomCommand>,
    /// Latest metadata, republished by the actor after every command.
    info: watch::Receiver<RoomInfo>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns whether the room is private or public.
    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// Returns the metadata the actor last published, without waiting on
    /// its command queue.
    ///
    /// The actor publishes before it replies to a join or leave, so a
    /// caller that awaited one of those sees its effect here.
    pub fn snapshot(&self) -> RoomInfo {
        self.info.borrow().clone()
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    /// Seats `player_id`, who will receive room messages on `sender`.
    pub async fn join(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Frees `player_id`'s seat and returns how many players remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Submits a fleet (fire-and-forget).
    pub async fn ready(
        &self,
        sender: PlayerId,
        ships: Vec<ShipLayout>,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Ready { sender, ships })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Fires at `(x, y)` (fire-and-forget).
    pub async fn fire(
        &self,
        sender: PlayerId,
        x: u8,
        y: u8,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Fire { sender, x, y })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

impl std::fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHandle")
            .field("room_id", &self.room_id)
            .field("room_type", &self.room_type)
            .finish_non_exhaustive()
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    room_type: RoomType,
    game: Game,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
    published: watch::Sender<RoomInfo>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(
            room_id = %self.room_id,
            room_type = %self.room_type,
            "room actor started"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, sender);
                    self.publish();
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    self.publish();
                    let _ = reply.send(result);
                }
                RoomCommand::Ready { sender, ships } => {
                    let msgs = self.game.ready(sender, &ships);
                    self.dispatch(msgs);
                    self.publish();
                }
                RoomCommand::Fire { sender, x, y } => {
                    let msgs = self.game.fire(sender, x, y);
                    self.dispatch(msgs);
                    self.publish();
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    /// The first occupant is told the room exists; once a second one sits
    /// down both are told a match was found.
    fn handle_join(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if self.game.contains(player_id) {
            return Err(RoomError::AlreadyInRoom(
                player_id,
                self.room_id.clone(),
            ));
        }
        if !self.game.seat(player_id) {
            return Err(RoomError::RoomFull(self.room_id.clone()));
        }
        self.senders.insert(player_id, sender);

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = self.game.player_count(),
            "player joined"
        );

        let room_id = self.room_id.clone();
        let msgs = if self.game.player_count() == 1 {
            vec![(
                Recipient::Player(player_id),
                ServerMessage::RoomCreated {
                    room_id,
                    room_type: self.room_type,
                },
            )]
        } else {
            vec![
                (
                    Recipient::Player(player_id),
                    ServerMessage::MatchFound {
                        room_id: room_id.clone(),
                        room_type: Some(self.room_type),
                    },
                ),
                (
                    Recipient::AllExcept(player_id),
                    ServerMessage::MatchFound {
                        room_id,
                        room_type: None,
                    },
                ),
            ]
        };
        self.dispatch(msgs);

        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, RoomError> {
        if !self.game.unseat(player_id) {
            return Err(RoomError::NotInRoom(player_id, self.room_id.clone()));
        }
        self.senders.remove(&player_id);

        let remaining = self.game.player_count();
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = remaining,
            "player left"
        );

        self.dispatch(vec![(Recipient::All, ServerMessage::OpponentLeft)]);
        Ok(remaining)
    }

    /// Dispatches outbound messages to the correct recipients.
    fn dispatch(&self, msgs: Vec<Outbound>) {
        for (recipient, msg) in msgs {
            match recipient {
                Recipient::All => {
                    for pid in self.game.players() {
                        self.send_to(pid, msg.clone());
                    }
                }
                Recipient::Player(pid) => {
                    self.send_to(pid, msg);
                }
                Recipient::AllExcept(excluded) => {
                    for pid in self.game.players().filter(|p| *p != excluded)
                    {
                        self.send_to(pid, msg.clone());
                    }
                }
            }
        }
    }

    /// Sends a message to a single player. Silently drops it if the
    /// receiver is gone (player disconnected).
    fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Pushes the current metadata to every handle.
    fn publish(&self) {
        let info = self.info();
        self.published.send_if_modified(|current| {
            if *current == info {
                return false;
            }
            *current = info;
            true
        });
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            room_type: self.room_type,
            state: self.game.state(),
            player_count: self.game.player_count(),
            turn: self.game.turn(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(
    room_id: RoomId,
    room_type: RoomType,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let (info_tx, info_rx) = watch::channel(RoomInfo {
        room_id: room_id.clone(),
        room_type,
        state: RoomState::Waiting,
        player_count: 0,
        turn: None,
    });

    let actor = RoomActor {
        room_id: room_id.clone(),
        room_type,
        game: Game::new(),
        senders: HashMap::new(),
        receiver: rx,
        published: info_tx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        room_type,
        sender: tx,
        info: info_rx,
    }
}
