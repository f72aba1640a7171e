//! Client → server and server → client messages.
//!
//! Every payload is a JSON object whose `action` field names the message.
//! `#[serde(tag = "action")]` makes these "internally tagged" enums:
//!
//! ```text
//! ClientMessage::Fire { x: 3, y: 4 }  ⇄  {"action":"fire","x":3,"y":4}
//! ```
//!
//! An unknown `action`, or a known one with missing/mistyped fields, fails
//! to decode. The server treats that as a framing error and drops the
//! frame.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoomId, RoomType, ShipLayout, ShotStatus};

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new private room and sit in it.
    CreateRoom,

    /// Take the free seat of an existing room.
    JoinRoom { room_id: RoomId },

    /// Join the oldest waiting public room, or open a new public one.
    RandomMatch,

    /// Submit a fleet for the next game in the current room.
    Ready { ships: Vec<ShipLayout> },

    /// Shoot at the opponent's board.
    Fire { x: u8, y: u8 },

    /// Leave the current room.
    LeaveRoom,
}

/// Messages the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once, right after the connection is accepted.
    Id { player_id: PlayerId },

    /// The sender now sits alone in a freshly created room.
    RoomCreated {
        room_id: RoomId,
        room_type: RoomType,
    },

    /// Both seats of the room are taken.
    ///
    /// The joining player's copy carries `room_type`; the copy sent to the
    /// player already waiting in the room omits it.
    MatchFound {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_type: Option<RoomType>,
    },

    /// A request could not be honoured.
    Error { msg: String },

    /// Both fleets are in; `turn` fires first.
    GameStart { turn: PlayerId },

    /// Result of a shot, sent to both players.
    UpdateBoard {
        x: u8,
        y: u8,
        status: ShotStatus,
        shooter: PlayerId,
        turn: PlayerId,
    },

    /// `winner` sank the last ship. The room is ready for a rematch.
    GameOver { winner: PlayerId },

    /// The other player left or disconnected.
    OpponentLeft,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;
    use serde_json::{Value, json};

    fn to_value<T: Serialize>(msg: &T) -> Value {
        serde_json::to_value(msg).unwrap()
    }

    // =====================================================================
    // ClientMessage: decoding what clients actually send
    // =====================================================================

    #[test]
    fn test_client_create_room_from_bare_action() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"create_room"}"#).unwrap();
        assert_eq!(msg, ClientMessage::CreateRoom);
    }

    #[test]
    fn test_client_join_room_reads_string_id() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"join_room","room_id":"1234"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                room_id: RoomId::from("1234")
            }
        );
    }

    #[test]
    fn test_client_ready_reads_nested_cells() {
        let raw = r#"{
            "action": "ready",
            "ships": [
                {"cells": [[0,0],[0,1]]},
                {"cells": [[5,5],[6,5],[7,5]]}
            ]
        }"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        let ClientMessage::Ready { ships } = msg else {
            panic!("expected Ready, got {msg:?}");
        };
        assert_eq!(ships.len(), 2);
        assert_eq!(ships[0].cells, vec![Cell(0, 0), Cell(0, 1)]);
        assert_eq!(ships[1].cells[2], Cell(7, 5));
    }

    #[test]
    fn test_client_fire_json_format() {
        let v = to_value(&ClientMessage::Fire { x: 2, y: 9 });
        assert_eq!(v, json!({"action": "fire", "x": 2, "y": 9}));
    }

    #[test]
    fn test_client_leave_room_and_random_match_tags() {
        assert_eq!(
            to_value(&ClientMessage::LeaveRoom),
            json!({"action": "leave_room"})
        );
        assert_eq!(
            to_value(&ClientMessage::RandomMatch),
            json!({"action": "random_match"})
        );
    }

    #[test]
    fn test_client_unknown_action_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"action":"surrender"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_missing_action_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"x":1,"y":2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_fire_missing_coordinate_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"action":"fire","x":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_fire_coordinates_outside_byte_range_are_rejected() {
        for raw in [
            r#"{"action":"fire","x":-1,"y":3}"#,
            r#"{"action":"fire","x":3,"y":256}"#,
            r#"{"action":"fire","x":1.5,"y":3}"#,
        ] {
            let result: Result<ClientMessage, _> = serde_json::from_str(raw);
            assert!(result.is_err(), "{raw} should not decode");
        }

        let far: ClientMessage =
            serde_json::from_str(r#"{"action":"fire","x":255,"y":10}"#)
                .unwrap();
        assert_eq!(far, ClientMessage::Fire { x: 255, y: 10 });
    }

    // =====================================================================
    // ServerMessage: exact JSON shapes clients parse
    // =====================================================================

    #[test]
    fn test_server_id_json_format() {
        let v = to_value(&ServerMessage::Id {
            player_id: PlayerId(4821),
        });
        assert_eq!(v, json!({"action": "id", "player_id": 4821}));
    }

    #[test]
    fn test_server_room_created_json_format() {
        let v = to_value(&ServerMessage::RoomCreated {
            room_id: RoomId::from("1234"),
            room_type: RoomType::Private,
        });
        assert_eq!(
            v,
            json!({"action": "room_created", "room_id": "1234", "room_type": "private"})
        );
    }

    #[test]
    fn test_server_match_found_omits_missing_room_type() {
        let v = to_value(&ServerMessage::MatchFound {
            room_id: RoomId::from("1234"),
            room_type: None,
        });
        assert_eq!(v, json!({"action": "match_found", "room_id": "1234"}));

        let v = to_value(&ServerMessage::MatchFound {
            room_id: RoomId::from("1234"),
            room_type: Some(RoomType::Public),
        });
        assert_eq!(v["room_type"], "public");
    }

    #[test]
    fn test_server_match_found_decodes_without_room_type() {
        let msg: ServerMessage =
            serde_json::from_str(r#"{"action":"match_found","room_id":"42"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ServerMessage::MatchFound {
                room_id: RoomId::from("42"),
                room_type: None
            }
        );
    }

    #[test]
    fn test_server_update_board_json_format() {
        let v = to_value(&ServerMessage::UpdateBoard {
            x: 0,
            y: 0,
            status: ShotStatus::Miss,
            shooter: PlayerId(1),
            turn: PlayerId(2),
        });
        assert_eq!(
            v,
            json!({
                "action": "update_board",
                "x": 0, "y": 0,
                "status": "miss",
                "shooter": 1,
                "turn": 2
            })
        );
    }

    #[test]
    fn test_server_error_game_start_game_over_opponent_left() {
        assert_eq!(
            to_value(&ServerMessage::Error { msg: "nope".into() }),
            json!({"action": "error", "msg": "nope"})
        );
        assert_eq!(
            to_value(&ServerMessage::GameStart { turn: PlayerId(5) }),
            json!({"action": "game_start", "turn": 5})
        );
        assert_eq!(
            to_value(&ServerMessage::GameOver { winner: PlayerId(6) }),
            json!({"action": "game_over", "winner": 6})
        );
        assert_eq!(
            to_value(&ServerMessage::OpponentLeft),
            json!({"action": "opponent_left"})
        );
    }
}
