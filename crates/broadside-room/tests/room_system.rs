//! Integration tests for the room system: registry, matchmaking and a
//! full game driven through room handles.

use std::time::Duration;

use broadside_protocol::{
    Cell, PlayerId, RoomId, RoomType, ServerMessage, ShipLayout, ShotStatus,
};
use broadside_room::{
    PlayerSender, RoomConfig, RoomError, RoomManager, RoomState,
};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

/// A player channel whose receiver is kept by the test.
fn channel() -> (PlayerSender, Inbox) {
    mpsc::unbounded_channel()
}

/// Creates a dummy player sender (receiver is dropped immediately).
fn dummy_sender() -> PlayerSender {
    mpsc::unbounded_channel().0
}

/// Everything currently queued for a player.
fn drain(rx: &mut Inbox) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// Waits for the next message, failing the test after a second.
async fn next(rx: &mut Inbox) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("channel closed")
}

fn one_ship(cells: &[(u8, u8)]) -> Vec<ShipLayout> {
    vec![ShipLayout {
        cells: cells.iter().map(|&(x, y)| Cell(x, y)).collect(),
    }]
}

// =========================================================================
// create_room / join_room
// =========================================================================

#[tokio::test]
async fn test_create_room_seats_creator_and_announces() {
    let mut mgr = RoomManager::default();
    let (tx, mut rx) = channel();

    let handle = mgr
        .create_room(RoomType::Private, pid(1), tx)
        .await
        .unwrap();

    let room_id = handle.room_id().clone();
    let n: u32 = room_id.as_str().parse().unwrap();
    assert!((1000..=9999).contains(&n));
    assert_eq!(mgr.player_room(&pid(1)), Some(&room_id));
    assert_eq!(mgr.room_count(), 1);
    assert_eq!(
        drain(&mut rx),
        vec![ServerMessage::RoomCreated {
            room_id,
            room_type: RoomType::Private,
        }]
    );
}

#[tokio::test]
async fn test_create_room_ids_are_unique() {
    let mut mgr = RoomManager::new(RoomConfig {
        id_min: 1,
        id_max: 3,
        ..RoomConfig::default()
    });

    for p in 1..=3 {
        mgr.create_room(RoomType::Private, pid(p), dummy_sender())
            .await
            .unwrap();
    }

    let mut ids = mgr.room_ids();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    assert_eq!(
        ids,
        vec![RoomId::from("1"), RoomId::from("2"), RoomId::from("3")]
    );

    let result = mgr
        .create_room(RoomType::Private, pid(4), dummy_sender())
        .await;
    assert!(matches!(
        result,
        Err(RoomError::IdSpaceExhausted { min: 1, max: 3 })
    ));
    assert_eq!(mgr.player_room(&pid(4)), None);
}

#[tokio::test]
async fn test_create_room_while_seated_is_rejected() {
    let mut mgr = RoomManager::default();
    let handle = mgr
        .create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap();

    let err = mgr
        .create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("player P-1 is already in room {}", handle.room_id())
    );
    assert_eq!(mgr.room_count(), 1);
}

#[tokio::test]
async fn test_join_room_sends_match_found_to_both() {
    let mut mgr = RoomManager::default();
    let (tx1, mut rx1) = channel();
    let (tx2, mut rx2) = channel();
    let room_id = mgr
        .create_room(RoomType::Private, pid(1), tx1)
        .await
        .unwrap()
        .room_id()
        .clone();
    drain(&mut rx1);

    mgr.join_room(pid(2), &room_id, tx2).await.unwrap();

    assert_eq!(
        drain(&mut rx2),
        vec![ServerMessage::MatchFound {
            room_id: room_id.clone(),
            room_type: Some(RoomType::Private),
        }]
    );
    assert_eq!(
        drain(&mut rx1),
        vec![ServerMessage::MatchFound {
            room_id: room_id.clone(),
            room_type: None,
        }]
    );
    assert_eq!(mgr.player_room(&pid(2)), Some(&room_id));
}

#[tokio::test]
async fn test_join_room_not_found() {
    let mut mgr = RoomManager::default();
    let result = mgr
        .join_room(pid(1), &RoomId::from("999"), dummy_sender())
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, RoomError::NotFound(_)));
    assert!(err.is_unjoinable());
    assert_eq!(mgr.player_room(&pid(1)), None);
}

#[tokio::test]
async fn test_join_room_full() {
    let mut mgr = RoomManager::default();
    let room_id = mgr
        .create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap()
        .room_id()
        .clone();
    mgr.join_room(pid(2), &room_id, dummy_sender()).await.unwrap();

    let err = mgr
        .join_room(pid(3), &room_id, dummy_sender())
        .await
        .unwrap_err();

    assert!(matches!(err, RoomError::RoomFull(_)));
    assert!(err.is_unjoinable());
    assert_eq!(mgr.player_room(&pid(3)), None);
}

#[tokio::test]
async fn test_join_room_one_room_at_a_time() {
    let mut mgr = RoomManager::default();
    mgr.create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap();
    let other = mgr
        .create_room(RoomType::Private, pid(2), dummy_sender())
        .await
        .unwrap()
        .room_id()
        .clone();

    let err = mgr
        .join_room(pid(1), &other, dummy_sender())
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::InvalidState(_)));
    assert!(!err.is_unjoinable());
}

// =========================================================================
// random_match
// =========================================================================

#[tokio::test]
async fn test_random_match_creates_public_room_when_none_waiting() {
    let mut mgr = RoomManager::default();
    let (tx, mut rx) = channel();

    let handle = mgr.random_match(pid(1), tx).await.unwrap();

    assert_eq!(handle.room_type(), RoomType::Public);
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [ServerMessage::RoomCreated { room_type: RoomType::Public, .. }]
    ));
}

#[tokio::test]
async fn test_random_match_ignores_private_rooms() {
    let mut mgr = RoomManager::default();
    let private = mgr
        .create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap();

    let handle = mgr.random_match(pid(2), dummy_sender()).await.unwrap();

    assert_ne!(handle.room_id(), private.room_id());
    assert_eq!(mgr.room_count(), 2);
}

#[tokio::test]
async fn test_random_match_pairs_with_waiting_public_room() {
    let mut mgr = RoomManager::default();
    let (tx1, mut rx1) = channel();
    let (tx2, mut rx2) = channel();

    let first = mgr.random_match(pid(1), tx1).await.unwrap();
    let second = mgr.random_match(pid(2), tx2).await.unwrap();

    assert_eq!(first.room_id(), second.room_id());
    assert_eq!(mgr.room_count(), 1);
    assert!(matches!(
        drain(&mut rx1).as_slice(),
        [
            ServerMessage::RoomCreated { .. },
            ServerMessage::MatchFound { room_type: None, .. }
        ]
    ));
    assert!(matches!(
        drain(&mut rx2).as_slice(),
        [ServerMessage::MatchFound { room_type: Some(RoomType::Public), .. }]
    ));
}

#[tokio::test]
async fn test_random_match_picks_oldest_waiting_room() {
    let mut mgr = RoomManager::default();
    // Two public rooms with one player each: the first must be picked.
    // Seat them by hand since random_match would pair 1 and 2.
    let oldest = mgr
        .create_room(RoomType::Public, pid(1), dummy_sender())
        .await
        .unwrap();
    mgr.create_room(RoomType::Public, pid(2), dummy_sender())
        .await
        .unwrap();

    let handle = mgr.random_match(pid(3), dummy_sender()).await.unwrap();

    assert_eq!(handle.room_id(), oldest.room_id());
}

#[tokio::test]
async fn test_random_match_skips_full_rooms() {
    let mut mgr = RoomManager::default();
    let full = mgr.random_match(pid(1), dummy_sender()).await.unwrap();
    mgr.random_match(pid(2), dummy_sender()).await.unwrap();

    let handle = mgr.random_match(pid(3), dummy_sender()).await.unwrap();

    assert_ne!(handle.room_id(), full.room_id());
    assert_eq!(mgr.room_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_fill_exactly_one_seat() {
    let mut mgr = RoomManager::default();
    let handle = mgr
        .create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for id in 2..=9 {
        let handle = handle.clone();
        tasks.spawn(async move { handle.join(pid(id), dummy_sender()).await });
    }

    let mut seated = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(()) => seated += 1,
            Err(e) => assert!(matches!(e, RoomError::RoomFull(_)), "{e}"),
        }
    }

    assert_eq!(seated, 1);
    assert_eq!(handle.get_info().await.unwrap().player_count, 2);
    assert_eq!(handle.snapshot().player_count, 2);
}

// =========================================================================
// leave_room
// =========================================================================

#[tokio::test]
async fn test_leave_room_last_player_destroys_room() {
    let mut mgr = RoomManager::default();
    let handle = mgr
        .create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap();
    let room_id = handle.room_id().clone();

    assert_eq!(mgr.leave_room(pid(1)).await.unwrap(), room_id);

    assert_eq!(mgr.player_room(&pid(1)), None);
    assert!(!mgr.contains_room(&room_id));
    assert_eq!(mgr.room_count(), 0);
    assert!(matches!(
        mgr.get_room_info(&room_id).await,
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_leave_room_keeps_room_for_remaining_player() {
    let mut mgr = RoomManager::default();
    let (tx1, mut rx1) = channel();
    let room_id = mgr
        .create_room(RoomType::Private, pid(1), tx1)
        .await
        .unwrap()
        .room_id()
        .clone();
    mgr.join_room(pid(2), &room_id, dummy_sender()).await.unwrap();
    drain(&mut rx1);

    mgr.leave_room(pid(2)).await.unwrap();

    assert_eq!(drain(&mut rx1), vec![ServerMessage::OpponentLeft]);
    let info = mgr.get_room_info(&room_id).await.unwrap();
    assert_eq!(info.player_count, 1);

    // The freed seat can be taken again.
    mgr.join_room(pid(3), &room_id, dummy_sender()).await.unwrap();
}

#[tokio::test]
async fn test_leave_room_not_in_any_room() {
    let mut mgr = RoomManager::default();
    let result = mgr.leave_room(pid(1)).await;
    assert!(matches!(result, Err(RoomError::InvalidState(_))));
}

#[tokio::test]
async fn test_leave_then_create_again() {
    let mut mgr = RoomManager::default();
    mgr.create_room(RoomType::Private, pid(1), dummy_sender())
        .await
        .unwrap();
    mgr.leave_room(pid(1)).await.unwrap();

    assert!(
        mgr.create_room(RoomType::Private, pid(1), dummy_sender())
            .await
            .is_ok()
    );
}

// =========================================================================
// Gameplay through handles
// =========================================================================

#[tokio::test]
async fn test_full_game_through_handles() {
    let mut mgr = RoomManager::default();
    let (tx1, mut rx1) = channel();
    let (tx2, mut rx2) = channel();

    let h1 = mgr
        .create_room(RoomType::Private, pid(1), tx1)
        .await
        .unwrap();
    let h2 = mgr.join_room(pid(2), h1.room_id(), tx2).await.unwrap();
    drain(&mut rx1);
    drain(&mut rx2);

    h1.ready(pid(1), one_ship(&[(0, 0), (0, 1)])).await.unwrap();
    h2.ready(pid(2), one_ship(&[(5, 5), (5, 6)])).await.unwrap();
    assert_eq!(next(&mut rx1).await, ServerMessage::GameStart { turn: pid(1) });
    assert_eq!(next(&mut rx2).await, ServerMessage::GameStart { turn: pid(1) });

    let info = mgr.get_room_info(h1.room_id()).await.unwrap();
    assert_eq!(info.state, RoomState::Playing);
    assert_eq!(info.turn, Some(pid(1)));

    // Out of turn: ignored, nothing is sent.
    h2.fire(pid(2), 0, 0).await.unwrap();

    let shots = [
        (pid(1), 5, 5, ShotStatus::Hit),
        (pid(2), 9, 9, ShotStatus::Miss),
        (pid(1), 5, 6, ShotStatus::Sunk),
    ];
    for (shooter, x, y, expected) in shots {
        let handle = if shooter == pid(1) { &h1 } else { &h2 };
        handle.fire(shooter, x, y).await.unwrap();
        for rx in [&mut rx1, &mut rx2] {
            match next(rx).await {
                ServerMessage::UpdateBoard {
                    x: got_x,
                    y: got_y,
                    status,
                    shooter: got_shooter,
                    turn,
                } => {
                    assert_eq!((got_x, got_y), (x, y));
                    assert_eq!(status, expected);
                    assert_eq!(got_shooter, shooter);
                    assert_ne!(turn, shooter);
                }
                other => panic!("expected update_board, got {other:?}"),
            }
        }
    }

    assert_eq!(next(&mut rx1).await, ServerMessage::GameOver { winner: pid(1) });
    assert_eq!(next(&mut rx2).await, ServerMessage::GameOver { winner: pid(1) });

    let info = mgr.get_room_info(h1.room_id()).await.unwrap();
    assert_eq!(info.state, RoomState::Waiting);
    assert_eq!(info.turn, None);
    assert_eq!(info.player_count, 2);
}

#[tokio::test]
async fn test_leave_mid_game_resets_room() {
    let mut mgr = RoomManager::default();
    let (tx1, mut rx1) = channel();
    let h1 = mgr
        .create_room(RoomType::Public, pid(1), tx1)
        .await
        .unwrap();
    let h2 = mgr.random_match(pid(2), dummy_sender()).await.unwrap();
    h1.ready(pid(1), one_ship(&[(1, 1)])).await.unwrap();
    h2.ready(pid(2), one_ship(&[(2, 2)])).await.unwrap();
    let info = mgr.get_room_info(h1.room_id()).await.unwrap();
    assert_eq!(info.state, RoomState::Playing);
    drain(&mut rx1);

    mgr.leave_room(pid(2)).await.unwrap();

    assert_eq!(drain(&mut rx1), vec![ServerMessage::OpponentLeft]);
    let info = mgr.get_room_info(h1.room_id()).await.unwrap();
    assert_eq!(info.state, RoomState::Waiting);
    assert_eq!(info.turn, None);

    // The room is public and waiting again, so matchmaking refills it.
    let h3 = mgr.random_match(pid(3), dummy_sender()).await.unwrap();
    assert_eq!(h3.room_id(), h1.room_id());
}

#[tokio::test]
async fn test_left_player_stops_receiving() {
    let mut mgr = RoomManager::default();
    let (tx1, mut rx1) = channel();
    let (tx2, mut rx2) = channel();
    let h1 = mgr
        .create_room(RoomType::Private, pid(1), tx1)
        .await
        .unwrap();
    let h2 = mgr.join_room(pid(2), h1.room_id(), tx2).await.unwrap();

    mgr.leave_room(pid(1)).await.unwrap();
    drain(&mut rx1);
    drain(&mut rx2);

    // Player 1's cached handle no longer reaches the game.
    h1.ready(pid(1), one_ship(&[(0, 0)])).await.unwrap();
    h2.ready(pid(2), one_ship(&[(0, 0)])).await.unwrap();
    let info = h2.get_info().await.unwrap();

    assert_eq!(info.state, RoomState::Waiting);
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
}
