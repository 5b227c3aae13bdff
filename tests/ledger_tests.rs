// tests/ledger_tests.rs

//! Леджер: профили, комнаты, ставки, возвраты, банк и лента.

mod common;

use std::sync::{Arc, Mutex};

use common::{client_of, identity, ledger_with};
use nexus_casino::config::StorageBackend;
use nexus_casino::domain::{Coins, GameKind, Room, RoomStatus};
use nexus_casino::infra::DocumentStore;
use nexus_casino::ledger::{Ledger, LedgerError};

const BACKENDS: [StorageBackend; 2] = [StorageBackend::InMemory, StorageBackend::Document];

fn coins_of(ledger: &Ledger, id: &str) -> Coins {
    ledger.user(id).unwrap().expect("user exists").coins
}

#[test]
fn first_sign_in_creates_profile_and_later_ones_keep_it() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &[]);

    let user = ledger.sign_in(&identity("ana", "Ana")).unwrap();
    assert_eq!(user.coins, Coins(5_000));
    assert_eq!(user.level, 1);
    assert!(user.is_online());

    ledger.update_coins("ana", 250).unwrap();
    ledger.sign_out("ana").unwrap();
    assert!(!ledger.user("ana").unwrap().unwrap().is_online());
    assert_eq!(ledger.current_user("ana").unwrap_err(), LedgerError::AuthRequired);

    let again = ledger.sign_in(&identity("ana", "Ana")).unwrap();
    assert_eq!(again.coins, Coins(5_250));
}

#[test]
fn signed_out_user_cannot_touch_rooms() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &[]);
    let err = ledger
        .create_room("ghost", GameKind::Dominoes, 2, Coins(100))
        .unwrap_err();
    assert_eq!(err, LedgerError::AuthRequired);
    assert!(ledger.rooms().unwrap().is_empty());
}

#[test]
fn two_player_wager_fills_the_pot_and_starts_play() {
    for backend in BACKENDS {
        let mut ledger = ledger_with(backend, &["a", "b"]);

        let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
        assert!(room.id.starts_with("ROOM_"));
        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.pot, Coins(100));
        assert_eq!(coins_of(&ledger, "a"), Coins(4_900));

        let room = ledger.join_room("b", &room.id, false).unwrap();
        assert_eq!(room.pot, Coins(200));
        assert_eq!(room.status, RoomStatus::Playing);
        assert_eq!(room.player_ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(coins_of(&ledger, "b"), Coins(4_900));

        assert_eq!(ledger.room(&room.id).unwrap(), room);
    }
}

#[test]
fn room_waits_until_every_seat_is_taken() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a", "b"]);
    let room = ledger.create_room("a", GameKind::Dominoes, 3, Coins(50)).unwrap();
    let room = ledger.join_room("b", &room.id, false).unwrap();
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.pot, Coins(100));
}

#[test]
fn insufficient_funds_mutates_nothing() {
    for backend in BACKENDS {
        let mut ledger = ledger_with(backend, &["a", "b"]);

        let err = ledger
            .create_room("a", GameKind::Dominoes, 2, Coins(5_001))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                required: Coins(5_001),
                available: Coins(5_000)
            }
        );
        assert!(ledger.rooms().unwrap().is_empty());
        assert_eq!(coins_of(&ledger, "a"), Coins(5_000));

        let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
        ledger.update_coins("b", -4_950).unwrap();

        let err = ledger.join_room("b", &room.id, false).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        let room = ledger.room(&room.id).unwrap();
        assert_eq!(room.player_count(), 1);
        assert_eq!(room.pot, Coins(100));
        assert_eq!(coins_of(&ledger, "b"), Coins(50));
    }
}

#[test]
fn full_room_rejects_another_player() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a", "b", "c"]);
    let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
    ledger.join_room("b", &room.id, false).unwrap();

    let err = ledger.join_room("c", &room.id, false).unwrap_err();
    assert_eq!(err, LedgerError::CapacityExceeded(room.id.clone()));
    assert_eq!(coins_of(&ledger, "c"), Coins(5_000));
    assert_eq!(ledger.room(&room.id).unwrap().pot, Coins(200));
}

#[test]
fn capacity_must_fit_the_game() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a"]);
    for capacity in [0u8, 1, 5] {
        let err = ledger
            .create_room("a", GameKind::Dominoes, capacity, Coins(10))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCapacity { .. }));
    }
    assert!(ledger.create_room("a", GameKind::PokerLite, 6, Coins(10)).is_ok());
}

#[test]
fn unknown_room_is_reported() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a"]);
    let err = ledger.join_room("a", "ROOM_NOPE00", false).unwrap_err();
    assert_eq!(err, LedgerError::RoomNotFound("ROOM_NOPE00".into()));
}

#[test]
fn spectators_pay_nothing_and_can_take_a_seat() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a", "b"]);
    let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();

    let room = ledger.join_room("b", &room.id, true).unwrap();
    assert!(room.has_spectator("b"));
    assert_eq!(room.pot, Coins(100));
    assert_eq!(coins_of(&ledger, "b"), Coins(5_000));

    // Повторный вход зрителем ничего не дублирует.
    let room = ledger.join_room("b", &room.id, true).unwrap();
    assert_eq!(room.spectators.len(), 1);

    let room = ledger.join_room("b", &room.id, false).unwrap();
    assert!(room.has_player("b"));
    assert!(!room.has_spectator("b"));

    // Игрок, зашедший зрителем, остаётся игроком.
    let room = ledger.join_room("a", &room.id, true).unwrap();
    assert!(room.spectators.is_empty());
    assert_eq!(room.player_count(), 2);
}

#[test]
fn leaving_a_waiting_room_refunds_the_wager() {
    for backend in BACKENDS {
        let mut ledger = ledger_with(backend, &["a", "b"]);
        let room = ledger.create_room("a", GameKind::Dominoes, 3, Coins(100)).unwrap();
        ledger.join_room("b", &room.id, false).unwrap();

        let outcome = ledger.leave_room("b", &room.id).unwrap();
        assert_eq!(outcome.refunded, Coins(100));
        assert!(!outcome.forfeited);
        let room = outcome.room.unwrap();
        assert_eq!(room.pot, Coins(100));
        assert_eq!(room.pot, room.expected_pot());
        assert_eq!(coins_of(&ledger, "b"), Coins(5_000));
    }
}

#[test]
fn leaving_a_running_match_forfeits_the_wager() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a", "b", "c"]);
    let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
    ledger.join_room("b", &room.id, false).unwrap();

    let outcome = ledger.leave_room("b", &room.id).unwrap();
    assert!(outcome.forfeited);
    assert_eq!(outcome.refunded, Coins::ZERO);
    let room = outcome.room.unwrap();
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.pot, Coins(200));
    assert_eq!(room.forfeited, Coins(100));
    assert_eq!(room.pot, room.expected_pot());
    assert_eq!(coins_of(&ledger, "b"), Coins(4_900));

    // Новый игрок доплачивает свою ставку, ставка ушедшего остаётся в банке.
    let room = ledger.join_room("c", &room.id, false).unwrap();
    assert_eq!(room.status, RoomStatus::Playing);
    assert_eq!(room.pot, Coins(300));
}

#[test]
fn last_player_out_destroys_the_room() {
    let mut ledger = ledger_with(StorageBackend::Document, &["a", "b"]);
    let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
    ledger.join_room("b", &room.id, true).unwrap();

    // Зритель уходит: комната остаётся.
    let outcome = ledger.leave_room("b", &room.id).unwrap();
    assert!(outcome.room.is_some());

    let outcome = ledger.leave_room("a", &room.id).unwrap();
    assert!(outcome.room.is_none());
    assert_eq!(outcome.refunded, Coins(100));
    assert_eq!(coins_of(&ledger, "a"), Coins(5_000));
    assert_eq!(ledger.room(&room.id).unwrap_err(), LedgerError::RoomNotFound(room.id.clone()));
    assert!(ledger.rooms().unwrap().is_empty());

    let err = ledger.leave_room("a", &room.id).unwrap_err();
    assert_eq!(err, LedgerError::RoomNotFound(room.id));
}

#[test]
fn outsiders_cannot_leave() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a", "b"]);
    let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
    let err = ledger.leave_room("b", &room.id).unwrap_err();
    assert!(matches!(err, LedgerError::NotInRoom { .. }));
}

#[test]
fn settling_pays_the_winner_once() {
    for backend in BACKENDS {
        let mut ledger = ledger_with(backend, &["a", "b", "c"]);
        let room = ledger.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
        ledger.join_room("b", &room.id, false).unwrap();

        let err = ledger.settle_pot(&room.id, "c").unwrap_err();
        assert!(matches!(err, LedgerError::NotInRoom { .. }));

        let payout = ledger.settle_pot(&room.id, "b").unwrap();
        assert_eq!(payout, Coins(200));
        assert_eq!(coins_of(&ledger, "b"), Coins(5_100));
        assert_eq!(coins_of(&ledger, "a"), Coins(4_900));

        let room = ledger.room(&room.id).unwrap();
        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(room.pot, Coins::ZERO);

        assert_eq!(
            ledger.settle_pot(&room.id, "b").unwrap_err(),
            LedgerError::RoomClosed(room.id.clone())
        );
        assert_eq!(
            ledger.join_room("c", &room.id, false).unwrap_err(),
            LedgerError::RoomClosed(room.id.clone())
        );
    }
}

#[test]
fn coin_updates_never_overdraw() {
    for backend in BACKENDS {
        let mut ledger = ledger_with(backend, &["a"]);
        assert_eq!(ledger.update_coins("a", 500).unwrap(), Coins(5_500));

        let err = ledger.update_coins("a", -6_000).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(coins_of(&ledger, "a"), Coins(5_500));

        assert_eq!(ledger.update_coins("a", -5_500).unwrap(), Coins::ZERO);
    }
}

#[test]
fn profile_updates_keep_balance() {
    let mut ledger = ledger_with(StorageBackend::Document, &["a"]);
    let user = ledger
        .update_profile("a", Some("Neo".into()), None, Some("cyber_07".into()))
        .unwrap();
    assert_eq!(user.name, "Neo");
    assert_eq!(user.avatar_id.as_deref(), Some("cyber_07"));
    assert_eq!(user.coins, Coins(5_000));

    // Пустое имя игнорируется, пустое фото заменяется сгенерированным.
    let user = ledger
        .update_profile("a", Some("  ".into()), Some(String::new()), None)
        .unwrap();
    assert_eq!(user.name, "Neo");
    assert!(user.photo_url.contains("seed=a"));
    assert_eq!(user.avatar_id.as_deref(), Some("cyber_07"));
}

#[test]
fn practice_rooms_stay_out_of_the_lobby() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a"]);
    let room = ledger.create_practice_room("a", GameKind::Dominoes, 4).unwrap();

    assert!(room.practice);
    assert!(room.id.starts_with("AI_"));
    assert_eq!(room.status, RoomStatus::Playing);
    assert_eq!(room.pot, Coins::ZERO);
    assert_eq!(room.player_count(), 4);
    assert_eq!(room.players.iter().filter(|m| m.is_bot).count(), 3);
    assert_eq!(room.players[1].name, "Kael");

    assert!(ledger.rooms().unwrap().is_empty());
    assert_eq!(coins_of(&ledger, "a"), Coins(5_000));
}

#[test]
fn feed_delivers_full_snapshots() {
    let mut ledger = ledger_with(StorageBackend::InMemory, &["a", "b"]);
    let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let sub = ledger
        .subscribe(Box::new(move |rooms: &[Room]| {
            let ids = rooms.iter().map(|r| r.id.clone()).collect();
            sink.lock().unwrap().push(ids);
        }))
        .unwrap();

    // Снимок сразу при подписке.
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(seen.lock().unwrap()[0].is_empty());

    let first = ledger.create_room("a", GameKind::Dominoes, 2, Coins(10)).unwrap();
    let second = ledger.create_room("b", GameKind::Truco, 2, Coins(10)).unwrap();
    ledger.join_room("b", &first.id, false).unwrap();

    {
        let snapshots = seen.lock().unwrap();
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots[3], vec![first.id.clone(), second.id.clone()]);
    }

    assert!(ledger.unsubscribe(sub));
    assert!(!ledger.unsubscribe(sub));
    ledger.leave_room("b", &second.id).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 4);
}

#[test]
fn feed_on_a_shared_store_sees_other_clients() {
    let store = DocumentStore::shared();
    let mut first = client_of(&store, 1, &["a"]);
    let mut second = client_of(&store, 2, &["b"]);

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = first
        .subscribe(Box::new(move |rooms: &[Room]| {
            sink.lock().unwrap().push(rooms.len());
        }))
        .unwrap();
    assert_eq!(first.subscriber_count(), 1);

    let room = second.create_room("b", GameKind::Dominoes, 2, Coins(100)).unwrap();
    second.leave_room("b", &room.id).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 0]);

    assert!(first.unsubscribe(sub));
    assert_eq!(first.subscriber_count(), 0);
    second.create_room("b", GameKind::Dominoes, 2, Coins(100)).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn profile_saves_never_revert_another_clients_credit() {
    let store = DocumentStore::shared();
    let mut first = client_of(&store, 1, &["a", "b"]);
    let mut second = client_of(&store, 2, &["a", "b"]);

    // Второй клиент выплачивает банк, пока первый переименовывает профиль.
    let room = second.create_room("a", GameKind::Dominoes, 2, Coins(100)).unwrap();
    second.join_room("b", &room.id, false).unwrap();
    second.settle_pot(&room.id, "a").unwrap();

    let user = first.update_profile("a", Some("Ana".into()), None, None).unwrap();
    assert_eq!(user.coins, Coins(5_100));
    first.sign_out("a").unwrap();
    first.sign_in(&identity("a", "a")).unwrap();

    assert_eq!(coins_of(&second, "a"), Coins(5_100));
    assert_eq!(second.user("a").unwrap().unwrap().name, "Ana");
}
