// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use nexus_casino::config::{LobbyConfig, StorageBackend};
use nexus_casino::domain::{Board, Boneyard, DominoPiece, Identity, SeatIndex};
use nexus_casino::engine::{MatchEngine, MatchHistory, RandomSource};
use nexus_casino::infra::{DeterministicRng, DocumentLobbyStorage, DocumentStore, IdGenerator};
use nexus_casino::ledger::Ledger;
use nexus_casino::orchestrator::LobbyService;
use nexus_casino::time_ctrl::{TimeoutPolicy, TurnClock, TurnRules};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Логи в тестах: TEST_LOG -> RUST_LOG -> "warn".
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

/// RNG без перемешивания: набор раздаётся в каноническом порядке.
pub struct DummyRng;

impl RandomSource for DummyRng {
    fn shuffle<T>(&mut self, _slice: &mut [T]) {}

    fn next_in_range(&mut self, low: u8, _high: u8) -> u8 {
        low
    }
}

pub fn identity(id: &str, name: &str) -> Identity {
    Identity {
        user_id: id.to_string(),
        display_name: Some(name.to_string()),
        photo_url: None,
    }
}

pub fn test_config(storage: StorageBackend) -> LobbyConfig {
    LobbyConfig {
        storage,
        rng_seed: Some(7),
        ..LobbyConfig::default()
    }
}

/// Леджер с уже вошедшими пользователями.
pub fn ledger_with(storage: StorageBackend, users: &[&str]) -> Ledger {
    init_logging();
    let mut ledger = Ledger::from_config(test_config(storage));
    for id in users {
        ledger.sign_in(&identity(id, id)).expect("sign in");
    }
    ledger
}

/// Клиент поверх общего документного стора, со своими сессиями.
pub fn client_of(store: &Arc<Mutex<DocumentStore>>, seed: u64, users: &[&str]) -> Ledger {
    init_logging();
    let config = test_config(StorageBackend::Document);
    let ids = IdGenerator::seeded(seed, config.room_id_len);
    let storage = DocumentLobbyStorage::connect(Arc::clone(store));
    let mut ledger = Ledger::new(Box::new(storage), config, ids);
    for id in users {
        ledger.sign_in(&identity(id, id)).expect("sign in");
    }
    ledger
}

pub fn service_with(users: &[&str], seed: u64) -> LobbyService<DeterministicRng> {
    let ledger = ledger_with(StorageBackend::InMemory, users);
    LobbyService::new(ledger, DeterministicRng::from_seed(seed))
}

pub fn service_with_policy(users: &[&str], seed: u64, policy: TimeoutPolicy) -> LobbyService<DeterministicRng> {
    init_logging();
    let config = LobbyConfig {
        timeout_policy: policy,
        ..test_config(StorageBackend::InMemory)
    };
    let mut ledger = Ledger::from_config(config);
    for id in users {
        ledger.sign_in(&identity(id, id)).expect("sign in");
    }
    LobbyService::new(ledger, DeterministicRng::from_seed(seed))
}

/// Сервис поверх общего документного стора.
pub fn shared_service(store: &Arc<Mutex<DocumentStore>>, seed: u64, users: &[&str]) -> LobbyService<DeterministicRng> {
    LobbyService::new(client_of(store, seed, users), DeterministicRng::from_seed(seed))
}

/// Кость канонического набора по значениям.
pub fn p(a: u8, b: u8) -> DominoPiece {
    DominoPiece::from_pips(a, b).expect("valid pips")
}

/// Матч с заранее заданными руками, стартовой костью и базаром.
pub fn engine_from(
    players: &[&str],
    hands: Vec<Vec<DominoPiece>>,
    start: DominoPiece,
    boneyard: Vec<DominoPiece>,
    turn: SeatIndex,
    rules: TurnRules,
) -> MatchEngine {
    let mut board = Board::new();
    board.place_start(start);

    let mut clock = TurnClock::new();
    clock.start_turn(turn, &rules);

    MatchEngine {
        room_id: "ROOM_TEST01".to_string(),
        match_id: 1,
        players: players.iter().map(|s| s.to_string()).collect(),
        hands,
        board,
        boneyard: Boneyard { pieces: boneyard },
        turn,
        rules,
        clock,
        winner: None,
        finish_reason: None,
        history: MatchHistory::new(),
    }
}
