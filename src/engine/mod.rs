//! Движок домино: раздача, выбор первого хода, проверка и применение ходов,
//! очередь хода, победа и «рыба».
//!
//! Высокоуровневый объект: `MatchEngine`
//! Основные операции:
//!   - `start_match` – раздать кости и выложить стартовую
//!   - `apply_action` – выложить / добрать / пасовать
//!   - `tick` – протекание времени хода

pub mod actions;
pub mod autoplay;
pub mod errors;
pub mod game_loop;
pub mod match_history;
pub mod match_manager;
pub mod positions;
pub mod validation;

pub use actions::{MatchAction, MatchActionKind};
pub use errors::EngineError;
pub use game_loop::{
    apply_action, start_match, tick, MatchEngine, MatchStatus, MatchSummary, TickOutcome, HAND_SIZE,
    MAX_PLAYERS, MIN_PLAYERS,
};
pub use match_history::{FinishReason, MatchEvent, MatchEventKind, MatchHistory};
pub use match_manager::{ManagerError, MatchManager};
pub use validation::{has_legal_move, is_legal_move, legal_moves};

/// RNG интерфейс для engine.
/// Реализации лежат в infra (обёртки над `rand`).
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);

    /// Равномерное число из `low..=high`.
    fn next_in_range(&mut self, low: u8, high: u8) -> u8;
}
