// src/time_ctrl/mod.rs
//! Контроль времени хода в матче.
//!
//! Здесь собираем:
//! - правила (`TurnRules`, `TimeoutPolicy`);
//! - локальный таймер хода (`TurnClock`);
//! - решение, что делать при истечении времени (`AutoActionDecision`).

pub mod clock;
pub mod time_rules;

pub use clock::{TimeoutState, TurnClock};
pub use time_rules::{TimeoutPolicy, TurnRules};

use serde::{Deserialize, Serialize};

use crate::domain::SeatIndex;

/// Какое авто-действие нужно сделать при истечении времени хода.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AutoActionDecision {
    /// Время не вышло, ничего не делаем.
    None,
    /// Время вышло, но таймер только информирует (ход остаётся за игроком).
    Advisory { seat: SeatIndex },
    /// Время вышло: ход игрока принудительно пропускается.
    ForcePass { seat: SeatIndex },
}

/// Перевести состояние таймера в решение согласно политике.
pub fn decide(policy: TimeoutPolicy, state: TimeoutState, seat: Option<SeatIndex>) -> AutoActionDecision {
    match (state, seat) {
        (TimeoutState::Expired, Some(seat)) => match policy {
            TimeoutPolicy::Advisory => AutoActionDecision::Advisory { seat },
            TimeoutPolicy::ForcePass => AutoActionDecision::ForcePass { seat },
        },
        _ => AutoActionDecision::None,
    }
}
