// src/time_ctrl/clock.rs
//! Локальный таймер хода для текущего игрока.

use serde::{Deserialize, Serialize};

use crate::domain::SeatIndex;

use super::TurnRules;

/// Состояние таймера текущего хода.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnClock {
    /// Чей сейчас ход (None, если матч не идёт).
    pub current_seat: Option<SeatIndex>,
    /// Сколько секунд ещё осталось на этот ход.
    pub remaining_secs: u32,
}

/// Результат "протекания" времени.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeoutState {
    /// Время ещё есть.
    Ongoing { remaining_secs: u32 },
    /// Отсчёт дошёл до нуля.
    Expired,
    /// Сейчас нет активного игрока, на кого вешать таймер.
    NoActivePlayer,
}

impl TurnClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Начать (или перезапустить) отсчёт для игрока.
    pub fn start_turn(&mut self, seat: SeatIndex, rules: &TurnRules) {
        self.current_seat = Some(seat);
        self.remaining_secs = rules.turn_secs;
    }

    /// Остановить таймер (матч завершён).
    pub fn clear(&mut self) {
        self.current_seat = None;
        self.remaining_secs = 0;
    }

    /// Протекло `delta_secs` секунд. Отсчёт не уходит ниже нуля.
    pub fn elapse(&mut self, delta_secs: u32) -> TimeoutState {
        if self.current_seat.is_none() {
            return TimeoutState::NoActivePlayer;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(delta_secs);

        if self.remaining_secs == 0 {
            TimeoutState::Expired
        } else {
            TimeoutState::Ongoing {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    pub fn is_expired(&self) -> bool {
        self.current_seat.is_some() && self.remaining_secs == 0
    }
}
