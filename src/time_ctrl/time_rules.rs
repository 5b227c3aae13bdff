// src/time_ctrl/time_rules.rs
//! Конфигурация таймера хода.
//!
//! Здесь описываем только "правила", без состояния и без привязки к конкретному матчу.

use serde::{Deserialize, Serialize};

/// Что происходит, когда время хода вышло.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Только сигнал для интерфейса, движок ничего не делает.
    #[default]
    Advisory,
    /// Ход принудительно пропускается.
    ForcePass,
}

/// Правила тайминга для одного матча.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnRules {
    /// Сколько секунд даётся на ход.
    pub turn_secs: u32,
    pub policy: TimeoutPolicy,
}

impl TurnRules {
    pub const fn new(turn_secs: u32, policy: TimeoutPolicy) -> Self {
        Self { turn_secs, policy }
    }

    /// Стандарт: 2 минуты на ход, таймер только информирует.
    pub const fn standard() -> Self {
        Self {
            turn_secs: 120,
            policy: TimeoutPolicy::Advisory,
        }
    }
}

impl Default for TurnRules {
    fn default() -> Self {
        Self::standard()
    }
}
