// src/engine/match_manager.rs

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{MatchId, RoomId, UserId};
use crate::engine::{self, EngineError, MatchAction, MatchEngine, MatchStatus, TickOutcome};
use crate::engine::RandomSource;
use crate::time_ctrl::TurnRules;

/// Ошибки уровня менеджера матчей (над движком одного матча).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    /// Для комнаты нет активного матча.
    #[error("В комнате {0} нет активного матча")]
    NoActiveMatch(RoomId),

    /// В комнате уже идёт матч.
    #[error("В комнате {0} уже идёт матч")]
    MatchAlreadyRunning(RoomId),

    /// Проброшенная ошибка из движка.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Менеджер матчей:
/// - хранит по одному MatchEngine на комнату;
/// - даёт start/apply/tick/abort поверх функций движка.
#[derive(Debug, Default)]
pub struct MatchManager {
    matches: HashMap<RoomId, MatchEngine>,
    next_match_id: MatchId,
}

impl MatchManager {
    pub fn new() -> Self {
        Self {
            matches: HashMap::new(),
            next_match_id: 1,
        }
    }

    pub fn has_match(&self, room_id: &str) -> bool {
        self.matches.contains_key(room_id)
    }

    /// Есть ли в комнате незавершённый матч.
    pub fn has_active_match(&self, room_id: &str) -> bool {
        self.matches
            .get(room_id)
            .map(|m| !m.is_finished())
            .unwrap_or(false)
    }

    pub fn get(&self, room_id: &str) -> Option<&MatchEngine> {
        self.matches.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut MatchEngine> {
        self.matches.get_mut(room_id)
    }

    /// Запустить новый матч в комнате.
    ///
    /// Завершённый матч в той же комнате заменяется новым.
    pub fn start_match<R: RandomSource>(
        &mut self,
        room_id: RoomId,
        players: Vec<UserId>,
        rules: TurnRules,
        rng: &mut R,
    ) -> Result<&MatchEngine, ManagerError> {
        if self.has_active_match(&room_id) {
            return Err(ManagerError::MatchAlreadyRunning(room_id));
        }

        let match_id = self.next_match_id.max(1);
        let engine = engine::start_match(room_id.clone(), match_id, players, rules, rng)?;
        self.next_match_id = match_id + 1;

        self.matches.insert(room_id.clone(), engine);
        self.matches
            .get(&room_id)
            .ok_or(ManagerError::NoActiveMatch(room_id))
    }

    /// Применить действие игрока в комнате.
    pub fn apply_action(&mut self, room_id: &str, action: MatchAction) -> Result<MatchStatus, ManagerError> {
        let engine = self
            .matches
            .get_mut(room_id)
            .ok_or_else(|| ManagerError::NoActiveMatch(room_id.to_string()))?;

        Ok(engine::apply_action(engine, action)?)
    }

    /// Протекание времени в матче комнаты.
    pub fn tick(&mut self, room_id: &str, delta_secs: u32) -> Result<TickOutcome, ManagerError> {
        let engine = self
            .matches
            .get_mut(room_id)
            .ok_or_else(|| ManagerError::NoActiveMatch(room_id.to_string()))?;

        Ok(engine::tick(engine, delta_secs))
    }

    /// Выбросить матч комнаты (выход игрока, уничтожение комнаты).
    pub fn abort(&mut self, room_id: &str) -> Option<MatchEngine> {
        self.matches.remove(room_id)
    }

    /// Убрать завершённые матчи, для которых `keep` вернул `false`.
    /// Возвращает, сколько убрано.
    pub fn prune_finished<F: FnMut(&str) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.matches.len();
        self.matches
            .retain(|room_id, engine| !engine.is_finished() || keep(room_id));
        before - self.matches.len()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
