use serde::{Deserialize, Serialize};

use crate::domain::{BoardPiece, MatchId, RoomId, SeatIndex, UserId};

/// Почему матч завершился.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinishReason {
    /// Игрок выложил последнюю кость.
    Domino,
    /// Базар пуст и ни у кого нет хода: побеждает меньшая сумма очков.
    Blocked,
}

/// Тип события в матче.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum MatchEventKind {
    /// Новый матч начался.
    MatchStarted {
        room_id: RoomId,
        match_id: MatchId,
        players: Vec<UserId>,
    },

    /// Стартовая кость выложена.
    StartPiecePlaced { seat: SeatIndex, placed: BoardPiece },

    /// Кость приложена к цепочке.
    PiecePlaced { seat: SeatIndex, placed: BoardPiece },

    /// Игрок взял кость из базара.
    PieceDrawn { seat: SeatIndex, boneyard_left: usize },

    /// Игрок спасовал.
    Passed { seat: SeatIndex },

    /// Время хода вышло, ход остался за игроком.
    TurnExpired { seat: SeatIndex },

    /// Время хода вышло, ход пропущен принудительно.
    TimedOut { seat: SeatIndex },

    /// Матч завершён.
    MatchFinished {
        winner: SeatIndex,
        reason: FinishReason,
    },
}

/// Событие в матче с порядковым номером.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    pub index: u32,
    pub kind: MatchEventKind,
}

/// Полная история матча.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchHistory {
    pub events: Vec<MatchEvent>,
}

impl MatchHistory {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, kind: MatchEventKind) {
        let idx = self.events.len() as u32;
        self.events.push(MatchEvent { index: idx, kind });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
