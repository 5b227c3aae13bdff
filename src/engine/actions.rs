use serde::{Deserialize, Serialize};

use crate::domain::{End, PieceId, UserId};

/// Тип действия игрока в матче домино.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchActionKind {
    /// Выложить кость к одному из концов цепочки.
    Place { piece: PieceId, end: End },
    /// Взять кость из базара (нет подходящего хода).
    Draw,
    /// Пропустить ход (нет хода и базар пуст).
    Pass,
}

/// Конкретное действие игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchAction {
    /// Какой игрок действует.
    pub player_id: UserId,
    /// Само действие.
    pub kind: MatchActionKind,
}

impl MatchAction {
    pub fn new(player_id: impl Into<UserId>, kind: MatchActionKind) -> Self {
        Self {
            player_id: player_id.into(),
            kind,
        }
    }

    pub fn place(player_id: impl Into<UserId>, piece: PieceId, end: End) -> Self {
        Self::new(player_id, MatchActionKind::Place { piece, end })
    }

    pub fn draw(player_id: impl Into<UserId>) -> Self {
        Self::new(player_id, MatchActionKind::Draw)
    }

    pub fn pass(player_id: impl Into<UserId>) -> Self {
        Self::new(player_id, MatchActionKind::Pass)
    }
}
