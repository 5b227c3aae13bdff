use crate::domain::{End, PieceId, SeatIndex, UserId};

use thiserror::Error;

/// Ошибки движка домино.
///
/// Любая ошибка означает, что состояние матча не изменилось.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Недостаточно игроков для матча: {0}")]
    NotEnoughPlayers(usize),

    #[error("Слишком много игроков для матча: {0}")]
    TooManyPlayers(usize),

    #[error("Игрок {0} дважды указан в составе матча")]
    DuplicatePlayer(UserId),

    #[error("Матч уже завершён")]
    MatchFinished,

    #[error("Игрок {0} не участвует в матче")]
    UnknownPlayer(UserId),

    #[error("Сейчас не ход игрока {0}")]
    NotPlayersTurn(UserId),

    #[error("Кости {0} нет в руке игрока")]
    PieceNotInHand(PieceId),

    #[error("Кость {piece} нельзя приложить к концу {end:?}")]
    IllegalMove { piece: PieceId, end: End },

    #[error("Базар пуст, добирать нечего")]
    BoneyardEmpty,

    #[error("Добор запрещён: у игрока на месте {0} есть ход")]
    DrawNotAllowed(SeatIndex),

    #[error("Пас запрещён: у игрока на месте {0} есть ход или можно добрать")]
    PassNotAllowed(SeatIndex),

    #[error("Внутренняя ошибка: {0}")]
    Internal(&'static str),
}
