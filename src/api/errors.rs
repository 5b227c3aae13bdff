use serde::{Deserialize, Serialize};

use crate::blackjack::BlackjackError;
use crate::domain::{Coins, RoomId, UserId};
use crate::engine::{EngineError, ManagerError};
use crate::ledger::LedgerError;

/// Ошибки внешнего API (то, что отдаём фронту / клиенту).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Неправильные входные данные.
    BadRequest(String),

    /// Действие требует входа.
    AuthRequired,

    UserNotFound(UserId),

    RoomNotFound(RoomId),

    /// Не хватает монет на ставку или списание.
    InsufficientFunds { required: Coins, available: Coins },

    /// Все места за столом заняты.
    CapacityExceeded(RoomId),

    InvalidCapacity(String),

    /// Матч в комнате уже сыгран.
    RoomClosed(RoomId),

    NotInRoom { room_id: RoomId, user_id: UserId },

    /// Комнату изменили параллельно, можно повторить.
    Conflict(RoomId),

    NoActiveMatch(RoomId),

    MatchAlreadyRunning(RoomId),

    /// Ошибка движка (ходы, очередь).
    EngineError(String),

    /// Внутренняя ошибка сервера.
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AuthRequired => ApiError::AuthRequired,
            LedgerError::UserNotFound(id) => ApiError::UserNotFound(id),
            LedgerError::RoomNotFound(id) => ApiError::RoomNotFound(id),
            LedgerError::InsufficientFunds {
                required,
                available,
            } => ApiError::InsufficientFunds {
                required,
                available,
            },
            LedgerError::CapacityExceeded(id) => ApiError::CapacityExceeded(id),
            err @ LedgerError::InvalidCapacity { .. } => ApiError::InvalidCapacity(err.to_string()),
            LedgerError::RoomClosed(id) => ApiError::RoomClosed(id),
            LedgerError::NotInRoom { room, user } => ApiError::NotInRoom {
                room_id: room,
                user_id: user,
            },
            LedgerError::Conflict(id) => ApiError::Conflict(id),
            LedgerError::Storage(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::EngineError(err.to_string())
    }
}

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::NoActiveMatch(id) => ApiError::NoActiveMatch(id),
            ManagerError::MatchAlreadyRunning(id) => ApiError::MatchAlreadyRunning(id),
            ManagerError::Engine(err) => err.into(),
        }
    }
}

impl From<BlackjackError> for ApiError {
    fn from(err: BlackjackError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
