use thiserror::Error;

use crate::domain::{Coins, GameKind, RoomId, UserId};
use crate::infra::StorageError;

/// Ошибки леджера (комнаты, ставки, баланс).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Требуется вход в систему")]
    AuthRequired,

    #[error("Пользователь {0} не найден")]
    UserNotFound(UserId),

    #[error("Комната {0} не найдена")]
    RoomNotFound(RoomId),

    #[error("Недостаточно монет: нужно {required}, на балансе {available}")]
    InsufficientFunds { required: Coins, available: Coins },

    #[error("Комната {0} заполнена")]
    CapacityExceeded(RoomId),

    #[error("Недопустимое число мест {capacity} для {kind:?}")]
    InvalidCapacity { kind: GameKind, capacity: u8 },

    #[error("Комната {0} закрыта: матч уже сыгран")]
    RoomClosed(RoomId),

    #[error("Пользователь {user} не состоит в комнате {room}")]
    NotInRoom { room: RoomId, user: UserId },

    #[error("Комната {0} изменена параллельно, повторите действие")]
    Conflict(RoomId),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { id, .. } => LedgerError::Conflict(id),
            StorageError::Overdraft {
                available,
                requested,
            } => LedgerError::InsufficientFunds {
                required: Coins(requested),
                available,
            },
            other => LedgerError::Storage(other),
        }
    }
}
