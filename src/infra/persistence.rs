use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Coins, Room, RoomId, User, UserId};
use crate::infra::feed::{RoomsCallback, SubscriptionId};

/// Версия документа комнаты. Каждая запись увеличивает её на 1.
pub type Revision = u64;

/// Значение вместе с версией, под которой оно прочитано.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub revision: Revision,
}

/// Ошибки хранилища.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Документ {collection}/{id} не найден")]
    NotFound { collection: &'static str, id: String },

    #[error("Документ {collection}/{id} уже существует")]
    AlreadyExists { collection: &'static str, id: String },

    #[error("Конфликт версий {collection}/{id}: ожидалась {expected}, текущая {actual}")]
    Conflict {
        collection: &'static str,
        id: String,
        expected: Revision,
        actual: Revision,
    },

    #[error("Списание {requested} больше баланса {available}")]
    Overdraft { available: Coins, requested: u64 },

    #[error("Ошибка сериализации: {0}")]
    Serialization(String),

    #[error("Хранилище недоступно: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

pub const USERS: &str = "users";
pub const ROOMS: &str = "rooms";

/// Абстракция хранилища лобби.
///
/// Любая запись комнаты это compare-and-swap по версии: параллельные
/// read-modify-write одной комнаты не теряют обновлений.
pub trait LobbyStorage: Send {
    /// Загрузить пользователя.
    fn load_user(&self, id: &str) -> Result<Option<User>, StorageError>;

    /// Сохранить профиль. Баланс уже существующего пользователя не
    /// перезаписывается: он меняется только через `increment_coins`.
    /// Возвращает запись в том виде, в каком она теперь лежит в сторе.
    fn save_user(&mut self, user: &User) -> Result<User, StorageError>;

    /// Атомарно изменить баланс. Баланс не уходит в минус.
    fn increment_coins(&mut self, id: &str, delta: i64) -> Result<Coins, StorageError>;

    /// Загрузить комнату вместе с версией.
    fn load_room(&self, id: &str) -> Result<Option<Versioned<Room>>, StorageError>;

    /// Все комнаты в порядке создания.
    fn list_rooms(&self) -> Result<Vec<Room>, StorageError>;

    /// Создать комнату. Ошибка, если id занят.
    fn insert_room(&mut self, room: &Room) -> Result<Revision, StorageError>;

    /// Перезаписать комнату, если её версия всё ещё `expected`.
    fn compare_and_swap_room(&mut self, room: &Room, expected: Revision) -> Result<Revision, StorageError>;

    /// Удалить комнату, если её версия всё ещё `expected`.
    fn delete_room(&mut self, id: &str, expected: Revision) -> Result<(), StorageError>;

    /// Умеет ли стор сам рассылать изменения комнат (записи любых клиентов).
    fn supports_watch(&self) -> bool {
        false
    }

    /// Подписаться на комнаты средствами стора.
    fn watch_rooms(&mut self, _callback: RoomsCallback) -> Result<SubscriptionId, StorageError> {
        Err(StorageError::Unavailable(
            "хранилище не поддерживает наблюдение".to_string(),
        ))
    }

    fn unwatch_rooms(&mut self, _id: SubscriptionId) -> Result<bool, StorageError> {
        Ok(false)
    }
}

/// Простая in-memory реализация: однопоточная, для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryLobbyStorage {
    users: HashMap<UserId, User>,
    rooms: HashMap<RoomId, Versioned<Room>>,
    /// Порядок создания комнат.
    room_order: Vec<RoomId>,
}

impl InMemoryLobbyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn conflict(id: &str, expected: Revision, actual: Revision) -> StorageError {
        StorageError::Conflict {
            collection: ROOMS,
            id: id.to_string(),
            expected,
            actual,
        }
    }
}

impl LobbyStorage for InMemoryLobbyStorage {
    fn load_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(id).cloned())
    }

    fn save_user(&mut self, user: &User) -> Result<User, StorageError> {
        let mut stored = user.clone();
        if let Some(existing) = self.users.get(&user.id) {
            stored.coins = existing.coins;
        }
        self.users.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn increment_coins(&mut self, id: &str, delta: i64) -> Result<Coins, StorageError> {
        let user = self.users.get_mut(id).ok_or_else(|| StorageError::NotFound {
            collection: USERS,
            id: id.to_string(),
        })?;

        let updated = user.coins.apply_delta(delta).ok_or(StorageError::Overdraft {
            available: user.coins,
            requested: delta.unsigned_abs(),
        })?;
        user.coins = updated;
        Ok(updated)
    }

    fn load_room(&self, id: &str) -> Result<Option<Versioned<Room>>, StorageError> {
        Ok(self.rooms.get(id).cloned())
    }

    fn list_rooms(&self) -> Result<Vec<Room>, StorageError> {
        Ok(self
            .room_order
            .iter()
            .filter_map(|id| self.rooms.get(id))
            .map(|v| v.value.clone())
            .collect())
    }

    fn insert_room(&mut self, room: &Room) -> Result<Revision, StorageError> {
        if self.rooms.contains_key(&room.id) {
            return Err(StorageError::AlreadyExists {
                collection: ROOMS,
                id: room.id.clone(),
            });
        }
        self.rooms.insert(
            room.id.clone(),
            Versioned {
                value: room.clone(),
                revision: 1,
            },
        );
        self.room_order.push(room.id.clone());
        Ok(1)
    }

    fn compare_and_swap_room(&mut self, room: &Room, expected: Revision) -> Result<Revision, StorageError> {
        let stored = self.rooms.get_mut(&room.id).ok_or_else(|| StorageError::NotFound {
            collection: ROOMS,
            id: room.id.clone(),
        })?;

        if stored.revision != expected {
            return Err(Self::conflict(&room.id, expected, stored.revision));
        }

        stored.value = room.clone();
        stored.revision += 1;
        Ok(stored.revision)
    }

    fn delete_room(&mut self, id: &str, expected: Revision) -> Result<(), StorageError> {
        let actual = self
            .rooms
            .get(id)
            .map(|v| v.revision)
            .ok_or_else(|| StorageError::NotFound {
                collection: ROOMS,
                id: id.to_string(),
            })?;

        if actual != expected {
            return Err(Self::conflict(id, expected, actual));
        }

        self.rooms.remove(id);
        self.room_order.retain(|r| r != id);
        Ok(())
    }
}
