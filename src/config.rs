//! Конфигурация лобби.
//!
//! Все поля имеют значения по умолчанию, JSON может задавать только нужные.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Coins;
use crate::infra::{DocumentLobbyStorage, InMemoryLobbyStorage, LobbyStorage};
use crate::time_ctrl::{TimeoutPolicy, TurnRules};

/// Ошибки загрузки конфига.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Не удалось прочитать конфиг {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Некорректный JSON конфига: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Некорректное значение: {0}")]
    Invalid(&'static str),
}

/// Какое хранилище поднимать при старте.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageBackend {
    /// Однопоточный in-memory стор.
    #[default]
    InMemory,
    /// Документный стор с версиями (JSON-документы).
    Document,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LobbyConfig {
    /// Стартовый баланс нового пользователя.
    pub starting_coins: Coins,
    pub starting_level: u32,
    /// Секунд на ход в матче.
    pub turn_secs: u32,
    pub timeout_policy: TimeoutPolicy,
    pub storage: StorageBackend,
    /// Длина суффикса id комнаты.
    pub room_id_len: usize,
    /// Seed для воспроизводимых id и раздач.
    pub rng_seed: Option<u64>,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            starting_coins: Coins(5_000),
            starting_level: 1,
            turn_secs: TurnRules::standard().turn_secs,
            timeout_policy: TimeoutPolicy::Advisory,
            storage: StorageBackend::InMemory,
            room_id_len: 6,
            rng_seed: None,
        }
    }
}

impl LobbyConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: LobbyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_secs == 0 {
            return Err(ConfigError::Invalid("turn_secs = 0"));
        }
        if self.room_id_len == 0 {
            return Err(ConfigError::Invalid("room_id_len = 0"));
        }
        Ok(())
    }

    pub fn turn_rules(&self) -> TurnRules {
        TurnRules::new(self.turn_secs, self.timeout_policy)
    }
}

/// Поднять хранилище, выбранное в конфиге.
pub fn build_storage(config: &LobbyConfig) -> Box<dyn LobbyStorage> {
    match config.storage {
        StorageBackend::InMemory => Box::new(InMemoryLobbyStorage::new()),
        StorageBackend::Document => Box::new(DocumentLobbyStorage::new()),
    }
}
