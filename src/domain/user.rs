use serde::{Deserialize, Serialize};

use crate::domain::coins::Coins;
use crate::domain::UserId;

/// Присутствие пользователя в сети.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline,
}

/// То, что приходит от провайдера авторизации при успешном входе.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Стабильный внешний идентификатор.
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Профиль пользователя. Создаётся при первом входе и никогда не удаляется.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub photo_url: String,
    /// Выбранный аватар из галереи персонажей (если есть).
    pub avatar_id: Option<String>,
    pub presence: Presence,
    pub level: u32,
    pub coins: Coins,
}

impl User {
    /// Имя по умолчанию, если провайдер его не прислал.
    pub const DEFAULT_NAME: &'static str = "Jogador";

    pub fn new(id: UserId, name: String, photo_url: String, level: u32, coins: Coins) -> Self {
        Self {
            id,
            name,
            photo_url,
            avatar_id: None,
            presence: Presence::Online,
            level,
            coins,
        }
    }

    /// Новый профиль из данных провайдера.
    ///
    /// Пустой аватар заменяем сгенерированным по id.
    pub fn from_identity(identity: &Identity, level: u32, coins: Coins) -> Self {
        let name = identity
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_NAME.to_string());
        let photo_url = identity
            .photo_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| generated_avatar_url(&identity.user_id));

        Self::new(identity.user_id.clone(), name, photo_url, level, coins)
    }

    pub fn is_online(&self) -> bool {
        self.presence == Presence::Online
    }
}

/// Аватар-заглушка на основе id пользователя.
pub fn generated_avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}
