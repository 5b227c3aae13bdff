use serde::{Deserialize, Serialize};

use crate::domain::coins::Coins;
use crate::domain::user::User;
use crate::domain::{RoomId, UserId};

/// Вид игры в комнате.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameKind {
    Blackjack,
    Dominoes,
    PokerLite,
    Truco,
}

impl GameKind {
    /// Максимум мест за столом для этого вида игры.
    pub const fn max_players(self) -> u8 {
        match self {
            GameKind::Blackjack => 4,
            // 28 костей по 7 в руку.
            GameKind::Dominoes => 4,
            GameKind::PokerLite => 6,
            GameKind::Truco => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            GameKind::Blackjack => "Blackjack",
            GameKind::Dominoes => "Dominó",
            GameKind::PokerLite => "Poker Lite",
            GameKind::Truco => "Truco",
        }
    }
}

/// Статус комнаты.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomStatus {
    /// Ждём, пока заполнятся места.
    Waiting,
    /// Все места заняты, идёт матч.
    Playing,
    /// Матч завершён, банк выплачен.
    Finished,
}

/// Участник комнаты (игрок или зритель): снимок отображаемых полей профиля.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub name: String,
    pub photo_url: String,
    /// Бот тренировочной комнаты (не человек, без баланса).
    pub is_bot: bool,
}

impl Member {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            photo_url: user.photo_url.clone(),
            is_bot: false,
        }
    }

    pub fn bot(user_id: UserId, name: String, photo_url: String) -> Self {
        Self {
            user_id,
            name,
            photo_url,
            is_bot: true,
        }
    }
}

/// Комната (стол) для одного матча со ставкой.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub creator: Member,
    pub game_kind: GameKind,
    /// Игроки в порядке входа, уникальны по user_id.
    pub players: Vec<Member>,
    /// Зрители, уникальны по user_id.
    pub spectators: Vec<Member>,
    pub max_players: u8,
    pub status: RoomStatus,
    /// Ставка за место, фиксируется при создании.
    pub bet: Coins,
    /// Собранный банк.
    pub pot: Coins,
    /// Часть банка от игроков, покинувших идущий матч (ставка не возвращается).
    pub forfeited: Coins,
    /// Тренировочная комната против ботов: не хранится и не попадает в ленту.
    pub practice: bool,
}

impl Room {
    /// Новая комната с создателем на единственном месте; банк = его ставка.
    pub fn new(id: RoomId, creator: Member, game_kind: GameKind, max_players: u8, bet: Coins) -> Self {
        Self {
            id,
            players: vec![creator.clone()],
            creator,
            game_kind,
            spectators: Vec::new(),
            max_players,
            status: RoomStatus::Waiting,
            bet,
            pot: bet,
            forfeited: Coins::ZERO,
            practice: false,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn has_player(&self, user_id: &str) -> bool {
        self.players.iter().any(|p| p.user_id == user_id)
    }

    pub fn has_spectator(&self, user_id: &str) -> bool {
        self.spectators.iter().any(|s| s.user_id == user_id)
    }

    /// Ожидаемый банк: ставка на каждое занятое место плюс ставки ушедших.
    pub fn expected_pot(&self) -> Coins {
        self.bet.times(self.players.len()) + self.forfeited
    }

    /// Убрать участника из игроков и зрителей. Возвращает, был ли он игроком.
    pub fn remove_member(&mut self, user_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.user_id != user_id);
        self.spectators.retain(|s| s.user_id != user_id);
        self.players.len() != before
    }

    pub fn player_ids(&self) -> Vec<UserId> {
        self.players.iter().map(|p| p.user_id.clone()).collect()
    }
}
