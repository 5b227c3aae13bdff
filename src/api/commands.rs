use serde::{Deserialize, Serialize};

use crate::domain::{Coins, GameKind, Identity, RoomId};
use crate::engine::actions::MatchActionKind;

/// Команда верхнего уровня.
///
/// Автор команды (`actor`) передаётся отдельно: в контракте это
/// аутентифицированный владелец операции, в dev-CLI просто строка.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    /// Вход через провайдера. `actor` должен совпадать с `identity.user_id`.
    SignIn(Identity),

    SignOut,

    /// Изменить отображаемые поля профиля.
    UpdateProfile(UpdateProfileCommand),

    /// Пополнить / списать монеты (отрицательная дельта = списание).
    UpdateCoins { delta: i64 },

    /// Создать комнату со ставкой.
    CreateRoom(CreateRoomCommand),

    /// Тренировочная комната против ботов.
    CreatePracticeRoom { game_kind: GameKind, capacity: u8 },

    /// Операция над конкретной комнатой.
    RoomCommand(RoomCommand),

    /// Раунд блэкджека против дилера.
    Blackjack(BlackjackCommand),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateProfileCommand {
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub avatar_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRoomCommand {
    pub game_kind: GameKind,
    /// Мест за столом (2..=максимум для вида игры).
    pub capacity: u8,
    /// Ставка за место.
    pub wager: Coins,
}

/// Команды, которые относятся к существующей комнате.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomCommand {
    /// Сесть за стол (со ставкой) или смотреть.
    Join { room_id: RoomId, as_spectator: bool },

    /// Выйти из комнаты.
    Leave { room_id: RoomId },

    /// Явно запустить матч (обычно стартует сам, когда стол заполнен).
    StartMatch { room_id: RoomId },

    /// Ход в матче домино.
    Play {
        room_id: RoomId,
        action: MatchActionKind,
    },

    /// Протекание времени хода (секунды с прошлого тика).
    Tick { room_id: RoomId, delta_secs: u32 },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlackjackCommand {
    Deal,
    Hit,
    Stand,
}

impl Command {
    /// Комната, к которой относится команда (для логов).
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Command::RoomCommand(cmd) => Some(match cmd {
                RoomCommand::Join { room_id, .. }
                | RoomCommand::Leave { room_id }
                | RoomCommand::StartMatch { room_id }
                | RoomCommand::Play { room_id, .. }
                | RoomCommand::Tick { room_id, .. } => room_id,
            }),
            _ => None,
        }
    }
}
