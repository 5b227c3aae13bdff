//! Доменная модель лобби: монеты, пользователи, комнаты, кости домино, борд.

pub mod board;
pub mod boneyard;
pub mod coins;
pub mod domino;
pub mod room;
pub mod user;

/// Внешний идентификатор пользователя (его выдаёт провайдер авторизации).
pub type UserId = String;
/// Идентификатор комнаты вида `ROOM_XXXXXX`.
pub type RoomId = String;
/// Индекс места в матче (порядок игроков в комнате).
pub type SeatIndex = u8;
/// Порядковый номер матча (для истории и снапшотов).
pub type MatchId = u64;

pub use board::*;
pub use boneyard::*;
pub use coins::*;
pub use domino::*;
pub use room::*;
pub use user::*;
