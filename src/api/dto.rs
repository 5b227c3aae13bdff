use serde::{Deserialize, Serialize};

use crate::blackjack::{BlackjackOutcome, BlackjackRound};
use crate::domain::{
    BoardPiece, Coins, DominoPiece, End, GameKind, Member, OpenEnds, PieceId, RoomId, RoomStatus,
    SeatIndex, User, UserId,
};
use crate::engine::MatchSummary;
use crate::time_ctrl::AutoActionDecision;

/// DTO профиля.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDto {
    pub user_id: UserId,
    pub name: String,
    pub photo_url: String,
    pub avatar_id: Option<String>,
    pub online: bool,
    pub level: u32,
    pub coins: Coins,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            photo_url: user.photo_url.clone(),
            avatar_id: user.avatar_id.clone(),
            online: user.is_online(),
            level: user.level,
            coins: user.coins,
        }
    }
}

/// DTO комнаты для лобби.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomViewDto {
    pub room_id: RoomId,
    pub game_kind: GameKind,
    /// Название игры для карточки в лобби.
    pub game_label: String,
    pub creator: Member,
    pub players: Vec<Member>,
    pub spectators: Vec<Member>,
    pub max_players: u8,
    pub status: RoomStatus,
    pub bet: Coins,
    pub pot: Coins,
    pub practice: bool,
    /// Есть ли незавершённый матч.
    pub match_in_progress: bool,
}

/// Место в матче домино.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSeatDto {
    pub seat: SeatIndex,
    pub user_id: UserId,
    pub pieces_left: usize,
    /// Кости в руке: только для самого игрока.
    pub hand: Option<Vec<DominoPiece>>,
    pub is_turn: bool,
}

/// Допустимый ход смотрящего игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegalMoveDto {
    pub piece: PieceId,
    pub end: End,
}

/// DTO матча домино глазами конкретного зрителя/игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchViewDto {
    pub room_id: RoomId,
    pub match_id: u64,
    pub seats: Vec<MatchSeatDto>,
    /// Цепочка слева направо.
    pub board: Vec<BoardPiece>,
    pub open_ends: Option<OpenEnds>,
    pub boneyard_left: usize,
    pub current_seat: Option<SeatIndex>,
    pub remaining_secs: u32,
    pub legal_moves: Vec<LegalMoveDto>,
    pub summary: Option<MatchSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlackjackViewDto {
    pub player: Vec<u8>,
    pub dealer: Vec<u8>,
    pub player_score: u32,
    pub dealer_score: u32,
    pub outcome: Option<BlackjackOutcome>,
}

impl From<&BlackjackRound> for BlackjackViewDto {
    fn from(round: &BlackjackRound) -> Self {
        Self {
            player: round.player.clone(),
            dealer: round.dealer.clone(),
            player_score: round.player_score(),
            dealer_score: round.dealer_score(),
            outcome: round.outcome,
        }
    }
}

/// Ответ на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandResponse {
    User(UserDto),
    SignedOut,
    Balance(Coins),
    Room(RoomViewDto),
    Left {
        room: Option<RoomViewDto>,
        refunded: Coins,
        forfeited: bool,
    },
    /// Матч продолжается (после старта, хода или тика).
    Match {
        view: MatchViewDto,
        timer: AutoActionDecision,
    },
    /// Матч завершён, банк выплачен победителю.
    MatchFinished {
        room: RoomViewDto,
        summary: MatchSummary,
        payout: Coins,
    },
    Blackjack(BlackjackViewDto),
}
