use linera_sdk::views::{linera_views, MapView, RegisterView, RootView, ViewStorageContext};
use serde::{Deserialize, Serialize};

use crate::domain::{Board, Boneyard, DominoPiece, MatchId, Room, RoomId, SeatIndex, User, UserId};
use crate::engine::{FinishReason, MatchEngine, MatchHistory};
use crate::time_ctrl::{TurnClock, TurnRules};

/// Снэпшот MatchEngine, который можно хранить во View.
/// Это «замороженный» матч: всё, что нужно, чтобы восстановить MatchEngine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub room_id: RoomId,
    pub match_id: MatchId,
    pub players: Vec<UserId>,
    pub hands: Vec<Vec<DominoPiece>>,
    pub board: Board,
    pub boneyard: Boneyard,
    pub turn: SeatIndex,
    pub rules: TurnRules,
    pub clock: TurnClock,
    pub winner: Option<SeatIndex>,
    pub finish_reason: Option<FinishReason>,
    pub history: MatchHistory,
}

impl MatchSnapshot {
    /// Упаковать живой MatchEngine в снапшот для хранения on-chain.
    pub fn from_engine(engine: &MatchEngine) -> Self {
        Self {
            room_id: engine.room_id.clone(),
            match_id: engine.match_id,
            players: engine.players.clone(),
            hands: engine.hands.clone(),
            board: engine.board.clone(),
            boneyard: engine.boneyard.clone(),
            turn: engine.turn,
            rules: engine.rules,
            clock: engine.clock.clone(),
            winner: engine.winner,
            finish_reason: engine.finish_reason,
            history: engine.history.clone(),
        }
    }

    /// Развернуть снапшот обратно в MatchEngine (в памяти).
    pub fn into_engine(self) -> MatchEngine {
        MatchEngine {
            room_id: self.room_id,
            match_id: self.match_id,
            players: self.players,
            hands: self.hands,
            board: self.board,
            boneyard: self.boneyard,
            turn: self.turn,
            rules: self.rules,
            clock: self.clock,
            winner: self.winner,
            finish_reason: self.finish_reason,
            history: self.history,
        }
    }
}

/// Глобальное состояние лобби на Linera.
///
/// Доменные структуры (User, Room) храним напрямую,
/// для MatchEngine используем MatchSnapshot.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct LobbyState {
    /// Профили: UserId -> User.
    #[view(map)]
    pub users: MapView<UserId, User>,

    /// Публичные комнаты: RoomId -> Room.
    #[view(map)]
    pub rooms: MapView<RoomId, Room>,

    /// Активные матчи по комнатам (None, если матча сейчас нет).
    #[view(map)]
    pub active_matches: MapView<RoomId, Option<MatchSnapshot>>,

    /// Сколько всего матчей сыграно.
    #[view(register)]
    pub total_matches_played: RegisterView<u64>,
}
