use serde::{Deserialize, Serialize};

use crate::domain::{Room, RoomId, SeatIndex, UserId};
use crate::engine::MatchEngine;

use super::dto::{LegalMoveDto, MatchSeatDto, MatchViewDto, RoomViewDto, UserDto};

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Query {
    /// Список публичных комнат (лобби).
    ListRooms,

    GetRoom { room_id: RoomId },

    /// Матч в комнате глазами `viewer` (его рука видна, чужие нет).
    GetMatch {
        room_id: RoomId,
        viewer: Option<UserId>,
    },

    GetUser { user_id: UserId },
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryResponse {
    Rooms(Vec<RoomViewDto>),
    Room(RoomViewDto),
    Match(MatchViewDto),
    User(Option<UserDto>),
}

/// DTO комнаты; `match_in_progress` берём из движка, если он есть.
pub fn build_room_view(room: &Room, engine: Option<&MatchEngine>) -> RoomViewDto {
    RoomViewDto {
        room_id: room.id.clone(),
        game_kind: room.game_kind,
        game_label: room.game_kind.label().to_string(),
        creator: room.creator.clone(),
        players: room.players.clone(),
        spectators: room.spectators.clone(),
        max_players: room.max_players,
        status: room.status,
        bet: room.bet,
        pot: room.pot,
        practice: room.practice,
        match_in_progress: engine.map(|e| !e.is_finished()).unwrap_or(false),
    }
}

/// DTO матча. Руки соперников скрыты, видны только размеры.
pub fn build_match_view(engine: &MatchEngine, viewer: Option<&str>) -> MatchViewDto {
    let viewer_seat = viewer.and_then(|v| engine.seat_of(v));
    let finished = engine.is_finished();

    let seats = engine
        .players
        .iter()
        .enumerate()
        .map(|(idx, user_id)| {
            let seat = idx as SeatIndex;
            MatchSeatDto {
                seat,
                user_id: user_id.clone(),
                pieces_left: engine.hand(seat).len(),
                hand: (viewer_seat == Some(seat)).then(|| engine.hand(seat).to_vec()),
                is_turn: !finished && engine.turn == seat,
            }
        })
        .collect();

    let legal_moves = match viewer_seat {
        Some(seat) if !finished && seat == engine.turn => engine
            .legal_moves(seat)
            .into_iter()
            .map(|(piece, end)| LegalMoveDto {
                piece: piece.id,
                end,
            })
            .collect(),
        _ => Vec::new(),
    };

    MatchViewDto {
        room_id: engine.room_id.clone(),
        match_id: engine.match_id,
        seats,
        board: engine.board.chain(),
        open_ends: engine.board.open_ends(),
        boneyard_left: engine.boneyard.len(),
        current_seat: (!finished).then_some(engine.turn),
        remaining_secs: engine.clock.remaining_secs,
        legal_moves,
        summary: engine.summary(),
    }
}
