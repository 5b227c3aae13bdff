use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Board, Boneyard, DominoPiece, End, MatchId, RoomId, SeatIndex, UserId};
use crate::engine::actions::{MatchAction, MatchActionKind};
use crate::engine::errors::EngineError;
use crate::engine::match_history::{FinishReason, MatchEventKind, MatchHistory};
use crate::engine::positions::{lowest_pip_seat, next_seat, pip_count, select_starter};
use crate::engine::validation::{has_legal_move, legal_moves, validate_action};
use crate::engine::RandomSource;
use crate::time_ctrl::{decide, AutoActionDecision, TurnClock, TurnRules};

/// Сколько костей получает каждый игрок при раздаче.
pub const HAND_SIZE: usize = 7;
pub const MIN_PLAYERS: usize = 2;
/// 4 * 7 = 28, больше рук из одного набора не раздать.
pub const MAX_PLAYERS: usize = 4;

/// Итог завершённого матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSummary {
    pub room_id: RoomId,
    pub match_id: MatchId,
    pub winner: UserId,
    pub winner_seat: SeatIndex,
    pub reason: FinishReason,
    /// Сумма очков, оставшихся в руке, по местам.
    pub pip_counts: Vec<u32>,
}

/// Статус матча для внешнего кода.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    Ongoing,
    Finished(MatchSummary),
}

/// Результат тика таймера.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub decision: AutoActionDecision,
    pub status: MatchStatus,
}

/// Внутреннее состояние матча домино.
#[derive(Clone, Debug)]
pub struct MatchEngine {
    pub room_id: RoomId,
    pub match_id: MatchId,
    /// Игроки в порядке мест.
    pub players: Vec<UserId>,
    /// Руки по местам.
    pub hands: Vec<Vec<DominoPiece>>,
    pub board: Board,
    pub boneyard: Boneyard,
    /// Чей сейчас ход.
    pub turn: SeatIndex,
    pub rules: TurnRules,
    pub clock: TurnClock,
    /// Победитель (после этого ходы не принимаются).
    pub winner: Option<SeatIndex>,
    pub finish_reason: Option<FinishReason>,
    pub history: MatchHistory,
}

impl MatchEngine {
    pub fn seat_of(&self, player_id: &str) -> Option<SeatIndex> {
        self.players
            .iter()
            .position(|p| p == player_id)
            .map(|idx| idx as SeatIndex)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn current_player(&self) -> &UserId {
        &self.players[self.turn as usize]
    }

    pub fn hand(&self, seat: SeatIndex) -> &[DominoPiece] {
        self.hands
            .get(seat as usize)
            .map(|h| h.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn legal_moves(&self, seat: SeatIndex) -> Vec<(DominoPiece, End)> {
        legal_moves(self.hand(seat), &self.board)
    }

    pub fn has_legal_move(&self, seat: SeatIndex) -> bool {
        has_legal_move(self.hand(seat), &self.board)
    }

    /// Сколько костей сейчас в руках.
    pub fn pieces_in_hands(&self) -> usize {
        self.hands.iter().map(|h| h.len()).sum()
    }

    /// Итог матча, если он завершён.
    pub fn summary(&self) -> Option<MatchSummary> {
        let winner_seat = self.winner?;
        Some(MatchSummary {
            room_id: self.room_id.clone(),
            match_id: self.match_id,
            winner: self.players[winner_seat as usize].clone(),
            winner_seat,
            reason: self.finish_reason.unwrap_or(FinishReason::Domino),
            pip_counts: self.hands.iter().map(|h| pip_count(h)).collect(),
        })
    }

    fn status(&self) -> MatchStatus {
        match self.summary() {
            Some(summary) => MatchStatus::Finished(summary),
            None => MatchStatus::Ongoing,
        }
    }

    fn advance_turn(&mut self) {
        self.turn = next_seat(self.turn, self.players.len());
        self.clock.start_turn(self.turn, &self.rules);
    }

    fn finish(&mut self, winner: SeatIndex, reason: FinishReason) {
        self.winner = Some(winner);
        self.finish_reason = Some(reason);
        self.clock.clear();
        self.history
            .push(MatchEventKind::MatchFinished { winner, reason });

        info!(
            room_id = %self.room_id,
            match_id = self.match_id,
            winner = %self.players[winner as usize],
            ?reason,
            "match finished"
        );
    }

    /// «Рыба»: базар пуст и ни у кого нет хода.
    fn finish_if_blocked(&mut self) -> bool {
        if !self.boneyard.is_empty() {
            return false;
        }
        let anyone_can_play = (0..self.players.len()).any(|seat| self.has_legal_move(seat as SeatIndex));
        if anyone_can_play {
            return false;
        }

        match lowest_pip_seat(&self.hands) {
            Some(winner) => {
                self.finish(winner, FinishReason::Blocked);
                true
            }
            None => false,
        }
    }
}

/// Старт нового матча:
/// - перемешивает полный набор;
/// - раздаёт по 7 костей в порядке мест, остаток уходит в базар;
/// - выбирает стартового игрока и выкладывает его кость;
/// - передаёт ход следующему месту и запускает таймер.
pub fn start_match<R: RandomSource>(
    room_id: RoomId,
    match_id: MatchId,
    players: Vec<UserId>,
    rules: TurnRules,
    rng: &mut R,
) -> Result<MatchEngine, EngineError> {
    if players.len() < MIN_PLAYERS {
        return Err(EngineError::NotEnoughPlayers(players.len()));
    }
    if players.len() > MAX_PLAYERS {
        return Err(EngineError::TooManyPlayers(players.len()));
    }
    let mut seen = HashSet::new();
    for p in &players {
        if !seen.insert(p.as_str()) {
            return Err(EngineError::DuplicatePlayer(p.clone()));
        }
    }

    let mut boneyard = Boneyard::double_six();
    rng.shuffle(&mut boneyard.pieces);

    let mut hands: Vec<Vec<DominoPiece>> = players
        .iter()
        .map(|_| boneyard.deal(HAND_SIZE))
        .collect();

    let (starter, start_piece) =
        select_starter(&hands).ok_or(EngineError::Internal("empty deal"))?;
    hands[starter as usize].retain(|p| p.id != start_piece.id);

    let mut board = Board::new();
    board.place_start(start_piece);

    let mut history = MatchHistory::new();
    history.push(MatchEventKind::MatchStarted {
        room_id: room_id.clone(),
        match_id,
        players: players.clone(),
    });
    if let Some(placed) = board.start {
        history.push(MatchEventKind::StartPiecePlaced {
            seat: starter,
            placed,
        });
    }

    let mut engine = MatchEngine {
        room_id,
        match_id,
        turn: starter,
        players,
        hands,
        board,
        boneyard,
        rules,
        clock: TurnClock::new(),
        winner: None,
        finish_reason: None,
        history,
    };

    info!(
        room_id = %engine.room_id,
        match_id,
        starter = %engine.players[starter as usize],
        start_piece = %start_piece,
        "match started"
    );

    engine.advance_turn();
    engine.finish_if_blocked();

    Ok(engine)
}

/// Применить действие игрока.
///
/// Отклонённое действие не меняет ни борд, ни руки, ни очередь хода.
pub fn apply_action(engine: &mut MatchEngine, action: MatchAction) -> Result<MatchStatus, EngineError> {
    if engine.is_finished() {
        return Err(EngineError::MatchFinished);
    }

    let seat = engine
        .seat_of(&action.player_id)
        .ok_or_else(|| EngineError::UnknownPlayer(action.player_id.clone()))?;

    if seat != engine.turn {
        return Err(EngineError::NotPlayersTurn(action.player_id));
    }

    validate_action(
        seat,
        engine.hand(seat),
        &action.kind,
        &engine.board,
        &engine.boneyard,
    )?;

    debug!(room_id = %engine.room_id, seat, action = ?action.kind, "apply action");

    match action.kind {
        MatchActionKind::Place { piece, end } => {
            let hand = &mut engine.hands[seat as usize];
            let idx = hand
                .iter()
                .position(|p| p.id == piece)
                .ok_or(EngineError::PieceNotInHand(piece))?;

            let placed = engine
                .board
                .place(hand[idx], end)
                .ok_or(EngineError::IllegalMove { piece, end })?;
            hand.remove(idx);
            let emptied = hand.is_empty();

            engine
                .history
                .push(MatchEventKind::PiecePlaced { seat, placed });

            if emptied {
                engine.finish(seat, FinishReason::Domino);
            } else {
                engine.advance_turn();
                engine.finish_if_blocked();
            }
        }

        MatchActionKind::Draw => {
            let piece = engine
                .boneyard
                .draw_one()
                .ok_or(EngineError::BoneyardEmpty)?;
            engine.hands[seat as usize].push(piece);

            engine.history.push(MatchEventKind::PieceDrawn {
                seat,
                boneyard_left: engine.boneyard.len(),
            });
        }

        MatchActionKind::Pass => {
            engine.history.push(MatchEventKind::Passed { seat });
            engine.advance_turn();
            engine.finish_if_blocked();
        }
    }

    Ok(engine.status())
}

/// Протекание времени хода.
///
/// При политике `ForcePass` истёкший ход пропускается так же, как пас.
/// При `Advisory` истечение попадает в историю и лог один раз за ход.
pub fn tick(engine: &mut MatchEngine, delta_secs: u32) -> TickOutcome {
    if engine.is_finished() {
        return TickOutcome {
            decision: AutoActionDecision::None,
            status: engine.status(),
        };
    }

    let seat = engine.clock.current_seat;
    let already_expired = engine.clock.is_expired();
    let state = engine.clock.elapse(delta_secs);
    let decision = decide(engine.rules.policy, state, seat);

    match decision {
        AutoActionDecision::ForcePass { seat } => {
            tracing::warn!(room_id = %engine.room_id, seat, "turn timed out, forcing pass");
            engine.history.push(MatchEventKind::TimedOut { seat });
            engine.advance_turn();
            engine.finish_if_blocked();
        }
        AutoActionDecision::Advisory { seat } if !already_expired => {
            tracing::warn!(room_id = %engine.room_id, seat, "turn timer expired");
            engine.history.push(MatchEventKind::TurnExpired { seat });
        }
        AutoActionDecision::Advisory { .. } => {}
        AutoActionDecision::None => {}
    }

    TickOutcome {
        decision,
        status: engine.status(),
    }
}
