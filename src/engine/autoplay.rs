//! Простейшая стратегия ботов тренировочной комнаты.

use crate::domain::SeatIndex;
use crate::engine::actions::MatchActionKind;
use crate::engine::game_loop::MatchEngine;

/// Выбрать ход за место: самая «тяжёлая» подходящая кость, иначе добор, иначе пас.
pub fn choose_action(engine: &MatchEngine, seat: SeatIndex) -> MatchActionKind {
    let best = engine
        .legal_moves(seat)
        .into_iter()
        .max_by_key(|(piece, _)| piece.pip_total());

    match best {
        Some((piece, end)) => MatchActionKind::Place {
            piece: piece.id,
            end,
        },
        None if !engine.boneyard.is_empty() => MatchActionKind::Draw,
        None => MatchActionKind::Pass,
    }
}
