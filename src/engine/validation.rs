use crate::domain::{Board, Boneyard, DominoPiece, End, SeatIndex};
use crate::engine::actions::MatchActionKind;
use crate::engine::errors::EngineError;

/// Легален ли ход: одна из половинок кости совпадает со значением конца.
pub fn is_legal_move(piece: &DominoPiece, end_value: u8) -> bool {
    piece.has_pip(end_value)
}

/// Все легальные ходы руки: (кость, конец).
pub fn legal_moves(hand: &[DominoPiece], board: &Board) -> Vec<(DominoPiece, End)> {
    let ends = match board.open_ends() {
        Some(ends) => ends,
        None => return Vec::new(),
    };

    let mut moves = Vec::new();
    for piece in hand {
        for end in [End::Left, End::Right] {
            if is_legal_move(piece, ends.get(end)) {
                moves.push((*piece, end));
            }
        }
    }
    moves
}

pub fn has_legal_move(hand: &[DominoPiece], board: &Board) -> bool {
    board
        .open_ends()
        .map(|ends| {
            hand.iter()
                .any(|p| is_legal_move(p, ends.left) || is_legal_move(p, ends.right))
        })
        .unwrap_or(false)
}

/// Проверка действия игрока на текущем месте без изменения состояния.
pub fn validate_action(
    seat: SeatIndex,
    hand: &[DominoPiece],
    action: &MatchActionKind,
    board: &Board,
    boneyard: &Boneyard,
) -> Result<(), EngineError> {
    match action {
        MatchActionKind::Place { piece, end } => {
            let piece = hand
                .iter()
                .find(|p| p.id == *piece)
                .ok_or(EngineError::PieceNotInHand(*piece))?;

            if board.accepts(piece, *end) {
                Ok(())
            } else {
                Err(EngineError::IllegalMove {
                    piece: piece.id,
                    end: *end,
                })
            }
        }

        MatchActionKind::Draw => {
            if boneyard.is_empty() {
                return Err(EngineError::BoneyardEmpty);
            }
            if has_legal_move(hand, board) {
                return Err(EngineError::DrawNotAllowed(seat));
            }
            Ok(())
        }

        MatchActionKind::Pass => {
            // Пасовать можно только когда ходить нечем и добирать неоткуда.
            if !boneyard.is_empty() || has_legal_move(hand, board) {
                return Err(EngineError::PassNotAllowed(seat));
            }
            Ok(())
        }
    }
}
