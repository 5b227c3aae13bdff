use crate::domain::{DominoPiece, SeatIndex};

/// Следующее место по кругу: `(i + 1) mod n`.
pub fn next_seat(current: SeatIndex, player_count: usize) -> SeatIndex {
    if player_count == 0 {
        return 0;
    }
    ((current as usize + 1) % player_count) as SeatIndex
}

/// Выбрать, кто ходит первым.
///
/// Обходим все розданные кости (игроки по порядку мест, кости по порядку в руке),
/// вес кости = сумма очков, дубль +100. Побеждает первая встреченная кость
/// с максимальным весом: при равенстве выигрывает более раннее место.
pub fn select_starter(hands: &[Vec<DominoPiece>]) -> Option<(SeatIndex, DominoPiece)> {
    let mut best: Option<(SeatIndex, DominoPiece, u32)> = None;

    for (seat, hand) in hands.iter().enumerate() {
        for piece in hand {
            let score = piece.starter_score();
            let better = match best {
                Some((_, _, best_score)) => score > best_score,
                None => true,
            };
            if better {
                best = Some((seat as SeatIndex, *piece, score));
            }
        }
    }

    best.map(|(seat, piece, _)| (seat, piece))
}

/// Кто выигрывает «рыбу» (заблокированную партию): меньше всего очков в руке.
/// При равенстве выигрывает более раннее место.
pub fn lowest_pip_seat(hands: &[Vec<DominoPiece>]) -> Option<SeatIndex> {
    hands
        .iter()
        .enumerate()
        .map(|(seat, hand)| (seat, pip_count(hand)))
        .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(seat, _)| seat as SeatIndex)
}

/// Сумма очков в руке.
pub fn pip_count(hand: &[DominoPiece]) -> u32 {
    hand.iter().map(|p| p.pip_total()).sum()
}
