// tests/blackjack_tests.rs

//! Раунд блэкджека на заранее известной колоде.

use std::collections::VecDeque;

use nexus_casino::blackjack::{BlackjackError, BlackjackOutcome, BlackjackRound};
use nexus_casino::engine::RandomSource;

/// Отдаёт карты по списку.
struct ScriptedRng(VecDeque<u8>);

impl ScriptedRng {
    fn new(cards: &[u8]) -> Self {
        Self(cards.iter().copied().collect())
    }
}

impl RandomSource for ScriptedRng {
    fn shuffle<T>(&mut self, _slice: &mut [T]) {}

    fn next_in_range(&mut self, low: u8, high: u8) -> u8 {
        let card = self.0.pop_front().expect("колода закончилась");
        assert!((low..=high).contains(&card));
        card
    }
}

#[test]
fn dealer_draws_to_seventeen() {
    // Игрок 10+11 = 20, дилер 6 -> +10 -> +5 = 21.
    let mut rng = ScriptedRng::new(&[10, 11, 6, 10, 5]);
    let mut round = BlackjackRound::deal(&mut rng);
    assert_eq!(round.player_score(), 20);
    assert_eq!(round.dealer_score(), 6);

    assert_eq!(round.stand(&mut rng).unwrap(), BlackjackOutcome::DealerWins);
    assert_eq!(round.dealer, vec![6, 10, 5]);
}

#[test]
fn soft_ace_makes_twenty_one() {
    let mut rng = ScriptedRng::new(&[1, 11, 9, 8]);
    let mut round = BlackjackRound::deal(&mut rng);
    assert_eq!(round.player_score(), 21);
    assert_eq!(round.stand(&mut rng).unwrap(), BlackjackOutcome::PlayerWins);
}

#[test]
fn equal_scores_push() {
    let mut rng = ScriptedRng::new(&[10, 7, 10, 7]);
    let mut round = BlackjackRound::deal(&mut rng);
    assert_eq!(round.stand(&mut rng).unwrap(), BlackjackOutcome::Push);
}

#[test]
fn dealer_bust_pays_player() {
    let mut rng = ScriptedRng::new(&[2, 3, 10, 6, 10]);
    let mut round = BlackjackRound::deal(&mut rng);
    assert_eq!(round.stand(&mut rng).unwrap(), BlackjackOutcome::PlayerWins);
    assert!(round.dealer_score() > 21);
}

#[test]
fn bust_ends_the_round() {
    let mut rng = ScriptedRng::new(&[10, 9, 4, 5]);
    let mut round = BlackjackRound::deal(&mut rng);

    assert_eq!(round.hit(&mut rng).unwrap(), Some(BlackjackOutcome::PlayerBust));
    assert!(round.is_over());
    assert_eq!(round.stand(&mut rng).unwrap_err(), BlackjackError::RoundOver);
    assert_eq!(round.hit(&mut rng).unwrap_err(), BlackjackError::RoundOver);
}
