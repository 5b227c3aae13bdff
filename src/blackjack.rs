//! Блэкджек один на один с дилером казино.
//!
//! Карта = число 1..=11: 1 это туз, 11 это картинка (считается за 10).
//! Один туз добавляет +10, если сумма не превышает 21. Ставок нет.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::engine::RandomSource;

pub const BLACKJACK: u32 = 21;
/// Дилер добирает, пока сумма меньше этого порога.
pub const DEALER_STANDS_ON: u32 = 17;

const ACE: u8 = 1;
const MAX_CARD: u8 = 11;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BlackjackError {
    #[error("Раунд уже завершён")]
    RoundOver,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlackjackOutcome {
    PlayerWins,
    DealerWins,
    Push,
    PlayerBust,
}

/// Очки руки.
pub fn score(cards: &[u8]) -> u32 {
    let mut total: u32 = cards.iter().map(|&c| u32::from(c.min(10))).sum();
    if cards.contains(&ACE) && total + 10 <= BLACKJACK {
        total += 10;
    }
    total
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlackjackRound {
    pub player: Vec<u8>,
    pub dealer: Vec<u8>,
    pub outcome: Option<BlackjackOutcome>,
}

impl BlackjackRound {
    /// Раздача: две карты игроку, одна дилеру.
    pub fn deal<R: RandomSource>(rng: &mut R) -> Self {
        let player = vec![draw(rng), draw(rng)];
        let dealer = vec![draw(rng)];
        Self {
            player,
            dealer,
            outcome: None,
        }
    }

    pub fn player_score(&self) -> u32 {
        score(&self.player)
    }

    pub fn dealer_score(&self) -> u32 {
        score(&self.dealer)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Ещё карту. Перебор сразу заканчивает раунд.
    pub fn hit<R: RandomSource>(&mut self, rng: &mut R) -> Result<Option<BlackjackOutcome>, BlackjackError> {
        if self.is_over() {
            return Err(BlackjackError::RoundOver);
        }
        self.player.push(draw(rng));
        if self.player_score() > BLACKJACK {
            self.outcome = Some(BlackjackOutcome::PlayerBust);
        }
        debug!(player = self.player_score(), outcome = ?self.outcome, "blackjack hit");
        Ok(self.outcome)
    }

    /// Хватит: дилер добирает до 17 и раунд решается.
    pub fn stand<R: RandomSource>(&mut self, rng: &mut R) -> Result<BlackjackOutcome, BlackjackError> {
        if self.is_over() {
            return Err(BlackjackError::RoundOver);
        }
        while self.dealer_score() < DEALER_STANDS_ON {
            self.dealer.push(draw(rng));
        }

        let player = self.player_score();
        let dealer = self.dealer_score();
        let outcome = if dealer > BLACKJACK || player > dealer {
            BlackjackOutcome::PlayerWins
        } else if player == dealer {
            BlackjackOutcome::Push
        } else {
            BlackjackOutcome::DealerWins
        };

        debug!(player, dealer, ?outcome, "blackjack stand");
        self.outcome = Some(outcome);
        Ok(outcome)
    }
}

fn draw<R: RandomSource>(rng: &mut R) -> u8 {
    rng.next_in_range(ACE, MAX_CARD)
}
