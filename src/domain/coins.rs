use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Количество виртуальных монет. Обёртка над u64, баланс не бывает отрицательным.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coins(pub u64);

impl Coins {
    pub const ZERO: Coins = Coins(0);

    pub fn new(amount: u64) -> Self {
        Coins(amount)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Вычитание без ухода в минус: `None`, если не хватает.
    pub fn checked_sub(self, other: Coins) -> Option<Coins> {
        self.0.checked_sub(other.0).map(Coins)
    }

    /// Применить знаковую дельту (пополнение / списание).
    ///
    /// `None`, если списание больше баланса или результат переполняет u64.
    pub fn apply_delta(self, delta: i64) -> Option<Coins> {
        if delta >= 0 {
            self.0.checked_add(delta as u64).map(Coins)
        } else {
            self.0.checked_sub(delta.unsigned_abs()).map(Coins)
        }
    }

    /// `amount * n`, например ставка на количество мест.
    pub fn times(self, n: usize) -> Coins {
        Coins(self.0.saturating_mul(n as u64))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Coins {
    type Output = Coins;

    fn add(self, rhs: Coins) -> Self::Output {
        Coins(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Coins {
    fn add_assign(&mut self, rhs: Coins) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Coins {
    type Output = Coins;

    fn sub(self, rhs: Coins) -> Self::Output {
        Coins(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Coins {
    fn sub_assign(&mut self, rhs: Coins) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}
