use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Идентификатор кости: её номер в каноническом наборе (0..27).
pub type PieceId = u8;

/// Старшее значение на половинке кости (набор «дубль-шесть»).
pub const MAX_PIP: u8 = 6;

/// Количество костей в полном наборе.
pub const FULL_SET_SIZE: usize = 28;

/// Бонус дубля при выборе первого хода: любой дубль старше любой обычной кости.
pub const DOUBLE_BONUS: u32 = 100;

/// Кость домино. Значения половинок 0..=6, порядок side1/side2 как при генерации.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DominoPiece {
    pub id: PieceId,
    pub side1: u8,
    pub side2: u8,
}

impl DominoPiece {
    pub const fn new(id: PieceId, side1: u8, side2: u8) -> Self {
        Self { id, side1, side2 }
    }

    pub fn is_double(&self) -> bool {
        self.side1 == self.side2
    }

    /// Сумма очков на кости.
    pub fn pip_total(&self) -> u32 {
        self.side1 as u32 + self.side2 as u32
    }

    /// Есть ли на кости такое значение.
    pub fn has_pip(&self, pip: u8) -> bool {
        self.side1 == pip || self.side2 == pip
    }

    /// Вес кости при выборе стартового игрока.
    pub fn starter_score(&self) -> u32 {
        if self.is_double() {
            self.pip_total() + DOUBLE_BONUS
        } else {
            self.pip_total()
        }
    }

    /// Канонический набор из 28 костей: все неупорядоченные пары i <= j из 0..=6.
    pub fn full_set() -> Vec<DominoPiece> {
        let mut pieces = Vec::with_capacity(FULL_SET_SIZE);
        let mut id: PieceId = 0;
        for i in 0..=MAX_PIP {
            for j in i..=MAX_PIP {
                pieces.push(DominoPiece::new(id, i, j));
                id += 1;
            }
        }
        pieces
    }

    /// Найти кость канонического набора по значениям половинок (в любом порядке).
    pub fn from_pips(a: u8, b: u8) -> Option<DominoPiece> {
        if a > MAX_PIP || b > MAX_PIP {
            return None;
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self::full_set()
            .into_iter()
            .find(|p| p.side1 == lo && p.side2 == hi)
    }
}

impl fmt::Display for DominoPiece {
    /// Формат вида `[3|5]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}|{}]", self.side1, self.side2)
    }
}

/// Парсинг строк вида "3-5", "3|5", "[3|5]".
impl FromStr for DominoPiece {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        let mut parts = trimmed.split(|c| c == '-' || c == '|');

        let (a, b) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => (a.trim(), b.trim()),
            _ => return Err(format!("Invalid piece: {s}")),
        };

        let a: u8 = a.parse().map_err(|_| format!("Invalid pip: {a}"))?;
        let b: u8 = b.parse().map_err(|_| format!("Invalid pip: {b}"))?;

        DominoPiece::from_pips(a, b).ok_or_else(|| format!("Pip out of range: {s}"))
    }
}
