use serde::{Deserialize, Serialize};

use crate::domain::domino::DominoPiece;

/// Запас костей («базар»). В домене это просто упорядоченный список.
/// Перемешивание делает engine (через RNG из infra), НЕ здесь.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Boneyard {
    pub pieces: Vec<DominoPiece>,
}

impl Boneyard {
    /// Полный набор из 28 костей в каноническом порядке.
    pub fn double_six() -> Self {
        Self {
            pieces: DominoPiece::full_set(),
        }
    }

    pub fn empty() -> Self {
        Self { pieces: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Раздать руку: первые `n` костей (или сколько осталось).
    pub fn deal(&mut self, n: usize) -> Vec<DominoPiece> {
        let n = n.min(self.pieces.len());
        self.pieces.drain(..n).collect()
    }

    /// Добор одной кости с конца запаса.
    pub fn draw_one(&mut self) -> Option<DominoPiece> {
        self.pieces.pop()
    }
}
