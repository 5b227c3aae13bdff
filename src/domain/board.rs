use serde::{Deserialize, Serialize};

use crate::domain::domino::DominoPiece;

/// Открытый конец цепочки, к которому прикладывают кость.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum End {
    Left,
    Right,
}

/// Где лежит кость на борде.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Placement {
    /// Стартовая кость (первый ход).
    Start,
    /// Левая ветка цепочки.
    Left,
    /// Правая ветка цепочки.
    Right,
}

impl From<End> for Placement {
    fn from(end: End) -> Self {
        match end {
            End::Left => Placement::Left,
            End::Right => Placement::Right,
        }
    }
}

/// Кость на борде + сторона и флаг разворота.
///
/// `flipped` = половинки выложены в обратном порядке относительно side1/side2,
/// чтобы наружный конец цепочки читался позиционно.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardPiece {
    pub piece: DominoPiece,
    pub placement: Placement,
    pub flipped: bool,
}

impl BoardPiece {
    /// Значения в порядке слева направо, как кость видна на столе.
    pub fn displayed(&self) -> (u8, u8) {
        if self.flipped {
            (self.piece.side2, self.piece.side1)
        } else {
            (self.piece.side1, self.piece.side2)
        }
    }

    /// Значение, смотрящее наружу цепочки.
    ///
    /// Для стартовой кости наружу смотрят обе половинки; берём правую.
    pub fn outward_pip(&self) -> u8 {
        let (left, right) = self.displayed();
        match self.placement {
            Placement::Left => left,
            Placement::Right | Placement::Start => right,
        }
    }
}

/// Два открытых конца цепочки.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenEnds {
    pub left: u8,
    pub right: u8,
}

impl OpenEnds {
    pub fn get(&self, end: End) -> u8 {
        match end {
            End::Left => self.left,
            End::Right => self.right,
        }
    }
}

/// Цепочка на столе: стартовая кость и две ветки, растущие только наружу.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub start: Option<BoardPiece>,
    /// Левая ветка, от старта наружу.
    pub left: Vec<BoardPiece>,
    /// Правая ветка, от старта наружу.
    pub right: Vec<BoardPiece>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.start.iter().count() + self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    /// Выложить стартовую кость. Только на пустой борд.
    pub fn place_start(&mut self, piece: DominoPiece) -> bool {
        if self.start.is_some() {
            return false;
        }
        self.start = Some(BoardPiece {
            piece,
            placement: Placement::Start,
            flipped: false,
        });
        true
    }

    /// Текущие открытые концы (None, пока борд пуст).
    pub fn open_ends(&self) -> Option<OpenEnds> {
        let start = self.start.as_ref()?;

        let left = self
            .left
            .last()
            .map(|p| p.outward_pip())
            .unwrap_or(start.piece.side1);
        let right = self
            .right
            .last()
            .map(|p| p.outward_pip())
            .unwrap_or(start.piece.side2);

        Some(OpenEnds { left, right })
    }

    pub fn end_value(&self, end: End) -> Option<u8> {
        self.open_ends().map(|ends| ends.get(end))
    }

    /// Можно ли приложить кость к этому концу.
    pub fn accepts(&self, piece: &DominoPiece, end: End) -> bool {
        self.end_value(end)
            .map(|value| piece.has_pip(value))
            .unwrap_or(false)
    }

    /// Приложить кость к концу цепочки, развернув её совпадающей половинкой внутрь.
    ///
    /// Возвращает выложенную кость или `None`, если ход нелегален (борд не тронут).
    pub fn place(&mut self, piece: DominoPiece, end: End) -> Option<BoardPiece> {
        let target = self.end_value(end)?;
        if !piece.has_pip(target) {
            return None;
        }

        let flipped = match end {
            End::Left => piece.side1 == target,
            End::Right => piece.side2 == target,
        };

        let placed = BoardPiece {
            piece,
            placement: end.into(),
            flipped,
        };

        match end {
            End::Left => self.left.push(placed),
            End::Right => self.right.push(placed),
        }

        Some(placed)
    }

    /// Вся цепочка слева направо.
    pub fn chain(&self) -> Vec<BoardPiece> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.left.iter().rev().copied());
        out.extend(self.start.iter().copied());
        out.extend(self.right.iter().copied());
        out
    }
}
