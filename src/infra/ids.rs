use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::RoomId;

/// Алфавит суффикса id комнаты (base36 в верхнем регистре).
const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Генерация id комнат вида `ROOM_7K2QXA`.
///
/// С `seeded` последовательность воспроизводима (тесты, реплей).
#[derive(Debug)]
pub struct IdGenerator {
    rng: StdRng,
    room_id_len: usize,
}

impl IdGenerator {
    pub fn from_entropy(room_id_len: usize) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            room_id_len: room_id_len.max(1),
        }
    }

    pub fn seeded(seed: u64, room_id_len: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            room_id_len: room_id_len.max(1),
        }
    }

    pub fn next_room_id(&mut self) -> RoomId {
        let suffix: String = (0..self.room_id_len)
            .map(|_| {
                let idx = self.rng.gen_range(0..ROOM_ID_ALPHABET.len());
                ROOM_ID_ALPHABET[idx] as char
            })
            .collect();
        format!("ROOM_{suffix}")
    }

    /// Id тренировочной комнаты (не хранится в сторе).
    pub fn next_practice_room_id(&mut self) -> RoomId {
        let id = self.next_room_id();
        id.replacen("ROOM_", "AI_", 1)
    }
}
