//! Лента комнат в реальном времени: подписчики получают полный список комнат
//! сразу при подписке и после каждого изменения.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::domain::Room;

/// Токен подписки, по нему же отписываемся.
pub type SubscriptionId = u64;

/// Колбэк подписчика: получает полный снимок комнат.
pub type RoomsCallback = Box<dyn FnMut(&[Room]) + Send>;

/// Реестр подписчиков. Без диффов и backpressure: всегда весь набор.
#[derive(Default)]
pub struct RoomFeed {
    subscribers: BTreeMap<SubscriptionId, RoomsCallback>,
    next_id: SubscriptionId,
}

impl RoomFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Подписаться: колбэк сразу получает текущий снимок.
    pub fn subscribe(&mut self, mut callback: RoomsCallback, snapshot: &[Room]) -> SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;

        callback(snapshot);
        self.subscribers.insert(id, callback);

        debug!(subscription = id, total = self.subscribers.len(), "room feed subscribed");
        id
    }

    /// Отписаться. `false`, если такой подписки нет.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Разослать снимок всем подписчикам в порядке подписки.
    pub fn broadcast(&mut self, rooms: &[Room]) {
        debug!(subscribers = self.subscribers.len(), rooms = rooms.len(), "room feed broadcast");
        for callback in self.subscribers.values_mut() {
            callback(rooms);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for RoomFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomFeed")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
