//! Инфраструктурный слой вокруг лобби и движка:
//! - генерация ID;
//! - RNG-реализации для движка;
//! - абстракция хранения (in-memory / документный стор);
//! - лента комнат для подписчиков.

pub mod document_store;
pub mod feed;
pub mod ids;
pub mod persistence;
pub mod rng;

pub use document_store::{DocumentLobbyStorage, DocumentStore};
pub use feed::{RoomFeed, RoomsCallback, SubscriptionId};
pub use ids::*;
pub use persistence::*;
pub use rng::*;
