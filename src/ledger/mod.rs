//! Леджер лобби: пользователи, комнаты, ставки и банк.
//!
//! Все изменения комнат идут через compare-and-swap по версии документа,
//! после каждого изменения подписчики ленты получают полный список комнат.

pub mod errors;
pub mod room_store;

pub use errors::LedgerError;
pub use room_store::{Ledger, LeaveOutcome, BOT_ROSTER};
