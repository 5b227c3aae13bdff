//! Главный модуль приложения казино-лобби на Linera.
//!
//! Здесь описываем ABI (Operation / Message / Query / Response) и
//! связываем contract/service с нашим LobbyState.

pub mod infra;
pub mod api;
pub mod blackjack;
pub mod config;
pub mod domain;
pub mod engine;
pub mod ledger;
pub mod orchestrator;
pub mod state;
pub mod time_ctrl;

use linera_sdk::linera_base_types::{ContractAbi, ServiceAbi};
use serde::{Deserialize, Serialize};

use crate::api::{Command, Query, QueryResponse};
use crate::domain::UserId;
use crate::state::LobbyState;

/// Операции (внешние команды), которые модуль принимает.
///
/// Одна операция = одна команда из api::Command от имени `actor`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LobbyOperation {
    Command { actor: UserId, command: Command },
}

/// Сообщения между приложениями Linera.
/// Пока нам не нужны – оставим пустой enum.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LobbyMessage {}

/// Запросы к сервису (read-only).
pub type LobbyQuery = Query;

/// Ответы на запросы.
pub type LobbyResponse = QueryResponse;

/// ABI для контракта и сервиса.
#[derive(Clone, Debug)]
pub struct LobbyAbi;

impl ContractAbi for LobbyAbi {
    type Operation = LobbyOperation;
    type Response = ();
}

impl ServiceAbi for LobbyAbi {
    type Query = LobbyQuery;
    type QueryResponse = LobbyResponse;
}

/// Экспортируем типы состояния, чтобы contract.rs и service.rs могли их использовать.
pub type Storage = LobbyState;
