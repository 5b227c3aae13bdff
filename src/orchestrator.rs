//! Оркестратор лобби: команды клиента -> леджер + движок домино.
//!
//! - когда стол домино заполняется, матч стартует сам;
//! - победа выплачивает банк победителю через леджер;
//! - выход игрока из идущего матча выбрасывает матч;
//! - в тренировочных комнатах за ботов ходит `autoplay`.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::api::{
    build_match_view, build_room_view, ApiError, BlackjackCommand, BlackjackViewDto, Command,
    CommandResponse, CreateRoomCommand, Query, QueryResponse, RoomCommand, UpdateProfileCommand,
    UserDto,
};
use crate::blackjack::BlackjackRound;
use crate::domain::{Coins, GameKind, Room, RoomId, RoomStatus, UserId};
use crate::engine::autoplay::choose_action;
use crate::engine::{
    EngineError, MatchAction, MatchActionKind, MatchManager, MatchStatus, MatchSummary,
    RandomSource,
};
use crate::infra::{RoomsCallback, SubscriptionId};
use crate::ledger::{Ledger, LedgerError};
use crate::time_ctrl::{AutoActionDecision, TurnRules};

/// Сервис лобби: один писатель поверх леджера и менеджера матчей.
pub struct LobbyService<R: RandomSource> {
    ledger: Ledger,
    matches: MatchManager,
    /// Тренировочные комнаты живут только здесь.
    practice_rooms: HashMap<RoomId, Room>,
    /// Текущий раунд блэкджека по пользователю.
    blackjack: HashMap<UserId, BlackjackRound>,
    rules: TurnRules,
    rng: R,
    matches_played: u64,
}

impl<R: RandomSource> LobbyService<R> {
    pub fn new(ledger: Ledger, rng: R) -> Self {
        let rules = ledger.config().turn_rules();
        Self {
            ledger,
            matches: MatchManager::new(),
            practice_rooms: HashMap::new(),
            blackjack: HashMap::new(),
            rules,
            rng,
            matches_played: 0,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn matches(&self) -> &MatchManager {
        &self.matches
    }

    pub fn matches_played(&self) -> u64 {
        self.matches_played
    }

    pub fn practice_room(&self, room_id: &str) -> Option<&Room> {
        self.practice_rooms.get(room_id)
    }

    pub fn subscribe(&mut self, callback: RoomsCallback) -> Result<SubscriptionId, ApiError> {
        Ok(self.ledger.subscribe(callback)?)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.ledger.unsubscribe(id)
    }

    /// Выполнить команду от имени `actor`.
    pub fn execute(&mut self, actor: &str, command: Command) -> Result<CommandResponse, ApiError> {
        debug!(actor = %actor, room = ?command.room_id(), "execute command");

        match command {
            Command::SignIn(identity) => {
                if identity.user_id != actor {
                    return Err(ApiError::BadRequest(
                        "identity не совпадает с автором команды".to_string(),
                    ));
                }
                let user = self.ledger.sign_in(&identity)?;
                Ok(CommandResponse::User(UserDto::from(&user)))
            }

            Command::SignOut => {
                self.ledger.sign_out(actor)?;
                self.blackjack.remove(actor);
                Ok(CommandResponse::SignedOut)
            }

            Command::UpdateProfile(UpdateProfileCommand {
                name,
                photo_url,
                avatar_id,
            }) => {
                let user = self.ledger.update_profile(actor, name, photo_url, avatar_id)?;
                Ok(CommandResponse::User(UserDto::from(&user)))
            }

            Command::UpdateCoins { delta } => {
                let balance = self.ledger.update_coins(actor, delta)?;
                Ok(CommandResponse::Balance(balance))
            }

            Command::CreateRoom(CreateRoomCommand {
                game_kind,
                capacity,
                wager,
            }) => {
                let room = self.ledger.create_room(actor, game_kind, capacity, wager)?;
                Ok(CommandResponse::Room(build_room_view(&room, None)))
            }

            Command::CreatePracticeRoom {
                game_kind,
                capacity,
            } => {
                let room = self.ledger.create_practice_room(actor, game_kind, capacity)?;
                let room_id = room.id.clone();
                self.practice_rooms.insert(room_id.clone(), room);
                if self.start_if_ready(&room_id)? {
                    if let MatchStatus::Finished(summary) = self.run_bots(&room_id)? {
                        self.settle(&room_id, &summary)?;
                    }
                }
                let room = self.lookup_room(&room_id)?;
                Ok(CommandResponse::Room(build_room_view(
                    &room,
                    self.matches.get(&room_id),
                )))
            }

            Command::RoomCommand(cmd) => self.execute_room_command(actor, cmd),

            Command::Blackjack(cmd) => self.execute_blackjack(actor, cmd),
        }
    }

    /// Запрос только на чтение.
    pub fn query(&self, query: Query) -> Result<QueryResponse, ApiError> {
        match query {
            Query::ListRooms => {
                let rooms = self
                    .ledger
                    .rooms()?
                    .iter()
                    .map(|room| build_room_view(room, self.matches.get(&room.id)))
                    .collect();
                Ok(QueryResponse::Rooms(rooms))
            }
            Query::GetRoom { room_id } => {
                let room = self.lookup_room(&room_id)?;
                Ok(QueryResponse::Room(build_room_view(
                    &room,
                    self.matches.get(&room_id),
                )))
            }
            Query::GetMatch { room_id, viewer } => {
                let engine = self
                    .matches
                    .get(&room_id)
                    .ok_or_else(|| ApiError::NoActiveMatch(room_id.clone()))?;
                Ok(QueryResponse::Match(build_match_view(
                    engine,
                    viewer.as_deref(),
                )))
            }
            Query::GetUser { user_id } => {
                let user = self.ledger.user(&user_id)?;
                Ok(QueryResponse::User(user.as_ref().map(UserDto::from)))
            }
        }
    }

    fn execute_room_command(&mut self, actor: &str, cmd: RoomCommand) -> Result<CommandResponse, ApiError> {
        self.ledger.current_user(actor)?;
        self.prune_finished_matches();

        match cmd {
            RoomCommand::Join {
                room_id,
                as_spectator,
            } => {
                let room = self.ledger.join_room(actor, &room_id, as_spectator)?;
                self.start_if_ready(&room.id)?;
                Ok(CommandResponse::Room(build_room_view(
                    &room,
                    self.matches.get(&room.id),
                )))
            }

            RoomCommand::Leave { room_id } => {
                if let Some(room) = self.practice_rooms.get(&room_id) {
                    if !room.has_player(actor) {
                        return Err(ApiError::NotInRoom {
                            room_id,
                            user_id: actor.to_string(),
                        });
                    }
                    self.practice_rooms.remove(&room_id);
                    self.matches.abort(&room_id);
                    info!(room = %room_id, "practice room closed");
                    return Ok(CommandResponse::Left {
                        room: None,
                        refunded: Coins::ZERO,
                        forfeited: false,
                    });
                }

                let outcome = self.ledger.leave_room(actor, &room_id)?;
                let keep_match = outcome
                    .room
                    .as_ref()
                    .map(|r| r.status == RoomStatus::Finished)
                    .unwrap_or(false);
                if !keep_match && self.matches.abort(&room_id).is_some() {
                    info!(room = %room_id, user = %actor, "match aborted after player left");
                }

                Ok(CommandResponse::Left {
                    room: outcome
                        .room
                        .as_ref()
                        .map(|r| build_room_view(r, self.matches.get(&r.id))),
                    refunded: outcome.refunded,
                    forfeited: outcome.forfeited,
                })
            }

            // Нужен, когда стол заполнился через другого клиента общего стора
            // или сервис поднят заново поверх уже идущей комнаты.
            RoomCommand::StartMatch { room_id } => {
                let room = self.lookup_room(&room_id)?;
                if !room.has_player(actor) {
                    return Err(ApiError::NotInRoom {
                        room_id,
                        user_id: actor.to_string(),
                    });
                }
                match room.status {
                    RoomStatus::Finished => return Err(ApiError::RoomClosed(room_id)),
                    RoomStatus::Waiting => {
                        return Err(ApiError::BadRequest(format!(
                            "комната {room_id} ещё не заполнена"
                        )))
                    }
                    RoomStatus::Playing => {}
                }
                if room.game_kind != GameKind::Dominoes {
                    return Err(ApiError::BadRequest(format!(
                        "матчи {} не поддерживаются",
                        room.game_kind.label()
                    )));
                }

                self.matches
                    .start_match(room.id.clone(), room.player_ids(), self.rules, &mut self.rng)?;
                let status = self.run_bots(&room_id)?;
                self.respond(actor, &room_id, status, AutoActionDecision::None)
            }

            RoomCommand::Play { room_id, action } => {
                self.lookup_room(&room_id)?;
                let status = self
                    .matches
                    .apply_action(&room_id, MatchAction::new(actor, action))?;
                let status = match status {
                    MatchStatus::Ongoing => self.run_bots(&room_id)?,
                    finished => finished,
                };
                self.respond(actor, &room_id, status, AutoActionDecision::None)
            }

            RoomCommand::Tick {
                room_id,
                delta_secs,
            } => {
                let engine = self
                    .matches
                    .get(&room_id)
                    .ok_or_else(|| ApiError::NoActiveMatch(room_id.clone()))?;
                if engine.seat_of(actor).is_none() {
                    return Err(ApiError::NotInRoom {
                        room_id,
                        user_id: actor.to_string(),
                    });
                }
                if engine.is_finished() {
                    return Err(EngineError::MatchFinished.into());
                }

                let outcome = self.matches.tick(&room_id, delta_secs)?;
                let status = match outcome.status {
                    MatchStatus::Ongoing => self.run_bots(&room_id)?,
                    finished => finished,
                };
                self.respond(actor, &room_id, status, outcome.decision)
            }
        }
    }

    fn execute_blackjack(&mut self, actor: &str, cmd: BlackjackCommand) -> Result<CommandResponse, ApiError> {
        self.ledger.current_user(actor)?;

        if cmd == BlackjackCommand::Deal {
            let round = BlackjackRound::deal(&mut self.rng);
            let view = BlackjackViewDto::from(&round);
            self.blackjack.insert(actor.to_string(), round);
            return Ok(CommandResponse::Blackjack(view));
        }

        let round = self
            .blackjack
            .get_mut(actor)
            .ok_or_else(|| ApiError::BadRequest("нет активного раунда".to_string()))?;
        match cmd {
            BlackjackCommand::Hit => {
                round.hit(&mut self.rng)?;
            }
            BlackjackCommand::Stand => {
                round.stand(&mut self.rng)?;
            }
            BlackjackCommand::Deal => {}
        }

        Ok(CommandResponse::Blackjack(BlackjackViewDto::from(&*round)))
    }

    fn lookup_room(&self, room_id: &str) -> Result<Room, ApiError> {
        match self.practice_rooms.get(room_id) {
            Some(room) => Ok(room.clone()),
            None => Ok(self.ledger.room(room_id)?),
        }
    }

    /// Стол домино заполнен, а матча нет: стартуем. `true`, если матч запущен.
    ///
    /// «Рыба» прямо на раздаче сразу рассчитывается.
    fn start_if_ready(&mut self, room_id: &str) -> Result<bool, ApiError> {
        let room = self.lookup_room(room_id)?;
        if room.game_kind != GameKind::Dominoes
            || room.status != RoomStatus::Playing
            || self.matches.has_active_match(room_id)
        {
            return Ok(false);
        }

        let engine = self
            .matches
            .start_match(room.id.clone(), room.player_ids(), self.rules, &mut self.rng)?;
        info!(room = %room_id, match_id = engine.match_id, "match auto-started");

        if let Some(summary) = engine.summary() {
            self.settle(room_id, &summary)?;
        }
        Ok(true)
    }

    /// Ходить за ботов, пока очередь не дойдёт до человека или матч не кончится.
    fn run_bots(&mut self, room_id: &str) -> Result<MatchStatus, ApiError> {
        loop {
            let engine = self
                .matches
                .get(room_id)
                .ok_or_else(|| ApiError::NoActiveMatch(room_id.to_string()))?;
            if let Some(summary) = engine.summary() {
                return Ok(MatchStatus::Finished(summary));
            }

            let current = engine.current_player().clone();
            if !self.is_bot(room_id, &current) {
                return Ok(MatchStatus::Ongoing);
            }

            let kind: MatchActionKind = choose_action(engine, engine.turn);
            debug!(room = %room_id, bot = %current, action = ?kind, "bot move");
            self.matches
                .apply_action(room_id, MatchAction::new(current, kind))?;
        }
    }

    /// Выбросить завершённые матчи, чьих комнат больше нет
    /// (удалены здесь или другим клиентом общего стора).
    fn prune_finished_matches(&mut self) -> usize {
        let practice = &self.practice_rooms;
        let ledger = &self.ledger;
        let pruned = self.matches.prune_finished(|room_id| {
            practice.contains_key(room_id)
                || !matches!(ledger.room(room_id), Err(LedgerError::RoomNotFound(_)))
        });
        if pruned > 0 {
            debug!(pruned, "finished matches pruned");
        }
        pruned
    }

    fn is_bot(&self, room_id: &str, user_id: &str) -> bool {
        self.practice_rooms
            .get(room_id)
            .map(|room| room.players.iter().any(|m| m.is_bot && m.user_id == user_id))
            .unwrap_or(false)
    }

    fn respond(
        &mut self,
        actor: &str,
        room_id: &str,
        status: MatchStatus,
        timer: AutoActionDecision,
    ) -> Result<CommandResponse, ApiError> {
        match status {
            MatchStatus::Ongoing => {
                let engine = self
                    .matches
                    .get(room_id)
                    .ok_or_else(|| ApiError::NoActiveMatch(room_id.to_string()))?;
                Ok(CommandResponse::Match {
                    view: build_match_view(engine, Some(actor)),
                    timer,
                })
            }
            MatchStatus::Finished(summary) => {
                let payout = self.settle(room_id, &summary)?;
                let room = self.lookup_room(room_id)?;
                Ok(CommandResponse::MatchFinished {
                    room: build_room_view(&room, self.matches.get(room_id)),
                    summary,
                    payout,
                })
            }
        }
    }

    /// Выплатить банк победителю и закрыть комнату.
    fn settle(&mut self, room_id: &str, summary: &MatchSummary) -> Result<Coins, ApiError> {
        let payout = match self.practice_rooms.get_mut(room_id) {
            Some(room) => {
                room.status = RoomStatus::Finished;
                Coins::ZERO
            }
            None => self.ledger.settle_pot(room_id, &summary.winner)?,
        };
        self.matches_played += 1;

        info!(
            room = %room_id,
            winner = %summary.winner,
            reason = ?summary.reason,
            payout = %payout,
            "match settled"
        );
        Ok(payout)
    }
}
