// src/ledger/room_store.rs

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::{build_storage, LobbyConfig};
use crate::domain::{
    generated_avatar_url, Coins, GameKind, Identity, Member, Presence, Room, RoomId, RoomStatus,
    User, UserId,
};
use crate::infra::{IdGenerator, LobbyStorage, RoomFeed, RoomsCallback, SubscriptionId};
use crate::ledger::errors::LedgerError;

/// Боты тренировочных комнат: (id, имя).
pub const BOT_ROSTER: [(&str, &str); 5] = [
    ("bot_kael", "Kael"),
    ("bot_lina", "Lina"),
    ("bot_zoro", "Zoro"),
    ("bot_miku", "Miku"),
    ("bot_jin", "Jin"),
];

/// Сколько раз пробуем сгенерировать свободный id комнаты.
const ROOM_ID_ATTEMPTS: usize = 16;

/// Итог выхода из комнаты.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Комната после выхода; `None`, если она опустела и удалена.
    pub room: Option<Room>,
    /// Сколько монет вернули ушедшему (ставка в ожидающей комнате).
    pub refunded: Coins,
    /// Игрок ушёл из идущего матча, ставка осталась в банке.
    pub forfeited: bool,
}

/// Леджер лобби.
///
/// Единственный писатель: каждое изменение комнаты делается как
/// read-modify-CAS по версии, списания и зачисления идут через атомарный
/// инкремент баланса в сторе.
pub struct Ledger {
    storage: Box<dyn LobbyStorage>,
    config: LobbyConfig,
    ids: IdGenerator,
    /// Пользователи с активной сессией.
    sessions: HashSet<UserId>,
    feed: RoomFeed,
    /// Подписки, которые ведёт сам стор.
    watches: HashSet<SubscriptionId>,
}

impl Ledger {
    pub fn new(storage: Box<dyn LobbyStorage>, config: LobbyConfig, ids: IdGenerator) -> Self {
        Self {
            storage,
            config,
            ids,
            sessions: HashSet::new(),
            feed: RoomFeed::new(),
            watches: HashSet::new(),
        }
    }

    /// Собрать леджер целиком из конфига: стор и генератор id.
    pub fn from_config(config: LobbyConfig) -> Self {
        let storage = build_storage(&config);
        let ids = match config.rng_seed {
            Some(seed) => IdGenerator::seeded(seed, config.room_id_len),
            None => IdGenerator::from_entropy(config.room_id_len),
        };
        Self::new(storage, config, ids)
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Сессии и профили
    // ---------------------------------------------------------------------

    /// Вход: при первом входе создаём профиль со стартовым балансом,
    /// при повторном просто помечаем online.
    pub fn sign_in(&mut self, identity: &Identity) -> Result<User, LedgerError> {
        let user = match self.storage.load_user(&identity.user_id)? {
            Some(mut existing) => {
                existing.presence = Presence::Online;
                existing
            }
            None => {
                let created = User::from_identity(
                    identity,
                    self.config.starting_level,
                    self.config.starting_coins,
                );
                info!(user = %created.id, coins = %created.coins, "new user profile created");
                created
            }
        };

        let user = self.storage.save_user(&user)?;
        self.sessions.insert(user.id.clone());
        debug!(user = %user.id, "signed in");
        Ok(user)
    }

    pub fn sign_out(&mut self, user_id: &str) -> Result<(), LedgerError> {
        if !self.sessions.remove(user_id) {
            return Err(LedgerError::AuthRequired);
        }
        if let Some(mut user) = self.storage.load_user(user_id)? {
            user.presence = Presence::Offline;
            self.storage.save_user(&user)?;
        }
        debug!(user = %user_id, "signed out");
        Ok(())
    }

    pub fn is_signed_in(&self, user_id: &str) -> bool {
        self.sessions.contains(user_id)
    }

    /// Профиль пользователя с активной сессией.
    pub fn current_user(&self, user_id: &str) -> Result<User, LedgerError> {
        if !self.sessions.contains(user_id) {
            return Err(LedgerError::AuthRequired);
        }
        self.storage
            .load_user(user_id)?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))
    }

    pub fn user(&self, user_id: &str) -> Result<Option<User>, LedgerError> {
        Ok(self.storage.load_user(user_id)?)
    }

    /// Обновить отображаемые поля профиля. `None` = не трогать поле.
    pub fn update_profile(
        &mut self,
        user_id: &str,
        name: Option<String>,
        photo_url: Option<String>,
        avatar_id: Option<String>,
    ) -> Result<User, LedgerError> {
        let mut user = self.current_user(user_id)?;

        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            user.name = name;
        }
        if let Some(photo_url) = photo_url {
            user.photo_url = if photo_url.is_empty() {
                generated_avatar_url(&user.id)
            } else {
                photo_url
            };
        }
        if avatar_id.is_some() {
            user.avatar_id = avatar_id;
        }

        Ok(self.storage.save_user(&user)?)
    }

    /// Атомарно изменить баланс на `delta`. Уход в минус отклоняется.
    pub fn update_coins(&mut self, user_id: &str, delta: i64) -> Result<Coins, LedgerError> {
        self.current_user(user_id)?;
        let balance = self.storage.increment_coins(user_id, delta)?;
        debug!(user = %user_id, delta, balance = %balance, "coins updated");
        Ok(balance)
    }

    // ---------------------------------------------------------------------
    // Комнаты
    // ---------------------------------------------------------------------

    pub fn rooms(&self) -> Result<Vec<Room>, LedgerError> {
        Ok(self.storage.list_rooms()?)
    }

    pub fn room(&self, room_id: &str) -> Result<Room, LedgerError> {
        self.storage
            .load_room(room_id)?
            .map(|versioned| versioned.value)
            .ok_or_else(|| LedgerError::RoomNotFound(room_id.to_string()))
    }

    /// Создать комнату: создатель занимает первое место, его ставка уходит в банк.
    pub fn create_room(
        &mut self,
        user_id: &str,
        game_kind: GameKind,
        capacity: u8,
        wager: Coins,
    ) -> Result<Room, LedgerError> {
        let user = self.current_user(user_id)?;
        check_capacity(game_kind, capacity)?;
        check_funds(&user, wager)?;

        let room_id = self.free_room_id()?;
        let room = Room::new(room_id, Member::from_user(&user), game_kind, capacity, wager);

        self.debit(user_id, wager)?;
        if let Err(err) = self.storage.insert_room(&room) {
            warn!(room = %room.id, error = %err, "room insert failed, refunding wager");
            self.credit(user_id, wager)?;
            return Err(err.into());
        }

        info!(
            room = %room.id,
            creator = %user_id,
            kind = ?game_kind,
            capacity,
            bet = %wager,
            "room created"
        );
        self.notify()?;
        Ok(room)
    }

    /// Тренировочная комната против ботов: без ставки, сразу полная,
    /// в стор и ленту не попадает.
    pub fn create_practice_room(
        &mut self,
        user_id: &str,
        game_kind: GameKind,
        capacity: u8,
    ) -> Result<Room, LedgerError> {
        let user = self.current_user(user_id)?;
        check_capacity(game_kind, capacity)?;

        let room_id = self.ids.next_practice_room_id();
        let mut room = Room::new(room_id, Member::from_user(&user), game_kind, capacity, Coins::ZERO);
        room.practice = true;

        for (bot_id, bot_name) in BOT_ROSTER.iter().take(capacity as usize - 1) {
            room.players.push(Member::bot(
                bot_id.to_string(),
                bot_name.to_string(),
                generated_avatar_url(bot_id),
            ));
        }
        room.status = RoomStatus::Playing;

        info!(room = %room.id, user = %user_id, bots = room.players.len() - 1, "practice room created");
        Ok(room)
    }

    /// Войти в комнату игроком (со ставкой) или зрителем.
    pub fn join_room(
        &mut self,
        user_id: &str,
        room_id: &str,
        as_spectator: bool,
    ) -> Result<Room, LedgerError> {
        let user = self.current_user(user_id)?;
        let versioned = self
            .storage
            .load_room(room_id)?
            .ok_or_else(|| LedgerError::RoomNotFound(room_id.to_string()))?;
        let revision = versioned.revision;
        let mut room = versioned.value;

        if as_spectator {
            if !room.has_player(user_id) && !room.has_spectator(user_id) {
                room.spectators.push(Member::from_user(&user));
                self.storage.compare_and_swap_room(&room, revision)?;
                debug!(room = %room.id, user = %user_id, "spectator joined");
            }
            self.notify()?;
            return Ok(room);
        }

        if room.has_player(user_id) {
            self.notify()?;
            return Ok(room);
        }
        if room.status == RoomStatus::Finished {
            return Err(LedgerError::RoomClosed(room.id));
        }
        if room.is_full() {
            return Err(LedgerError::CapacityExceeded(room.id));
        }
        check_funds(&user, room.bet)?;

        self.debit(user_id, room.bet)?;

        room.spectators.retain(|s| s.user_id != user_id);
        room.players.push(Member::from_user(&user));
        room.pot += room.bet;
        if room.is_full() {
            room.status = RoomStatus::Playing;
        }

        if let Err(err) = self.storage.compare_and_swap_room(&room, revision) {
            warn!(room = %room.id, user = %user_id, error = %err, "join lost the race, refunding wager");
            self.credit(user_id, room.bet)?;
            return Err(err.into());
        }

        info!(
            room = %room.id,
            user = %user_id,
            players = room.player_count(),
            pot = %room.pot,
            status = ?room.status,
            "player joined"
        );
        self.notify()?;
        Ok(room)
    }

    /// Выйти из комнаты.
    ///
    /// Из ожидающей комнаты ставка возвращается, из идущего матча сгорает в
    /// банке. Опустевшая комната удаляется вместе с банком.
    pub fn leave_room(&mut self, user_id: &str, room_id: &str) -> Result<LeaveOutcome, LedgerError> {
        self.current_user(user_id)?;
        let versioned = self
            .storage
            .load_room(room_id)?
            .ok_or_else(|| LedgerError::RoomNotFound(room_id.to_string()))?;
        let revision = versioned.revision;
        let mut room = versioned.value;

        if !room.has_player(user_id) && !room.has_spectator(user_id) {
            return Err(LedgerError::NotInRoom {
                room: room.id,
                user: user_id.to_string(),
            });
        }

        let was_player = room.remove_member(user_id);
        let status_before = room.status;
        let mut refunded = Coins::ZERO;
        let mut forfeited = false;

        if was_player {
            match status_before {
                RoomStatus::Waiting => {
                    refunded = room.bet;
                    room.pot -= room.bet;
                }
                RoomStatus::Playing => {
                    forfeited = true;
                    room.forfeited += room.bet;
                    room.status = RoomStatus::Waiting;
                }
                RoomStatus::Finished => {}
            }
        }

        let remaining = if room.is_empty() {
            self.storage.delete_room(&room.id, revision)?;
            if !room.pot.is_zero() {
                warn!(room = %room.id, pot = %room.pot, "empty room destroyed with coins in pot");
            }
            info!(room = %room.id, "room destroyed");
            None
        } else {
            self.storage.compare_and_swap_room(&room, revision)?;
            Some(room)
        };

        if !refunded.is_zero() {
            self.credit(user_id, refunded)?;
        }

        debug!(
            room = %room_id,
            user = %user_id,
            was_player,
            refunded = %refunded,
            forfeited,
            "member left"
        );
        self.notify()?;
        Ok(LeaveOutcome {
            room: remaining,
            refunded,
            forfeited,
        })
    }

    /// Выплатить банк победителю и закрыть комнату.
    pub fn settle_pot(&mut self, room_id: &str, winner_id: &str) -> Result<Coins, LedgerError> {
        let versioned = self
            .storage
            .load_room(room_id)?
            .ok_or_else(|| LedgerError::RoomNotFound(room_id.to_string()))?;
        let revision = versioned.revision;
        let mut room = versioned.value;

        if room.status == RoomStatus::Finished {
            return Err(LedgerError::RoomClosed(room.id));
        }
        if !room.has_player(winner_id) {
            return Err(LedgerError::NotInRoom {
                room: room.id,
                user: winner_id.to_string(),
            });
        }

        let payout = room.pot;
        room.pot = Coins::ZERO;
        room.forfeited = Coins::ZERO;
        room.status = RoomStatus::Finished;
        self.storage.compare_and_swap_room(&room, revision)?;

        if !payout.is_zero() {
            self.credit(winner_id, payout)?;
        }

        info!(room = %room.id, winner = %winner_id, payout = %payout, "pot settled");
        self.notify()?;
        Ok(payout)
    }

    // ---------------------------------------------------------------------
    // Лента
    // ---------------------------------------------------------------------

    /// Подписаться на ленту комнат.
    ///
    /// Если стор умеет наблюдение, подписка регистрируется в нём и видит
    /// записи всех клиентов этого стора; иначе ленту ведёт сам леджер.
    pub fn subscribe(&mut self, callback: RoomsCallback) -> Result<SubscriptionId, LedgerError> {
        if self.storage.supports_watch() {
            let id = self.storage.watch_rooms(callback)?;
            self.watches.insert(id);
            return Ok(id);
        }
        let rooms = self.storage.list_rooms()?;
        Ok(self.feed.subscribe(callback, &rooms))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.watches.remove(&id) {
            return match self.storage.unwatch_rooms(id) {
                Ok(removed) => removed,
                Err(err) => {
                    warn!(subscription = id, error = %err, "failed to drop store watch");
                    false
                }
            };
        }
        self.feed.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.len() + self.watches.len()
    }

    /// Разослать снимок локальным подписчикам. Наблюдатели стора уже
    /// получили его при записи.
    fn notify(&mut self) -> Result<(), LedgerError> {
        if self.feed.is_empty() {
            return Ok(());
        }
        let rooms = self.storage.list_rooms()?;
        self.feed.broadcast(&rooms);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Деньги
    // ---------------------------------------------------------------------

    fn debit(&mut self, user_id: &str, amount: Coins) -> Result<Coins, LedgerError> {
        if amount.is_zero() {
            return self.balance_of(user_id);
        }
        let delta = to_delta(amount)?;
        Ok(self.storage.increment_coins(user_id, -delta)?)
    }

    fn credit(&mut self, user_id: &str, amount: Coins) -> Result<Coins, LedgerError> {
        let delta = to_delta(amount)?;
        Ok(self.storage.increment_coins(user_id, delta)?)
    }

    fn balance_of(&self, user_id: &str) -> Result<Coins, LedgerError> {
        self.storage
            .load_user(user_id)?
            .map(|u| u.coins)
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))
    }

    fn free_room_id(&mut self) -> Result<RoomId, LedgerError> {
        for _ in 0..ROOM_ID_ATTEMPTS {
            let candidate = self.ids.next_room_id();
            if self.storage.load_room(&candidate)?.is_none() {
                return Ok(candidate);
            }
            debug!(room = %candidate, "room id collision, retrying");
        }
        Err(LedgerError::Storage(crate::infra::StorageError::Unavailable(
            "не удалось подобрать свободный id комнаты".to_string(),
        )))
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .field("feed", &self.feed)
            .field("watches", &self.watches.len())
            .finish()
    }
}

fn check_capacity(game_kind: GameKind, capacity: u8) -> Result<(), LedgerError> {
    if capacity < 2 || capacity > game_kind.max_players() {
        return Err(LedgerError::InvalidCapacity {
            kind: game_kind,
            capacity,
        });
    }
    Ok(())
}

fn check_funds(user: &User, required: Coins) -> Result<(), LedgerError> {
    if user.coins < required {
        return Err(LedgerError::InsufficientFunds {
            required,
            available: user.coins,
        });
    }
    Ok(())
}

fn to_delta(amount: Coins) -> Result<i64, LedgerError> {
    i64::try_from(amount.0).map_err(|_| LedgerError::InsufficientFunds {
        required: amount,
        available: Coins::ZERO,
    })
}
