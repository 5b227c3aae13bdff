//! Документное хранилище: коллекции JSON-документов с версиями.
//!
//! Поддерживает то, что лобби требует от внешнего документного стора:
//! чтение по ключу, полную запись, слияние полей, инкремент числового поля,
//! запись по версии и наблюдение за коллекцией.
//! Несколько клиентов (`DocumentLobbyStorage`) могут делить один стор через `Arc`,
//! наблюдатели видят записи любого из них.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{Coins, Room, User};
use crate::infra::feed::{RoomsCallback, SubscriptionId};
use crate::infra::persistence::{LobbyStorage, Revision, StorageError, Versioned, ROOMS, USERS};

/// Токен наблюдателя коллекции.
pub type WatchId = u64;

/// Колбэк наблюдателя: тела всех документов коллекции в порядке создания.
///
/// Вызывается под блокировкой стора и не должен обращаться к нему сам.
pub type WatchCallback = Box<dyn FnMut(&[Value]) + Send>;

struct Watcher {
    collection: &'static str,
    callback: WatchCallback,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("collection", &self.collection)
            .finish()
    }
}

/// Один документ коллекции.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub revision: Revision,
    /// Порядковый номер создания (для стабильного порядка выдачи).
    pub created_seq: u64,
    pub body: Value,
}

/// Коллекции документов, ключ: id сущности.
#[derive(Debug, Default)]
pub struct DocumentStore {
    collections: HashMap<&'static str, HashMap<String, Document>>,
    next_seq: u64,
    watchers: BTreeMap<WatchId, Watcher>,
    next_watch_id: WatchId,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Обёртка для совместного использования несколькими клиентами.
    pub fn shared() -> Arc<Mutex<DocumentStore>> {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn get(&self, collection: &'static str, id: &str) -> Option<&Document> {
        self.collections.get(collection).and_then(|c| c.get(id))
    }

    /// Полная запись документа без проверки версии.
    pub fn set(&mut self, collection: &'static str, id: &str, body: Value) -> Revision {
        let revision = self.write(collection, id, body);
        self.fire(collection);
        revision
    }

    fn write(&mut self, collection: &'static str, id: &str, body: Value) -> Revision {
        let seq = self.next_seq;
        let docs = self.collections.entry(collection).or_default();

        match docs.get_mut(id) {
            Some(doc) => {
                doc.body = body;
                doc.revision += 1;
                doc.revision
            }
            None => {
                docs.insert(
                    id.to_string(),
                    Document {
                        revision: 1,
                        created_seq: seq,
                        body,
                    },
                );
                self.next_seq += 1;
                1
            }
        }
    }

    /// Запись по версии: `expected == 0`: документа ещё не должно быть.
    pub fn set_if(
        &mut self,
        collection: &'static str,
        id: &str,
        body: Value,
        expected: Revision,
    ) -> Result<Revision, StorageError> {
        let actual = self.get(collection, id).map(|d| d.revision).unwrap_or(0);
        if actual != expected {
            return Err(if expected == 0 {
                StorageError::AlreadyExists {
                    collection,
                    id: id.to_string(),
                }
            } else if actual == 0 {
                StorageError::NotFound {
                    collection,
                    id: id.to_string(),
                }
            } else {
                StorageError::Conflict {
                    collection,
                    id: id.to_string(),
                    expected,
                    actual,
                }
            });
        }
        Ok(self.set(collection, id, body))
    }

    /// Удаление по версии.
    pub fn delete_if(&mut self, collection: &'static str, id: &str, expected: Revision) -> Result<(), StorageError> {
        let actual = self
            .get(collection, id)
            .map(|d| d.revision)
            .ok_or_else(|| StorageError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if actual != expected {
            return Err(StorageError::Conflict {
                collection,
                id: id.to_string(),
                expected,
                actual,
            });
        }

        if let Some(docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
        self.fire(collection);
        Ok(())
    }

    /// Перезаписать только переданные поля верхнего уровня, остальные не трогать.
    pub fn merge(&mut self, collection: &'static str, id: &str, fields: Value) -> Result<Revision, StorageError> {
        let doc = self
            .collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StorageError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        let Value::Object(fields) = fields else {
            return Err(StorageError::Serialization(format!(
                "{collection}/{id}: слияние принимает только объект"
            )));
        };
        let Some(body) = doc.body.as_object_mut() else {
            return Err(StorageError::Serialization(format!(
                "{collection}/{id}: документ не объект"
            )));
        };

        body.extend(fields);
        doc.revision += 1;
        let revision = doc.revision;
        self.fire(collection);
        Ok(revision)
    }

    /// Инкремент неотрицательного целого поля. Результат < 0 отклоняется.
    pub fn increment(
        &mut self,
        collection: &'static str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<u64, StorageError> {
        let doc = self
            .collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StorageError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        let current = doc.body.get(field).and_then(Value::as_u64).ok_or_else(|| {
            StorageError::Serialization(format!("{collection}/{id}: поле {field} не число"))
        })?;

        let updated = Coins(current).apply_delta(delta).ok_or(StorageError::Overdraft {
            available: Coins(current),
            requested: delta.unsigned_abs(),
        })?;

        if let Some(obj) = doc.body.as_object_mut() {
            obj.insert(field.to_string(), Value::from(updated.0));
        }
        doc.revision += 1;
        self.fire(collection);
        Ok(updated.0)
    }

    /// Все документы коллекции в порядке создания.
    pub fn list(&self, collection: &'static str) -> Vec<(&String, &Document)> {
        let mut docs: Vec<(&String, &Document)> = self
            .collections
            .get(collection)
            .map(|c| c.iter().collect())
            .unwrap_or_default();
        docs.sort_by_key(|(_, d)| d.created_seq);
        docs
    }

    /// Наблюдать за коллекцией: колбэк сразу получает текущее содержимое
    /// и затем всё содержимое после каждой записи в неё.
    pub fn watch(&mut self, collection: &'static str, mut callback: WatchCallback) -> WatchId {
        self.next_watch_id += 1;
        let id = self.next_watch_id;

        callback(&self.bodies(collection));
        self.watchers.insert(id, Watcher { collection, callback });

        debug!(watch = id, collection, "document store watch registered");
        id
    }

    /// Снять наблюдателя. `false`, если его нет.
    pub fn unwatch(&mut self, id: WatchId) -> bool {
        self.watchers.remove(&id).is_some()
    }

    pub fn watcher_count(&self, collection: &str) -> usize {
        self.watchers
            .values()
            .filter(|w| w.collection == collection)
            .count()
    }

    fn bodies(&self, collection: &'static str) -> Vec<Value> {
        self.list(collection)
            .into_iter()
            .map(|(_, doc)| doc.body.clone())
            .collect()
    }

    fn fire(&mut self, collection: &'static str) {
        if self.watcher_count(collection) == 0 {
            return;
        }
        let bodies = self.bodies(collection);
        for watcher in self.watchers.values_mut() {
            if watcher.collection == collection {
                (watcher.callback)(&bodies);
            }
        }
    }
}

/// Реализация `LobbyStorage` поверх (возможно общего) документного стора.
#[derive(Debug, Clone)]
pub struct DocumentLobbyStorage {
    store: Arc<Mutex<DocumentStore>>,
}

impl DocumentLobbyStorage {
    /// Клиент с собственным пустым стором.
    pub fn new() -> Self {
        Self {
            store: DocumentStore::shared(),
        }
    }

    /// Клиент поверх уже существующего стора.
    pub fn connect(store: Arc<Mutex<DocumentStore>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<Mutex<DocumentStore>> {
        Arc::clone(&self.store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, DocumentStore>, StorageError> {
        self.store.lock().map_err(|err| {
            warn!(error = %err, "document store mutex poisoned");
            StorageError::Unavailable(err.to_string())
        })
    }
}

impl Default for DocumentLobbyStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(value)?)
}

fn decode<T: DeserializeOwned>(body: &Value) -> Result<T, StorageError> {
    Ok(serde_json::from_value(body.clone())?)
}

impl LobbyStorage for DocumentLobbyStorage {
    fn load_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        let store = self.lock()?;
        let user = store.get(USERS, id).map(|doc| decode(&doc.body)).transpose()?;
        Ok(user)
    }

    fn save_user(&mut self, user: &User) -> Result<User, StorageError> {
        let mut body = encode(user)?;
        let mut store = self.lock()?;

        if store.get(USERS, &user.id).is_some() {
            // Баланс меняется только инкрементом.
            if let Some(fields) = body.as_object_mut() {
                fields.remove("coins");
            }
            store.merge(USERS, &user.id, body)?;
        } else {
            store.set(USERS, &user.id, body);
        }

        let doc = store.get(USERS, &user.id).ok_or_else(|| StorageError::NotFound {
            collection: USERS,
            id: user.id.clone(),
        })?;
        decode(&doc.body)
    }

    fn increment_coins(&mut self, id: &str, delta: i64) -> Result<Coins, StorageError> {
        let updated = self.lock()?.increment(USERS, id, "coins", delta)?;
        Ok(Coins(updated))
    }

    fn load_room(&self, id: &str) -> Result<Option<Versioned<Room>>, StorageError> {
        let store = self.lock()?;
        let room = match store.get(ROOMS, id) {
            Some(doc) => Some(Versioned {
                value: decode(&doc.body)?,
                revision: doc.revision,
            }),
            None => None,
        };
        Ok(room)
    }

    fn list_rooms(&self) -> Result<Vec<Room>, StorageError> {
        let store = self.lock()?;
        let rooms = store
            .list(ROOMS)
            .into_iter()
            .map(|(_, doc)| decode(&doc.body))
            .collect::<Result<Vec<Room>, StorageError>>()?;
        Ok(rooms)
    }

    fn insert_room(&mut self, room: &Room) -> Result<Revision, StorageError> {
        let body = encode(room)?;
        self.lock()?.set_if(ROOMS, &room.id, body, 0)
    }

    fn compare_and_swap_room(&mut self, room: &Room, expected: Revision) -> Result<Revision, StorageError> {
        let body = encode(room)?;
        self.lock()?.set_if(ROOMS, &room.id, body, expected)
    }

    fn delete_room(&mut self, id: &str, expected: Revision) -> Result<(), StorageError> {
        self.lock()?.delete_if(ROOMS, id, expected)
    }

    fn supports_watch(&self) -> bool {
        true
    }

    fn watch_rooms(&mut self, mut callback: RoomsCallback) -> Result<SubscriptionId, StorageError> {
        let watch: WatchCallback = Box::new(move |bodies: &[Value]| {
            let rooms: Vec<Room> = bodies
                .iter()
                .filter_map(|body| match decode::<Room>(body) {
                    Ok(room) => Some(room),
                    Err(err) => {
                        warn!(error = %err, "undecodable room document skipped");
                        None
                    }
                })
                .collect();
            callback(&rooms);
        });
        Ok(self.lock()?.watch(ROOMS, watch))
    }

    fn unwatch_rooms(&mut self, id: SubscriptionId) -> Result<bool, StorageError> {
        Ok(self.lock()?.unwatch(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stale_revision_is_rejected() {
        let mut store = DocumentStore::new();
        let rev = store.set_if(ROOMS, "R1", json!({"pot": 100}), 0).unwrap();
        assert_eq!(rev, 1);

        // Второй клиент успел записать раньше.
        store.set_if(ROOMS, "R1", json!({"pot": 200}), 1).unwrap();

        let err = store.set_if(ROOMS, "R1", json!({"pot": 300}), 1).unwrap_err();
        assert!(matches!(err, StorageError::Conflict { expected: 1, actual: 2, .. }));
        assert_eq!(store.get(ROOMS, "R1").unwrap().body, json!({"pot": 200}));
    }

    #[test]
    fn increment_refuses_negative_balance() {
        let mut store = DocumentStore::new();
        store.set(USERS, "u1", json!({"coins": 50}));

        assert_eq!(store.increment(USERS, "u1", "coins", 25).unwrap(), 75);
        let err = store.increment(USERS, "u1", "coins", -100).unwrap_err();
        assert!(matches!(err, StorageError::Overdraft { .. }));
        assert_eq!(store.get(USERS, "u1").unwrap().body["coins"], json!(75));
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut store = DocumentStore::new();
        store.set(USERS, "u1", json!({"name": "A", "coins": 50}));
        store.increment(USERS, "u1", "coins", 10).unwrap();

        let rev = store.merge(USERS, "u1", json!({"name": "B"})).unwrap();
        assert_eq!(rev, 3);
        assert_eq!(store.get(USERS, "u1").unwrap().body, json!({"name": "B", "coins": 60}));
        assert!(matches!(
            store.merge(USERS, "nobody", json!({"name": "C"})),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn watchers_see_every_write_to_their_collection() {
        let mut store = DocumentStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = store.watch(
            ROOMS,
            Box::new(move |bodies: &[Value]| sink.lock().unwrap().push(bodies.len())),
        );

        store.set_if(ROOMS, "R1", json!({"pot": 1}), 0).unwrap();
        store.set(ROOMS, "R2", json!({"pot": 2}));
        store.set(USERS, "u1", json!({"coins": 1}));
        store.delete_if(ROOMS, "R1", 1).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 1]);

        assert!(store.unwatch(id));
        store.set(ROOMS, "R3", json!({"pot": 3}));
        assert_eq!(seen.lock().unwrap().len(), 4);
        assert_eq!(store.watcher_count(ROOMS), 0);
    }
}
