//! Durable backing for the VIP set and bonus grants.
//!
//! Everything else in a [`lotobot_engine::session::GameSession`] is
//! ephemeral; these two tables are loaded once at startup and rewritten on
//! every VIP/bonus mutation. Save failures never abort an operation: the
//! in-memory state stays authoritative and the next save is the retry.

use lotobot_engine::session::VipUser;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// The durably stored slice of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub vips: Vec<VipUser>,
    pub bonuses: HashMap<i64, u32>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Narrow boundary the session store saves through. Implementations must
/// leave the persisted set equal to what a full rewrite of `state` would
/// produce.
pub trait Persistence: Send + Sync {
    fn load(&self) -> Result<PersistedState, StorageError>;
    fn save(&self, state: &PersistedState) -> Result<(), StorageError>;
}

/// SQLite-backed store over `vip_users` and `bonus_users`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS vip_users (
                user_id INTEGER PRIMARY KEY,
                username TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS bonus_users (
                user_id INTEGER PRIMARY KEY,
                bonus_count INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl Persistence for SqliteStore {
    fn load(&self) -> Result<PersistedState, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;

        let mut stmt = conn.prepare("SELECT user_id, username FROM vip_users")?;
        let vips = stmt
            .query_map([], |row| {
                Ok(VipUser {
                    user_id: row.get(0)?,
                    display_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare("SELECT user_id, bonus_count FROM bonus_users")?;
        let bonuses = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(PersistedState { vips, bonuses })
    }

    // Full delete-then-reinsert of both tables, in one transaction.
    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM vip_users", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO vip_users (user_id, username) VALUES (?1, ?2)")?;
            for vip in &state.vips {
                stmt.execute(params![vip.user_id, vip.display_name])?;
            }
        }

        tx.execute("DELETE FROM bonus_users", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO bonus_users (user_id, bonus_count) VALUES (?1, ?2)")?;
            for (user_id, bonus_count) in &state.bonuses {
                stmt.execute(params![user_id, bonus_count])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vip(user_id: i64, name: &str) -> VipUser {
        VipUser {
            user_id,
            display_name: name.into(),
        }
    }

    #[test]
    fn fresh_store_loads_empty_state() {
        let store = SqliteStore::open_in_memory().expect("open");
        let state = store.load().expect("load");
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn saved_state_round_trips() {
        let store = SqliteStore::open_in_memory().expect("open");
        let state = PersistedState {
            vips: vec![vip(1, "@one"), vip(2, "@two")],
            bonuses: HashMap::from([(3, 1), (4, 2)]),
        };

        store.save(&state).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded.bonuses, state.bonuses);
        let mut vips = loaded.vips;
        vips.sort_by_key(|v| v.user_id);
        assert_eq!(vips, state.vips);
    }

    #[test]
    fn later_save_removes_stale_rows() {
        let store = SqliteStore::open_in_memory().expect("open");
        store
            .save(&PersistedState {
                vips: vec![vip(1, "@one"), vip(2, "@two")],
                bonuses: HashMap::from([(3, 1)]),
            })
            .expect("first save");

        let reduced = PersistedState {
            vips: vec![vip(2, "@two")],
            bonuses: HashMap::new(),
        };
        store.save(&reduced).expect("second save");

        assert_eq!(store.load().expect("load"), reduced);
    }

    #[test]
    fn state_survives_reopening_a_file_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lotobot.db");

        let state = PersistedState {
            vips: vec![vip(5, "@five")],
            bonuses: HashMap::from([(6, 1)]),
        };
        {
            let store = SqliteStore::open(&path).expect("open");
            store.save(&state).expect("save");
        }

        let reopened = SqliteStore::open(&path).expect("reopen");
        assert_eq!(reopened.load().expect("load"), state);
    }
}
