use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Which game the chat is currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Bingo,
    Roulette,
}

/// Opaque handle to the chat message that holds the pinned roster summary.
/// The renderer owns the actual message; the session only remembers it so
/// later registrations can re-render by edit instead of send-and-pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef(pub i64);

/// A durably remembered user with an elevated quota, independent of any
/// specific game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipUser {
    pub user_id: i64,
    pub display_name: String,
}

/// One registered participation in the active game.
///
/// `numbers` is present exactly when the entry was taken during a bingo
/// game: 4 or 5 distinct integers in 1..=100, the count fixed by the
/// registrant's VIP/bonus status at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub user_id: i64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbers: Option<Vec<u8>>,
}

/// The single in-memory record of the currently running (or absent) game.
///
/// Only `vip_users` and `bonus_grants` have durable backing; every other
/// field is ephemeral and reset when a game ends, is reset, or the process
/// restarts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSession {
    pub active_game: Option<GameKind>,
    pub registration_open: bool,
    /// Insertion order is display and draw order.
    pub roster: Vec<Entry>,
    /// Bingo calls so far; append-only while a bingo game is closed for
    /// registration.
    pub drawn_rows: Vec<Vec<u8>>,
    pub pinned_summary: Option<MessageRef>,
    /// Unique by `user_id`; cleared only by explicit VIP removal.
    pub vip_users: Vec<VipUser>,
    /// `user_id -> extra entries` (>= 1); cleared whenever a game ends.
    pub bonus_grants: HashMap<i64, u32>,
    pub started_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs a fresh session from the durably stored VIP and bonus
    /// rows loaded at startup.
    pub fn from_persisted(vip_users: Vec<VipUser>, bonus_grants: HashMap<i64, u32>) -> Self {
        Self {
            vip_users,
            bonus_grants,
            ..Self::default()
        }
    }

    pub fn is_vip(&self, user_id: i64) -> bool {
        self.vip_users.iter().any(|vip| vip.user_id == user_id)
    }

    pub fn bonus_count(&self, user_id: i64) -> u32 {
        self.bonus_grants.get(&user_id).copied().unwrap_or(0)
    }

    /// Number of roster entries the user currently holds.
    pub fn entry_count(&self, user_id: i64) -> u32 {
        self.roster
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .count() as u32
    }

    /// Union of every number called so far in this bingo game.
    pub fn drawn_union(&self) -> BTreeSet<u8> {
        self.drawn_rows.iter().flatten().copied().collect()
    }

    /// Clears everything that belongs to the current round, leaving the
    /// durable VIP set and the bonus grants untouched.
    pub fn clear_round(&mut self) {
        self.active_game = None;
        self.registration_open = false;
        self.roster.clear();
        self.drawn_rows.clear();
        self.pinned_summary = None;
        self.started_at = None;
    }
}
