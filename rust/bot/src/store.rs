//! Atomic operations over the single shared [`GameSession`].
//!
//! Many chat members race to mutate one session; every operation here runs
//! its whole read-decide-write sequence under one exclusive critical
//! section, so no interleaving can observe or produce a half-applied
//! transition. Durable writes for VIP/bonus changes happen after the
//! in-memory mutation, outside the lock.

use crate::events::{EntryVerdict, GameSnapshot, SessionEvent};
use crate::storage::{PersistedState, Persistence};
use chrono::Utc;
use lotobot_engine::draw::Drum;
use lotobot_engine::errors::GameError;
use lotobot_engine::rules::{self, RegistrationRequest};
use lotobot_engine::session::{Entry, GameKind, GameSession, MessageRef, VipUser};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Session lock poisoned")]
    Poisoned,
}

/// Owns the session, the RNG drum, and the save-through persistence hook.
pub struct SessionStore {
    session: RwLock<GameSession>,
    drum: Mutex<Drum>,
    persistence: Option<Arc<dyn Persistence>>,
}

impl SessionStore {
    /// Store with no durable backing (tests, dry runs).
    pub fn new(drum: Drum) -> Self {
        Self {
            session: RwLock::new(GameSession::new()),
            drum: Mutex::new(drum),
            persistence: None,
        }
    }

    /// Store that loads the persisted VIP/bonus rows at startup and saves
    /// through on every VIP/bonus mutation. A failed load starts empty:
    /// the bot must come up even when the database is unreachable.
    pub fn with_persistence(drum: Drum, persistence: Arc<dyn Persistence>) -> Self {
        let session = match persistence.load() {
            Ok(state) => {
                tracing::info!(
                    vips = state.vips.len(),
                    bonuses = state.bonuses.len(),
                    "loaded persisted privileges"
                );
                GameSession::from_persisted(state.vips, state.bonuses)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load persisted privileges, starting empty");
                GameSession::new()
            }
        };
        Self {
            session: RwLock::new(session),
            drum: Mutex::new(drum),
            persistence: Some(persistence),
        }
    }

    pub fn start_game(
        &self,
        requester_is_admin: bool,
        kind: GameKind,
    ) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let mut session = self.write()?;
        if session.active_game.is_some() {
            return Err(GameError::GameAlreadyActive.into());
        }
        session.clear_round();
        session.active_game = Some(kind);
        session.registration_open = true;
        session.started_at = Some(Utc::now());
        tracing::info!(kind = ?kind, "game started, registration open");
        Ok(SessionEvent::GameStarted {
            snapshot: snapshot(&session),
        })
    }

    pub fn close_registration(&self, requester_is_admin: bool) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let mut session = self.write()?;
        if !session.registration_open {
            return Err(GameError::NoOpenRegistration.into());
        }
        let kind = session.active_game.ok_or(GameError::NoOpenRegistration)?;
        session.registration_open = false;
        tracing::info!(participants = session.roster.len(), "registration closed");
        Ok(SessionEvent::RegistrationClosed {
            kind,
            participants: session.roster.len(),
        })
    }

    /// Registers one entry for `user_id`. A registration while no window
    /// is open is silently ignored (`Ok(None)`), not an error: stray `+`
    /// messages between games are chat noise, not commands.
    pub fn register(
        &self,
        user_id: i64,
        display_name: &str,
        request: RegistrationRequest,
    ) -> Result<Option<SessionEvent>, StoreError> {
        let mut session = self.write()?;
        if !session.registration_open {
            return Ok(None);
        }
        let kind = match session.active_game {
            Some(kind) => kind,
            None => return Ok(None),
        };

        let max = rules::quota(&session, user_id);
        if session.entry_count(user_id) >= max {
            return Err(GameError::QuotaExceeded { max }.into());
        }

        let numbers = match kind {
            GameKind::Bingo => {
                let required = rules::required_card_len(&session, user_id);
                Some(rules::parse_card(&request.card_tokens, required).map_err(GameError::from)?)
            }
            // Roulette entries carry no card; trailing payload is ignored.
            GameKind::Roulette => None,
        };

        let entry = Entry {
            user_id,
            display_name: request.handle.unwrap_or_else(|| display_name.to_string()),
            numbers,
        };
        session.roster.push(entry.clone());
        tracing::debug!(
            user_id,
            entries = session.entry_count(user_id),
            max,
            "entry registered"
        );
        Ok(Some(SessionEvent::PlayerRegistered {
            entry,
            snapshot: snapshot(&session),
        }))
    }

    /// `/stop`: ends the game and clears the per-game bonus grants. The
    /// VIP set survives; the emptied bonus table is saved through.
    pub fn end_game(&self, requester_is_admin: bool) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let (kind, persisted) = {
            let mut session = self.write()?;
            let kind = session.active_game.ok_or(GameError::NoActiveGame)?;
            session.clear_round();
            session.bonus_grants.clear();
            (kind, persisted_slice(&session))
        };
        self.save_through(&persisted);
        tracing::info!(kind = ?kind, "game ended");
        Ok(SessionEvent::GameEnded { kind })
    }

    /// `/reset`: wipes the round unconditionally but keeps the bonus
    /// grants, so an aborted game can be restarted without re-granting.
    pub fn reset_game(&self, requester_is_admin: bool) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let mut session = self.write()?;
        session.clear_round();
        tracing::info!("session reset");
        Ok(SessionEvent::GameReset)
    }

    pub fn draw_bingo_rows(
        &self,
        requester_is_admin: bool,
        row_count: usize,
    ) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let mut session = self.write()?;
        if session.active_game != Some(GameKind::Bingo) || session.registration_open {
            return Err(GameError::WrongPhase.into());
        }
        let new_rows = self
            .drum
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .bingo_rows(row_count);
        session.drawn_rows.extend(new_rows.iter().cloned());
        tracing::info!(
            rows = new_rows.len(),
            total = session.drawn_rows.len(),
            "bingo rows drawn"
        );
        Ok(SessionEvent::RowsDrawn {
            new_rows,
            history: session.drawn_rows.clone(),
        })
    }

    /// Checks every entry the claimant holds against the union of all
    /// drawn rows. The verdicts go back to the chat for the admin to
    /// confirm; nothing is decided here.
    pub fn claim_bingo(&self, user_id: i64) -> Result<SessionEvent, StoreError> {
        let session = self.read()?;
        if session.active_game != Some(GameKind::Bingo) || session.registration_open {
            return Err(GameError::WrongPhase.into());
        }
        let drawn = session.drawn_union();
        let verdicts: Vec<EntryVerdict> = session
            .roster
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| {
                let numbers = entry.numbers.clone().unwrap_or_default();
                let win = match &entry.numbers {
                    Some(numbers) => rules::card_wins(numbers, &drawn),
                    None => false,
                };
                EntryVerdict { numbers, win }
            })
            .collect();
        if verdicts.is_empty() {
            return Err(GameError::NotRegistered.into());
        }
        Ok(SessionEvent::BingoVerdicts { user_id, verdicts })
    }

    /// Draws the roulette winner. The admin declares the participant
    /// count out loud; the store verifies it against the roster before
    /// drawing so a stale count never silently skews the odds.
    pub fn draw_roulette(
        &self,
        requester_is_admin: bool,
        expected_count: usize,
    ) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let session = self.read()?;
        if session.active_game != Some(GameKind::Roulette) || session.registration_open {
            return Err(GameError::WrongPhase.into());
        }
        let actual = session.roster.len();
        if expected_count != actual || actual == 0 {
            return Err(GameError::CountMismatch {
                expected: expected_count,
                actual,
            }
            .into());
        }
        let index = self
            .drum
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .roulette_index(expected_count);
        tracing::info!(index, participants = expected_count, "roulette drawn");
        Ok(SessionEvent::RouletteWinner {
            index,
            participants: expected_count,
        })
    }

    pub fn set_vip(
        &self,
        requester_is_admin: bool,
        target_user_id: i64,
        target_display_name: &str,
    ) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let (user, persisted) = {
            let mut session = self.write()?;
            if session.is_vip(target_user_id) {
                return Err(GameError::AlreadyVip.into());
            }
            let user = VipUser {
                user_id: target_user_id,
                display_name: target_display_name.to_string(),
            };
            session.vip_users.push(user.clone());
            (user, persisted_slice(&session))
        };
        self.save_through(&persisted);
        tracing::info!(user_id = target_user_id, "vip granted");
        Ok(SessionEvent::VipGranted { user })
    }

    pub fn unset_vip(
        &self,
        requester_is_admin: bool,
        target_user_id: i64,
    ) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let persisted = {
            let mut session = self.write()?;
            if !session.is_vip(target_user_id) {
                return Err(GameError::NotVip.into());
            }
            session.vip_users.retain(|vip| vip.user_id != target_user_id);
            persisted_slice(&session)
        };
        self.save_through(&persisted);
        tracing::info!(user_id = target_user_id, "vip revoked");
        Ok(SessionEvent::VipRevoked {
            user_id: target_user_id,
        })
    }

    /// Grants a one-game bonus: one extra entry and the short card. VIPs
    /// already hold the higher quota and cannot stack a bonus on top.
    pub fn grant_bonus(
        &self,
        requester_is_admin: bool,
        target_user_id: i64,
    ) -> Result<SessionEvent, StoreError> {
        if !requester_is_admin {
            return Err(GameError::Unauthorized.into());
        }
        let (extra_entries, persisted) = {
            let mut session = self.write()?;
            if session.is_vip(target_user_id) {
                return Err(GameError::AlreadyVip.into());
            }
            if session.bonus_grants.contains_key(&target_user_id) {
                return Err(GameError::AlreadyBonused.into());
            }
            session.bonus_grants.insert(target_user_id, 1);
            (1, persisted_slice(&session))
        };
        self.save_through(&persisted);
        tracing::info!(user_id = target_user_id, "bonus granted");
        Ok(SessionEvent::BonusGranted {
            user_id: target_user_id,
            extra_entries,
        })
    }

    pub fn list_vips(&self) -> Result<SessionEvent, StoreError> {
        let session = self.read()?;
        Ok(SessionEvent::VipList {
            vips: session.vip_users.clone(),
        })
    }

    /// Read-only quota introspection.
    pub fn quota_of(&self, user_id: i64) -> Result<u32, StoreError> {
        let session = self.read()?;
        Ok(rules::quota(&session, user_id))
    }

    /// The renderer reports the summary message it pinned so subsequent
    /// registrations re-render by edit. Cleared with the round.
    pub fn record_pinned_summary(&self, handle: MessageRef) -> Result<SessionEvent, StoreError> {
        let mut session = self.write()?;
        session.pinned_summary = Some(handle);
        Ok(SessionEvent::SummaryPinned { handle })
    }

    /// Best-effort save of the durable slice, used by the shutdown hook.
    pub fn save_now(&self) {
        let persisted = match self.read() {
            Ok(session) => persisted_slice(&session),
            Err(_) => return,
        };
        self.save_through(&persisted);
    }

    // Issued after the in-memory mutation, never under the session lock.
    // A failure is logged and swallowed: the in-memory state stays
    // authoritative and the next mutation's save is the implicit retry.
    fn save_through(&self, state: &PersistedState) {
        if let Some(persistence) = &self.persistence {
            if let Err(err) = persistence.save(state) {
                tracing::warn!(error = %err, "durable save failed, keeping in-memory state");
            }
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GameSession>, StoreError> {
        self.session.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GameSession>, StoreError> {
        self.session.write().map_err(|_| StoreError::Poisoned)
    }
}

fn snapshot(session: &GameSession) -> GameSnapshot {
    GameSnapshot {
        active_game: session.active_game,
        registration_open: session.registration_open,
        roster: session.roster.clone(),
        pinned_summary: session.pinned_summary,
        started_at: session.started_at,
    }
}

fn persisted_slice(session: &GameSession) -> PersistedState {
    PersistedState {
        vips: session.vip_users.clone(),
        bonuses: session.bonus_grants.clone(),
    }
}

#[cfg(test)]
impl SessionStore {
    fn force_drawn_rows(&self, rows: Vec<Vec<u8>>) {
        let mut session = self.session.write().expect("session lock");
        session.drawn_rows = rows;
    }
}
