//! Inbound command classification and routing.
//!
//! The transport adapter delivers raw chat events; this module resolves
//! the requester's boolean capabilities from configuration, classifies
//! the text, and invokes exactly one [`SessionStore`] operation per event.

use crate::config::Config;
use crate::events::{Rejection, Reply};
use crate::store::{SessionStore, StoreError};
use lotobot_engine::errors::GameError;
use lotobot_engine::rules::{self, RegistrationRequest};
use lotobot_engine::session::GameKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A user named by an inbound event: the sender, or the target of the
/// replied-to message for `/vip`-style commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub user_id: i64,
    pub display_name: String,
}

/// One inbound chat event, as the transport adapter delivers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub user_id: i64,
    pub display_name: String,
    pub chat_id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<UserRef>,
}

/// The single store operation an inbound text maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartGame(GameKind),
    CloseRegistration,
    DrawRows(usize),
    ClaimBingo,
    DrawRoulette(usize),
    SetVip,
    UnsetVip,
    GrantBonus,
    ListVips,
    EndGame,
    ResetGame,
    Register(RegistrationRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Command(Command),
    /// A recognized command with unusable arguments. Stays local: it is
    /// answered directly, never escalated into the error taxonomy.
    Malformed { reason: String },
    Unrecognized,
}

fn command(command: Command) -> Classification {
    Classification::Command(command)
}

fn malformed(reason: impl Into<String>) -> Classification {
    Classification::Malformed {
        reason: reason.into(),
    }
}

pub fn classify(text: &str) -> Classification {
    let mut tokens = text.split_whitespace();
    let first = match tokens.next() {
        Some(token) => token,
        None => return Classification::Unrecognized,
    };
    let args: Vec<&str> = tokens.collect();

    match first {
        "/game" => match args.first().copied() {
            Some("bingo") => command(Command::StartGame(GameKind::Bingo)),
            Some("roulette") => command(Command::StartGame(GameKind::Roulette)),
            _ => malformed("expected '/game bingo' or '/game roulette'"),
        },
        "/endreg" => command(Command::CloseRegistration),
        "/draw" => match args.first().copied() {
            None | Some("1") => command(Command::DrawRows(1)),
            Some("2") => command(Command::DrawRows(2)),
            Some(other) => malformed(format!("'{}' is not a row count of 1 or 2", other)),
        },
        "/bingo" => command(Command::ClaimBingo),
        "/roll" => match args.first().and_then(|token| token.parse::<usize>().ok()) {
            Some(count) if count >= 1 => command(Command::DrawRoulette(count)),
            _ => malformed("expected '/roll <participant count>'"),
        },
        "/vip" => command(Command::SetVip),
        "/delvip" => command(Command::UnsetVip),
        "/bonus" => command(Command::GrantBonus),
        "/viplist" => command(Command::ListVips),
        "/stop" => command(Command::EndGame),
        "/reset" => command(Command::ResetGame),
        _ => match rules::parse_registration(text) {
            Some(request) => command(Command::Register(request)),
            None => Classification::Unrecognized,
        },
    }
}

/// Routes classified commands into the session store.
pub struct Dispatcher {
    store: Arc<SessionStore>,
    admin_ids: Vec<i64>,
    chat_id: i64,
}

impl Dispatcher {
    pub fn new(store: Arc<SessionStore>, config: &Config) -> Self {
        Self {
            store,
            admin_ids: config.admin_ids.clone(),
            chat_id: config.chat_id,
        }
    }

    fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    fn is_valid_chat(&self, chat_id: i64) -> bool {
        chat_id == self.chat_id
    }

    /// Handles one inbound event end to end: classify, resolve the
    /// requester's capabilities, run exactly one store operation, wrap
    /// the outcome for the renderer.
    pub fn handle(&self, message: &InboundMessage) -> Reply {
        let command = match classify(&message.text) {
            Classification::Command(command) => command,
            Classification::Malformed { reason } => return Reply::Malformed { reason },
            Classification::Unrecognized => return Reply::Ignored,
        };

        if !self.is_valid_chat(message.chat_id) {
            // Registrations outside the configured chat are noise;
            // commands get a typed refusal.
            return match command {
                Command::Register(_) => Reply::Ignored,
                _ => Reply::rejected(&GameError::InvalidChat),
            };
        }

        let is_admin = self.is_admin(message.user_id);
        tracing::debug!(
            user_id = message.user_id,
            is_admin,
            command = ?command,
            "dispatching inbound command"
        );

        let result = match command {
            Command::StartGame(kind) => self.store.start_game(is_admin, kind).map(Some),
            Command::CloseRegistration => self.store.close_registration(is_admin).map(Some),
            Command::DrawRows(count) => self.store.draw_bingo_rows(is_admin, count).map(Some),
            Command::ClaimBingo => self.store.claim_bingo(message.user_id).map(Some),
            Command::DrawRoulette(expected) => {
                self.store.draw_roulette(is_admin, expected).map(Some)
            }
            Command::SetVip => match &message.reply_to {
                Some(target) => self
                    .store
                    .set_vip(is_admin, target.user_id, &target.display_name)
                    .map(Some),
                None => return missing_reply_target(),
            },
            Command::UnsetVip => match &message.reply_to {
                Some(target) => self.store.unset_vip(is_admin, target.user_id).map(Some),
                None => return missing_reply_target(),
            },
            Command::GrantBonus => match &message.reply_to {
                Some(target) => self.store.grant_bonus(is_admin, target.user_id).map(Some),
                None => return missing_reply_target(),
            },
            Command::ListVips => self.store.list_vips().map(Some),
            Command::EndGame => self.store.end_game(is_admin).map(Some),
            Command::ResetGame => self.store.reset_game(is_admin).map(Some),
            Command::Register(request) => {
                self.store
                    .register(message.user_id, &message.display_name, request)
            }
        };

        match result {
            Ok(Some(event)) => Reply::Event { event },
            Ok(None) => Reply::Ignored,
            Err(StoreError::Game(err)) => Reply::rejected(&err),
            Err(err @ StoreError::Poisoned) => Reply::Rejected {
                rejection: Rejection {
                    code: "session_poisoned".into(),
                    message: err.to_string(),
                },
            },
        }
    }
}

fn missing_reply_target() -> Reply {
    Reply::Malformed {
        reason: "reply to the target user's message".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_command_requires_a_known_kind() {
        assert_eq!(
            classify("/game bingo"),
            Classification::Command(Command::StartGame(GameKind::Bingo))
        );
        assert_eq!(
            classify("/game roulette"),
            Classification::Command(Command::StartGame(GameKind::Roulette))
        );
        assert!(matches!(
            classify("/game"),
            Classification::Malformed { .. }
        ));
        assert!(matches!(
            classify("/game chess"),
            Classification::Malformed { .. }
        ));
    }

    #[test]
    fn draw_defaults_to_one_row() {
        assert_eq!(
            classify("/draw"),
            Classification::Command(Command::DrawRows(1))
        );
        assert_eq!(
            classify("/draw 2"),
            Classification::Command(Command::DrawRows(2))
        );
        assert!(matches!(
            classify("/draw 3"),
            Classification::Malformed { .. }
        ));
    }

    #[test]
    fn roll_requires_a_positive_count() {
        assert_eq!(
            classify("/roll 12"),
            Classification::Command(Command::DrawRoulette(12))
        );
        assert!(matches!(classify("/roll"), Classification::Malformed { .. }));
        assert!(matches!(
            classify("/roll 0"),
            Classification::Malformed { .. }
        ));
        assert!(matches!(
            classify("/roll everyone"),
            Classification::Malformed { .. }
        ));
    }

    #[test]
    fn registrations_and_noise_are_told_apart() {
        assert!(matches!(
            classify("+ 1 2 3 4 5"),
            Classification::Command(Command::Register(_))
        ));
        assert!(matches!(
            classify("@friend 1 2 3 4"),
            Classification::Command(Command::Register(_))
        ));
        assert_eq!(classify("good luck everyone"), Classification::Unrecognized);
        assert_eq!(classify(""), Classification::Unrecognized);
        assert_eq!(classify("/unknown"), Classification::Unrecognized);
    }
}
