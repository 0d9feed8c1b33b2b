//! Typed outcome data handed to the renderer.
//!
//! Every dispatcher call produces exactly one [`Reply`]. The core returns
//! data, never formatted strings: the renderer owns all user-facing text,
//! emoji, and the pin/edit decisions.

use chrono::{DateTime, Utc};
use lotobot_engine::errors::GameError;
use lotobot_engine::session::{Entry, GameKind, MessageRef, VipUser};
use serde::{Deserialize, Serialize};

/// State the renderer needs to re-render the roster summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub active_game: Option<GameKind>,
    pub registration_open: bool,
    pub roster: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_summary: Option<MessageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// Win verdict for one of a claimant's entries. Surfaced for human
/// adjudication; the store never declares a winner on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryVerdict {
    pub numbers: Vec<u8>,
    pub win: bool,
}

/// Successful outcome of a session operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    GameStarted {
        snapshot: GameSnapshot,
    },
    RegistrationClosed {
        kind: GameKind,
        participants: usize,
    },
    PlayerRegistered {
        entry: Entry,
        snapshot: GameSnapshot,
    },
    RowsDrawn {
        new_rows: Vec<Vec<u8>>,
        history: Vec<Vec<u8>>,
    },
    BingoVerdicts {
        user_id: i64,
        verdicts: Vec<EntryVerdict>,
    },
    RouletteWinner {
        index: usize,
        participants: usize,
    },
    VipGranted {
        user: VipUser,
    },
    VipRevoked {
        user_id: i64,
    },
    VipList {
        vips: Vec<VipUser>,
    },
    BonusGranted {
        user_id: i64,
        extra_entries: u32,
    },
    GameEnded {
        kind: GameKind,
    },
    GameReset,
    SummaryPinned {
        handle: MessageRef,
    },
}

/// A typed failure for the renderer: machine-readable code plus the
/// error's own message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: String,
    pub message: String,
}

impl From<&GameError> for Rejection {
    fn from(err: &GameError) -> Self {
        let code = match err {
            GameError::Unauthorized => "unauthorized",
            GameError::InvalidChat => "invalid_chat",
            GameError::GameAlreadyActive => "game_already_active",
            GameError::NoActiveGame => "no_active_game",
            GameError::NoOpenRegistration => "no_open_registration",
            GameError::WrongPhase => "wrong_phase",
            GameError::QuotaExceeded { .. } => "quota_exceeded",
            GameError::InvalidCard(_) => "invalid_card",
            GameError::NotRegistered => "not_registered",
            GameError::CountMismatch { .. } => "count_mismatch",
            GameError::AlreadyVip => "already_vip",
            GameError::NotVip => "not_vip",
            GameError::AlreadyBonused => "already_bonused",
        };
        Self {
            code: code.into(),
            message: err.to_string(),
        }
    }
}

/// What the dispatcher hands back for one inbound chat event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    /// The operation succeeded; render this event.
    Event { event: SessionEvent },
    /// The operation failed with an expected, recoverable condition.
    Rejected { rejection: Rejection },
    /// The message was a recognized command with unusable arguments.
    Malformed { reason: String },
    /// Nothing to do: not a command, or a silently ignored registration.
    Ignored,
}

impl Reply {
    pub fn rejected(err: &GameError) -> Self {
        Reply::Rejected {
            rejection: Rejection::from(err),
        }
    }
}
