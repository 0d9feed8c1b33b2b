//! # lotobot-engine: Chat Game Session Core
//!
//! The pure core of a turn-based chat game bot running numbered-bingo and
//! roulette draws in a single chat. Holds the session data model, the game
//! rules as pure functions over a session snapshot, and the seeded RNG
//! behind every draw. The service shell (command dispatch, locking,
//! persistence) lives in the `lotobot-bot` crate.
//!
//! ## Core Modules
//!
//! - [`session`] - The `GameSession` record, roster entries, VIP set
//! - [`rules`] - Quotas, card validation, registration parsing, win check
//! - [`draw`] - Bingo row generation and the roulette index (ChaCha20 RNG)
//! - [`errors`] - The domain error taxonomy
//!
//! ## Quick Start
//!
//! ```rust
//! use lotobot_engine::rules::{parse_card, parse_registration};
//!
//! // A registration message carries an optional explicit handle followed
//! // by the card tokens.
//! let request = parse_registration("@night_wolf 4 23 56 78").unwrap();
//! assert_eq!(request.handle.as_deref(), Some("@night_wolf"));
//!
//! // VIPs and bonus holders submit 4 numbers instead of 5.
//! let card = parse_card(&request.card_tokens, 4).unwrap();
//! assert_eq!(card, vec![4, 23, 56, 78]);
//! ```
//!
//! ## Deterministic Draws
//!
//! All draws are reproducible from a seed:
//!
//! ```rust
//! use lotobot_engine::draw::Drum;
//!
//! let mut a = Drum::new(Some(42));
//! let mut b = Drum::new(Some(42));
//! assert_eq!(a.bingo_row(), b.bingo_row());
//! ```

pub mod draw;
pub mod errors;
pub mod rules;
pub mod session;
