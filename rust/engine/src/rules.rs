use crate::errors::CardError;
use crate::session::GameSession;
use std::collections::BTreeSet;

/// Smallest callable bingo number.
pub const NUMBER_MIN: u8 = 1;
/// Largest callable bingo number.
pub const NUMBER_MAX: u8 = 100;
/// Card size for users without any privilege.
pub const FULL_CARD: usize = 5;
/// Card size for VIPs and bonus holders.
pub const SHORT_CARD: usize = 4;
/// Numbers called per drawn bingo row.
pub const ROW_LEN: usize = 5;
/// Entries a plain user may hold per game.
pub const BASE_QUOTA: u32 = 1;
/// Entries a VIP may hold per game.
pub const VIP_QUOTA: u32 = 2;
/// First token of a plain registration message.
pub const REGISTRATION_MARKER: &str = "+";

/// A classified registration message: an optional explicit handle to record
/// instead of the sender's own name, and the raw card tokens that follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub handle: Option<String>,
    pub card_tokens: Vec<String>,
}

/// Maximum entries the user may hold in the current game.
///
/// VIP status strictly overrides bonus grants: a VIP gets [`VIP_QUOTA`]
/// and any bonus row for the same user is ignored.
pub fn quota(session: &GameSession, user_id: i64) -> u32 {
    if session.is_vip(user_id) {
        VIP_QUOTA
    } else {
        BASE_QUOTA + session.bonus_count(user_id)
    }
}

/// Card size the user must submit, re-evaluated on every registration
/// attempt since VIP/bonus status can change between attempts.
pub fn required_card_len(session: &GameSession, user_id: i64) -> usize {
    if session.is_vip(user_id) || session.bonus_count(user_id) > 0 {
        SHORT_CARD
    } else {
        FULL_CARD
    }
}

/// Classifies a raw chat line as a registration message, if it is one.
///
/// A registration starts with the literal [`REGISTRATION_MARKER`], or with
/// an explicit `@handle` token in place of the marker. In the second form
/// the handle is recorded as the entry's display name instead of the
/// sender's resolved name; no ownership check is performed against the
/// sender.
///
/// Returns `None` for anything else.
pub fn parse_registration(text: &str) -> Option<RegistrationRequest> {
    let mut tokens = text.split_whitespace();
    let first = tokens.next()?;
    let card_tokens: Vec<String> = tokens.map(str::to_string).collect();

    if first == REGISTRATION_MARKER {
        Some(RegistrationRequest {
            handle: None,
            card_tokens,
        })
    } else if first.len() > 1 && first.starts_with('@') {
        Some(RegistrationRequest {
            handle: Some(first.to_string()),
            card_tokens,
        })
    } else {
        None
    }
}

/// Validates a submitted bingo card against the required size.
///
/// The tokens must number exactly `required`, every token must parse as an
/// integer in [`NUMBER_MIN`]`..=`[`NUMBER_MAX`], and no value may repeat.
/// Each violation yields a distinct [`CardError`] so the caller can render
/// a precise message.
///
/// # Examples
///
/// ```
/// use lotobot_engine::rules::parse_card;
///
/// let tokens: Vec<String> = ["4", "23", "56", "78", "90"]
///     .iter().map(|t| t.to_string()).collect();
/// assert_eq!(parse_card(&tokens, 5), Ok(vec![4, 23, 56, 78, 90]));
/// ```
///
/// ```
/// use lotobot_engine::errors::CardError;
/// use lotobot_engine::rules::parse_card;
///
/// let tokens: Vec<String> = ["4", "23", "101", "78", "90"]
///     .iter().map(|t| t.to_string()).collect();
/// assert_eq!(parse_card(&tokens, 5), Err(CardError::OutOfRange(101)));
/// ```
pub fn parse_card(tokens: &[String], required: usize) -> Result<Vec<u8>, CardError> {
    if tokens.len() != required {
        return Err(CardError::WrongCount {
            expected: required,
            actual: tokens.len(),
        });
    }

    let mut numbers = Vec::with_capacity(required);
    for token in tokens {
        let value: i64 = token
            .parse()
            .map_err(|_| CardError::NotANumber(token.clone()))?;
        if value < NUMBER_MIN as i64 || value > NUMBER_MAX as i64 {
            return Err(CardError::OutOfRange(value));
        }
        numbers.push(value as u8);
    }

    let mut seen = BTreeSet::new();
    for &number in &numbers {
        if !seen.insert(number) {
            return Err(CardError::Duplicate(number));
        }
    }

    Ok(numbers)
}

/// A card wins iff every one of its numbers has been called: a strict
/// subset-of-union test over all rows drawn so far, not an exact cover.
pub fn card_wins(numbers: &[u8], drawn: &BTreeSet<u8>) -> bool {
    numbers.iter().all(|number| drawn.contains(number))
}
