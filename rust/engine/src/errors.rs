use thiserror::Error;

/// A reason a submitted bingo card was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("Expected {expected} numbers, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("Number {0} is outside 1..=100")]
    OutOfRange(i64),
    #[error("Number {0} appears more than once")]
    Duplicate(u8),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Requester is not an admin")]
    Unauthorized,
    #[error("Command sent outside the configured chat")]
    InvalidChat,
    #[error("A game is already running")]
    GameAlreadyActive,
    #[error("No game is running")]
    NoActiveGame,
    #[error("Registration is not open")]
    NoOpenRegistration,
    #[error("Not allowed in the current game phase")]
    WrongPhase,
    #[error("Entry quota reached (max {max})")]
    QuotaExceeded { max: u32 },
    #[error("Invalid card: {0}")]
    InvalidCard(#[from] CardError),
    #[error("User has no entries in this game")]
    NotRegistered,
    #[error("Participant count mismatch (declared {expected}, roster has {actual})")]
    CountMismatch { expected: usize, actual: usize },
    #[error("User is already a VIP")]
    AlreadyVip,
    #[error("User is not a VIP")]
    NotVip,
    #[error("User already received a bonus this game")]
    AlreadyBonused,
}
