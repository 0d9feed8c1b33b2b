//! Service shell around the `lotobot-engine` core: the locked session
//! store, the inbound-command dispatcher, typed renderer events, SQLite
//! persistence for VIP/bonus rows, configuration, and logging.

pub mod config;
pub mod dispatch;
pub mod events;
pub mod logging;
pub mod storage;
pub mod store;

pub use config::{Config, ConfigError, ConfigResolved};
pub use dispatch::{classify, Classification, Command, Dispatcher, InboundMessage, UserRef};
pub use events::{EntryVerdict, GameSnapshot, Rejection, Reply, SessionEvent};
pub use logging::init_logging;
pub use storage::{PersistedState, Persistence, SqliteStore, StorageError};
pub use store::{SessionStore, StoreError};
