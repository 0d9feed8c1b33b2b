//! Standalone bot process.
//!
//! Reads newline-delimited JSON `InboundMessage` values on stdin (the
//! transport adapter's feed), dispatches each against the session store,
//! and writes the JSON `Reply` to stdout. Performs a best-effort save of
//! the durable state on EOF or Ctrl-C; a hard kill can lose the window
//! since the last VIP/bonus mutation.

use lotobot_bot::{config, Dispatcher, InboundMessage, SessionStore, SqliteStore};
use lotobot_engine::draw::Drum;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lotobot_bot::init_logging();

    let resolved = config::load_with_sources()?;
    let cfg = resolved.config;
    tracing::info!(
        chat_id = cfg.chat_id,
        admins = cfg.admin_ids.len(),
        database = %cfg.database_path,
        "configuration loaded"
    );

    let storage = Arc::new(SqliteStore::open(&cfg.database_path)?);
    let store = Arc::new(SessionStore::with_persistence(Drum::new(cfg.seed), storage));
    let dispatcher = Dispatcher::new(Arc::clone(&store), &cfg);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received");
                break;
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                let message: InboundMessage = match serde_json::from_str(&line) {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::warn!(error = %err, "unparseable inbound event");
                        continue;
                    }
                };
                let reply = dispatcher.handle(&message);
                println!("{}", serde_json::to_string(&reply)?);
            }
        }
    }

    store.save_now();
    tracing::info!("stopped");
    Ok(())
}
