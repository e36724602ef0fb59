//! Reelrank command driver
//!
//! Reads one JSON command per line on stdin and writes one JSON response per
//! line on stdout. Logs go to stderr.
//!
//! ```text
//! {"op": "create_user", "user_id": "alice"}
//! {"op": "feedback", "user_id": "alice", "item_id": 550, "kind": "right"}
//! {"op": "recommend", "user_id": "alice", "top_n": 3}
//! ```

use anyhow::{Context, Result};
use reelrank_core::{init_logging, load_dotenv, ConfigLoader, LogConfig};
use reelrank_engine::{EngineConfig, FeedbackKind, InMemoryUserStore, ItemId, RecommenderEngine};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command {
    CreateUser {
        user_id: String,
    },
    Feedback {
        user_id: String,
        item_id: ItemId,
        kind: FeedbackKind,
    },
    Recommend {
        user_id: String,
        top_n: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    let log_config = LogConfig::load().context("invalid logging configuration")?;
    init_logging(&log_config)?;

    let config = EngineConfig::load().context("invalid engine configuration")?;
    let engine = RecommenderEngine::from_config(&config, Arc::new(InMemoryUserStore::new()))
        .context("failed to load ranking data")?;

    info!(
        items = engine.embeddings().len(),
        dimension = engine.embeddings().dimension(),
        catalog = engine.catalog().len(),
        "Reelrank engine ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Command>(&line) {
            Ok(command) => dispatch(&engine, command).await,
            Err(e) => json!({ "ok": false, "error": format!("invalid command: {}", e) }),
        };

        stdout.write_all(response.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("Input closed, shutting down");
    Ok(())
}

async fn dispatch(engine: &RecommenderEngine, command: Command) -> Value {
    let result = match command {
        Command::CreateUser { user_id } => engine
            .create_user(&user_id)
            .await
            .map(|record| json!({ "user_id": record.user_id })),
        Command::Feedback {
            user_id,
            item_id,
            kind,
        } => engine
            .submit_feedback(&user_id, item_id, kind)
            .await
            .map(|outcome| json!({ "outcome": outcome })),
        Command::Recommend { user_id, top_n } => engine
            .get_recommendations(&user_id, top_n)
            .await
            .map(|batch| json!(batch)),
    };

    match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => {
            error!(error = %e, "Command failed");
            json!({ "ok": false, "error": e.to_string() })
        }
    }
}
