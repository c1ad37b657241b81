//! Put command - stores a session map.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use stasis_session::{SessionData, SessionMap, SessionStorage};

use super::Context;

/// Arguments for the put command.
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Session id
    pub id: String,

    /// Session map as a JSON object
    #[arg(short, long)]
    pub data: String,

    /// TTL in seconds (default: session.default_ttl_secs)
    #[arg(long)]
    pub ttl: Option<u64>,
}

/// Parse the `--data` argument.
pub fn parse_data(raw: &str) -> Result<SessionMap> {
    let value: serde_json::Value = serde_json::from_str(raw).context("--data is not valid JSON")?;
    match value {
        serde_json::Value::Object(object) => Ok(object.into_iter().collect()),
        other => bail!("--data must be a JSON object, got {other}"),
    }
}

/// Run the put command.
pub async fn run(args: PutArgs, ctx: &Context) -> Result<()> {
    let map = parse_data(&args.data)?;
    let ttl = ctx.ttl_or_default(args.ttl);

    let storage = ctx.open_storage().await?;
    let saved = storage
        .set_session(&args.id, &SessionData::from_map(map), ttl)
        .await;
    storage.shutdown().await;
    saved?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "id": args.id, "ttl_secs": ttl.as_secs() })
        );
    } else {
        println!("Saved session '{}' (ttl {}s)", args.id, ttl.as_secs());
    }
    Ok(())
}
