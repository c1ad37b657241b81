//! Get command - prints a stored session.

use anyhow::Result;
use clap::Args;
use console::Style;
use stasis_session::SessionStorage;

use super::Context;

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Session id
    pub id: String,
}

/// Run the get command.
pub async fn run(args: GetArgs, ctx: &Context) -> Result<()> {
    let storage = ctx.open_storage().await?;
    let ttl = ctx.ttl_or_default(None);
    let loaded = storage.get_session(&args.id, ttl, None).await;
    storage.shutdown().await;

    match loaded? {
        Some(data) => {
            let map = data.snapshot();
            if ctx.json_output {
                println!("{}", serde_json::to_string(&map)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&map)?);
            }
        }
        None => {
            if ctx.json_output {
                println!("null");
            } else {
                let yellow = Style::new().yellow();
                println!("{}", yellow.apply_to(format!("Session '{}' not found", args.id)));
            }
        }
    }

    Ok(())
}
