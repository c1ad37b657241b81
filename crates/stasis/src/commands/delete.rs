//! Delete command - removes a stored session.

use anyhow::Result;
use clap::Args;
use stasis_session::SessionStorage;

use super::Context;

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Session id
    pub id: String,
}

/// Run the delete command.
pub async fn run(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let storage = ctx.open_storage().await?;
    let removed = storage.remove_all(&args.id).await;
    storage.shutdown().await;
    removed?;

    if ctx.json_output {
        println!("{}", serde_json::json!({ "id": args.id, "deleted": true }));
    } else {
        println!("Deleted session '{}'", args.id);
    }
    Ok(())
}
