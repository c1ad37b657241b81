//! Touch command - extends the TTL of a stored session.

use anyhow::Result;
use clap::Args;
use console::Style;
use stasis_session::{FlushReport, SessionStorage};

use super::Context;

/// Arguments for the touch command.
#[derive(Args, Debug)]
pub struct TouchArgs {
    /// Session id
    pub id: String,

    /// TTL in seconds (default: session.default_ttl_secs)
    #[arg(long)]
    pub ttl: Option<u64>,
}

/// Run the touch command.
///
/// The renewal goes through the same queue as in a server, then is flushed
/// right away so the process can exit.
pub async fn run(args: TouchArgs, ctx: &Context) -> Result<()> {
    let ttl = ctx.ttl_or_default(args.ttl);
    let storage = ctx.open_storage().await?;

    storage.update_ttl(&args.id, ttl).await?;
    let queued = storage.pending_renewals().contains(&args.id);
    let report = storage.flush_pending().await;
    storage.shutdown().await;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({
                "id": args.id,
                "queued": queued,
                "extended": report.extended,
                "missing": report.missing,
                "failed": report.failed,
            })
        );
        return Ok(());
    }

    let dim = Style::new().dim();
    if ctx.verbose {
        println!("{}", dim.apply_to(report_summary(&report)));
    }
    if !queued {
        println!(
            "{}",
            dim.apply_to(format!(
                "TTL {}s is shorter than the flush interval ({}s); nothing to do",
                ttl.as_secs(),
                storage.flush_interval().as_secs()
            ))
        );
    } else if report.extended > 0 {
        println!("Extended session '{}' to {}s", args.id, ttl.as_secs());
    } else if report.missing > 0 {
        let yellow = Style::new().yellow();
        println!("{}", yellow.apply_to(format!("Session '{}' not found", args.id)));
    } else {
        anyhow::bail!("failed to extend session '{}'; see log for details", args.id);
    }
    Ok(())
}

/// One-line summary of a flush cycle, shown with `--verbose`.
fn report_summary(report: &FlushReport) -> String {
    format!(
        "flush: drained={} extended={} missing={} failed={}",
        report.drained, report.extended, report.missing, report.failed
    )
}
