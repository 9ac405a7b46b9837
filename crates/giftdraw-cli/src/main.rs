//! giftdraw - gift exchange draws from the command line
//!
//! ## Commands
//!
//! - `preview`: compute a draw from the roster without saving it
//! - `draw`: compute a draw and replace the stored one
//! - `diagnose`: show every giver's eligible recipients and, when no draw
//!   exists, which givers are over-constrained
//! - `status`: whether a draw is stored
//! - `reset`: delete the stored draw
//! - `lookup`: print one giver's recipient
//!
//! The stored draw lives in SurrealDB, selected from the environment
//! (`SURREALDB_ENDPOINT`/`SURREALDB_URL`, else a local `.giftdraw/db`).

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use draw_state::{JsonRosterSource, SurrealDrawLedger, SurrealHandle};
use giftdraw_core::{
    Diagnosis, DrawError, DrawPlan, DrawService, DrawStatus, FailureLog, Inspection, Outcome,
    METRICS,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "giftdraw")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gift exchange draws as constrained perfect matching", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Participant roster (JSON)
    #[arg(long, global = true, env = "GIFTDRAW_ROSTER", default_value = "roster.json")]
    roster: PathBuf,

    /// Where infeasible draws are recorded
    #[arg(
        long,
        global = true,
        env = "GIFTDRAW_FAILURE_LOG",
        default_value = "logs/draw_failures.log"
    )]
    failure_log: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a draw without saving it
    Preview,

    /// Compute a draw and replace the stored one
    Draw {
        /// Who is running the draw (recorded with it)
        #[arg(long)]
        by: Option<String>,
    },

    /// Show eligibility per giver and explain infeasible rosters
    Diagnose,

    /// Show whether a draw is stored
    Status,

    /// Delete the stored draw
    Reset,

    /// Print the recipient drawn for one giver
    Lookup {
        /// Giver id
        giver: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    giftdraw_core::init_tracing(cli.json, level);

    let handle = SurrealHandle::setup_from_env()
        .await
        .context("Failed to connect to giftdraw database")?;
    let service = DrawService::new(
        Arc::new(JsonRosterSource::new(&cli.roster)),
        Arc::new(SurrealDrawLedger::new(Arc::new(handle))),
    )
    .with_failure_log(FailureLog::new(&cli.failure_log));

    let result = match cli.command {
        Commands::Preview => cmd_preview(&service).await,
        Commands::Draw { by } => cmd_draw(&service, by.as_deref()).await,
        Commands::Diagnose => cmd_diagnose(&service).await,
        Commands::Status => cmd_status(&service).await,
        Commands::Reset => cmd_reset(&service).await,
        Commands::Lookup { giver } => cmd_lookup(&service, &giver).await,
    };
    METRICS.flush();
    result
}

async fn cmd_preview(service: &DrawService) -> Result<()> {
    match service.preview().await {
        Ok(plan) => {
            print!("{}", render_plan(&plan));
            println!("(preview only, nothing saved)");
            Ok(())
        }
        Err(DrawError::Infeasible(diagnosis)) => {
            print!("{}", render_diagnosis(&diagnosis));
            bail!("no valid draw exists for this roster")
        }
        Err(e) => Err(e).context("preview failed"),
    }
}

async fn cmd_draw(service: &DrawService, by: Option<&str>) -> Result<()> {
    match service.commit(by).await {
        Ok(record) => {
            info!(draw_id = %record.draw_id, "draw saved");
            println!(
                "Draw {} saved: {} pairs (snapshot {})",
                record.draw_id,
                record.pairs.len(),
                record.snapshot_digest.short()
            );
            Ok(())
        }
        Err(DrawError::Infeasible(diagnosis)) => {
            print!("{}", render_diagnosis(&diagnosis));
            bail!("no valid draw exists for this roster; stored draw left unchanged")
        }
        Err(e) => Err(e).context("draw failed"),
    }
}

async fn cmd_diagnose(service: &DrawService) -> Result<()> {
    let inspection = service.inspect().await.context("diagnose failed")?;
    print!("{}", render_inspection(&inspection));
    if let Outcome::Infeasible(_) = inspection.outcome {
        bail!("no valid draw exists for this roster");
    }
    Ok(())
}

async fn cmd_status(service: &DrawService) -> Result<()> {
    let status = service.status().await.context("status failed")?;
    print!("{}", render_status(&status));
    Ok(())
}

async fn cmd_reset(service: &DrawService) -> Result<()> {
    if service.reset().await.context("reset failed")? {
        println!("Stored draw deleted");
    } else {
        println!("No draw stored");
    }
    Ok(())
}

async fn cmd_lookup(service: &DrawService, giver: &str) -> Result<()> {
    match service
        .recipient_for(giver)
        .await
        .context("lookup failed")?
    {
        Some(recipient) => println!("{giver} -> {recipient}"),
        None => bail!("no recipient stored for {giver}"),
    }
    Ok(())
}

// ========== Rendering ==========

fn render_plan(plan: &DrawPlan) -> String {
    let mut out = String::new();
    for pair in plan.assignment.iter() {
        let _ = writeln!(
            out,
            "{} -> {}",
            plan.display_name(&pair.giver),
            plan.display_name(&pair.recipient)
        );
    }
    out
}

fn render_diagnosis(d: &Diagnosis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "No valid draw: at most {} of {} givers can be matched.",
        d.matched_count, d.participant_count
    );
    let _ = writeln!(
        out,
        "These {} givers share only {} eligible recipients:",
        d.violator_set.len(),
        d.reachable_recipients.len()
    );
    for giver in &d.violator_set {
        let options = d
            .per_giver_options
            .get(giver)
            .map(|o| join(o))
            .unwrap_or_default();
        let _ = writeln!(out, "  {giver}: [{options}]");
    }
    if !d.zero_option_givers.is_empty() {
        let _ = writeln!(
            out,
            "Givers with no eligible recipient: {}",
            join(&d.zero_option_givers)
        );
    }
    out
}

fn render_inspection(inspection: &Inspection) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Snapshot {}", inspection.snapshot_digest.short());
    for (giver, options) in &inspection.per_giver_options {
        let _ = writeln!(out, "  {giver} ({}): [{}]", options.len(), join(options));
    }
    match &inspection.outcome {
        Outcome::Matched(a) => {
            let _ = writeln!(out, "Feasible: a draw of {} pairs exists.", a.len());
        }
        Outcome::Infeasible(d) => out.push_str(&render_diagnosis(d)),
    }
    out
}

fn render_status(status: &DrawStatus) -> String {
    match (&status.draw_id, status.created_at) {
        (Some(id), Some(at)) if status.exists => {
            let mut out = format!(
                "Draw {id} created {} with {} pairs",
                at.to_rfc3339(),
                status.pair_count
            );
            if let Some(by) = &status.requested_by {
                let _ = write!(out, " by {by}");
            }
            out.push('\n');
            out
        }
        _ => "No draw stored\n".to_string(),
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
