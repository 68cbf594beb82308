//! One-shot reconciliation cycle against a JSON inventory file.
//!
//! Loads the file into the in-memory store, finds the item by query or scan,
//! submits the observed count and reports the outcome. The interactive loop
//! of the full application drives the same `ReconcileDriver`.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tally_protocol::payload;
use tally_protocol::types::InventoryItem;
use tally_reconcile::{MemoryStore, Notice, ReconcileDriver, SessionEvent, SessionState};
use tracing::info;

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// JSON inventory file (array of items, store field names)
    #[arg(long, env = "TALLY_INVENTORY")]
    inventory: PathBuf,
    /// Free-text search for the item
    #[arg(long, conflicts_with = "scan")]
    query: Option<String>,
    /// Scanned label content (payload JSON or bare SKU)
    #[arg(long)]
    scan: Option<String>,
    /// Physically observed count; omit to confirm the recorded count
    #[arg(long)]
    count: Option<u32>,
}

pub fn run(args: ReconcileArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run_cycle(args))
}

async fn run_cycle(args: ReconcileArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.inventory)
        .with_context(|| format!("Failed to read inventory file: {}", args.inventory.display()))?;
    let items: Vec<InventoryItem> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid inventory file: {}", args.inventory.display()))?;
    info!(
        path = %args.inventory.display(),
        items = items.len(),
        "loaded inventory"
    );

    let store = Arc::new(MemoryStore::new(items));
    let mut driver = ReconcileDriver::new(store.clone());

    match (&args.query, &args.scan) {
        (Some(query), None) => {
            driver
                .handle(SessionEvent::QuerySubmitted(query.clone()))
                .await?
        }
        (None, Some(scan)) => match payload::decode(scan) {
            Some(identity) => driver.handle(SessionEvent::ScanDecoded(identity)).await?,
            None => bail!("scan content is empty"),
        },
        _ => bail!("exactly one of --query or --scan is required"),
    }

    // One-shot mode: a search that narrowed to a single candidate is picked
    // without a prompt.
    let single = match driver.state() {
        SessionState::Searching { candidates, .. } if candidates.len() == 1 => {
            Some(candidates[0].id.clone())
        }
        _ => None,
    };
    if let Some(id) = single {
        driver.handle(SessionEvent::CandidatePicked(id)).await?;
    }

    match driver.state().clone() {
        SessionState::Searching { candidates, .. } => {
            report_notices(&mut driver);
            if candidates.is_empty() {
                bail!("no matching item");
            }
            println!("multiple candidates; narrow the search:");
            for item in candidates {
                println!("  {}  {}  (recorded {})", item.sku, item.name, item.quantity);
            }
        }
        SessionState::Verifying { item, .. } => {
            println!(
                "selected {}  {}  (recorded {})",
                item.sku, item.name, item.quantity
            );
            if let Some(count) = args.count {
                driver
                    .handle(SessionEvent::CountEdited(count.to_string()))
                    .await?;
            }
            driver.handle(SessionEvent::SubmitPressed).await?;
            report_notices(&mut driver);
            if let Some(updated) = store.quantity(&item.id) {
                println!("recorded quantity now {updated}");
            }
        }
    }
    Ok(())
}

fn report_notices(driver: &mut ReconcileDriver) {
    for notice in driver.drain_notices() {
        match notice {
            Notice::CountVerified { sku } => println!("count verified for {sku}"),
            Notice::StockAdjusted {
                sku,
                kind,
                quantity,
            } => println!("{kind} of {quantity} posted for {sku}"),
            Notice::DispatchFailed { message } => eprintln!("dispatch failed: {message}"),
            Notice::NoMatches { term } => println!("no results for '{term}'"),
        }
    }
}
