//! Minimal embedding example for agentkit-core
//!
//! Reconciles a desired interface address list against the current one,
//! publishes the resulting deltas through an in-process transport, and
//! prints how long each step took.
//!
//! ```bash
//! AGENTKIT_LOG_LEVEL=debug cargo run -p agentkit-demos --bin embedded_usage
//! ```

use agentkit_core::addr::{diff_addresses, parse_addresses};
use agentkit_core::measure::{LatencyTracer, Tracer, or_noop};
use agentkit_core::traits::{KeyValPublisher, KeyValWatcher, Plugin, PutDel};
use agentkit_core::LocalTransport;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const DESIRED: &[&str] = &["10.10.0.1/24", "10.10.0.2/24", "fd00::1/64"];
const CURRENT: &[&str] = &["10.10.0.2/24", "10.10.0.3/24", "fe80::1/64"];

#[tokio::main]
async fn main() -> Result<()> {
    let level = match std::env::var("AGENTKIT_LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())?;

    let tracer: Arc<dyn LatencyTracer> = Arc::new(Tracer::new("embedded"));
    // Uninstrumented collaborators get a silent tracer
    let quiet = or_noop(None);

    let start = Instant::now();
    let desired = parse_addresses(DESIRED.iter().copied())?;
    let current = parse_addresses(CURRENT.iter().copied())?;
    tracer.log_time("parse", start);

    // The transport starts out holding the live address set
    let transport = LocalTransport::new();
    transport.init().await?;
    for addr in &current {
        transport.publish_data(&format!("addrs/{addr}"), Some(addr.to_string().as_bytes())).await?;
    }

    let (change_tx, mut change_rx) = mpsc::channel(16);
    let (resync_tx, mut resync_rx) = mpsc::channel(1);
    let registration = transport
        .watch_data("embedded", change_tx, resync_tx, &["addrs/".to_string()])
        .await?;
    if let Some(resync) = resync_rx.recv().await {
        let existing: usize = resync.values.values().map(Vec::len).sum();
        info!("Initial resync: {} address(es)", existing);
        resync.done(Ok(()));
    }

    let start = Instant::now();
    let diff = diff_addresses(&desired, &current);
    tracer.log_time("diff", start);
    quiet.log_time("diff", start);

    for addr in &diff.to_delete {
        let start = Instant::now();
        transport.publish_data(&format!("addrs/{addr}"), None).await?;
        tracer.log_time("publish", start);
    }
    for addr in &diff.to_add {
        let start = Instant::now();
        transport.publish_data(&format!("addrs/{addr}"), Some(addr.to_string().as_bytes())).await?;
        tracer.log_time("publish", start);
    }

    while let Ok(event) = change_rx.try_recv() {
        let verb = match event.change_type {
            PutDel::Put => "add",
            PutDel::Delete => "delete",
        };
        info!("{} {} (revision {})", verb, event.key, event.revision);
        event.done(Ok(()));
    }

    registration.release().await?;
    transport.close().await?;

    println!("{}", tracer.get().to_json()?);
    Ok(())
}
