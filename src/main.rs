use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use dispatch_lite::config::EngineConfig;
use dispatch_lite::engine::{DispatchEngine, EngineSnapshot};
use dispatch_lite::scheduler::Priority;
use dispatch_lite::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "dispatch-lite")]
#[command(version)]
#[command(about = "A priority-aware order dispatch simulation")]
struct Args {
    /// Number of workers to start with
    #[arg(long, default_value = "2")]
    workers: u32,

    /// Standard-priority orders to submit up front
    #[arg(long, default_value = "4")]
    standard: u32,

    /// Expedited orders to submit up front (dispatched ahead of standard)
    #[arg(long, default_value = "2")]
    expedited: u32,

    /// Per-order processing time in milliseconds
    #[arg(long, default_value = "10000")]
    processing_ms: u64,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Remove the newest worker after this many milliseconds
    /// (exercises the requeue path mid-run)
    #[arg(long)]
    remove_worker_after_ms: Option<u64>,

    /// Output format for the final report
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Reporting
// =============================================================================

fn print_report(snapshot: &EngineSnapshot, now: Duration, processing: Duration) {
    let pending = snapshot.pending();
    if pending.is_empty() {
        println!("No pending orders.");
    } else {
        println!(
            "{:<8} {:<10} {:<12} {:<8} PROGRESS",
            "ORDER", "PRIORITY", "STATUS", "WORKER"
        );
        println!("{}", "-".repeat(50));
        for order in &pending {
            let worker = order
                .assigned_worker
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let progress = order
                .assigned_worker
                .and_then(|id| snapshot.workers.iter().find(|w| w.id == id))
                .and_then(|w| w.progress(now, processing))
                .map(|p| format!("{:.0}%", p * 100.0))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<8} {:<10} {:<12} {:<8} {}",
                order.id,
                order.priority.to_string(),
                order.status.to_string(),
                worker,
                progress
            );
        }
    }

    println!();
    let completed = snapshot.completed();
    if completed.is_empty() {
        println!("No completed orders.");
    } else {
        println!("{:<8} {:<10} COMPLETED AT", "ORDER", "PRIORITY");
        println!("{}", "-".repeat(34));
        for order in &completed {
            let at = order
                .completed_at_ms
                .map(|ms| format!("{ms} ms"))
                .unwrap_or_else(|| "-".to_string());
            println!("{:<8} {:<10} {}", order.id, order.priority.to_string(), at);
        }
    }

    println!();
    println!(
        "{} workers ({} idle), {} orders total",
        snapshot.workers.len(),
        snapshot.workers.iter().filter(|w| w.order.is_none()).count(),
        snapshot.orders.len()
    );
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = EngineConfig::default()
        .with_processing_duration(Duration::from_millis(args.processing_ms))
        .with_tick_interval(Duration::from_millis(args.tick_ms));

    let mut engine = DispatchEngine::new(config.clone());
    for _ in 0..args.workers {
        engine.add_worker();
    }
    for _ in 0..args.standard {
        engine.submit_order(Priority::Standard);
    }
    for _ in 0..args.expedited {
        engine.submit_order(Priority::Expedited);
    }

    let shutdown = install_shutdown_handler();
    let started = Instant::now();
    let mut interval = tokio::time::interval(config.tick_interval);
    let mut pending_removal = args.remove_worker_after_ms.map(Duration::from_millis);

    // The interval is the only source of autonomous progress; the engine
    // itself is synchronous, so cancelling between ticks can never leave a
    // half-applied tick behind.
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested, state frozen at last completed tick");
                break;
            }
            _ = interval.tick() => {
                let now = started.elapsed();
                if let Some(after) = pending_removal {
                    if now >= after {
                        engine.remove_worker();
                        pending_removal = None;
                    }
                }
                engine.tick(now);

                let snapshot = engine.snapshot();
                if snapshot.all_done() {
                    tracing::info!(elapsed_ms = now.as_millis() as u64, "All orders done");
                    break;
                }
                if snapshot.workers.is_empty() {
                    tracing::warn!("No workers left and orders still pending, stopping");
                    break;
                }
            }
        }
    }

    let now = started.elapsed();
    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        OutputFormat::Table => print_report(&engine.snapshot(), now, config.processing_duration),
    }

    Ok(())
}
