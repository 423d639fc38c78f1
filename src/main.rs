use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use riverworks::config::SimConfig;
use riverworks::scheduler::TaskKind;
use riverworks::shutdown::install_shutdown_handler;
use riverworks::sim::Simulation;

#[derive(Parser, Debug)]
#[command(name = "riverworks")]
#[command(version)]
#[command(about = "A tick-driven job-dispatch facility simulator")]
struct Args {
    /// Number of ticks to run (ignored with --realtime, which runs until
    /// Ctrl-C)
    #[arg(long, default_value = "3600")]
    ticks: u64,

    /// Milliseconds of simulated time per tick
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Milliseconds between client arrivals
    #[arg(long, default_value = "2000")]
    spawn_interval_ms: u64,

    /// Upper bound on the tasks a fresh client tries to open
    #[arg(long, default_value = "5")]
    max_tasks_per_client: usize,

    /// Image workers in the initial pool
    #[arg(long, default_value = "10")]
    image_workers: usize,

    /// Video workers in the initial pool
    #[arg(long, default_value = "10")]
    video_workers: usize,

    /// Audio workers in the initial pool
    #[arg(long, default_value = "0")]
    audio_workers: usize,

    /// Text workers in the initial pool
    #[arg(long, default_value = "0")]
    text_workers: usize,

    /// Seed for the arrival generator (same seed, same run)
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Pace ticks against the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Output format for the final summary
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = SimConfig {
        tick_ms: args.tick_ms,
        spawn_interval_ms: args.spawn_interval_ms,
        max_tasks_per_client: args.max_tasks_per_client,
        seed: args.seed,
        image_workers: args.image_workers,
        video_workers: args.video_workers,
        audio_workers: args.audio_workers,
        text_workers: args.text_workers,
    };
    config.validate()?;

    let mut sim = Simulation::new(&config);

    if args.realtime {
        let shutdown = install_shutdown_handler();
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(args.tick_ms));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => sim.step(args.tick_ms),
            }
        }
    } else {
        for _ in 0..args.ticks {
            sim.step(args.tick_ms);
        }
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sim.summary())?),
        OutputFormat::Table => print_summary(&sim),
    }

    Ok(())
}

fn print_summary(sim: &Simulation) {
    let summary = sim.summary();
    let dispatcher = sim.dispatcher();

    println!("=== riverworks summary ===");
    println!(
        "ticks: {}  sim time: {:.1}s",
        summary.ticks,
        summary.now_ms as f64 / 1000.0
    );
    println!(
        "clients: {} active, {} spawned, {} retired",
        summary.clients_active, summary.clients_spawned, summary.clients_retired
    );
    println!(
        "tasks: {} submitted, {} rejected, queue depth {}, {} warnings",
        summary.tasks_submitted, summary.tasks_rejected, summary.queue_depth, summary.warnings
    );

    println!("completed by kind:");
    for kind in [
        TaskKind::Image,
        TaskKind::Video,
        TaskKind::Audio,
        TaskKind::Text,
    ] {
        let count = dispatcher.completed(kind);
        if count > 0 || dispatcher.worker_count(kind) > 0 {
            println!("  {:<6} {}", kind.to_string(), count);
        }
    }

    println!("workers:");
    for worker in dispatcher.workers() {
        match dispatcher.worker_progress(worker) {
            Some(progress) => println!(
                "  {:<12} {:<8} {:>5.1}%",
                worker.label(),
                worker.status.to_string(),
                progress * 100.0
            ),
            None => println!("  {:<12} {}", worker.label(), worker.status),
        }
    }
}
