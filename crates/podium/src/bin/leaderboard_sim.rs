//! # Leaderboard Simulation
//!
//! Seeds a board, lets a worker pool hammer it and prints the top of the
//! board while the updates land.
//!
//! Usage: `leaderboard_sim [config.toml]`
//!
//! Log level follows `RUST_LOG` (default `info`).

use std::process::ExitCode;

use podium::{RankedEntry, SimulationConfig, SimulationError, Simulator};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SimulationError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              PODIUM - LEADERBOARD SIMULATION                     ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Players:            {}", config.players);
    println!("│ Worker Threads:     {}", config.worker_threads);
    println!("│ Updates / Player:   {}", config.updates_per_player);
    println!("│ Max Increase:       {}", config.max_score_increase);
    println!("│ Lock Stripes:       {}", config.ranking.lock_stripes);
    println!("│ Table Shards:       {}", config.ranking.table_shards);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let simulator = Simulator::new(config)?;
    simulator.seed_players();

    let top_n = simulator.config().top_n;
    print_board("INITIAL BOARD", &simulator.board().top_n_with_scores(top_n));

    let report = simulator.run(|snapshot| {
        let title = format!(
            "SNAPSHOT {} @ {:.1}s",
            snapshot.index,
            snapshot.elapsed.as_secs_f64()
        );
        print_board(&title, &snapshot.entries);
    })?;

    print_board("FINAL BOARD", &report.final_entries);

    println!("┌─ SUMMARY ───────────────────────────────────────────────────────┐");
    println!("│ Updates Applied:    {}", report.updates_applied);
    println!("│ Players on Board:   {}", report.total_players);
    println!("│ Snapshots:          {}", report.snapshots_taken);
    println!("│ Wall Time:          {:.2} s", report.elapsed.as_secs_f64());
    println!("│ Consistency:        ✓ VERIFIED");
    println!("└──────────────────────────────────────────────────────────────────┘");
    Ok(())
}

fn print_board(title: &str, entries: &[RankedEntry]) {
    println!("┌─ {title} ");
    if entries.is_empty() {
        println!("│ Leaderboard is empty.");
    } else {
        for (rank, entry) in entries.iter().enumerate() {
            println!("│ {:>2}. {:<12} {:>8}", rank + 1, entry.player, entry.score);
        }
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
}
