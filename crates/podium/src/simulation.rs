//! # Leaderboard Simulation
//!
//! Drives a shared [`RankingEngine`] from a fixed pool of worker threads
//! while the calling thread takes periodic top-N snapshots.
//!
//! ## Flow
//!
//! ```text
//!   Simulator::run
//!     │
//!     ├─ enqueue players × updates_per_player jobs  (crossbeam unbounded)
//!     ├─ spawn worker_threads workers
//!     │     └─ recv job ─> think ─> score_of ─> +rand(1..=max) ─> update_score
//!     ├─ every snapshot_interval: on_snapshot(top_n_with_scores)
//!     ├─ join workers
//!     └─ check_consistency ─> SimulationReport
//! ```
//!
//! The worker's read-modify-write is not atomic: two workers can read the
//! same score and one increment overwrites the other. The engine still
//! keeps table and index in agreement, which is what the run verifies.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use podium_ranking::{PlayerId, RankedEntry, RankingConfig, RankingEngine, RankingError, Score};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Errors raised by the simulation driver.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration values rejected by validation.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("failed to read simulation config '{path}': {source}")]
    ConfigIo {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse simulation config '{path}': {source}")]
    ConfigParse {
        /// Path of the config file.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// Engine config rejected or board found inconsistent.
    #[error(transparent)]
    Ranking(#[from] RankingError),

    /// A worker thread could not be started.
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// A worker thread panicked.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    /// The job queue closed before all jobs were queued.
    #[error("job queue closed")]
    QueueClosed,
}

/// Result type for simulation operations.
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Simulation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of distinct players (`User_1..=User_N`).
    pub players: usize,
    /// Worker pool size.
    pub worker_threads: usize,
    /// Score updates queued per player.
    pub updates_per_player: usize,
    /// Largest single increment; increments are drawn from `1..=max`.
    pub max_score_increase: Score,
    /// Seeded scores are drawn from `0..initial_score_max`.
    pub initial_score_max: Score,
    /// Workers sleep `0..max_think_time_ms` before each update. 0 disables.
    pub max_think_time_ms: u64,
    /// Rows per snapshot.
    pub top_n: usize,
    /// Snapshots taken while workers run.
    pub snapshots: usize,
    /// Pause before each snapshot.
    pub snapshot_interval_ms: u64,
    /// RNG seed for seeding and for every worker.
    pub seed: u64,
    /// Engine sizing.
    pub ranking: RankingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: 10,
            worker_threads: 5,
            updates_per_player: 10,
            max_score_increase: 50,
            initial_score_max: 100,
            max_think_time_ms: 500,
            top_n: 5,
            snapshots: 5,
            snapshot_interval_ms: 1_000,
            seed: 42,
            ranking: RankingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Checks value ranges, including the nested engine config.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfig`] or the engine's error.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.worker_threads == 0 {
            return Err(SimulationError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_score_increase < 1 {
            return Err(SimulationError::InvalidConfig(format!(
                "max_score_increase must be at least 1, got {}",
                self.max_score_increase
            )));
        }
        if self.initial_score_max < 1 {
            return Err(SimulationError::InvalidConfig(format!(
                "initial_score_max must be at least 1, got {}",
                self.initial_score_max
            )));
        }
        self.ranking.validate()?;
        Ok(())
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an IO, parse or validation error.
    pub fn from_file(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SimulationError::ConfigIo {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| SimulationError::ConfigParse {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Board state captured while workers are running.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// 1-based snapshot number.
    pub index: usize,
    /// Time since the workers started.
    pub elapsed: Duration,
    /// Top rows at capture time.
    pub entries: Vec<RankedEntry>,
}

/// Outcome of a completed run.
#[derive(Clone, Debug)]
pub struct SimulationReport {
    /// Top rows after every worker finished.
    pub final_entries: Vec<RankedEntry>,
    /// Number of `update_score` calls made by workers.
    pub updates_applied: u64,
    /// Snapshots delivered to the callback.
    pub snapshots_taken: usize,
    /// Distinct players on the board at the end.
    pub total_players: usize,
    /// Wall time of the run.
    pub elapsed: Duration,
}

/// Worker-pool driver around a shared board.
pub struct Simulator {
    config: SimulationConfig,
    board: Arc<RankingEngine>,
    players: Vec<PlayerId>,
}

impl Simulator {
    /// Builds a simulator and an empty board.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        let board = Arc::new(RankingEngine::with_config(config.ranking.clone())?);
        let players = (1..=config.players)
            .map(|i| PlayerId::from(format!("User_{i}")))
            .collect();
        Ok(Self {
            config,
            board,
            players,
        })
    }

    /// The shared board.
    #[must_use]
    pub fn board(&self) -> &Arc<RankingEngine> {
        &self.board
    }

    /// Simulated player ids.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Gives every player a random starting score.
    pub fn seed_players(&self) {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        for player in &self.players {
            let score = rng.gen_range(0..self.config.initial_score_max);
            self.board.update_score(player, score);
        }
        debug!(players = self.players.len(), "players seeded");
    }

    /// Runs the worker pool to completion, calling `on_snapshot` between
    /// intervals.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker cannot be spawned or panics, or if the
    /// board is inconsistent once every worker has joined.
    pub fn run(&self, mut on_snapshot: impl FnMut(&Snapshot)) -> SimulationResult<SimulationReport> {
        let start = Instant::now();
        let (jobs, queue) = unbounded::<PlayerId>();
        for player in &self.players {
            for _ in 0..self.config.updates_per_player {
                jobs.send(player.clone())
                    .map_err(|_| SimulationError::QueueClosed)?;
            }
        }
        drop(jobs);
        info!(
            jobs = queue.len(),
            workers = self.config.worker_threads,
            "simulation started"
        );

        let applied = Arc::new(AtomicU64::new(0));
        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for worker in 0..self.config.worker_threads {
            workers.push(self.spawn_worker(worker, queue.clone(), Arc::clone(&applied))?);
        }
        drop(queue);

        let interval = Duration::from_millis(self.config.snapshot_interval_ms);
        for index in 1..=self.config.snapshots {
            thread::sleep(interval);
            let snapshot = Snapshot {
                index,
                elapsed: start.elapsed(),
                entries: self.board.top_n_with_scores(self.config.top_n),
            };
            on_snapshot(&snapshot);
        }

        for (worker, handle) in workers.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| SimulationError::WorkerPanicked(worker))?;
        }

        self.board.check_consistency()?;

        let report = SimulationReport {
            final_entries: self.board.top_n_with_scores(self.config.top_n),
            updates_applied: applied.load(Ordering::Relaxed),
            snapshots_taken: self.config.snapshots,
            total_players: self.board.total_players(),
            elapsed: start.elapsed(),
        };
        info!(
            updates = report.updates_applied,
            players = report.total_players,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "simulation finished"
        );
        Ok(report)
    }

    fn spawn_worker(
        &self,
        worker: usize,
        queue: Receiver<PlayerId>,
        applied: Arc<AtomicU64>,
    ) -> SimulationResult<JoinHandle<()>> {
        let board = Arc::clone(&self.board);
        let max_think = self.config.max_think_time_ms;
        let max_increase = self.config.max_score_increase;
        let seed = self.config.seed.wrapping_add(worker as u64 + 1);

        let handle = thread::Builder::new()
            .name(format!("worker-{worker}"))
            .spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                while let Ok(player) = queue.recv() {
                    if max_think > 0 {
                        thread::sleep(Duration::from_millis(rng.gen_range(0..max_think)));
                    }
                    let current = board.score_of(player.as_str());
                    let score = current + rng.gen_range(1..=max_increase);
                    trace!(worker, player = %player, current, score, "worker update");
                    board.update_score(player, score);
                    applied.fetch_add(1, Ordering::Relaxed);
                }
            })?;
        Ok(handle)
    }
}
