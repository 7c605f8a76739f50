//! # PODIUM
//!
//! The main crate: the ranking engine plus a driver that exercises it the
//! way a game server would.
//!
//! ```text
//!   seed_players() ──> RankingEngine <── worker-0 ┐
//!                           ▲            worker-1 ├── crossbeam job queue
//!                           │            worker-N ┘
//!                   snapshot every interval
//! ```
//!
//! ## Modules
//!
//! - `simulation`: Worker pool driver and its config

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod simulation;

// Re-export the engine
pub use podium_ranking as ranking;

pub use podium_ranking::{PlayerId, RankedEntry, RankingConfig, RankingEngine, Score};
pub use simulation::{SimulationConfig, SimulationError, SimulationReport, Simulator, Snapshot};
