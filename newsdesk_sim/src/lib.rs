//! Newsdesk Simulation Driver
//!
//! Runs the panel protocol from `newsdesk_core` two ways:
//! - **Threaded** (`Simulation`): one thread per actor, real interruptible
//!   delays scaled by the config's `pace`, and a tick loop that samples for
//!   breaking news.
//! - **Lockstep** (`LockstepHarness`): one thread, caller-chosen decision
//!   order, no timing. Identical inputs give identical event sequences.
//!
//! # Usage
//!
//! ```ignore
//! use newsdesk_sim::{ScenarioId, Simulation};
//!
//! let scenario = ScenarioId::AllAnswer;
//! let report = Simulation::new(scenario.config(), scenario.random(42)?)?.run()?;
//! println!("{}", report.to_json()?);
//! ```

mod error;
mod exporter;
mod harness;
mod runner;
pub mod scenarios;

pub use error::SimError;
pub use exporter::SimulationReport;
pub use harness::LockstepHarness;
pub use runner::Simulation;
pub use scenarios::ScenarioId;
