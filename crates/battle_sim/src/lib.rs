//! Command-line battle simulator.
//!
//! Loads a battle scenario, runs it through the external engine with
//! [`battle_core`] and reports the result:
//!
//! - **run**: one battle, survivors printed after every round
//! - **simulate**: many simulations in one engine invocation, summarized
//! - **batch**: many engine invocations in parallel, summarized
//!
//! # Example
//!
//! ```bash
//! # One battle with a fixed seed
//! cargo run -p battle_sim -- run crates/battle_sim/scenarios/og_example.ron --seed 42
//!
//! # 100 simulations, JSON summary
//! cargo run -p battle_sim -- simulate crates/battle_sim/scenarios/og_example.ron -n 100 --json
//! ```

pub mod batch;
pub mod report;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use report::{SampleStats, Summary};
pub use scenario::{EngineConfig, Scenario, ScenarioError, UnitNames, UnitSource};
