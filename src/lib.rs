//! Per-tick force computation for a quadrotor swarm travelling along a shared
//! polyline, with edge-by-edge traversal timing.
//!
//! Each tick the [`Engine`] reads a consistent snapshot from its
//! [`Environment`], builds the visibility graph, sums separation, cohesion,
//! alignment, path-following and obstacle-avoidance terms, advances the
//! waypoint state machine and emits one force per agent.

pub mod algorithms;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod models;
pub mod path;
pub mod sim;

pub use algorithms::progression::RunPhase;
pub use config::{FollowMode, GainPair, Gains, SwarmConfig};
pub use engine::{Engine, RunOutcome, SwarmSnapshot};
pub use environment::Environment;
pub use error::{Result, SwarmError};
pub use path::Path;
pub use sim::{BodyConfig, Simulator};

/// Build an engine over `env` and tick it to the end.
pub fn run_swarm<E: Environment>(config: SwarmConfig, env: E) -> Result<RunOutcome> {
    let mut engine = Engine::new(config, env)?;
    Ok(engine.run())
}
