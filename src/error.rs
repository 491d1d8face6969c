/// Errors raised while setting up a swarm run.
///
/// The tick loop itself never fails: missing sensor data and degenerate vectors
/// collapse to zero contributions, and a lost connection ends the run with the
/// partial timings.
#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    #[error("path needs at least 2 waypoints, got {waypoints}")]
    MalformedPath { waypoints: usize },
    #[error("swarm must contain at least one agent")]
    NoAgents,
    #[error("config asks for {agents} agents but the environment has {available}")]
    TooFewBodies { agents: usize, available: usize },
    #[error("invalid value {value} for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SwarmError>;
