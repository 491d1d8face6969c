use crate::config::{FollowMode, SwarmConfig};
use crate::environment::Environment;
use crate::models::obstacles::ObstaclePoly;
use crate::path::Path;
use crate::sim::{BodyConfig, Simulator};
use nalgebra::Vector3;

pub const DEMO_DT: f64 = 0.01;
/// Linear drag per unit mass; with drag 1 the cruise speed equals the commanded force.
pub const DEMO_DRAG: f64 = 1.0;
pub const DEMO_SENSING_RANGE: f64 = 1.5;
pub const DEMO_TIME_LIMIT: f64 = 600.0;
pub const FORMATION_SPACING: f64 = 1.5;

/// Simulated quadrotor swarm: point masses with drag driven by the commanded
/// force, a proximity sensor per agent and a simulation clock.
#[derive(Debug)]
pub struct QuadrotorSwarm {
    sim: Simulator,
    obstacles: Vec<ObstaclePoly>,
    sensing_range: f64,
    time_limit: Option<f64>,
    connected: bool,
}

impl QuadrotorSwarm {
    pub fn new(configs: &[BodyConfig], dt: f64) -> Self {
        Self {
            sim: Simulator::new(configs, dt),
            obstacles: Vec::new(),
            sensing_range: DEMO_SENSING_RANGE,
            time_limit: None,
            connected: true,
        }
    }

    pub fn with_obstacles(mut self, obstacles: Vec<ObstaclePoly>) -> Self {
        self.obstacles = obstacles;
        self
    }

    pub fn with_sensing_range(mut self, range: f64) -> Self {
        self.sensing_range = range;
        self
    }

    /// Report a lost connection once simulation time reaches `seconds`.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn disconnect(&mut self) { self.connected = false; }

    pub fn len(&self) -> usize { self.sim.len() }

    pub fn is_empty(&self) -> bool { self.sim.is_empty() }

    pub fn time(&self) -> f64 { self.sim.time() }

    pub fn positions(&self) -> &[Vector3<f64>] { self.sim.positions() }

    /// Force most recently commanded for agent `i`.
    pub fn force(&self, i: usize) -> Vector3<f64> { self.sim.force(i) }
}

impl Environment for QuadrotorSwarm {
    fn agent_count(&self) -> usize { self.sim.len() }

    fn position(&self, agent: usize) -> Vector3<f64> { self.sim.positions()[agent] }

    fn velocity(&self, agent: usize) -> Vector3<f64> { self.sim.velocities()[agent] }

    fn nearest_obstacle(&self, agent: usize) -> Option<Vector3<f64>> {
        let from = self.sim.positions()[agent];
        let t = self.sim.time();
        self.obstacles
            .iter()
            .filter_map(|o| o.surface_offset(&from, t))
            .filter(|offset| offset.norm() <= self.sensing_range)
            .min_by(|a, b| a.norm().total_cmp(&b.norm()))
    }

    fn set_output_force(&mut self, agent: usize, force: Vector3<f64>) {
        self.sim.set_force(agent, force);
    }

    fn is_connected(&self) -> bool {
        self.connected && self.time_limit.is_none_or(|limit| self.sim.time() < limit)
    }

    fn now(&self) -> f64 { self.sim.time() }

    fn pace(&mut self, period: f64) { self.sim.advance(period); }
}

/// Grid of agents on the ground behind the first waypoint, facing the first edge.
pub fn formation_configs(count: usize, path: &Path, spacing: f64) -> Vec<BodyConfig> {
    let mut configs = Vec::with_capacity(count);
    if count == 0 {
        return configs;
    }

    let start = path.waypoint(0);
    let heading = path.waypoint(1) - start;
    let heading = Vector3::new(heading.x, heading.y, 0.0);
    let heading = if heading.norm_squared() > 1.0e-12 {
        heading.normalize()
    } else {
        Vector3::new(1.0, 0.0, 0.0)
    };
    let lateral = Vector3::new(-heading.y, heading.x, 0.0);

    let side = (count as f64).sqrt().ceil() as usize;
    let offset = (side as f64 - 1.0) * spacing * 0.5;
    for k in 0..count {
        let row = (k / side) as f64;
        let col = (k % side) as f64;
        let mut pos = start - heading * (row * spacing) + lateral * (col * spacing - offset);
        pos.z = 0.0;
        configs.push(BodyConfig::at_rest(pos, DEMO_DRAG));
    }
    configs
}

/// Square route with reference tuning, used by the demo binary.
pub fn demo_config() -> SwarmConfig {
    SwarmConfig {
        agents: 5,
        path: vec![
            [0.0, 0.0, 1.0],
            [10.0, 0.0, 1.0],
            [10.0, 10.0, 1.0],
            [0.0, 10.0, 1.0],
        ],
        mode: FollowMode::AllFollow,
        ..SwarmConfig::default()
    }
}
