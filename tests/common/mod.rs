#![allow(dead_code)]

use nalgebra::Vector3;
use quadflock::Environment;

/// One force command as seen by the environment.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub agent: usize,
    pub position: Vector3<f64>,
    pub force: Vector3<f64>,
}

/// Kinematic fake: each pace moves an agent by `force * period` and reports
/// that force as its velocity. Disconnects after `max_paces` paces.
#[derive(Debug, Clone)]
pub struct KinematicEnv {
    pub positions: Vec<Vector3<f64>>,
    pub velocities: Vec<Vector3<f64>>,
    pub obstacles: Vec<Option<Vector3<f64>>>,
    pub commands: Vec<Command>,
    pub time: f64,
    pub paces: usize,
    pub max_paces: usize,
    pending: Vec<Vector3<f64>>,
}

impl KinematicEnv {
    pub fn new(positions: Vec<Vector3<f64>>) -> Self {
        let n = positions.len();
        Self {
            positions,
            velocities: vec![Vector3::zeros(); n],
            obstacles: vec![None; n],
            commands: Vec::new(),
            time: 0.0,
            paces: 0,
            max_paces: 10_000,
            pending: vec![Vector3::zeros(); n],
        }
    }

    pub fn with_max_paces(mut self, max_paces: usize) -> Self {
        self.max_paces = max_paces;
        self
    }
}

impl Environment for KinematicEnv {
    fn agent_count(&self) -> usize { self.positions.len() }

    fn position(&self, agent: usize) -> Vector3<f64> { self.positions[agent] }

    fn velocity(&self, agent: usize) -> Vector3<f64> { self.velocities[agent] }

    fn nearest_obstacle(&self, agent: usize) -> Option<Vector3<f64>> { self.obstacles[agent] }

    fn set_output_force(&mut self, agent: usize, force: Vector3<f64>) {
        self.pending[agent] = force;
        self.commands.push(Command {
            agent,
            position: self.positions[agent],
            force,
        });
    }

    fn is_connected(&self) -> bool { self.paces < self.max_paces }

    fn now(&self) -> f64 { self.time }

    fn pace(&mut self, period: f64) {
        self.time += period;
        self.paces += 1;
        for i in 0..self.positions.len() {
            self.positions[i] += self.pending[i] * period;
            self.velocities[i] = self.pending[i];
        }
    }
}

pub fn line_path(points: usize, spacing: f64) -> Vec<[f64; 3]> {
    (0..points).map(|i| [spacing * i as f64, 0.0, 0.0]).collect()
}
