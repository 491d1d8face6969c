use crate::algorithms::flocking::{power_scaled, FlockForces};
use crate::config::GainPair;
use nalgebra::Vector3;

/// Below this altitude the vertical output is overridden.
pub const GROUND_ALTITUDE: f64 = 0.5;
/// Vertical output used near the ground.
pub const GROUND_CLIMB: f64 = 0.05;

/// Repulsion away from the nearest obstacle offset, planar by construction.
pub fn avoidance_force(obstacle: &Vector3<f64>, pair: GainPair) -> Vector3<f64> {
    power_scaled(-obstacle, pair)
}

/// All force terms of one agent for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceField {
    pub flock: FlockForces,
    pub destination: Vector3<f64>,
    pub avoidance: Vector3<f64>,
}

impl Default for ForceField {
    fn default() -> Self {
        Self {
            flock: FlockForces::default(),
            destination: Vector3::zeros(),
            avoidance: Vector3::zeros(),
        }
    }
}

impl ForceField {
    /// Sum of every term, with the ground floor applied for an agent at `altitude`.
    pub fn output(&self, altitude: f64) -> Vector3<f64> {
        let mut out = self.flock.total() + self.destination + self.avoidance;
        if altitude < GROUND_ALTITUDE {
            out.z = GROUND_CLIMB;
        }
        out
    }
}
