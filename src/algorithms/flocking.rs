use crate::algorithms::visibility::VisibilityGraph;
use crate::config::GainPair;
use nalgebra::Vector3;

/// `v * gain / |v|^power`, or zero for a zero-length `v`.
pub fn power_scaled(v: Vector3<f64>, pair: GainPair) -> Vector3<f64> {
    let norm = v.norm();
    if norm == 0.0 {
        return Vector3::zeros();
    }
    v * (pair.gain / norm.powf(pair.power))
}

/// Reynolds terms for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockForces {
    pub separation: Vector3<f64>,
    pub cohesion: Vector3<f64>,
    pub alignment: Vector3<f64>,
}

impl Default for FlockForces {
    fn default() -> Self {
        Self {
            separation: Vector3::zeros(),
            cohesion: Vector3::zeros(),
            alignment: Vector3::zeros(),
        }
    }
}

impl FlockForces {
    pub fn total(&self) -> Vector3<f64> { self.separation + self.cohesion + self.alignment }
}

#[derive(Debug, Clone)]
pub struct Flocking {
    pub separation: GainPair,
    pub cohesion: GainPair,
    pub alignment: GainPair,
}

impl Flocking {
    pub fn new(separation: GainPair, cohesion: GainPair, alignment: GainPair) -> Self {
        Self {
            separation,
            cohesion,
            alignment,
        }
    }

    /// Fill `out[i]` for every agent from one consistent snapshot.
    #[cfg(not(feature = "parallel"))]
    pub fn apply(
        &self,
        positions: &[Vector3<f64>],
        velocities: &[Vector3<f64>],
        graph: &VisibilityGraph,
        out: &mut [FlockForces],
    ) {
        for (i, f) in out.iter_mut().enumerate() {
            *f = self.agent_forces(i, positions, velocities, graph);
        }
    }

    /// Параллельный вариант (только если включена фича parallel).
    #[cfg(feature = "parallel")]
    pub fn apply(
        &self,
        positions: &[Vector3<f64>],
        velocities: &[Vector3<f64>],
        graph: &VisibilityGraph,
        out: &mut [FlockForces],
    ) {
        use rayon::prelude::*;
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, f)| *f = self.agent_forces(i, positions, velocities, graph));
    }

    pub fn agent_forces(
        &self,
        i: usize,
        positions: &[Vector3<f64>],
        velocities: &[Vector3<f64>],
        graph: &VisibilityGraph,
    ) -> FlockForces {
        let pos_i = positions[i];
        let mut separation = Vector3::zeros();
        let mut center = Vector3::zeros();
        let mut mean_vel = Vector3::zeros();
        let mut neighbors = 0usize;

        for j in graph.neighbors(i) {
            separation += power_scaled(pos_i - positions[j], self.separation);
            center += positions[j];
            mean_vel += velocities[j];
            neighbors += 1;
        }

        let mut forces = FlockForces {
            separation,
            ..FlockForces::default()
        };
        if neighbors > 0 {
            let inv = 1.0 / neighbors as f64;
            forces.cohesion = power_scaled(center * inv - pos_i, self.cohesion);
            forces.alignment = power_scaled(mean_vel * inv, self.alignment);
        }
        forces
    }
}
