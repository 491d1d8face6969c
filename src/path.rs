use crate::error::{Result, SwarmError};
use nalgebra::Vector3;

/// Shared polyline the swarm travels along. Always holds at least one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Vector3<f64>>,
}

impl Path {
    pub fn new(waypoints: Vec<Vector3<f64>>) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(SwarmError::MalformedPath {
                waypoints: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    pub fn from_points(points: &[[f64; 3]]) -> Result<Self> {
        Self::new(points.iter().map(|p| Vector3::new(p[0], p[1], p[2])).collect())
    }

    pub fn len(&self) -> usize { self.waypoints.len() }

    /// Number of edges, `len() - 1`.
    pub fn edge_count(&self) -> usize { self.waypoints.len() - 1 }

    pub fn last_index(&self) -> usize { self.waypoints.len() - 1 }

    pub fn waypoint(&self, index: usize) -> Vector3<f64> { self.waypoints[index] }

    pub fn last(&self) -> Vector3<f64> { self.waypoints[self.last_index()] }

    pub fn waypoints(&self) -> &[Vector3<f64>] { &self.waypoints }
}

/// Distance in the ground (XY) plane.
pub fn planar_distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle between two vectors in radians, `None` if either has zero length.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return None;
    }
    Some((a.dot(b) / denom).clamp(-1.0, 1.0).acos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rejects_single_waypoint() {
        let err = Path::from_points(&[[0.0, 0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, SwarmError::MalformedPath { waypoints: 1 }));
        assert!(Path::new(Vec::new()).is_err());
    }

    #[test]
    fn planar_distance_ignores_altitude() {
        let a = Vector3::new(0.0, 0.0, 5.0);
        let b = Vector3::new(3.0, 4.0, -2.0);
        assert_relative_eq!(planar_distance(&a, &b), 5.0);
    }

    #[test]
    fn angle_of_perpendicular_vectors() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 2.0, 0.0);
        assert_relative_eq!(angle_between(&a, &b).unwrap(), FRAC_PI_2);
        assert!(angle_between(&a, &Vector3::zeros()).is_none());
    }
}
