use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Smallest surface offset reported, so an agent inside an obstacle is still pushed out.
const MIN_SURFACE_OFFSET: f64 = 1.0e-3;

/// Spherical obstacle of radius `d` moving along a quadratic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePoly {
    /// p(t) = a2 * t^2 + a1 * t + a0
    pub a2: [f64; 3],
    pub a1: [f64; 3],
    pub a0: [f64; 3],
    pub d: f64,
}

impl ObstaclePoly {
    pub fn fixed(center: [f64; 3], d: f64) -> Self {
        Self {
            a2: [0.0; 3],
            a1: [0.0; 3],
            a0: center,
            d,
        }
    }

    pub fn pos(&self, t: f64) -> Vector3<f64> {
        Vector3::new(
            self.a2[0] * t * t + self.a1[0] * t + self.a0[0],
            self.a2[1] * t * t + self.a1[1] * t + self.a0[1],
            self.a2[2] * t * t + self.a1[2] * t + self.a0[2],
        )
    }

    /// Offset from `from` to the closest surface point at time `t`.
    /// `None` when `from` sits exactly on the centre.
    pub fn surface_offset(&self, from: &Vector3<f64>, t: f64) -> Option<Vector3<f64>> {
        let to_center = self.pos(t) - from;
        let dist = to_center.norm();
        if dist == 0.0 {
            return None;
        }
        let gap = (dist - self.d).max(MIN_SURFACE_OFFSET);
        Some(to_center * (gap / dist))
    }
}

/// Two pillars and a slow drifter along the demo route.
pub fn demo_obstacles() -> Vec<ObstaclePoly> {
    vec![
        ObstaclePoly::fixed([5.0, 1.8, 1.0], 0.4),
        ObstaclePoly::fixed([11.5, 5.0, 1.0], 0.5),
        // drifts across the last leg: p = [4 + 0.01 t, 11.5 - 0.02 t, 1]
        ObstaclePoly {
            a2: [0.0; 3],
            a1: [0.01, -0.02, 0.0],
            a0: [4.0, 11.5, 1.0],
            d: 0.3,
        },
    ]
}
