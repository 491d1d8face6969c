use nalgebra::Vector3;

/// Agent closest to `goal`; ties go to the lowest index. `None` for an empty swarm.
pub fn elect_leader(positions: &[Vector3<f64>], goal: &Vector3<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in positions.iter().enumerate() {
        let dist = (goal - p).norm();
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}
