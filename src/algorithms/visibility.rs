use nalgebra::Vector3;

/// Directed N×N visibility matrix, stored row-major and reused across ticks.
#[derive(Debug, Clone)]
pub struct VisibilityGraph {
    n: usize,
    cells: Vec<bool>,
}

impl VisibilityGraph {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![false; n * n],
        }
    }

    pub fn len(&self) -> usize { self.n }

    pub fn is_empty(&self) -> bool { self.n == 0 }

    /// Recompute from a position snapshot. `j` is visible from `i` iff their
    /// distance is strictly below `view_range`; the diagonal stays false.
    pub fn rebuild(&mut self, positions: &[Vector3<f64>], view_range: f64) {
        debug_assert_eq!(positions.len(), self.n);
        let range2 = view_range * view_range;
        for i in 0..self.n {
            for j in 0..self.n {
                self.cells[i * self.n + j] =
                    i != j && (positions[i] - positions[j]).norm_squared() < range2;
            }
        }
    }

    pub fn is_visible(&self, i: usize, j: usize) -> bool { self.cells[i * self.n + j] }

    pub fn row(&self, i: usize) -> &[bool] { &self.cells[i * self.n..(i + 1) * self.n] }

    /// Indices of agents visible from `i`.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(i)
            .iter()
            .enumerate()
            .filter_map(|(j, &seen)| seen.then_some(j))
    }

    pub fn neighbor_count(&self, i: usize) -> usize { self.row(i).iter().filter(|&&v| v).count() }
}
