use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Начальная конфигурация одного коптера для симулятора.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub mass: f64,
    /// state = [x, y, z, vx, vy, vz]
    pub state: [f64; 6],
    pub drag_coefficient: f64,
}

impl BodyConfig {
    pub fn new(mass: f64, state: [f64; 6]) -> Self {
        Self {
            mass,
            state,
            drag_coefficient: 0.0,
        }
    }

    pub fn at_rest(position: Vector3<f64>, drag_coefficient: f64) -> Self {
        Self {
            mass: 1.0,
            state: [position.x, position.y, position.z, 0.0, 0.0, 0.0],
            drag_coefficient,
        }
    }
}

/// Групповой симулятор материальных точек (RK4).
/// Хранит позиции/скорости (SoA), массы, коэффициенты сопротивления и внешние силы.
#[derive(Debug)]
pub struct Simulator {
    x: Vec<Vector3<f64>>,      // позиции
    v: Vec<Vector3<f64>>,      // скорости
    mass: Vec<f64>,            // массы
    drag: Vec<f64>,            // коэффициенты сопротивления
    forces: Vec<Vector3<f64>>, // внешние силы, держатся до следующей команды
    time: f64,
    dt: f64,

    // Рабочие буферы для RK4, чтобы не аллоцировать на каждом шаге
    k1x: Vec<Vector3<f64>>, k1v: Vec<Vector3<f64>>,
    k2x: Vec<Vector3<f64>>, k2v: Vec<Vector3<f64>>,
    k3x: Vec<Vector3<f64>>, k3v: Vec<Vector3<f64>>,
    k4x: Vec<Vector3<f64>>, k4v: Vec<Vector3<f64>>,
    tmp_v: Vec<Vector3<f64>>,
}

impl Simulator {
    pub fn new(configs: &[BodyConfig], dt: f64) -> Self {
        let n = configs.len();
        let x = configs
            .iter()
            .map(|c| Vector3::new(c.state[0], c.state[1], c.state[2]))
            .collect();
        let v = configs
            .iter()
            .map(|c| Vector3::new(c.state[3], c.state[4], c.state[5]))
            .collect();
        let zero = || vec![Vector3::zeros(); n];

        Self {
            x,
            v,
            mass: configs.iter().map(|c| c.mass).collect(),
            drag: configs.iter().map(|c| c.drag_coefficient).collect(),
            forces: zero(),
            time: 0.0,
            dt,
            k1x: zero(), k1v: zero(),
            k2x: zero(), k2v: zero(),
            k3x: zero(), k3v: zero(),
            k4x: zero(), k4v: zero(),
            tmp_v: zero(),
        }
    }

    pub fn len(&self) -> usize { self.x.len() }
    pub fn is_empty(&self) -> bool { self.x.is_empty() }
    pub fn time(&self) -> f64 { self.time }
    pub fn dt(&self) -> f64 { self.dt }

    pub fn positions(&self) -> &[Vector3<f64>] { &self.x }

    pub fn velocities(&self) -> &[Vector3<f64>] { &self.v }

    pub fn force(&self, i: usize) -> Vector3<f64> { self.forces[i] }

    /// Назначить внешнюю силу для объекта i
    pub fn set_force(&mut self, i: usize, f: Vector3<f64>) {
        self.forces[i] = f;
    }

    fn acc(&self, i: usize, v: Vector3<f64>) -> Vector3<f64> {
        (self.forces[i] - self.drag[i] * v) / self.mass[i]
    }

    /// Один шаг RK4 с силами, постоянными на шаге.
    pub fn step(&mut self) {
        self.step_by(self.dt);
    }

    fn step_by(&mut self, dt: f64) {
        let n = self.len();
        if n == 0 {
            self.time += dt;
            return;
        }

        // k1
        for i in 0..n {
            self.k1x[i] = self.v[i];
            self.k1v[i] = self.acc(i, self.v[i]);
            self.tmp_v[i] = self.v[i] + 0.5 * dt * self.k1v[i];
        }

        // k2
        for i in 0..n {
            self.k2x[i] = self.tmp_v[i];
            self.k2v[i] = self.acc(i, self.tmp_v[i]);
            self.tmp_v[i] = self.v[i] + 0.5 * dt * self.k2v[i];
        }

        // k3
        for i in 0..n {
            self.k3x[i] = self.tmp_v[i];
            self.k3v[i] = self.acc(i, self.tmp_v[i]);
            self.tmp_v[i] = self.v[i] + dt * self.k3v[i];
        }

        // k4
        for i in 0..n {
            self.k4x[i] = self.tmp_v[i];
            self.k4v[i] = self.acc(i, self.tmp_v[i]);
        }

        // Обновление состояния
        for i in 0..n {
            self.x[i] += dt * (self.k1x[i] + 2.0 * self.k2x[i] + 2.0 * self.k3x[i] + self.k4x[i]) / 6.0;
            self.v[i] += dt * (self.k1v[i] + 2.0 * self.k2v[i] + 2.0 * self.k3v[i] + self.k4v[i]) / 6.0;
        }

        self.time += dt;
    }

    /// Прогнать модель вперёд ровно на `duration` секунд: целые шаги dt плюс
    /// укороченный хвостовой шаг.
    pub fn advance(&mut self, duration: f64) {
        if duration <= 0.0 || self.dt <= 0.0 {
            return;
        }
        let steps = (duration / self.dt).floor() as usize;
        for _ in 0..steps {
            self.step();
        }
        let rest = duration - steps as f64 * self.dt;
        if rest > self.dt * 1.0e-9 {
            self.step_by(rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constant_force_without_drag() {
        let mut sim = Simulator::new(&[BodyConfig::new(2.0, [0.0; 6])], 0.01);
        sim.set_force(0, Vector3::new(4.0, 0.0, 0.0));
        sim.advance(1.0);
        // x = a t^2 / 2 with a = 2
        assert_relative_eq!(sim.positions()[0].x, 1.0, epsilon = 1.0e-9);
        assert_relative_eq!(sim.velocities()[0].x, 2.0, epsilon = 1.0e-9);
        assert_relative_eq!(sim.time(), 1.0, epsilon = 1.0e-9);
    }

    #[test]
    fn drag_limits_speed_to_force() {
        let body = BodyConfig::at_rest(Vector3::zeros(), 1.0);
        let mut sim = Simulator::new(&[body], 0.01);
        sim.set_force(0, Vector3::new(0.0, 1.5, 0.0));
        sim.advance(20.0);
        assert_relative_eq!(sim.velocities()[0].y, 1.5, epsilon = 1.0e-6);
    }

    #[test]
    fn advance_shorter_than_dt_still_moves_clock() {
        let mut sim = Simulator::new(&[BodyConfig::new(1.0, [0.0; 6])], 0.01);
        sim.set_force(0, Vector3::new(1.0, 0.0, 0.0));
        for _ in 0..10 {
            sim.advance(0.004);
        }
        assert_relative_eq!(sim.time(), 0.04, epsilon = 1.0e-12);
        assert_relative_eq!(sim.positions()[0].x, 0.5 * 0.04 * 0.04, epsilon = 1.0e-12);
    }

    #[test]
    fn advance_covers_fractional_remainder() {
        let mut sim = Simulator::new(&[BodyConfig::new(1.0, [0.0; 6])], 0.01);
        sim.advance(0.125);
        assert_relative_eq!(sim.time(), 0.125, epsilon = 1.0e-12);
    }
}
