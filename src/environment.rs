use nalgebra::Vector3;
use std::time::Duration;

/// Sensing/actuation side of a swarm run. The engine calls it synchronously,
/// once per agent per tick, and never from more than one thread.
pub trait Environment {
    /// Number of agents the environment can sense and command.
    fn agent_count(&self) -> usize;

    fn position(&self, agent: usize) -> Vector3<f64>;

    fn velocity(&self, agent: usize) -> Vector3<f64>;

    /// Offset from the agent to the nearest sensed obstacle, `None` when the
    /// sensor has no reading this tick.
    fn nearest_obstacle(&self, agent: usize) -> Option<Vector3<f64>>;

    /// Fire-and-forget force command for the agent's target.
    fn set_output_force(&mut self, agent: usize, force: Vector3<f64>);

    fn is_connected(&self) -> bool;

    /// Monotonic clock in seconds, used only for edge timing.
    fn now(&self) -> f64;

    /// Inter-tick pacing. Real deployments sleep; simulations advance time.
    fn pace(&mut self, period: f64) {
        if period > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(period));
        }
    }
}

impl<E: Environment + ?Sized> Environment for &mut E {
    fn agent_count(&self) -> usize { (**self).agent_count() }

    fn position(&self, agent: usize) -> Vector3<f64> { (**self).position(agent) }

    fn velocity(&self, agent: usize) -> Vector3<f64> { (**self).velocity(agent) }

    fn nearest_obstacle(&self, agent: usize) -> Option<Vector3<f64>> {
        (**self).nearest_obstacle(agent)
    }

    fn set_output_force(&mut self, agent: usize, force: Vector3<f64>) {
        (**self).set_output_force(agent, force)
    }

    fn is_connected(&self) -> bool { (**self).is_connected() }

    fn now(&self) -> f64 { (**self).now() }

    fn pace(&mut self, period: f64) { (**self).pace(period) }
}
