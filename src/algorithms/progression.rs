use crate::path::{angle_between, planar_distance, Path};
use log::{debug, info};
use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;

/// Planar distance at which a waypoint counts as reached.
pub const ARRIVAL_TOLERANCE: f64 = 1.0;
/// Planar distance to the final waypoint accepted during the verify pass.
pub const VERIFY_TOLERANCE: f64 = 2.0;
/// Ticks a lagging agent may spend on one waypoint before it is pushed on.
pub const STALL_LIMIT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// First pass along the path, timing every completed edge.
    Forward,
    /// Edges are timed; waiting for each follower to sit near the final waypoint.
    Verify,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentProgress {
    /// Index of the waypoint the agent is heading for.
    pub target: usize,
    pub stall: u32,
    /// Passed the final waypoint during the forward pass.
    pub exhausted: bool,
    /// Confirmed near the final waypoint during the verify pass.
    pub confirmed: bool,
}

/// Waypoint progression and edge timing for the agents that follow the path.
#[derive(Debug, Clone)]
pub struct PathProgress {
    path: Path,
    following: Vec<bool>,
    followers: Vec<usize>,
    agents: Vec<AgentProgress>,
    tally: Vec<usize>,
    phase: RunPhase,
    confirm_final: bool,
    durations: Vec<f64>,
    edge_started: f64,
}

impl PathProgress {
    /// `followers` are the agents that run the state machine (everyone, or
    /// just the leader). Edge timing starts at `started_at`.
    pub fn new(
        path: Path,
        agents: usize,
        followers: Vec<usize>,
        confirm_final: bool,
        started_at: f64,
    ) -> Self {
        let mut following = vec![false; agents];
        for &i in &followers {
            following[i] = true;
        }
        let tally = vec![0; path.len()];
        Self {
            path,
            following,
            followers,
            agents: vec![AgentProgress::default(); agents],
            tally,
            phase: RunPhase::Forward,
            confirm_final,
            durations: Vec::new(),
            edge_started: started_at,
        }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn phase(&self) -> RunPhase { self.phase }

    pub fn durations(&self) -> &[f64] { &self.durations }

    pub fn into_durations(self) -> Vec<f64> { self.durations }

    pub fn agent(&self, agent: usize) -> &AgentProgress { &self.agents[agent] }

    pub fn target(&self, agent: usize) -> usize { self.agents[agent].target }

    pub fn tally(&self, waypoint: usize) -> usize { self.tally[waypoint] }

    pub fn is_following(&self, agent: usize) -> bool { self.following[agent] }

    /// Arrivals needed at a waypoint before its edge counts as completed.
    pub fn required(&self) -> usize { self.followers.len() }

    /// Point the agent should steer towards, if it follows the path.
    pub fn goal(&self, agent: usize) -> Option<Vector3<f64>> {
        if !self.following[agent] {
            return None;
        }
        match self.phase {
            RunPhase::Forward => Some(self.path.waypoint(self.agents[agent].target)),
            RunPhase::Verify => Some(self.path.last()),
            RunPhase::Done => None,
        }
    }

    /// Feed one agent's position for this tick. Agents are observed one after
    /// another, so later agents see the effects of earlier ones.
    pub fn observe(&mut self, agent: usize, position: &Vector3<f64>, now: f64) {
        if !self.following[agent] {
            return;
        }
        match self.phase {
            RunPhase::Forward => self.observe_forward(agent, position, now),
            RunPhase::Verify => self.observe_verify(agent, position),
            RunPhase::Done => {}
        }
    }

    fn observe_forward(&mut self, agent: usize, position: &Vector3<f64>, now: f64) {
        if self.agents[agent].exhausted {
            return;
        }
        let target = self.agents[agent].target;
        let goal = self.path.waypoint(target);

        let arrived = if target == 0 {
            let next = self.path.waypoint(1);
            planar_distance(position, &next) <= ARRIVAL_TOLERANCE
                || angle_between(&(next - goal), &(position - goal)).is_none_or(|a| a <= FRAC_PI_2)
        } else {
            if self.is_lagging(agent) {
                self.agents[agent].stall += 1;
            }
            let prev = self.path.waypoint(target - 1);
            let stalled = self.agents[agent].stall > STALL_LIMIT;
            let reached = planar_distance(position, &goal) <= ARRIVAL_TOLERANCE
                || angle_between(&(prev - goal), &(position - goal)).is_none_or(|a| a >= FRAC_PI_2);
            if stalled && !reached {
                debug!("agent {} stalled on waypoint {}, forcing advance", agent, target);
            }
            reached || stalled
        };
        if !arrived {
            return;
        }

        if target > 0 {
            for a in self.agents.iter_mut() {
                a.stall = 0;
            }
        }
        self.tally[target] += 1;
        debug_assert!(self.tally[target] <= self.required());

        let state = &mut self.agents[agent];
        if target < self.path.last_index() {
            state.target += 1;
            debug!("agent {} reached waypoint {}", agent, target);
        } else {
            state.exhausted = true;
            debug!("agent {} reached the final waypoint", agent);
        }

        if self.tally[target] == self.required() {
            self.complete_edge(target, now);
        }
    }

    /// Holds the lowest target among followers while someone is already ahead.
    fn is_lagging(&self, agent: usize) -> bool {
        let targets = self.followers.iter().map(|&i| self.agents[i].target);
        let min = targets.clone().min().unwrap_or(0);
        let max = targets.max().unwrap_or(0);
        self.agents[agent].target == min && min != max
    }

    fn complete_edge(&mut self, waypoint: usize, now: f64) {
        let duration = now - self.edge_started;
        self.edge_started = now;
        self.durations.push(duration);
        info!("edge #{}: {:.3}s", self.durations.len() - 1, duration);

        if !self.confirm_final && self.durations.len() == self.path.edge_count() {
            info!("all {} edges timed", self.durations.len());
            self.phase = RunPhase::Done;
        } else if waypoint == self.path.last_index() {
            info!("final waypoint reached by all followers, verifying arrival");
            self.start_verify();
        }
    }

    fn start_verify(&mut self) {
        self.phase = RunPhase::Verify;
        self.agents.fill(AgentProgress::default());
        self.tally.fill(0);
    }

    fn observe_verify(&mut self, agent: usize, position: &Vector3<f64>) {
        let state = &mut self.agents[agent];
        if !state.confirmed && planar_distance(position, &self.path.last()) < VERIFY_TOLERANCE {
            state.confirmed = true;
            debug!("agent {} confirmed at the final waypoint", agent);
        }
        if self.followers.iter().all(|&i| self.agents[i].confirmed) {
            info!("every follower confirmed at the final waypoint");
            self.phase = RunPhase::Done;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: usize) -> Path {
        Path::new((0..points).map(|i| Vector3::new(10.0 * i as f64, 0.0, 1.0)).collect()).unwrap()
    }

    fn v(x: f64, y: f64) -> Vector3<f64> { Vector3::new(x, y, 1.0) }

    #[test]
    fn start_leg_completes_when_every_agent_is_past_the_start() {
        let mut progress = PathProgress::new(line(3), 2, vec![0, 1], false, 0.0);
        progress.observe(0, &v(0.5, 0.0), 0.2);
        assert_eq!(progress.target(0), 1);
        assert_eq!(progress.tally(0), 1);
        assert!(progress.durations().is_empty());

        // behind the start and far from waypoint 1
        progress.observe(1, &v(-3.0, 0.0), 0.2);
        assert_eq!(progress.target(1), 0);

        progress.observe(1, &v(0.1, 0.0), 0.6);
        assert_eq!(progress.target(1), 1);
        assert_eq!(progress.durations(), &[0.6]);
    }

    #[test]
    fn passing_the_perpendicular_plane_counts_as_arrival() {
        let mut progress = PathProgress::new(line(4), 1, vec![0], false, 0.0);
        progress.observe(0, &v(0.0, 0.0), 1.0);
        progress.observe(0, &v(9.0, 3.0), 2.0);
        assert_eq!(progress.target(0), 1);
        progress.observe(0, &v(10.2, 3.0), 3.0);
        assert_eq!(progress.target(0), 2);
        assert_eq!(progress.durations(), &[1.0, 2.0]);
    }

    #[test]
    fn lagging_agent_escapes_after_stall_limit() {
        let mut progress = PathProgress::new(line(4), 2, vec![0, 1], false, 0.0);
        progress.observe(0, &v(0.0, 0.0), 0.0);
        progress.observe(1, &v(0.0, 0.0), 0.0);
        progress.observe(0, &v(10.0, 0.0), 1.0);
        assert_eq!(progress.target(0), 2);

        let stuck = v(0.0, 5.0);
        for _ in 0..STALL_LIMIT {
            progress.observe(1, &stuck, 2.0);
        }
        assert_eq!(progress.target(1), 1);
        assert_eq!(progress.agent(1).stall, STALL_LIMIT);

        progress.observe(1, &stuck, 3.0);
        assert_eq!(progress.target(1), 2);
        assert_eq!(progress.agent(1).stall, 0);
        assert_eq!(progress.tally(1), 2);
        assert_eq!(progress.durations().len(), 2);
    }

    #[test]
    fn agents_level_with_each_other_do_not_stall() {
        let mut progress = PathProgress::new(line(3), 2, vec![0, 1], false, 0.0);
        progress.observe(0, &v(0.0, 0.0), 0.0);
        progress.observe(1, &v(0.0, 0.0), 0.0);
        for _ in 0..100 {
            progress.observe(0, &v(0.0, 5.0), 1.0);
            progress.observe(1, &v(0.0, -5.0), 1.0);
        }
        assert_eq!(progress.target(0), 1);
        assert_eq!(progress.target(1), 1);
        assert_eq!(progress.agent(0).stall, 0);
    }

    #[test]
    fn forward_pass_stops_after_edge_count_durations() {
        let mut progress = PathProgress::new(line(2), 1, vec![0], false, 0.0);
        progress.observe(0, &v(0.0, 0.0), 0.2);
        assert_eq!(progress.phase(), RunPhase::Done);
        assert_eq!(progress.durations(), &[0.2]);
        assert_eq!(progress.goal(0), None);
    }

    #[test]
    fn confirmed_run_verifies_final_arrival() {
        let mut progress = PathProgress::new(line(2), 1, vec![0], true, 0.0);
        progress.observe(0, &v(0.0, 0.0), 0.2);
        assert_eq!(progress.phase(), RunPhase::Forward);
        progress.observe(0, &v(10.0, 0.0), 4.0);
        assert_eq!(progress.phase(), RunPhase::Verify);
        assert_eq!(progress.durations().len(), 2);
        assert_eq!(progress.target(0), 0);
        assert_eq!(progress.tally(1), 0);
        assert_eq!(progress.goal(0), Some(Vector3::new(10.0, 0.0, 1.0)));

        progress.observe(0, &v(13.0, 0.0), 4.2);
        assert_eq!(progress.phase(), RunPhase::Verify);
        progress.observe(0, &v(11.5, 0.0), 4.4);
        assert_eq!(progress.phase(), RunPhase::Done);
    }

    #[test]
    fn verify_waits_for_every_follower() {
        let mut progress = PathProgress::new(line(2), 2, vec![0, 1], true, 0.0);
        progress.observe(0, &v(0.0, 0.0), 0.2);
        progress.observe(1, &v(0.1, 0.5), 0.2);
        progress.observe(0, &v(10.0, 0.0), 5.0);
        progress.observe(1, &v(10.0, 0.5), 5.0);
        assert_eq!(progress.phase(), RunPhase::Verify);
        progress.observe(0, &v(10.0, 0.0), 5.2);
        assert!(progress.agent(0).confirmed);
        progress.observe(1, &v(20.0, 0.0), 5.2);
        assert_eq!(progress.phase(), RunPhase::Verify);
        progress.observe(1, &v(10.0, 1.0), 5.4);
        assert_eq!(progress.phase(), RunPhase::Done);
    }

    #[test]
    fn only_the_leader_progresses_in_leader_mode() {
        let mut progress = PathProgress::new(line(3), 3, vec![1], false, 0.0);
        assert_eq!(progress.required(), 1);
        progress.observe(0, &v(0.0, 0.0), 0.2);
        progress.observe(2, &v(0.0, 0.0), 0.2);
        assert_eq!(progress.tally(0), 0);
        assert_eq!(progress.goal(0), None);

        progress.observe(1, &v(0.0, 0.0), 0.2);
        assert_eq!(progress.tally(0), 1);
        assert_eq!(progress.durations().len(), 1);
        assert_eq!(progress.goal(1), Some(Vector3::new(10.0, 0.0, 1.0)));
    }

    #[test]
    fn targets_never_regress_and_tally_stays_bounded() {
        let mut progress = PathProgress::new(line(5), 3, vec![0, 1, 2], false, 0.0);
        let mut last = [0usize; 3];
        let mut t = 0.0;
        for step in 0..400 {
            t += 0.2;
            for agent in 0..3 {
                let x = step as f64 * 0.15 - agent as f64;
                progress.observe(agent, &v(x, agent as f64 * 0.3), t);
                if progress.phase() == RunPhase::Done {
                    break;
                }
                assert!(progress.target(agent) >= last[agent]);
                last[agent] = progress.target(agent);
                for w in 0..5 {
                    assert!(progress.tally(w) <= 3);
                }
            }
            if progress.phase() == RunPhase::Done {
                break;
            }
        }
        assert_eq!(progress.phase(), RunPhase::Done);
        assert_eq!(progress.durations().len(), 4);
    }
}
