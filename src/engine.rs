use crate::algorithms::avoidance::{avoidance_force, ForceField};
use crate::algorithms::flocking::{power_scaled, FlockForces, Flocking};
use crate::algorithms::leader::elect_leader;
use crate::algorithms::progression::{PathProgress, RunPhase};
use crate::algorithms::visibility::VisibilityGraph;
use crate::config::{FollowMode, SwarmConfig};
use crate::environment::Environment;
use crate::error::{Result, SwarmError};
use log::{info, warn};
use nalgebra::Vector3;

/// What a run hands back: every edge duration recorded, in completion order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The environment went away before the run finished.
    InProgress(Vec<f64>),
    Completed(Vec<f64>),
}

impl RunOutcome {
    pub fn durations(&self) -> &[f64] {
        match self {
            RunOutcome::InProgress(d) | RunOutcome::Completed(d) => d,
        }
    }

    pub fn into_durations(self) -> Vec<f64> {
        match self {
            RunOutcome::InProgress(d) | RunOutcome::Completed(d) => d,
        }
    }

    pub fn is_completed(&self) -> bool { matches!(self, RunOutcome::Completed(_)) }
}

/// Kinematic state of the whole swarm, captured before any force is computed.
#[derive(Debug, Clone)]
pub struct SwarmSnapshot {
    pub positions: Vec<Vector3<f64>>,
    pub velocities: Vec<Vector3<f64>>,
    /// Nearest obstacle offsets with the vertical component zeroed.
    pub obstacles: Vec<Vector3<f64>>,
}

impl SwarmSnapshot {
    pub fn new(n: usize) -> Self {
        Self {
            positions: vec![Vector3::zeros(); n],
            velocities: vec![Vector3::zeros(); n],
            obstacles: vec![Vector3::zeros(); n],
        }
    }

    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    pub fn read<E: Environment + ?Sized>(&mut self, env: &E) {
        for i in 0..self.len() {
            self.positions[i] = env.position(i);
            self.velocities[i] = env.velocity(i);
            let mut obstacle = env.nearest_obstacle(i).unwrap_or_else(Vector3::zeros);
            obstacle.z = 0.0;
            self.obstacles[i] = obstacle;
        }
    }
}

/// Per-tick control loop: read, build visibility, flock, progress, compose, emit.
pub struct Engine<E: Environment> {
    env: E,
    config: SwarmConfig,
    flocking: Flocking,
    graph: VisibilityGraph,
    snapshot: SwarmSnapshot,
    flock: Vec<FlockForces>,
    fields: Vec<ForceField>,
    progress: PathProgress,
    leader: usize,
    ticks: u64,
}

impl<E: Environment> Engine<E> {
    /// Validate the config against the environment, elect the leader from the current positions and
    /// start the edge clock.
    pub fn new(config: SwarmConfig, env: E) -> Result<Self> {
        let path = config.validate()?;
        let n = config.agents;
        if n > env.agent_count() {
            return Err(SwarmError::TooFewBodies {
                agents: n,
                available: env.agent_count(),
            });
        }

        let mut snapshot = SwarmSnapshot::new(n);
        snapshot.read(&env);
        let leader = elect_leader(&snapshot.positions, &path.waypoint(1)).ok_or(SwarmError::NoAgents)?;
        info!("leader is agent {} of {}", leader, n);

        let followers = match config.mode {
            FollowMode::AllFollow => (0..n).collect(),
            FollowMode::LeaderFollowers => vec![leader],
        };
        info!("evaluating {} edges", path.edge_count());
        let progress = PathProgress::new(path, n, followers, config.confirm_final_arrival, env.now());
        let gains = &config.gains;
        let flocking = Flocking::new(gains.separation, gains.cohesion, gains.alignment);

        Ok(Self {
            env,
            flocking,
            graph: VisibilityGraph::new(n),
            snapshot,
            flock: vec![FlockForces::default(); n],
            fields: vec![ForceField::default(); n],
            progress,
            leader,
            ticks: 0,
            config,
        })
    }

    pub fn len(&self) -> usize { self.config.agents }

    pub fn is_empty(&self) -> bool { self.config.agents == 0 }

    pub fn leader(&self) -> usize { self.leader }

    pub fn phase(&self) -> RunPhase { self.progress.phase() }

    pub fn progress(&self) -> &PathProgress { &self.progress }

    pub fn ticks(&self) -> u64 { self.ticks }

    pub fn snapshot(&self) -> &SwarmSnapshot { &self.snapshot }

    pub fn visibility(&self) -> &VisibilityGraph { &self.graph }

    /// Force terms from the last completed tick.
    pub fn fields(&self) -> &[ForceField] { &self.fields }

    pub fn env(&self) -> &E { &self.env }

    pub fn env_mut(&mut self) -> &mut E { &mut self.env }

    pub fn into_env(self) -> E { self.env }

    /// One read-compute-emit cycle. Stops before emitting if the run finishes
    /// during this tick.
    pub fn tick(&mut self) -> RunPhase {
        if self.progress.phase() == RunPhase::Done {
            return RunPhase::Done;
        }
        self.snapshot.read(&self.env);
        self.graph.rebuild(&self.snapshot.positions, self.config.view_range);
        self.flocking.apply(
            &self.snapshot.positions,
            &self.snapshot.velocities,
            &self.graph,
            &mut self.flock,
        );

        let now = self.env.now();
        let gains = &self.config.gains;
        for i in 0..self.len() {
            let pos = self.snapshot.positions[i];
            self.progress.observe(i, &pos, now);
            if self.progress.phase() == RunPhase::Done {
                return RunPhase::Done;
            }
            let destination = self
                .progress
                .goal(i)
                .map_or_else(Vector3::zeros, |goal| power_scaled(goal - pos, gains.destination));
            self.fields[i] = ForceField {
                flock: self.flock[i],
                destination,
                avoidance: avoidance_force(&self.snapshot.obstacles[i], gains.avoidance),
            };
        }

        for (i, field) in self.fields.iter().enumerate() {
            self.env.set_output_force(i, field.output(self.snapshot.positions[i].z));
        }
        self.ticks += 1;
        self.progress.phase()
    }

    /// Tick until the run finishes or the environment disconnects.
    pub fn run(&mut self) -> RunOutcome {
        loop {
            if self.progress.phase() == RunPhase::Done {
                info!("run finished after {} ticks", self.ticks);
                return RunOutcome::Completed(self.progress.durations().to_vec());
            }
            if !self.env.is_connected() {
                warn!(
                    "environment disconnected after {} ticks, {} edges timed",
                    self.ticks,
                    self.progress.durations().len()
                );
                return RunOutcome::InProgress(self.progress.durations().to_vec());
            }
            self.env.pace(self.config.tick_period);
            self.tick();
        }
    }
}
