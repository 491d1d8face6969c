use crate::error::{Result, SwarmError};
use crate::path::Path;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VIEW_RANGE: f64 = 3.0;
pub const DEFAULT_TICK_PERIOD: f64 = 0.2;
pub const DEFAULT_SPEED: f64 = 1.0;

/// Gain and falloff exponent of a power-law force term: `v * gain / |v|^power`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainPair {
    pub gain: f64,
    pub power: f64,
}

impl GainPair {
    pub const fn new(gain: f64, power: f64) -> Self {
        Self { gain, power }
    }

    pub const fn off() -> Self {
        Self { gain: 0.0, power: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gains {
    pub separation: GainPair,
    pub cohesion: GainPair,
    /// Reference tuning leaves alignment disabled.
    pub alignment: GainPair,
    /// Path following; `gain` is the cruise speed.
    pub destination: GainPair,
    pub avoidance: GainPair,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            separation: GainPair::new(0.30, 2.0),
            cohesion: GainPair::new(0.30, 0.0),
            alignment: GainPair::off(),
            destination: GainPair::new(DEFAULT_SPEED, 1.0),
            avoidance: GainPair::new(0.20, 2.0),
        }
    }
}

impl Gains {
    /// Only path following, every other behaviour switched off.
    pub fn destination_only(speed: f64) -> Self {
        Self {
            separation: GainPair::off(),
            cohesion: GainPair::off(),
            alignment: GainPair::off(),
            destination: GainPair::new(speed, 1.0),
            avoidance: GainPair::off(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowMode {
    /// Every agent follows the path and takes part in edge timing.
    #[default]
    AllFollow,
    /// Only the elected leader follows the path, the rest flock around it.
    LeaderFollowers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub agents: usize,
    /// Neighbours closer than this (strictly) are visible.
    pub view_range: f64,
    /// Seconds between control ticks.
    pub tick_period: f64,
    pub gains: Gains,
    pub path: Vec<[f64; 3]>,
    pub mode: FollowMode,
    /// Keep going after the last edge is timed and require every path
    /// follower to be confirmed near the final waypoint before finishing.
    pub confirm_final_arrival: bool,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            agents: 1,
            view_range: DEFAULT_VIEW_RANGE,
            tick_period: DEFAULT_TICK_PERIOD,
            gains: Gains::default(),
            path: Vec::new(),
            mode: FollowMode::AllFollow,
            confirm_final_arrival: false,
        }
    }
}

impl SwarmConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: SwarmConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks the run preconditions and returns the validated path.
    pub fn validate(&self) -> Result<Path> {
        if self.agents == 0 {
            return Err(SwarmError::NoAgents);
        }
        if !self.view_range.is_finite() || self.view_range < 0.0 {
            return Err(SwarmError::InvalidParameter {
                name: "view_range",
                value: self.view_range,
            });
        }
        if !self.tick_period.is_finite() || self.tick_period <= 0.0 {
            return Err(SwarmError::InvalidParameter {
                name: "tick_period",
                value: self.tick_period,
            });
        }
        let pairs = [
            ("gains.separation", self.gains.separation),
            ("gains.cohesion", self.gains.cohesion),
            ("gains.alignment", self.gains.alignment),
            ("gains.destination", self.gains.destination),
            ("gains.avoidance", self.gains.avoidance),
        ];
        for (name, pair) in pairs {
            if !pair.gain.is_finite() {
                return Err(SwarmError::InvalidParameter { name, value: pair.gain });
            }
            if !pair.power.is_finite() {
                return Err(SwarmError::InvalidParameter { name, value: pair.power });
            }
        }
        Path::from_points(&self.path)
    }
}
