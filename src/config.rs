//! Simulation, learner and runner configuration.

use crate::display::MAX_REGIONS;
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A configuration which can check itself.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Configuration of a single session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The number of lanes.
    pub lane_count: usize,
    /// The simulation rate in ticks/s.
    pub tick_rate: f64,
    /// The lane the controlled agent starts in.
    pub initial_lane: usize,
    /// The sprite of a single lane; its size sets the lane size.
    pub lane_asset: String,
    /// The sprite of the controlled agent.
    pub car_asset: String,
    /// The sprite of obstacles.
    pub obstacle_asset: String,
    /// Whether the session records frames to draw.
    pub render: bool,
    /// The speed of obstacles in px/tick.
    pub obstacle_speed: f64,
    /// The gap between the controlled agent and the bottom of the play area in px.
    pub player_margin: f64,
    /// A lane which rewards the controlled agent for entering it.
    pub goal_lane: Option<usize>,
    /// The random seed, or `None` to seed from system entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lane_count: 5,
            tick_rate: 60.0,
            initial_lane: 1,
            lane_asset: "street_sprite.png".into(),
            car_asset: "car_sprite.png".into(),
            obstacle_asset: "car_sprite_enemy.png".into(),
            render: true,
            obstacle_speed: 1.0,
            player_margin: 50.0,
            goal_lane: None,
            seed: None,
        }
    }
}

impl Validate for SessionConfig {
    /// Checks that the configuration describes a playable road.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_count == 0 {
            return invalid("lane_count must be at least 1");
        }
        if !(self.tick_rate > 0.0) {
            return invalid("tick_rate must be positive");
        }
        if self.initial_lane == 0 || self.initial_lane > self.lane_count {
            return invalid(format!(
                "initial_lane {} is not in 1..={}",
                self.initial_lane, self.lane_count
            ));
        }
        if let Some(goal) = self.goal_lane {
            if goal == 0 || goal > self.lane_count {
                return invalid(format!("goal_lane {} is not in 1..={}", goal, self.lane_count));
            }
        }
        Ok(())
    }
}

/// Configuration of a Q-learning controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// The discount applied to the value of the next state.
    pub gamma: f64,
    /// The reward for crashing.
    pub collision_reward: f64,
    /// The reward for reaching the goal.
    pub goal_reward: f64,
    /// The reward for any other step.
    pub step_reward: f64,
    /// The number of initial decisions which are made at random.
    pub explore_steps: u64,
    /// The probability, drawn once, that the controller never stops exploring.
    pub random_forever_probability: f64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            collision_reward: -100.0,
            goal_reward: 100.0,
            step_reward: 1.0,
            explore_steps: 1000,
            random_forever_probability: 0.0,
        }
    }
}

impl Validate for LearnerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return invalid(format!("gamma {} is not in (0, 1)", self.gamma));
        }
        if !(0.0..=1.0).contains(&self.random_forever_probability) {
            return invalid("random_forever_probability must be in [0, 1]");
        }
        Ok(())
    }
}

/// Configuration of a group of concurrently running sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// The number of sessions.
    pub sessions: usize,
    /// Whether sessions are steered from the keyboard rather than by a learner.
    pub manual: bool,
    /// The name under which learned tables are stored.
    pub table_name: String,
    /// Whether to wait between frames to hold the tick rate.
    pub frame_pacing: bool,
    pub session: SessionConfig,
    pub learner: LearnerConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sessions: 1,
            manual: false,
            table_name: "qtable".into(),
            frame_pacing: true,
            session: SessionConfig::default(),
            learner: LearnerConfig::default(),
        }
    }
}

impl Validate for RunnerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sessions == 0 || self.sessions > MAX_REGIONS {
            return invalid(format!(
                "sessions {} is not in 1..={}",
                self.sessions, MAX_REGIONS
            ));
        }
        self.session.validate()?;
        self.learner.validate()
    }
}

/// Parses and validates a configuration from JSON.
pub fn from_json_str<T: DeserializeOwned + Validate>(json: &str) -> Result<T, ConfigError> {
    let config: T = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a configuration from a JSON file.
pub fn from_json_file<T: DeserializeOwned + Validate>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    from_json_str(&std::fs::read_to_string(path)?)
}

fn invalid<T>(message: impl Into<String>) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RunnerConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: RunnerConfig =
            from_json_str(r#"{ "sessions": 2, "session": { "lane_count": 3, "render": false } }"#)
                .unwrap();
        assert_eq!(config.sessions, 2);
        assert_eq!(config.session.lane_count, 3);
        assert!(!config.session.render);
        assert_eq!(config.session.tick_rate, 60.0);
        assert_eq!(config.learner, LearnerConfig::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = SessionConfig {
            initial_lane: 6,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(from_json_str::<RunnerConfig>(r#"{ "sessions": 5 }"#).is_err());
        assert!(from_json_str::<LearnerConfig>(r#"{ "gamma": 1.0 }"#).is_err());
        assert!(matches!(
            from_json_str::<SessionConfig>("{"),
            Err(ConfigError::Format(_))
        ));
    }
}
