pub use self::neighborhood::{CellKind, Heading, Neighborhood, STATE_COUNT};
pub use self::table::QTable;
use crate::config::LearnerConfig;
use crate::error::StorageError;
use rand::Rng;

mod neighborhood;
mod table;

/// A steering decision, relative to the current heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    Left,
    Straight,
    Right,
}

impl Turn {
    /// Every action, in table row order.
    pub const ALL: [Turn; 3] = [Turn::Left, Turn::Straight, Turn::Right];

    /// The table row of this action.
    pub fn index(self) -> usize {
        match self {
            Turn::Left => 0,
            Turn::Straight => 1,
            Turn::Right => 2,
        }
    }

    /// The heading after taking this action.
    pub fn apply(self, heading: Heading) -> Heading {
        match self {
            Turn::Left => heading.rotate_left(),
            Turn::Straight => heading,
            Turn::Right => heading.rotate_right(),
        }
    }
}

/// What happened as a result of the previous decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The controlled agent crashed.
    Collision,
    /// The controlled agent reached the goal.
    Goal,
    /// Anything else.
    Step,
}

/// A tabular Q-learning controller.
///
/// Each decision is remembered until [`QLearner::update`] is called with
/// its outcome, at which point the remembered entry is overwritten with
/// the reward plus the discounted best value of the new state.
#[derive(Clone, Debug)]
pub struct QLearner {
    /// The action values, owned exclusively by this controller.
    table: QTable,
    /// The discount applied to the value of the next state.
    gamma: f64,
    collision_reward: f64,
    goal_reward: f64,
    step_reward: f64,
    /// The number of remaining decisions to make at random.
    explore_budget: u64,
    /// Whether every decision is made at random.
    random_forever: bool,
    /// The previous decision and the state it was made in.
    last: Option<(Turn, usize)>,
}

impl QLearner {
    /// Creates a controller with an empty table.
    pub fn new<R: Rng + ?Sized>(config: &LearnerConfig, rng: &mut R) -> Self {
        Self::build(config, QTable::new(), rng)
    }

    /// Creates a controller which continues learning from `table`.
    ///
    /// Fails unless `table` has a value for every action in every encodable state.
    pub fn with_table<R: Rng + ?Sized>(
        config: &LearnerConfig,
        table: QTable,
        rng: &mut R,
    ) -> Result<Self, StorageError> {
        check_shape(&table)?;
        Ok(Self::build(config, table, rng))
    }

    fn build<R: Rng + ?Sized>(config: &LearnerConfig, table: QTable, rng: &mut R) -> Self {
        Self {
            table,
            gamma: config.gamma,
            collision_reward: config.collision_reward,
            goal_reward: config.goal_reward,
            step_reward: config.step_reward,
            explore_budget: config.explore_steps,
            random_forever: rng.gen_bool(config.random_forever_probability),
            last: None,
        }
    }

    /// The learned action values.
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Continues learning from `table`, returning the table it replaces.
    pub fn replace_table(&mut self, table: QTable) -> Result<QTable, StorageError> {
        check_shape(&table)?;
        Ok(std::mem::replace(&mut self.table, table))
    }

    /// Whether the next decision will be made at random.
    pub fn is_exploring(&self) -> bool {
        self.random_forever || self.explore_budget > 0
    }

    /// Maps an outcome to its reward.
    pub fn reward(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Collision => self.collision_reward,
            Outcome::Goal => self.goal_reward,
            Outcome::Step => self.step_reward,
        }
    }

    /// Chooses an action in `state`, and remembers it for the next update.
    pub fn choose<R: Rng + ?Sized>(&mut self, state: usize, rng: &mut R) -> Turn {
        let action = if self.is_exploring() {
            self.explore_budget = self.explore_budget.saturating_sub(1);
            Turn::ALL[rng.gen_range(0..Turn::ALL.len())]
        } else {
            self.table.best(state)
        };
        self.last = Some((action, state));
        action
    }

    /// Learns from the outcome of the previous decision, which led to `state`.
    ///
    /// Returns the new value of the updated entry, or `None` if no decision
    /// is pending.
    pub fn update(&mut self, outcome: Outcome, state: usize) -> Option<f64> {
        let (action, prev_state) = self.last.take()?;
        let value = self.reward(outcome) + self.gamma * self.table.max(state);
        self.table.set(action, prev_state, value);
        Some(value)
    }

    /// Forgets the pending decision, e.g. when a session is abandoned.
    pub fn end_episode(&mut self) {
        self.last = None;
    }
}

fn check_shape(table: &QTable) -> Result<(), StorageError> {
    let expected = (QTable::ROWS, STATE_COUNT);
    let found = table.shape();
    if found != expected {
        return Err(StorageError::Shape { expected, found });
    }
    Ok(())
}
