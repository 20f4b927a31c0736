use super::neighborhood::STATE_COUNT;
use super::Turn;

/// A table of action values, one row per action and one column per state.
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    /// The number of states (columns).
    states: usize,
    /// Row-major values, `rows * states` long.
    values: Vec<f64>,
}

impl QTable {
    /// The number of rows, one per action.
    pub const ROWS: usize = Turn::ALL.len();

    /// Creates a zeroed table over every encodable neighbourhood.
    pub fn new() -> Self {
        Self::with_states(STATE_COUNT)
    }

    /// Creates a zeroed table with the given number of states.
    pub fn with_states(states: usize) -> Self {
        Self {
            states,
            values: vec![0.0; Self::ROWS * states],
        }
    }

    /// Rebuilds a table from its rows.
    ///
    /// Returns `None` unless there are exactly [`QTable::ROWS`] rows of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let states = rows.first()?.len();
        if rows.len() != Self::ROWS || rows.iter().any(|row| row.len() != states) {
            return None;
        }
        Some(Self {
            states,
            values: rows.concat(),
        })
    }

    /// The shape of the table as `(rows, states)`.
    pub fn shape(&self) -> (usize, usize) {
        (Self::ROWS, self.states)
    }

    /// The table as a list of rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.states.max(1))
    }

    pub fn get(&self, action: Turn, state: usize) -> f64 {
        self.values[self.index(action, state)]
    }

    pub fn set(&mut self, action: Turn, state: usize, value: f64) {
        let idx = self.index(action, state);
        self.values[idx] = value;
    }

    /// The values of every action in `state`, in [`Turn::ALL`] order.
    pub fn actions(&self, state: usize) -> [f64; QTable::ROWS] {
        Turn::ALL.map(|action| self.get(action, state))
    }

    /// The best value available in `state`.
    pub fn max(&self, state: usize) -> f64 {
        self.actions(state).into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    /// The action with the highest value in `state`; the first one wins ties.
    pub fn best(&self, state: usize) -> Turn {
        let values = self.actions(state);
        let mut best = 0;
        for (idx, value) in values.iter().enumerate().skip(1) {
            if *value > values[best] {
                best = idx;
            }
        }
        Turn::ALL[best]
    }

    /// Sets every value to zero.
    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    fn index(&self, action: Turn, state: usize) -> usize {
        assert!(state < self.states, "state {} out of range", state);
        action.index() * self.states + state
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}
