pub use agent::{Agent, AgentAttributes, AgentId, AgentKind};
pub use cgmath;
pub use collision::CollisionIndex;
pub use config::{LearnerConfig, RunnerConfig, SessionConfig, Validate};
pub use display::{Blit, DisplayRouter, Frame};
pub use error::{AssetError, BoundsError, ConfigError, Error, StorageError};
pub use lane::LaneGeometry;
pub use learner::{CellKind, Heading, Neighborhood, Outcome, QLearner, QTable, Turn};
pub use runner::{Driver, EpisodeSummary, FramePacer, Runner};
pub use session::{Session, TickResult};
pub use spawn::{SpawnController, SpawnDecision};
pub use storage::{FileStore, MemoryStore, TableStore};
use slotmap::new_key_type;
pub use util::{Interval, Rect};

mod agent;
pub mod collision;
pub mod config;
mod display;
mod error;
pub mod io;
mod lane;
pub mod learner;
pub mod math;
mod runner;
mod session;
mod spawn;
mod storage;
mod util;

new_key_type! {
    /// Unique ID of a [Session] within a [Runner].
    pub struct SessionId;
}
