use crate::agent::{Agent, AgentAttributes, AgentId, AgentKind};
use crate::collision::{CollisionIndex, LaneBoxes};
use crate::config::{SessionConfig, Validate};
use crate::display::Frame;
use crate::error::Error;
use crate::io::{AssetLoader, ImageSize, InputEvent};
use crate::lane::LaneGeometry;
use crate::learner::{CellKind, Heading, Neighborhood, Outcome, Turn};
use crate::math::{Point2d, Vector2d};
use crate::spawn::{SpawnController, SpawnDecision};
use crate::util::Rect;
use cgmath::Zero;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// One simulated drive: a road, the controlled agent and the traffic around it.
///
/// The controlled agent is always `agents[0]`. A session runs until it is
/// stopped or the controlled agent crashes, after which it no longer changes.
#[derive(Clone, Debug)]
pub struct Session {
    /// The configuration the session was created with.
    config: SessionConfig,
    /// The road.
    geometry: LaneGeometry,
    /// The agents, starting with the controlled agent.
    agents: Vec<Agent>,
    /// Decides when obstacles appear.
    spawner: SpawnController,
    /// The session's own source of randomness.
    rng: StdRng,
    /// The number of ticks simulated.
    tick_count: u64,
    /// The ID of the next agent to be created.
    next_id: u64,
    /// Whether the session is still running.
    live: bool,
    /// Whether the session ended in a crash.
    crashed: bool,
    /// The lateral velocity to apply on the next tick, in px/tick.
    pending: f64,
    /// The most recent frame, if rendering is enabled.
    frame: Option<Frame>,
}

/// The result of a `tick` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickResult {
    /// The tick was simulated and the session is still running.
    Running,
    /// The tick was simulated and the controlled agent crashed.
    Crashed,
    /// The session had already ended; nothing happened.
    Inactive,
}

impl Session {
    /// Creates a session whose controlled agent is of the given kind.
    ///
    /// Sprite sizes are read once here; nothing is loaded while ticking.
    pub fn new(
        config: &SessionConfig,
        kind: AgentKind,
        assets: &mut dyn AssetLoader,
    ) -> Result<Self, Error> {
        config.validate()?;
        let geometry = LaneGeometry::from_sprite(config.lane_count, assets.dimensions(&config.lane_asset)?);
        let car = attributes(kind, assets.dimensions(&config.car_asset)?, &config.car_asset);
        let obstacle = attributes(
            AgentKind::Obstacle,
            assets.dimensions(&config.obstacle_asset)?,
            &config.obstacle_asset,
        );

        let y = geometry.height() - car.height - config.player_margin;
        let controlled = Agent::new(AgentId(0), &car, &geometry, config.initial_lane, y, Vector2d::zero());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let frame = config.render.then(|| {
            let (width, height) = geometry.play_area();
            Frame::new(ImageSize::new(width as u32, height as u32))
        });

        let mut session = Self {
            config: config.clone(),
            geometry,
            agents: vec![controlled],
            spawner: SpawnController::new(config.tick_rate, obstacle, config.obstacle_speed),
            rng,
            tick_count: 0,
            next_id: 1,
            live: true,
            crashed: false,
            pending: 0.0,
            frame,
        };
        session.render();
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The road.
    pub fn geometry(&self) -> &LaneGeometry {
        &self.geometry
    }

    /// All agents, starting with the controlled agent.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The controlled agent.
    pub fn controlled(&self) -> &Agent {
        &self.agents[0]
    }

    /// The number of ticks simulated.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The current probability that an obstacle spawn is attempted.
    pub fn spawn_probability(&self) -> f64 {
        self.spawner.probability()
    }

    /// Whether the session is still running.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Whether the session ended in a crash.
    pub fn crashed(&self) -> bool {
        self.crashed
    }

    /// The most recent frame, or `None` for a headless session.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Ends the session. Returns `false` if it had already ended.
    pub fn stop(&mut self) -> bool {
        if !self.live {
            return false;
        }
        self.live = false;
        info!("session stopped after {} ticks", self.tick_count);
        true
    }

    /// Sets the lateral velocity of the controlled agent for the next tick,
    /// replacing any command not yet applied. Returns `false` if the session has ended.
    pub fn steer(&mut self, dx: f64) -> bool {
        if self.live {
            self.pending = dx;
        }
        self.live
    }

    /// Steers the controlled agent one lane in the direction of `turn`.
    pub fn steer_turn(&mut self, turn: Turn) -> bool {
        let dx = turn.apply(self.heading()).vector().x * self.geometry.lane_width();
        self.steer(dx)
    }

    /// Applies a frame's worth of input events. Quit ends the session; the
    /// arrow keys steer the controlled agent if it is player driven.
    ///
    /// Returns whether the session is still running.
    pub fn handle_events(&mut self, events: &[InputEvent]) -> bool {
        let manual = self.controlled().kind() == AgentKind::Player;
        for event in events {
            match event {
                InputEvent::Quit => {
                    self.stop();
                }
                InputEvent::Left if manual => {
                    self.steer_turn(Turn::Left);
                }
                InputEvent::Right if manual => {
                    self.steer_turn(Turn::Right);
                }
                _ => {}
            }
        }
        self.live
    }

    /// Places an obstacle with its top edge at `y` in `lane`, regardless of
    /// what is already there. Returns `None` if the session has ended.
    pub fn add_obstacle(&mut self, lane: usize, y: f64) -> Option<AgentId> {
        if !self.live {
            return None;
        }
        let id = self.take_id();
        let agent = Agent::new(
            id,
            self.spawner.obstacle(),
            &self.geometry,
            lane,
            y,
            Vector2d::new(0.0, self.config.obstacle_speed),
        );
        self.agents.push(agent);
        Some(id)
    }

    /// Advances the session by one tick.
    pub fn tick(&mut self) -> TickResult {
        if !self.live {
            return TickResult::Inactive;
        }
        self.tick_count += 1;

        let id = AgentId(self.next_id);
        if let SpawnDecision::Spawned(agent) =
            self.spawner
                .maybe_spawn(&mut self.rng, &self.geometry, &self.agents, id)
        {
            self.next_id += 1;
            self.agents.push(agent);
        }

        let command = Vector2d::new(std::mem::take(&mut self.pending), 0.0);
        self.integrate(command);

        let result = if self.player_collision() {
            self.live = false;
            self.crashed = true;
            info!("session crashed after {} ticks", self.tick_count);
            TickResult::Crashed
        } else {
            TickResult::Running
        };
        self.render();
        result
    }

    /// The bounding boxes of every agent in `lane`.
    pub fn agents_in_lane(&self, lane: usize) -> LaneBoxes {
        self.collision_index().boxes_in_lane(lane)
    }

    /// Whether the controlled agent touches any other agent in its lane.
    pub fn player_collision(&self) -> bool {
        self.collision_index().collides(self.controlled())
    }

    fn collision_index(&self) -> CollisionIndex {
        CollisionIndex::build(self.geometry.lane_count(), &self.agents)
    }

    /// The outcome of the latest tick, as seen by a learning controller.
    pub fn outcome(&self) -> Outcome {
        if self.crashed {
            Outcome::Collision
        } else if self.config.goal_lane == Some(self.controlled().lane()) {
            Outcome::Goal
        } else {
            Outcome::Step
        }
    }

    /// The direction the controlled agent travels in.
    ///
    /// The road scrolls towards the agent, so it always faces up the screen.
    pub fn heading(&self) -> Heading {
        Heading::Up
    }

    /// Classifies the cells around the controlled agent, rotated to its heading.
    ///
    /// Cells are one lane wide and one car tall.
    pub fn local_state(&self) -> Neighborhood {
        let player = self.controlled();
        let bbox = player.bounding_box();
        let lane_width = self.geometry.lane_width();
        let grid = Neighborhood::from_fn(|dx, dy| {
            let lane = player.lane() as i64 + dx as i64;
            if !self.geometry.contains_lane(lane) {
                return CellKind::Wall;
            }
            let cell = Rect::new(
                Point2d::new((lane - 1) as f64 * lane_width, bbox.y.min + dy as f64 * bbox.height()),
                lane_width,
                bbox.height(),
            );
            if self.agents[1..].iter().any(|a| a.bounding_box().overlaps(&cell)) {
                CellKind::Occupied
            } else if self.config.goal_lane == Some(lane as usize) {
                CellKind::Goal
            } else {
                CellKind::Free
            }
        });
        grid.oriented(self.heading())
    }

    /// The encoded local state, for indexing a value table.
    pub fn state_index(&self) -> usize {
        self.local_state().encode()
    }

    /// Moves every agent, dropping obstacles which have left the road.
    fn integrate(&mut self, command: Vector2d) {
        let geometry = self.geometry;
        let mut survivors = Vec::with_capacity(self.agents.len());
        for (idx, mut agent) in std::mem::take(&mut self.agents).into_iter().enumerate() {
            let commanded = if idx == 0 { command } else { Vector2d::zero() };
            let keep = agent.update_position(&geometry, commanded);
            if keep || idx == 0 {
                survivors.push(agent);
            } else {
                debug!("removed {:?} at tick {}", agent.id(), self.tick_count);
            }
        }
        self.agents = survivors;
    }

    /// Records the road and agents into the frame, if rendering is enabled.
    fn render(&mut self) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        frame.clear();
        for lane in 0..self.geometry.lane_count() {
            let x = lane as f64 * self.geometry.lane_width();
            frame.push(&self.config.lane_asset, Point2d::new(x, 0.0));
        }
        for agent in &self.agents {
            frame.push(agent.image(), agent.position());
        }
    }

    fn take_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn attributes(kind: AgentKind, size: ImageSize, image: &str) -> AgentAttributes {
    AgentAttributes {
        kind,
        width: size.width as f64,
        height: size.height as f64,
        image: image.to_owned(),
    }
}
