use crate::lane::LaneGeometry;
use crate::math::{Point2d, Vector2d};
use crate::util::Rect;
use cgmath::Zero;
use log::trace;

/// Identifies an agent within its session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

/// What moves an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    /// Steered by keyboard input.
    Player,
    /// Steered by a learning controller.
    ControllerDriven,
    /// Traffic which drifts down its lane at a constant speed.
    Obstacle,
}

impl AgentKind {
    /// Whether agents of this kind take commanded velocities.
    pub fn is_steered(self) -> bool {
        match self {
            AgentKind::Player | AgentKind::ControllerDriven => true,
            AgentKind::Obstacle => false,
        }
    }
}

/// A car on the road.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// The agent's ID.
    id: AgentId,
    /// What moves the agent.
    kind: AgentKind,
    /// The lane the agent is in, derived from `pos`.
    lane: usize,
    /// The top-left corner of the bounding box in px.
    pos: Point2d,
    /// The velocity in px/tick.
    vel: Vector2d,
    /// The bounding box, kept in lockstep with `pos`.
    bbox: Rect,
    /// The sprite drawn for the agent.
    image: String,
}

/// The attributes of a new agent.
#[derive(Clone, Debug)]
pub struct AgentAttributes {
    /// What moves the agent.
    pub kind: AgentKind,
    /// The width of the agent's sprite in px.
    pub width: f64,
    /// The height of the agent's sprite in px.
    pub height: f64,
    /// The sprite drawn for the agent.
    pub image: String,
}

impl Agent {
    /// Creates an agent centred in `lane`, with its top edge at `y`.
    pub fn new(
        id: AgentId,
        attributes: &AgentAttributes,
        geometry: &LaneGeometry,
        lane: usize,
        y: f64,
        vel: Vector2d,
    ) -> Self {
        let pos = Point2d::new(geometry.lane_to_x(lane, attributes.width), y);
        Self {
            id,
            kind: attributes.kind,
            lane,
            pos,
            vel,
            bbox: Rect::new(pos, attributes.width, attributes.height),
            image: attributes.image.clone(),
        }
    }

    /// Gets the agent's ID.
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// The lane the agent is in.
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// The top-left corner of the agent's bounding box in px.
    pub fn position(&self) -> Point2d {
        self.pos
    }

    /// The agent's velocity in px/tick.
    pub fn velocity(&self) -> Vector2d {
        self.vel
    }

    /// The agent's bounding box.
    pub fn bounding_box(&self) -> Rect {
        self.bbox
    }

    /// The sprite drawn for the agent.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Advances the agent by one tick.
    ///
    /// Steered agents take `commanded` as their velocity for this tick;
    /// obstacles ignore it and keep their own.
    /// A lateral move that would leave the play area is dropped, but the
    /// vertical part of the move is always applied.
    ///
    /// Returns `false` once the agent has moved past the bottom of the play area.
    pub fn update_position(&mut self, geometry: &LaneGeometry, commanded: Vector2d) -> bool {
        if self.kind.is_steered() {
            self.vel = commanded;
        }

        let candidate = self.pos + self.vel;
        let delta = if geometry.fits(candidate.x, self.bbox.width()) {
            self.vel
        } else {
            trace!("agent {:?} rejected move to x = {}", self.id, candidate.x);
            Vector2d::new(0.0, self.vel.y)
        };

        if !delta.is_zero() {
            self.pos += delta;
            self.bbox = self.bbox.translate(delta);
            self.lane = geometry.x_to_lane(self.pos.x, self.bbox.width()).max(1) as usize;
        }

        candidate.y <= geometry.height()
    }
}
