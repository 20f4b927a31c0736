use crate::agent::{Agent, AgentId};
use crate::util::Rect;
use smallvec::SmallVec;

/// An indexed agent's bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneEntry {
    pub id: AgentId,
    pub bbox: Rect,
}

/// The indexed agents in one lane.
pub type LaneEntries = SmallVec<[LaneEntry; 8]>;

/// Bounding boxes of the agents in one lane.
pub type LaneBoxes = SmallVec<[Rect; 8]>;

/// Groups agents by lane for collision queries.
///
/// The index is a snapshot: it must be rebuilt after agents move.
#[derive(Clone, Debug, Default)]
pub struct CollisionIndex {
    /// The agents in each lane, indexed by `lane - 1`.
    lanes: Vec<LaneEntries>,
}

impl CollisionIndex {
    /// Builds the index over `agents`.
    pub fn build<'a>(lane_count: usize, agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut lanes = vec![LaneEntries::new(); lane_count];
        for agent in agents {
            if let Some(lane) = lanes.get_mut(agent.lane().wrapping_sub(1)) {
                lane.push(LaneEntry {
                    id: agent.id(),
                    bbox: agent.bounding_box(),
                });
            }
        }
        Self { lanes }
    }

    /// The indexed agents in `lane`.
    pub fn agents_in_lane(&self, lane: usize) -> &[LaneEntry] {
        lane.checked_sub(1)
            .and_then(|idx| self.lanes.get(idx))
            .map(|entries| entries.as_slice())
            .unwrap_or(&[])
    }

    /// The bounding boxes of the indexed agents in `lane`.
    pub fn boxes_in_lane(&self, lane: usize) -> LaneBoxes {
        self.agents_in_lane(lane).iter().map(|entry| entry.bbox).collect()
    }

    /// Returns true if `bbox` touches any indexed agent in `lane` other than `except`.
    pub fn hits(&self, lane: usize, bbox: &Rect, except: Option<AgentId>) -> bool {
        self.agents_in_lane(lane)
            .iter()
            .filter(|entry| Some(entry.id) != except)
            .any(|entry| entry.bbox.intersects(bbox))
    }

    /// Returns true if `agent` touches any other indexed agent in its lane.
    pub fn collides(&self, agent: &Agent) -> bool {
        self.hits(agent.lane(), &agent.bounding_box(), Some(agent.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentAttributes, AgentId, AgentKind};
    use crate::lane::LaneGeometry;
    use crate::math::Vector2d;
    use cgmath::Zero;

    fn car(id: u64, kind: AgentKind, lane: usize, y: f64) -> Agent {
        let attributes = AgentAttributes {
            kind,
            width: 60.0,
            height: 100.0,
            image: "car".into(),
        };
        let geometry = LaneGeometry::new(5, 100.0, 600.0);
        Agent::new(AgentId(id), &attributes, &geometry, lane, y, Vector2d::zero())
    }

    fn index(agents: &[Agent]) -> CollisionIndex {
        CollisionIndex::build(5, agents)
    }

    #[test]
    fn obstacle_fifty_pixels_ahead_collides() {
        let agents = vec![
            car(0, AgentKind::Player, 2, 450.0),
            car(1, AgentKind::Obstacle, 2, 400.0),
        ];
        assert!(index(&agents).collides(&agents[0]));
    }

    #[test]
    fn obstacles_in_other_lanes_do_not_collide() {
        let agents = vec![
            car(0, AgentKind::Player, 2, 450.0),
            car(1, AgentKind::Obstacle, 3, 450.0),
            car(2, AgentKind::Obstacle, 2, 200.0),
        ];
        assert!(!index(&agents).collides(&agents[0]));
    }

    #[test]
    fn player_never_collides_with_itself() {
        let agents = vec![car(0, AgentKind::Player, 2, 450.0)];
        let index = index(&agents);
        assert!(!index.collides(&agents[0]));
        let bbox = agents[0].bounding_box();
        assert!(!index.hits(2, &bbox, Some(AgentId(0))));
        assert!(index.hits(2, &bbox, None));
    }

    #[test]
    fn index_groups_by_lane() {
        let agents = vec![
            car(0, AgentKind::Player, 1, 450.0),
            car(1, AgentKind::Obstacle, 1, 0.0),
            car(2, AgentKind::Obstacle, 4, 0.0),
        ];
        let index = index(&agents);
        assert_eq!(index.agents_in_lane(1).len(), 2);
        assert_eq!(index.agents_in_lane(4)[0].id, AgentId(2));
        assert!(index.agents_in_lane(2).is_empty());
        assert!(index.agents_in_lane(0).is_empty());
        assert!(index.agents_in_lane(9).is_empty());
        assert_eq!(index.boxes_in_lane(1)[1], agents[1].bounding_box());
    }
}
