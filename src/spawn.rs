use crate::agent::{Agent, AgentAttributes, AgentId};
use crate::collision::CollisionIndex;
use crate::lane::LaneGeometry;
use crate::math::Vector2d;
use crate::util::round_to;
use log::{debug, trace};
use rand::Rng;

/// Scales the per-tick growth of the spawn probability.
const RAMP_TICKS: f64 = 50.0;

/// The spawn probability is kept to this many decimal places.
const PROBABILITY_PLACES: i32 = 8;

/// Decides when and where new obstacles enter the road.
///
/// Every tick without a spawn attempt makes the next attempt more likely,
/// and the growth is faster the fewer agents are on the road.
#[derive(Clone, Debug)]
pub struct SpawnController {
    /// The current probability of attempting a spawn.
    probability: f64,
    /// The simulation rate in ticks/s.
    tick_rate: f64,
    /// The attributes of spawned obstacles.
    obstacle: AgentAttributes,
    /// The speed of spawned obstacles in px/tick.
    speed: f64,
}

/// The result of a `maybe_spawn` call.
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnDecision {
    /// No attempt was made; the probability grew.
    Waiting,
    /// An attempt was made but the chosen lane was occupied at the top.
    Blocked { lane: usize },
    /// A new obstacle was created.
    Spawned(Agent),
}

impl SpawnController {
    /// Creates a controller which spawns obstacles of the given kind and speed.
    pub fn new(tick_rate: f64, obstacle: AgentAttributes, speed: f64) -> Self {
        Self {
            probability: 0.0,
            tick_rate,
            obstacle,
            speed,
        }
    }

    /// The current probability of attempting a spawn.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// The attributes of spawned obstacles.
    pub fn obstacle(&self) -> &AgentAttributes {
        &self.obstacle
    }

    /// Possibly creates a new obstacle above a random lane.
    ///
    /// The returned agent has not been added to `agents`; that is up to the caller.
    pub fn maybe_spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        geometry: &LaneGeometry,
        agents: &[Agent],
        id: AgentId,
    ) -> SpawnDecision {
        let draw: f64 = rng.gen();
        if draw >= self.probability {
            let population = agents.len().max(1) as f64;
            let increment = 1.0 / (population * self.tick_rate * RAMP_TICKS);
            self.probability = round_to(self.probability + increment, PROBABILITY_PLACES);
            return SpawnDecision::Waiting;
        }

        let lane = rng.gen_range(1..=geometry.lane_count());
        let candidate = Agent::new(
            id,
            &self.obstacle,
            geometry,
            lane,
            -self.obstacle.height,
            Vector2d::new(0.0, self.speed),
        );

        let index = CollisionIndex::build(geometry.lane_count(), agents);
        if index.hits(lane, &candidate.bounding_box(), None) {
            trace!("spawn into lane {} blocked", lane);
            return SpawnDecision::Blocked { lane };
        }

        debug!("spawned {:?} in lane {}", id, lane);
        self.probability = 0.0;
        SpawnDecision::Spawned(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use cgmath::Zero;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn obstacle() -> AgentAttributes {
        AgentAttributes {
            kind: AgentKind::Obstacle,
            width: 60.0,
            height: 100.0,
            image: "enemy".into(),
        }
    }

    fn geometry(lanes: usize) -> LaneGeometry {
        LaneGeometry::new(lanes, 100.0, 600.0)
    }

    fn player(geometry: &LaneGeometry) -> Agent {
        let attributes = AgentAttributes {
            kind: AgentKind::Player,
            ..obstacle()
        };
        Agent::new(AgentId(0), &attributes, geometry, 1, 450.0, Vector2d::zero())
    }

    #[test]
    fn first_tick_never_spawns() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut spawner = SpawnController::new(60.0, obstacle(), 1.0);
        let decision = spawner.maybe_spawn(&mut rng, &geometry(5), &[], AgentId(1));
        assert_eq!(decision, SpawnDecision::Waiting);
        assert_eq!(spawner.probability(), 0.00033333);
    }

    #[test]
    fn probability_grows_until_a_spawn_then_resets() {
        let mut rng = StdRng::seed_from_u64(7);
        let geometry = geometry(5);
        let agents = vec![player(&geometry)];
        let mut spawner = SpawnController::new(60.0, obstacle(), 1.0);
        let mut last = spawner.probability();
        for tick in 0.. {
            match spawner.maybe_spawn(&mut rng, &geometry, &agents, AgentId(1)) {
                SpawnDecision::Waiting => {
                    assert!(spawner.probability() > last);
                    last = spawner.probability();
                }
                SpawnDecision::Blocked { .. } => panic!("nothing can block a spawn"),
                SpawnDecision::Spawned(agent) => {
                    assert_eq!(spawner.probability(), 0.0);
                    assert_eq!(agent.position().y, -100.0);
                    assert_eq!(agent.velocity(), Vector2d::new(0.0, 1.0));
                    assert_eq!(agent.kind(), AgentKind::Obstacle);
                    break;
                }
            }
            assert!(tick < 100_000, "spawned nothing");
        }
    }

    #[test]
    fn blocked_attempt_keeps_probability() {
        let mut rng = StdRng::seed_from_u64(3);
        let geometry = geometry(1);
        let mut spawner = SpawnController::new(60.0, obstacle(), 1.0);
        let blocker = Agent::new(AgentId(5), &obstacle(), &geometry, 1, -50.0, Vector2d::zero());
        let agents = vec![player(&geometry), blocker];
        spawner.probability = 1.0;
        let decision = spawner.maybe_spawn(&mut rng, &geometry, &agents, AgentId(6));
        assert_eq!(decision, SpawnDecision::Blocked { lane: 1 });
        assert_eq!(spawner.probability(), 1.0);
    }
}
