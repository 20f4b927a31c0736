use crate::agent::AgentKind;
use crate::config::{RunnerConfig, Validate};
use crate::display::DisplayRouter;
use crate::error::{Error, StorageError};
use crate::io::{AssetLoader, ImageSize, InputEvent, InputSource, RenderSink};
use crate::learner::{QLearner, QTable};
use crate::session::{Session, TickResult};
use crate::storage::TableStore;
use crate::SessionId;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::SlotMap;
use std::time::{Duration, Instant};

/// What steers a session's controlled agent.
#[derive(Clone, Debug)]
pub enum Driver {
    /// The keyboard.
    Manual,
    /// A learning controller with its own table.
    Learner(Box<QLearner>),
}

/// A session together with the things that drive and display it.
#[derive(Clone, Debug)]
pub struct Slot {
    session: Session,
    driver: Driver,
    /// The display region the session is drawn into.
    display: usize,
    /// The number of sessions this slot has been restarted with.
    episode: u64,
    /// Randomness for the driver's decisions.
    rng: StdRng,
}

impl Slot {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// The learning controller, if the slot has one.
    pub fn learner(&self) -> Option<&QLearner> {
        match &self.driver {
            Driver::Learner(learner) => Some(learner.as_ref()),
            Driver::Manual => None,
        }
    }

    pub fn display(&self) -> usize {
        self.display
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Simulates one tick of the session, letting the driver steer and learn.
    fn step(&mut self, events: &[InputEvent]) -> TickResult {
        if let Driver::Learner(learner) = &mut self.driver {
            let turn = learner.choose(self.session.state_index(), &mut self.rng);
            self.session.steer_turn(turn);
        }
        self.session.handle_events(events);
        let result = self.session.tick();
        if let Driver::Learner(learner) = &mut self.driver {
            match result {
                TickResult::Inactive => learner.end_episode(),
                _ => {
                    learner.update(self.session.outcome(), self.session.state_index());
                }
            }
        }
        result
    }
}

/// How one session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpisodeSummary {
    pub session: SessionId,
    pub ticks: u64,
    pub crashed: bool,
}

/// Runs several independent sessions in lockstep on one thread.
///
/// Each frame, every live session is ticked to completion before the next
/// one starts; sessions share nothing but the frame cadence and the input.
pub struct Runner {
    config: RunnerConfig,
    slots: SlotMap<SessionId, Slot>,
    /// The sessions in display order.
    order: Vec<SessionId>,
    /// Lays out rendered frames, if sessions render.
    router: Option<DisplayRouter>,
    assets: Box<dyn AssetLoader>,
}

impl Runner {
    /// Creates `config.sessions` sessions, each with its own driver.
    pub fn new(config: RunnerConfig, mut assets: Box<dyn AssetLoader>) -> Result<Self, Error> {
        config.validate()?;
        let mut slots = SlotMap::with_key();
        let mut order = vec![];
        for display in 0..config.sessions {
            let mut rng = match config.session.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(display as u64)),
                None => StdRng::from_entropy(),
            };
            let driver = if config.manual {
                Driver::Manual
            } else {
                Driver::Learner(Box::new(QLearner::new(&config.learner, &mut rng)))
            };
            let session = new_session(&config, display, 0, &driver, assets.as_mut())?;
            order.push(slots.insert(Slot {
                session,
                driver,
                display,
                episode: 0,
                rng,
            }));
        }

        let first = order.first().and_then(|id| slots.get(*id));
        let router = match first.and_then(|slot: &Slot| slot.session.frame()) {
            Some(frame) => Some(DisplayRouter::new(config.sessions, frame.size())?),
            None => None,
        };

        Ok(Self {
            config,
            slots,
            order,
            router,
            assets,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// The session IDs in display order.
    pub fn ids(&self) -> &[SessionId] {
        &self.order
    }

    pub fn slot(&self, id: SessionId) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// The size of the screen needed to show every session, or `None` if headless.
    pub fn screen_size(&self) -> Option<ImageSize> {
        self.router.as_ref().map(DisplayRouter::screen_size)
    }

    /// The number of sessions still running.
    pub fn live_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.session.is_live()).count()
    }

    /// Simulates one frame: every live session is ticked once and drawn.
    ///
    /// Returns the number of sessions still running.
    pub fn run_frame(&mut self, events: &[InputEvent], sink: &mut dyn RenderSink) -> Result<usize, Error> {
        for id in &self.order {
            let slot = &mut self.slots[*id];
            if !slot.session.is_live() {
                continue;
            }
            if slot.step(events) == TickResult::Inactive {
                continue;
            }
            if let (Some(router), Some(frame)) = (&self.router, slot.session.frame()) {
                router.place(frame, slot.display, sink)?;
            }
        }
        sink.present();
        Ok(self.live_count())
    }

    /// Runs frames until every session has ended, polling `input` once per frame.
    pub fn run(&mut self, input: &mut dyn InputSource, sink: &mut dyn RenderSink) -> Result<(), Error> {
        let mut pacer = FramePacer::new(self.config.session.tick_rate);
        loop {
            let events = input.poll();
            if self.run_frame(&events, sink)? == 0 {
                return Ok(());
            }
            if self.config.frame_pacing {
                pacer.wait();
            }
        }
    }

    /// Runs every session until it ends or `max_ticks` ticks have passed,
    /// then starts a fresh session in each slot.
    pub fn run_episode(&mut self, max_ticks: u64, sink: &mut dyn RenderSink) -> Result<Vec<EpisodeSummary>, Error> {
        while self.live_count() > 0 {
            let at_limit = self
                .slots
                .values()
                .all(|slot| !slot.session.is_live() || slot.session.tick_count() >= max_ticks);
            if at_limit {
                break;
            }
            self.run_frame(&[], sink)?;
        }

        let mut summaries = vec![];
        for id in self.order.clone() {
            let slot = &mut self.slots[id];
            slot.session.stop();
            summaries.push(EpisodeSummary {
                session: id,
                ticks: slot.session.tick_count(),
                crashed: slot.session.crashed(),
            });
            self.restart(id)?;
        }
        Ok(summaries)
    }

    /// Replaces an ended session with a fresh one, keeping its driver.
    ///
    /// Returns `false` if the session is still running or does not exist.
    pub fn restart(&mut self, id: SessionId) -> Result<bool, Error> {
        let Some(slot) = self.slots.get_mut(id) else {
            return Ok(false);
        };
        if slot.session.is_live() {
            return Ok(false);
        }
        if let Driver::Learner(learner) = &mut slot.driver {
            learner.end_episode();
        }
        slot.episode += 1;
        slot.session = new_session(&self.config, slot.display, slot.episode, &slot.driver, self.assets.as_mut())?;
        Ok(true)
    }

    /// Stops every session.
    pub fn stop_all(&mut self) {
        for slot in self.slots.values_mut() {
            slot.session.stop();
        }
    }

    /// Saves the table of every learning controller.
    pub fn save_tables(&self, store: &mut dyn TableStore) -> Result<(), StorageError> {
        for (display, id) in self.order.iter().enumerate() {
            if let Some(learner) = self.slots[*id].learner() {
                store.save(&self.table_name(display), learner.table())?;
            }
        }
        Ok(())
    }

    /// Replaces the table of every learning controller with a stored one.
    pub fn load_tables(&mut self, store: &dyn TableStore) -> Result<(), StorageError> {
        for (display, id) in self.order.iter().enumerate() {
            let name = self.table_name(display);
            if let Driver::Learner(learner) = &mut self.slots[*id].driver {
                learner.replace_table(store.load(&name)?)?;
                info!("session {} continues from table {:?}", display, name);
            }
        }
        Ok(())
    }

    /// Zeroes the table of every learning controller and saves it.
    pub fn reset_tables(&mut self, store: &mut dyn TableStore) -> Result<(), StorageError> {
        for (display, id) in self.order.iter().enumerate() {
            let name = self.table_name(display);
            if let Driver::Learner(learner) = &mut self.slots[*id].driver {
                let mut table = QTable::new();
                store.reset(&name, &mut table)?;
                learner.replace_table(table)?;
            }
        }
        Ok(())
    }

    /// The storage name of the table driving the session in region `display`.
    fn table_name(&self, display: usize) -> String {
        if self.config.sessions == 1 {
            self.config.table_name.clone()
        } else {
            format!("{}_{}", self.config.table_name, display)
        }
    }
}

fn new_session(
    config: &RunnerConfig,
    display: usize,
    episode: u64,
    driver: &Driver,
    assets: &mut dyn AssetLoader,
) -> Result<Session, Error> {
    let kind = match driver {
        Driver::Manual => AgentKind::Player,
        Driver::Learner(_) => AgentKind::ControllerDriven,
    };
    let mut session_config = config.session.clone();
    session_config.seed = config
        .session
        .seed
        .map(|seed| seed ^ ((display as u64) << 48) ^ episode.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    Session::new(&session_config, kind, assets)
}

/// Holds a loop to a fixed rate by sleeping until each frame is due.
///
/// A late frame pushes back the schedule rather than being made up for.
#[derive(Clone, Debug)]
pub struct FramePacer {
    period: Duration,
    next: Instant,
}

impl FramePacer {
    /// Creates a pacer for `rate` frames per second.
    pub fn new(rate: f64) -> Self {
        let period = Duration::from_secs_f64(1.0 / rate);
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    /// Sleeps until the next frame is due.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
        }
        self.next = self.next.max(now) + self.period;
    }
}
