//! Tests that involve several sessions sharing one control loop.

use lane_sim::cgmath::Point2;
use lane_sim::io::{FixedAssets, ImageHandle, ImageSize, InputEvent, RenderSink, ScriptedInput};
use lane_sim::{MemoryStore, Runner, RunnerConfig, SessionConfig, TableStore};

#[derive(Default)]
struct Recorder {
    blits: Vec<(ImageHandle, Point2<f64>)>,
    frames: usize,
}

impl RenderSink for Recorder {
    fn blit(&mut self, image: &ImageHandle, position: Point2<f64>) {
        self.blits.push((image.clone(), position));
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}

fn config(sessions: usize, manual: bool, render: bool) -> RunnerConfig {
    RunnerConfig {
        sessions,
        manual,
        frame_pacing: false,
        session: SessionConfig {
            seed: Some(9),
            render,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Test that each session is drawn into its own region until the user quits.
#[test]
fn sessions_render_into_separate_regions() {
    let mut runner = Runner::new(config(4, true, true), Box::new(FixedAssets::reference())).unwrap();
    assert_eq!(runner.screen_size(), Some(ImageSize::new(1000, 1200)));

    let mut input = ScriptedInput::new(vec![vec![], vec![InputEvent::Right], vec![InputEvent::Quit]]);
    let mut sink = Recorder::default();
    runner.run(&mut input, &mut sink).unwrap();

    assert_eq!(sink.frames, 3);
    assert_eq!(runner.live_count(), 0);
    let lanes: Vec<_> = sink
        .blits
        .iter()
        .filter(|(image, _)| image == "street_sprite.png")
        .map(|(_, pos)| *pos)
        .collect();
    // Two frames drawn, four sessions, five lanes each.
    assert_eq!(lanes.len(), 2 * 4 * 5);
    assert!(lanes.contains(&Point2::new(500.0, 600.0)));
    assert!(lanes.contains(&Point2::new(900.0, 600.0)));
    assert!(lanes.iter().all(|p| p.x < 1000.0 && p.y < 1200.0));

    for id in runner.ids() {
        let session = runner.slot(*id).unwrap().session();
        assert_eq!(session.tick_count(), 2);
        assert_eq!(session.controlled().lane(), 2);
    }
}

/// Test that learned tables survive a save and load.
#[test]
fn tables_round_trip_through_storage() {
    let mut trained = Runner::new(config(2, false, false), Box::new(FixedAssets::reference())).unwrap();
    trained.run_episode(200, &mut Recorder::default()).unwrap();

    let mut store = MemoryStore::new();
    trained.save_tables(&mut store).unwrap();
    assert!(store.load("qtable_0").is_ok());
    assert!(store.load("qtable").is_err());

    let mut fresh = Runner::new(config(2, false, false), Box::new(FixedAssets::reference())).unwrap();
    fresh.load_tables(&store).unwrap();
    for (a, b) in trained.ids().iter().zip(fresh.ids()) {
        let a = trained.slot(*a).unwrap().learner().unwrap().table();
        let b = fresh.slot(*b).unwrap().learner().unwrap().table();
        assert_eq!(a, b);
    }

    fresh.reset_tables(&mut store).unwrap();
    assert_eq!(store.load("qtable_1").unwrap(), lane_sim::QTable::new());
}

/// Test that loading from an empty store fails rather than inventing a table.
#[test]
fn loading_missing_tables_fails() {
    let mut runner = Runner::new(config(1, false, false), Box::new(FixedAssets::reference())).unwrap();
    assert!(runner.load_tables(&MemoryStore::new()).is_err());
}
