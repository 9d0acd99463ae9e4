//! Drives the simulation through the public API the way a host would.

use flappyster::{
    FrameScheduler, GameSimulation, Phase, PixelBuf, RestartMode, Session, SimConfig, Surface,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type Sim = GameSimulation<PixelBuf, ChaCha8Rng>;

fn recording_sim(seed: u64, config: SimConfig) -> (Sim, Rc<RefCell<Vec<u32>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sim = GameSimulation::with_rng(config, PixelBuf::new(36, 60), ChaCha8Rng::seed_from_u64(seed))
        .unwrap()
        .on_score_change(move |score| sink.borrow_mut().push(score));
    (sim, seen)
}

/// Flaps whenever the bird sinks below the center of the next gap.
fn autopilot_wants_flap(sim: &Sim) -> bool {
    let cfg = sim.config();
    let next = sim
        .obstacles()
        .iter()
        .filter(|o| !o.passed)
        .min_by(|a, b| a.x.total_cmp(&b.x));
    match next {
        Some(o) => sim.bird().y > o.gap_top + cfg.gap_height / 2.0 + 20.0,
        None => false,
    }
}

#[test]
fn single_flap_then_falls_to_the_floor() {
    let (mut sim, seen) = recording_sim(1, SimConfig::default());
    assert_eq!(sim.flap(), Phase::Running);

    let mut ended_at = None;
    for i in 0..1000 {
        sim.tick();
        if sim.phase() == Phase::Ended && ended_at.is_none() {
            ended_at = Some(i);
        }
    }

    // Rises for 16 ticks, then hits the floor well before the first pipe.
    let ended_at = ended_at.expect("bird never hit the floor");
    assert!(ended_at < 100, "ended at tick {ended_at}");
    assert!(sim.bird().y + sim.config().bird_radius > sim.config().field_height);
    assert_eq!(sim.score(), 0);
    assert!(seen.borrow().is_empty());
}

#[test]
fn autopilot_scores_with_increasing_callbacks() {
    let (mut sim, seen) = recording_sim(42, SimConfig::default());
    sim.flap();
    for _ in 0..3000 {
        if sim.phase() == Phase::Ended {
            break;
        }
        if autopilot_wants_flap(&sim) {
            sim.flap();
        }
        sim.tick();
    }

    let scores = seen.borrow().clone();
    assert!(!scores.is_empty(), "autopilot never cleared a pipe");
    let expected: Vec<u32> = (1..=scores.len() as u32).collect();
    assert_eq!(scores, expected);
    assert_eq!(sim.score(), *scores.last().unwrap());
    assert_eq!(sim.obstacles().len(), 2);
}

#[test]
fn game_over_flap_resets_and_reports_zero() {
    let (mut sim, seen) = recording_sim(42, SimConfig::default());
    sim.flap();
    while sim.phase() != Phase::Ended {
        if autopilot_wants_flap(&sim) && sim.score() < 1 {
            sim.flap();
        }
        sim.tick();
    }
    let final_score = sim.score();
    assert!(final_score >= 1);
    assert_eq!(sim.best(), final_score);

    assert_eq!(sim.flap(), Phase::Idle);
    assert_eq!(sim.score(), 0);
    assert_eq!(seen.borrow().last(), Some(&0));

    let mut session = Session::default();
    for &score in seen.borrow().iter() {
        session.on_score(score);
    }
    assert_eq!(session.runs(), 1);
    assert_eq!(session.points(), u64::from(final_score));

    // The reset itself does not launch; the next flap does.
    let idle_y = sim.bird().y;
    sim.tick();
    assert_eq!(sim.bird().y, idle_y);
    assert_eq!(sim.flap(), Phase::Running);
}

#[test]
fn reset_and_launch_restarts_immediately() {
    let config = SimConfig {
        restart_mode: RestartMode::ResetAndLaunch,
        ..SimConfig::default()
    };
    let (mut sim, _) = recording_sim(3, config);
    sim.flap();
    while sim.phase() != Phase::Ended {
        sim.tick();
    }
    assert_eq!(sim.flap(), Phase::Running);
    let y = sim.bird().y;
    sim.tick();
    assert!(sim.bird().y < y);
}

#[test]
fn same_seed_same_gaps() {
    let (a, _) = recording_sim(9, SimConfig::default());
    let (b, _) = recording_sim(9, SimConfig::default());
    assert_eq!(a.obstacles(), b.obstacles());
}

#[test]
fn idle_and_game_over_frames_stay_live() {
    let (mut sim, _) = recording_sim(5, SimConfig::default());
    sim.tick();
    let idle = sim.surface().clone();
    sim.tick();
    assert_eq!(&idle, sim.surface());

    sim.flap();
    while sim.phase() != Phase::Ended {
        sim.tick();
    }
    let ended = sim.surface().clone();
    assert_ne!(idle, ended);
    sim.tick();
    assert_eq!(&ended, sim.surface());
}

#[test]
fn scheduler_drives_ticks_until_cancelled() {
    let (mut sim, _) = recording_sim(11, SimConfig::default());
    let (mut frames, cancel) = FrameScheduler::subscribe(Duration::from_millis(1));
    sim.flap();

    let mut ticks = 0;
    while let Some(frame) = frames.next_frame() {
        sim.tick();
        ticks += 1;
        if frame.index == 9 {
            cancel.cancel();
        }
    }
    assert_eq!(ticks, 10);

    let after = sim.bird();
    assert!(frames.next_frame().is_none());
    assert_eq!(sim.bird(), after);
}

#[test]
fn unattached_surface_waits_for_resize() {
    let mut sim = GameSimulation::with_rng(
        SimConfig::default(),
        PixelBuf::new(0, 0),
        ChaCha8Rng::seed_from_u64(0),
    )
    .unwrap();
    sim.flap();
    for _ in 0..5 {
        sim.tick();
    }
    assert_eq!(sim.bird().y, 300.0);
    assert!(!sim.surface().is_ready());

    sim.surface_mut().resize(18, 30);
    sim.tick();
    assert!(sim.bird().y < 300.0);
}
