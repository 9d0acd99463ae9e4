//! The bird-and-pipes simulation.
//!
//! One [`GameSimulation`] owns every piece of mutable game state. The host
//! drives it with [`GameSimulation::tick`] once per frame and forwards input
//! through [`GameSimulation::flap`]; both are synchronous and bounded by the
//! fixed obstacle count.

use crate::config::{ConfigError, RestartMode, SimConfig};
use crate::render::{self, Scene};
use crate::surface::Surface;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Invoked with the new score whenever it changes.
pub type ScoreCallback = Box<dyn FnMut(u32)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first flap. Physics frozen.
    Idle,
    Running,
    /// Game over. Physics frozen until a flap resets.
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    /// Center, in pixels from the top of the field.
    pub y: f64,
    /// Pixels per tick, positive is downward.
    pub velocity: f64,
}

/// A pipe pair with a passable gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Leading (left) edge.
    pub x: f64,
    /// Top of the gap.
    pub gap_top: f64,
    pub passed: bool,
}

impl Obstacle {
    fn spawn<R: Rng>(config: &SimConfig, rng: &mut R, x: f64) -> Self {
        Self {
            x,
            gap_top: rng.gen_range(config.gap_offset_range()) as f64,
            passed: false,
        }
    }

    fn trailing_edge(&self, config: &SimConfig) -> f64 {
        self.x + config.obstacle_width
    }
}

fn initial_obstacles<R: Rng>(config: &SimConfig, rng: &mut R) -> Vec<Obstacle> {
    let start = config.field_width + config.first_obstacle_offset;
    (0..config.obstacle_count)
        .map(|i| Obstacle::spawn(config, rng, start + i as f64 * config.obstacle_spacing()))
        .collect()
}

pub struct GameSimulation<S, R = StdRng> {
    config: SimConfig,
    bird: Bird,
    obstacles: Vec<Obstacle>,
    score: u32,
    best: u32,
    phase: Phase,
    frame: u64,
    rng: R,
    surface: S,
    on_score: Option<ScoreCallback>,
}

impl<S: Surface> GameSimulation<S, StdRng> {
    /// Creates a simulation with an entropy-seeded gap generator.
    pub fn new(config: SimConfig, surface: S) -> Result<Self, ConfigError> {
        Self::with_rng(config, surface, StdRng::from_entropy())
    }

    /// Same gap sequence for the same seed.
    pub fn seeded(config: SimConfig, surface: S, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, surface, StdRng::seed_from_u64(seed))
    }
}

impl<S: Surface, R: Rng> GameSimulation<S, R> {
    pub fn with_rng(config: SimConfig, surface: S, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let obstacles = initial_obstacles(&config, &mut rng);
        Ok(Self {
            bird: Bird {
                y: config.field_height / 2.0,
                velocity: 0.0,
            },
            obstacles,
            score: 0,
            best: 0,
            phase: Phase::Idle,
            frame: 0,
            rng,
            surface,
            on_score: None,
            config,
        })
    }

    pub fn on_score_change(mut self, callback: impl FnMut(u32) + 'static) -> Self {
        self.on_score = Some(Box::new(callback));
        self
    }

    /// Replaces the callback; `None` detaches it.
    pub fn set_score_callback(&mut self, callback: Option<ScoreCallback>) {
        self.on_score = callback;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Highest score of any ended run since construction.
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn bird(&self) -> Bird {
        self.bird
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Advances one frame and redraws.
    ///
    /// Does nothing while the surface is not ready; the next frame retries.
    pub fn tick(&mut self) {
        if !self.surface.is_ready() {
            trace!("tick skipped: surface not ready");
            return;
        }
        if self.phase == Phase::Running {
            self.step();
        }
        self.render();
    }

    /// Applies one input event and returns the resulting phase.
    pub fn flap(&mut self) -> Phase {
        match self.phase {
            Phase::Idle => {
                debug!("run started");
                self.phase = Phase::Running;
                self.bird.velocity = self.config.flap_impulse;
            }
            Phase::Running => {
                self.bird.velocity = self.config.flap_impulse;
            }
            Phase::Ended => {
                self.reset();
                if self.config.restart_mode == RestartMode::ResetAndLaunch {
                    debug!("run started");
                    self.phase = Phase::Running;
                    self.bird.velocity = self.config.flap_impulse;
                }
            }
        }
        self.phase
    }

    /// Returns to the idle layout with fresh gaps and a zero score.
    pub fn reset(&mut self) {
        debug!("reset (score was {})", self.score);
        self.bird = Bird {
            y: self.config.field_height / 2.0,
            velocity: 0.0,
        };
        self.obstacles = initial_obstacles(&self.config, &mut self.rng);
        self.phase = Phase::Idle;
        self.frame = 0;
        if self.score != 0 {
            self.score = 0;
            self.emit_score();
        }
    }

    /// Bounds-box test against the ceiling, the floor and every pipe.
    ///
    /// The bird is treated as the square band `[bird_x - r, bird_x + r]` by
    /// `[y - r, y + r]`, not as a circle.
    pub fn is_colliding(&self) -> bool {
        let r = self.config.bird_radius;
        let top = self.bird.y - r;
        let bottom = self.bird.y + r;
        if top < 0.0 || bottom > self.config.field_height {
            return true;
        }

        let bx = self.config.bird_x();
        self.obstacles.iter().any(|o| {
            let overlaps = bx + r > o.x && bx - r < o.trailing_edge(&self.config);
            overlaps && (top < o.gap_top || bottom > o.gap_top + self.config.gap_height)
        })
    }

    /// Redraws the current state without advancing it.
    pub fn render(&mut self) {
        if !self.surface.is_ready() {
            return;
        }
        let scene = Scene {
            config: &self.config,
            bird: self.bird,
            obstacles: &self.obstacles,
            score: self.score,
            best: self.best,
            phase: self.phase,
            frame: self.frame,
        };
        render::draw(&scene, &mut self.surface);
    }

    fn step(&mut self) {
        self.frame += 1;
        trace!(
            "step frame={} y={:.1} vy={:.1}",
            self.frame,
            self.bird.y,
            self.bird.velocity
        );

        self.bird.velocity += self.config.gravity;
        self.bird.y += self.bird.velocity;

        let respawn_x = self.config.field_width + self.config.recycle_offset;
        for o in &mut self.obstacles {
            o.x -= self.config.obstacle_speed;
            if o.trailing_edge(&self.config) < 0.0 {
                *o = Obstacle::spawn(&self.config, &mut self.rng, respawn_x);
            }
        }

        let pass_line = self.config.bird_x() - self.config.bird_radius;
        let mut newly_passed = 0;
        for o in &mut self.obstacles {
            if !o.passed && o.trailing_edge(&self.config) < pass_line {
                o.passed = true;
                newly_passed += 1;
            }
        }
        for _ in 0..newly_passed {
            self.score += 1;
            self.emit_score();
        }

        if self.is_colliding() {
            self.phase = Phase::Ended;
            self.best = self.best.max(self.score);
            info!("run ended with score {} (best {})", self.score, self.best);
        }
    }

    fn emit_score(&mut self) {
        if let Some(callback) = self.on_score.as_mut() {
            callback(self.score);
        }
    }
}
