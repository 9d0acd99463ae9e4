//! Tunable parameters for the simulation.
//!
//! Defaults are the classic tuning: a 360x600 field, a radius-20 bird,
//! 60px pipes with a 160px gap scrolling at 2.5px per tick.

use std::ops::RangeInclusive;
use thiserror::Error;

/// What a flap does once the run has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartMode {
    /// Reset to idle; the next flap launches the new run.
    #[default]
    ResetOnly,
    /// Reset and launch immediately with an impulse.
    ResetAndLaunch,
}

/// Rejected configurations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("gravity must not be negative, got {0}")]
    NegativeGravity(f64),
    #[error("flap impulse must point upward (negative), got {0}")]
    FlapNotUpward(f64),
    #[error("at least two obstacles are required, got {0}")]
    TooFewObstacles(usize),
    #[error("obstacles leave a {corridor}px corridor, narrower than the {bird_width}px bird")]
    ObstaclesTooClose { corridor: f64, bird_width: f64 },
    #[error(
        "gap of {gap_height}px with {margin}px margins does not fit a {field_height}px field"
    )]
    GapDoesNotFit {
        gap_height: f64,
        margin: f64,
        field_height: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub field_width: f64,
    pub field_height: f64,
    pub bird_radius: f64,
    /// Velocity added per tick.
    pub gravity: f64,
    /// Velocity set on flap; negative is upward.
    pub flap_impulse: f64,
    pub obstacle_width: f64,
    pub gap_height: f64,
    /// Horizontal pixels per tick.
    pub obstacle_speed: f64,
    /// Minimum distance between the gap and the top or bottom edge.
    pub gap_margin: f64,
    /// Obstacles in play; they are recycled, never added.
    pub obstacle_count: usize,
    /// Distance past the right edge where the first obstacle starts.
    pub first_obstacle_offset: f64,
    /// Distance past the right edge where a recycled obstacle reappears.
    pub recycle_offset: f64,
    pub restart_mode: RestartMode,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field_width: 360.0,
            field_height: 600.0,
            bird_radius: 20.0,
            gravity: 0.5,
            flap_impulse: -8.0,
            obstacle_width: 60.0,
            gap_height: 160.0,
            obstacle_speed: 2.5,
            gap_margin: 80.0,
            obstacle_count: 2,
            first_obstacle_offset: 100.0,
            recycle_offset: 40.0,
            restart_mode: RestartMode::ResetOnly,
        }
    }
}

impl SimConfig {
    /// The wider gap used by the relaxed tuning.
    pub const RELAXED_GAP_HEIGHT: f64 = 170.0;

    pub fn with_gap_height(mut self, gap_height: f64) -> Self {
        self.gap_height = gap_height;
        self
    }

    /// Fixed horizontal center of the bird.
    pub fn bird_x(&self) -> f64 {
        self.field_width / 4.0
    }

    /// Horizontal distance between consecutive obstacles in the initial
    /// layout: half the field width.
    pub fn obstacle_spacing(&self) -> f64 {
        self.field_width / 2.0
    }

    /// Narrowest horizontal corridor between neighbouring obstacles once
    /// recycling has settled.
    ///
    /// Neighbours start `spacing - width` apart. The last obstacle and the
    /// first one recycled behind it are `field_width + recycle_offset` minus
    /// `(count - 1) * spacing` apart. A recycle lands on the next whole tick,
    /// so either gap can shrink by up to one tick of movement.
    pub fn min_corridor(&self) -> f64 {
        let spacing = self.obstacle_spacing();
        let between = spacing - self.obstacle_width;
        let wrap = self.field_width + self.recycle_offset
            - self.obstacle_count.saturating_sub(1) as f64 * spacing;
        between.min(wrap) - self.obstacle_speed
    }

    /// Inclusive range of legal gap-top offsets, in whole pixels.
    pub fn gap_offset_range(&self) -> RangeInclusive<i64> {
        let min = self.gap_margin.ceil() as i64;
        let max = (self.field_height - self.gap_height - self.gap_margin).floor() as i64;
        min..=max
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("bird_radius", self.bird_radius),
            ("gravity", self.gravity),
            ("flap_impulse", self.flap_impulse),
            ("obstacle_width", self.obstacle_width),
            ("gap_height", self.gap_height),
            ("obstacle_speed", self.obstacle_speed),
            ("gap_margin", self.gap_margin),
            ("first_obstacle_offset", self.first_obstacle_offset),
            ("recycle_offset", self.recycle_offset),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }

        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("bird_radius", self.bird_radius),
            ("obstacle_width", self.obstacle_width),
            ("gap_height", self.gap_height),
            ("obstacle_speed", self.obstacle_speed),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if self.gravity < 0.0 {
            return Err(ConfigError::NegativeGravity(self.gravity));
        }
        if self.flap_impulse >= 0.0 {
            return Err(ConfigError::FlapNotUpward(self.flap_impulse));
        }
        if self.obstacle_count < 2 {
            return Err(ConfigError::TooFewObstacles(self.obstacle_count));
        }
        let bird_width = 2.0 * self.bird_radius;
        let corridor = self.min_corridor();
        if corridor < bird_width {
            return Err(ConfigError::ObstaclesTooClose {
                corridor,
                bird_width,
            });
        }
        if self.gap_margin < 0.0 || self.gap_offset_range().is_empty() {
            return Err(ConfigError::GapDoesNotFit {
                gap_height: self.gap_height,
                margin: self.gap_margin,
                field_height: self.field_height,
            });
        }
        Ok(())
    }
}
