//! Flappyster: a Flappy Bird style side-scroller.
//!
//! The library holds the frame-driven simulation ([`GameSimulation`]) and
//! everything a host needs around it: a pixel [`Surface`] to render into, a
//! cancellable [`FrameScheduler`], sound cues and a terminal presenter.

pub mod audio;
pub mod config;
pub mod error;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod sim;
pub mod surface;
pub mod terminal;

pub use config::{ConfigError, RestartMode, SimConfig};
pub use error::Error;
pub use scheduler::{CancelHandle, Frame, FrameScheduler};
pub use session::Session;
pub use sim::{Bird, GameSimulation, Obstacle, Phase, ScoreCallback};
pub use surface::{PixelBuf, Rgb, Surface};
