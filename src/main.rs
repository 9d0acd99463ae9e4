use clap::{Parser, ValueEnum};
use flappyster::audio::{Cue, Sfx};
use flappyster::terminal::{self, Input, TerminalGuard};
use flappyster::{
    Error, FrameScheduler, GameSimulation, Phase, PixelBuf, RestartMode, Session, SimConfig,
    Surface,
};
use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(
    name = "flappyster",
    version,
    about = "Flap through the pipes. Space, Up, Enter or click to flap; q or Esc to quit."
)]
struct Cli {
    /// Vertical opening of each pipe pair in field pixels (160 classic, 170 relaxed)
    #[arg(long, default_value_t = 160.0)]
    gap_height: f64,

    /// Pipe speed in field pixels per frame
    #[arg(long, default_value_t = 2.5)]
    speed: f64,

    /// Seed for the gap sequence; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// What a flap does on the game-over screen
    #[arg(long, value_enum, default_value_t = Restart::ResetOnly)]
    restart_mode: Restart,

    /// Disable sound
    #[arg(long)]
    mute: bool,

    /// Write logs to this file (RUST_LOG controls the level, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Restart {
    /// Reset to the start screen; flap again to launch
    ResetOnly,
    /// Reset and launch straight away
    ResetAndLaunch,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            gap_height: self.gap_height,
            obstacle_speed: self.speed,
            restart_mode: match self.restart_mode {
                Restart::ResetOnly => RestartMode::ResetOnly,
                Restart::ResetAndLaunch => RestartMode::ResetAndLaunch,
            },
            ..SimConfig::default()
        }
    }
}

/// The game owns the terminal, so without a log file only warnings reach stderr.
fn init_logging(path: Option<&Path>) -> Result<(), Error> {
    let default_level = if path.is_some() { "info" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(path) = path {
        let file = File::create(path).map_err(|source| Error::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = cli.sim_config();
    config.validate()?;
    log::info!("starting with {config:?}");

    let sfx = Rc::new(if cli.mute {
        Sfx::muted()
    } else {
        Sfx::open_or_muted()
    });
    let session = Rc::new(RefCell::new(Session::default()));

    let mut term = TerminalGuard::enter()?;
    let (cols, rows) = term.size()?;
    let (pw, ph) = terminal::fit_field(cols, rows, config.field_width, config.field_height);
    let surface = PixelBuf::new(pw, ph);

    let sim = match cli.seed {
        Some(seed) => GameSimulation::seeded(config, surface, seed)?,
        None => GameSimulation::new(config, surface)?,
    };
    let mut sim = sim.on_score_change({
        let session = Rc::clone(&session);
        let sfx = Rc::clone(&sfx);
        move |score| {
            if score > 0 {
                sfx.play(Cue::Score);
            }
            session.borrow_mut().on_score(score);
        }
    });

    let (mut frames, cancel) =
        FrameScheduler::subscribe(FrameScheduler::interval_for_fps(cli.fps));
    // Leaving this scope by any path stops the clock.
    let _teardown = cancel.clone().cancel_on_drop();

    'frames: while let Some(frame) = frames.next_frame() {
        for input in terminal::poll_inputs()? {
            match input {
                Input::Quit => {
                    cancel.cancel();
                    continue 'frames;
                }
                Input::Flap => {
                    if sim.flap() == Phase::Running {
                        sfx.play(Cue::Flap);
                    }
                }
                Input::Resize(c, r) => {
                    let cfg = sim.config();
                    let (w, h) = terminal::fit_field(c, r, cfg.field_width, cfg.field_height);
                    log::debug!("resized to {c}x{r} cells, {w}x{h} pixels");
                    sim.surface_mut().resize(w, h);
                    term.clear()?;
                }
            }
        }

        let before = sim.phase();
        sim.tick();
        if before == Phase::Running && sim.phase() == Phase::Ended {
            sfx.play(Cue::Crash);
        }
        if sim.surface().is_ready() {
            term.present(sim.surface())?;
        }
        log::trace!("frame {} took {:?}", frame.index, frame.delta);
    }
    drop(term);

    let mut session = session.borrow_mut();
    session.close_run();
    log::info!(
        "session over: {} scoring runs, {} points, best {}",
        session.runs(),
        session.points(),
        session.best()
    );
    Ok(())
}
