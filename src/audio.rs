//! Sound cues for flap, score and crash.
//!
//! Tones are synthesized with fundsp into sample buffers up front and played
//! through rodio's output mixer, so triggering a cue from inside a frame never
//! blocks.

use fundsp::prelude32::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle};
use thiserror::Error;

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("could not play cue: {0}")]
    Play(#[from] rodio::PlayError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Flap,
    Score,
    Crash,
}

impl Cue {
    fn millis(self) -> u32 {
        match self {
            Cue::Flap => 80,
            Cue::Score => 150,
            Cue::Crash => 500,
        }
    }
}

fn collect<X: AudioNode>(mut node: An<X>, len: usize) -> Vec<f32> {
    node.set_sample_rate(SAMPLE_RATE as f64);
    (0..len).map(|_| node.get_mono()).collect()
}

/// Renders a cue into mono samples at [`SAMPLE_RATE`].
pub fn synthesize(cue: Cue) -> Vec<f32> {
    let len = (SAMPLE_RATE * cue.millis() / 1000) as usize;
    match cue {
        Cue::Flap => {
            // Quick upward chirp.
            let freq = lfo(|t: f32| -> f32 { lerp(300.0, 700.0, (t / 0.08).min(1.0)) });
            let gain = lfo(|t: f32| -> f32 { lerp(0.12, 0.0, (t / 0.08).min(1.0)) });
            collect((freq >> sine()) * gain, len)
        }
        Cue::Score => {
            // Two-note chime, the second a fifth above.
            let freq = lfo(|t: f32| -> f32 { if t < 0.06 { 880.0 } else { 1320.0 } });
            let gain = lfo(|t: f32| -> f32 { lerp(0.15, 0.0, (t / 0.15).min(1.0)) });
            collect((freq >> sine()) * gain, len)
        }
        Cue::Crash => {
            // Falling saw, 400Hz to 80Hz.
            let freq = lfo(|t: f32| -> f32 { lerp(400.0, 80.0, (t / 0.4).min(1.0)) });
            let gain = lfo(|t: f32| -> f32 { lerp(0.15, 0.0, (t / 0.5).min(1.0)) });
            collect((freq >> saw()) * gain, len)
        }
    }
}

struct Output {
    // Playback stops when the stream is dropped.
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Pre-rendered cues bound to an output device, or silent.
pub struct Sfx {
    output: Option<Output>,
    flap: Vec<f32>,
    score: Vec<f32>,
    crash: Vec<f32>,
}

impl Sfx {
    /// Opens the default output device.
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        let mut sfx = Self::muted();
        sfx.output = Some(Output {
            _stream: stream,
            handle,
        });
        Ok(sfx)
    }

    /// Opens the default device, falling back to silence with a warning.
    pub fn open_or_muted() -> Self {
        match Self::open() {
            Ok(sfx) => sfx,
            Err(e) => {
                log::warn!("sound disabled: {e}");
                Self::muted()
            }
        }
    }

    pub fn muted() -> Self {
        Self {
            output: None,
            flap: synthesize(Cue::Flap),
            score: synthesize(Cue::Score),
            crash: synthesize(Cue::Crash),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.output.is_none()
    }

    /// Starts a cue in the background. Failures are logged, never fatal.
    pub fn play(&self, cue: Cue) {
        let Some(output) = &self.output else { return };
        let samples = match cue {
            Cue::Flap => &self.flap,
            Cue::Score => &self.score,
            Cue::Crash => &self.crash,
        };
        let source = SamplesBuffer::new(1, SAMPLE_RATE, samples.clone());
        if let Err(e) = output.handle.play_raw(source) {
            log::debug!("dropping {cue:?} cue: {}", AudioError::from(e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_lengths() {
        assert_eq!(synthesize(Cue::Flap).len(), 3528);
        assert_eq!(synthesize(Cue::Score).len(), 6615);
        assert_eq!(synthesize(Cue::Crash).len(), 22050);
    }

    #[test]
    fn test_cues_are_quiet_and_fade_out() {
        for cue in [Cue::Flap, Cue::Score, Cue::Crash] {
            let samples = synthesize(cue);
            assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 0.2));
            assert!(samples.iter().any(|s| s.abs() > 0.01), "{cue:?} is silent");
            let tail = &samples[samples.len() - 100..];
            assert!(tail.iter().all(|s| s.abs() < 0.02), "{cue:?} does not fade");
        }
    }

    #[test]
    fn test_muted_play_is_noop() {
        let sfx = Sfx::muted();
        assert!(sfx.is_muted());
        sfx.play(Cue::Crash);
    }
}
