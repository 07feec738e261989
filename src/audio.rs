use std::{f32::consts::TAU, io::Write, time::Duration};

use log::{debug, warn};

/// A tone that slides from one pitch and volume to another along
/// exponential curves.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sweep {
    pub start_hz: f32,
    pub end_hz: f32,
    pub start_gain: f32,
    pub end_gain: f32,
    pub duration: Duration,
}

impl Sweep {
    /// High to low, like a cat.
    pub const MEOW: Sweep = Sweep {
        start_hz: 600.0,
        end_hz: 300.0,
        start_gain: 0.5,
        end_gain: 0.01,
        duration: Duration::from_millis(300),
    };

    /// Frequency at `t` seconds into the sweep.
    pub fn frequency_at(&self, t: f32) -> f32 {
        exp_ramp(self.start_hz, self.end_hz, self.progress(t))
    }

    pub fn gain_at(&self, t: f32) -> f32 {
        exp_ramp(self.start_gain, self.end_gain, self.progress(t))
    }

    fn progress(&self, t: f32) -> f32 {
        let total = self.duration.as_secs_f32();
        if total <= 0.0 {
            1.0
        } else {
            (t / total).clamp(0.0, 1.0)
        }
    }

    /// Mono PCM at `sample_rate`. Phase is accumulated sample by sample so
    /// the pitch glides without clicks.
    pub fn samples(&self, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration.as_secs_f32() * sample_rate as f32).round() as usize;
        let step = 1.0 / sample_rate as f32;
        let mut phase = 0.0f32;

        (0..count)
            .map(|i| {
                let t = i as f32 * step;
                let sample = phase.sin() * self.gain_at(t);
                phase = (phase + TAU * self.frequency_at(t) * step) % TAU;
                sample
            })
            .collect()
    }
}

fn exp_ramp(from: f32, to: f32, progress: f32) -> f32 {
    from * (to / from).powf(progress)
}

pub trait Player {
    fn play(&mut self, sweep: &Sweep);
}

/// Rings the terminal bell. Terminals can't do pitch, so this is the
/// closest thing that works everywhere.
pub struct Bell<W: Write> {
    out: W,
}

impl<W: Write> Bell<W> {
    pub fn new(out: W) -> Self {
        Bell { out }
    }
}

impl<W: Write> Player for Bell<W> {
    fn play(&mut self, _sweep: &Sweep) {
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            warn!("could not ring the bell: {}", e);
        }
    }
}

/// Wraps a player with the on/off switch from the settings window.
pub struct Speaker {
    player: Box<dyn Player>,
    enabled: bool,
}

impl Speaker {
    pub fn new(player: Box<dyn Player>, enabled: bool) -> Self {
        Speaker { player, enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        debug!("sound {}", if self.enabled { "on" } else { "off" });
        self.enabled
    }

    pub fn meow(&mut self) {
        if self.enabled {
            self.player.play(&Sweep::MEOW);
        }
    }
}

/// The best player this build has: the sound card with the `audio`
/// feature, otherwise the terminal bell.
pub fn default_player() -> Box<dyn Player> {
    #[cfg(feature = "audio")]
    {
        match cpal_player::CpalPlayer::new() {
            Ok(player) => return Box::new(player),
            Err(e) => warn!("no audio device, falling back to the bell: {}", e),
        }
    }
    Box::new(Bell::new(std::io::stdout()))
}

#[cfg(feature = "audio")]
mod cpal_player {
    use std::sync::{Arc, Mutex};

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleFormat, Stream};
    use log::warn;

    use super::{Player, Sweep};
    use crate::error::{Error, Result};

    type Queue = Arc<Mutex<std::collections::VecDeque<f32>>>;

    /// Keeps one output stream open and feeds it rendered sweeps.
    pub struct CpalPlayer {
        queue: Queue,
        sample_rate: u32,
        _stream: Stream,
    }

    impl CpalPlayer {
        pub fn new() -> Result<Self> {
            let device = cpal::default_host()
                .default_output_device()
                .ok_or_else(|| Error::Audio("no default output device".into()))?;
            let supported = device
                .default_output_config()
                .map_err(|e| Error::Audio(e.to_string()))?;
            if supported.sample_format() != SampleFormat::F32 {
                return Err(Error::Audio(format!(
                    "unsupported sample format {:?}",
                    supported.sample_format()
                )));
            }

            let config: cpal::StreamConfig = supported.into();
            let channels = config.channels as usize;
            let sample_rate = config.sample_rate.0;
            let queue: Queue = Arc::default();
            let feed = Arc::clone(&queue);

            let stream = device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _| {
                        let mut queue = match feed.lock() {
                            Ok(q) => q,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        for frame in data.chunks_mut(channels) {
                            let sample = queue.pop_front().unwrap_or(0.0);
                            frame.fill(sample);
                        }
                    },
                    |e| warn!("audio stream error: {}", e),
                    None,
                )
                .map_err(|e| Error::Audio(e.to_string()))?;
            stream.play().map_err(|e| Error::Audio(e.to_string()))?;

            Ok(CpalPlayer { queue, sample_rate, _stream: stream })
        }
    }

    impl Player for CpalPlayer {
        fn play(&mut self, sweep: &Sweep) {
            let samples = sweep.samples(self.sample_rate);
            match self.queue.lock() {
                Ok(mut queue) => queue.extend(samples),
                Err(e) => warn!("audio queue poisoned: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn meow_slides_down() {
        let sweep = Sweep::MEOW;
        assert!((sweep.frequency_at(0.0) - 600.0).abs() < 1e-3);
        assert!((sweep.frequency_at(0.3) - 300.0).abs() < 1e-3);
        assert!((sweep.frequency_at(10.0) - 300.0).abs() < 1e-3);
        // Exponential: halfway in time is the geometric mean.
        assert!((sweep.frequency_at(0.15) - (600.0f32 * 300.0).sqrt()).abs() < 0.5);
        assert!((sweep.gain_at(0.3) - 0.01).abs() < 1e-4);
    }

    #[test]
    fn samples_length_and_envelope() {
        let samples = Sweep::MEOW.samples(8000);
        assert_eq!(samples.len(), 2400);
        assert!(samples.iter().all(|s| s.abs() <= 0.5 + 1e-6));
        let tail_peak = samples[2300..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail_peak < 0.05);
    }

    struct Counter(Rc<RefCell<u32>>);

    impl Player for Counter {
        fn play(&mut self, _sweep: &Sweep) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn muted_speaker_stays_quiet() {
        let plays = Rc::new(RefCell::new(0));
        let mut speaker = Speaker::new(Box::new(Counter(Rc::clone(&plays))), true);
        speaker.meow();
        assert!(!speaker.toggle());
        speaker.meow();
        assert_eq!(*plays.borrow(), 1);
    }

    #[test]
    fn bell_writes_bel() {
        let mut bell = Bell::new(Vec::new());
        bell.play(&Sweep::MEOW);
        assert_eq!(bell.out, b"\x07");
    }
}
