use std::time::{Duration, Instant};

use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

const BEEP_PITCH: f32 = 440.0;
const BEEP_VOLUME: f32 = 0.25;
const BEEP_LENGTH: Duration = Duration::from_millis(100);
const SAMPLE_RATE: i32 = 44_100;

/// Makes the noise asked for by the sound timer
pub trait Sound {
    /// start a beep
    fn beep(&mut self);

    /// called once per cycle so a beep can be ended
    fn update(&mut self);
}

struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// Square wave beeps through the default sdl2 playback device
pub struct Beeper {
    device: AudioDevice<SquareWave>,
    until: Option<Instant>,
}

impl Beeper {
    pub fn new(sdl: &sdl2::Sdl) -> Result<Self, String> {
        let audio = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(SAMPLE_RATE),
            channels: Some(1),
            samples: None,
        };
        let device = audio.open_playback(None, &desired, |spec| SquareWave {
            phase_inc: BEEP_PITCH / spec.freq as f32,
            phase: 0.0,
            volume: BEEP_VOLUME,
        })?;
        Ok(Beeper {
            device,
            until: None,
        })
    }
}

impl Sound for Beeper {
    fn beep(&mut self) {
        self.device.resume();
        self.until = Some(Instant::now() + BEEP_LENGTH);
    }

    fn update(&mut self) {
        if let Some(until) = self.until {
            if Instant::now() >= until {
                self.device.pause();
                self.until = None;
            }
        }
    }
}

/// Silence, for `--mute`
pub struct Mute;

impl Sound for Mute {
    fn beep(&mut self) {}

    fn update(&mut self) {}
}
