use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use chip8vm::Audio;
use sdl2::audio::{AudioCallback, AudioSpec};

/// A simple square wave.
/// Adapted from sdl2::audio sample code.
///
/// A good tool for testing tone changes is https://onlinetonegenerator.com/?waveform=square
pub struct SquareWave {
    sample_rate: f32,
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl SquareWave {
    pub fn set_frequency(&mut self, frequency_hz: u32) {
        self.phase_inc = frequency_hz as f32 / self.sample_rate;
    }
}

impl From<AudioSpec> for SquareWave {
    fn from(spec: AudioSpec) -> Self {
        let mut wave = SquareWave {
            sample_rate: spec.freq as f32,
            phase_inc: 0.0,
            phase: 0.0,
            volume: 0.10,
        };
        wave.set_frequency(chip8vm::audio::BEEP_FREQUENCY_HZ);
        wave
    }
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for x in out.iter_mut() {
            *x = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// A tone asked for by the machine thread.
pub struct BeepRequest {
    pub frequency_hz: u32,
    pub duration: Duration,
}

/// The machine's speaker: forwards tones to the thread that owns the
/// audio device.
pub struct BeepSender(Sender<BeepRequest>);

impl Audio for BeepSender {
    fn beep(&mut self, frequency_hz: u32, duration_ms: u32) {
        let request = BeepRequest {
            frequency_hz,
            duration: Duration::from_millis(duration_ms as u64),
        };
        if self.0.send(request).is_err() {
            log::debug!("beep dropped, audio thread is gone");
        }
    }
}

pub fn channel() -> (BeepSender, Receiver<BeepRequest>) {
    let (tx, rx) = mpsc::channel();
    (BeepSender(tx), rx)
}
