/// Pitch used for the sound timer tone.
pub const BEEP_FREQUENCY_HZ: u32 = 440;

/// Sink for the tones requested by the sound timer.
///
/// Calls are fire-and-forget: the core never waits for the tone to finish.
pub trait Audio {
    fn beep(&mut self, frequency_hz: u32, duration_ms: u32);
}

/// Discards every tone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Audio for Silent {
    fn beep(&mut self, _frequency_hz: u32, _duration_ms: u32) {}
}
