use std::io::Read;

use nanorand::{BufferedRng, WyRand};

use crate::{
    audio::Audio,
    config::Config,
    cpu::{Bus, Cpu, CpuSnapshot, RandomSource},
    display::{Display, Frame},
    error::{Error, Result},
    input::{CancelToken, KeyInput},
    memory::Memory,
};

/// Something that can show the screen, e.g. a window or a terminal.
pub trait Render {
    type Error;

    fn render(&mut self, frame: &Frame, cpu: &CpuSnapshot) -> std::result::Result<(), Self::Error>;
}

/// The whole machine: CPU, memory and display, wired to a keypad and a
/// speaker.
///
/// The driver calls `tick_instruction` at whatever rate it wants to emulate
/// and `tick_timer` at 60Hz. After an error the machine stays halted until
/// `reset` is called. A halt caused by cancelling the wait for a key can
/// also be undone with `resume`.
pub struct Platform<K: KeyInput, A: Audio> {
    config: Config,
    cpu: Cpu,
    memory: Memory,
    display: Display,
    keys: K,
    audio: A,
    cancel: CancelToken,

    // memory as it was right after the rom was loaded
    boot_memory: Memory,
    halted: bool,

    // halted while waiting for a key, with PC still on the FX0A
    interrupted: bool,
}

impl<K: KeyInput, A: Audio> Platform<K, A> {
    pub fn new(config: Config, keys: K, audio: A) -> Self {
        let cpu = Cpu::with_seed(config.rng_seed);
        Self::build(config, cpu, keys, audio)
    }

    /// Like `new`, with a caller-supplied source of random numbers for
    /// `CXNN`. `config.rng_seed` is ignored, and `reset` keeps the source.
    pub fn with_rng(config: Config, keys: K, audio: A, rng: Box<dyn RandomSource>) -> Self {
        let config = Config {
            rng_seed: None,
            ..config
        };
        Self::build(config, Cpu::new(rng), keys, audio)
    }

    fn build(config: Config, cpu: Cpu, keys: K, audio: A) -> Self {
        let memory = blank_memory(&config);

        Platform {
            config,
            cpu,
            memory: memory.clone(),
            display: Display::new(),
            keys,
            audio,
            cancel: CancelToken::new(),
            boot_memory: memory,
            halted: false,
            interrupted: false,
        }
    }

    /// Load a chip-8 rom and restart the machine.
    pub fn load_rom<T>(&mut self, mut rom: T) -> Result<()>
    where
        T: Read,
    {
        let mut image = Vec::new();
        rom.read_to_end(&mut image)?;

        let mut memory = blank_memory(&self.config);
        memory.load_program(&image)?;
        log::debug!("loaded rom with {} bytes", image.len());

        self.boot_memory = memory;
        self.reset();
        Ok(())
    }

    /// Back to the state right after the rom was loaded. A seeded random
    /// generator starts over from its seed.
    pub fn reset(&mut self) {
        self.memory = self.boot_memory.clone();
        self.cpu.reset();
        if let Some(seed) = self.config.rng_seed {
            self.cpu.set_rng(Box::new(BufferedRng::<WyRand, 8>::new(WyRand::new_seed(seed))));
        }
        self.display.clear();
        self.cancel.rearm();
        self.halted = false;
        self.interrupted = false;
        log::debug!("machine reset");
    }

    /// Re-arm the cancellation token. If the machine was halted by a
    /// cancelled wait for a key, clear the halt so that the next tick waits
    /// again. Returns `true` when such a halt was cleared.
    pub fn resume(&mut self) -> bool {
        self.cancel.rearm();
        if !self.interrupted {
            return false;
        }

        self.interrupted = false;
        self.halted = false;
        log::debug!("machine resumed at {:#05X}", self.cpu.PC);
        true
    }

    /// Execute a single instruction.
    pub fn tick_instruction(&mut self) -> Result<()> {
        if self.halted {
            return Err(Error::Halted);
        }

        let mut bus = Bus {
            memory: &mut self.memory,
            display: &mut self.display,
            keys: &self.keys,
            audio: &mut self.audio,
            cancel: &self.cancel,
        };

        let result = self.cpu.step(&mut bus);
        match &result {
            Err(Error::Cancelled) => {
                log::debug!("wait for key cancelled at {:#05X}", self.cpu.PC);
                self.halted = true;
                self.interrupted = true;
            }
            Err(err) => {
                log::warn!("machine halted: {}", err);
                self.halted = true;
            }
            Ok(()) => {}
        }
        result
    }

    /// Count the timers down by one.
    pub fn tick_timer(&mut self) {
        self.cpu.tick_timers();
    }

    /// Hand the current screen and registers to a renderer.
    pub fn present<R: Render>(&self, sink: &mut R) -> std::result::Result<(), R::Error> {
        sink.render(self.display.frame(), &self.cpu.snapshot())
    }

    /// A token that aborts a pending wait for a key press when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

fn blank_memory(config: &Config) -> Memory {
    if config.load_font {
        Memory::with_font()
    } else {
        Memory::new()
    }
}
