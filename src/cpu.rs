use std::ops::{Index, IndexMut};

use nanorand::{BufferedRng, Rng, WyRand};

use crate::{
    audio::{Audio, BEEP_FREQUENCY_HZ},
    display::Display,
    error::{Error, Result},
    input::{CancelToken, KeyInput},
    instruction::Instruction,
    memory::{Memory, MEM_SIZE, PROGRAM_START},
};

// nesting limit for subroutines
pub const STACK_DEPTH: usize = 16;

// rate at which the driver ticks the timers
pub const TIMER_HZ: u32 = 60;

/// Source of the random bytes used by `CXNN`.
pub trait RandomSource: Send {
    fn next_byte(&mut self) -> u8;
}

impl RandomSource for BufferedRng<WyRand, 8> {
    fn next_byte(&mut self) -> u8 {
        let mut n = [0u8; 1];
        self.fill(&mut n);
        n[0]
    }
}

/// Data registers V0 - VF. Indexing past VF panics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registers([u8; 16]);

impl Registers {
    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    pub fn as_array(&self) -> &[u8; 16] {
        &self.0
    }
}

impl Index<usize> for Registers {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Registers {
    fn index_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.0[index]
    }
}

/// Fixed-depth stack of return addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallStack {
    slots: [u16; STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            slots: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    /// Returns `false`, leaving the stack untouched, when it is full.
    pub fn push(&mut self, address: u16) -> bool {
        if self.sp == STACK_DEPTH {
            return false;
        }
        self.slots[self.sp] = address;
        self.sp += 1;
        true
    }

    pub fn pop(&mut self) -> Option<u16> {
        if self.sp == 0 {
            return None;
        }
        self.sp -= 1;
        Some(self.slots[self.sp])
    }

    pub fn len(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only copy of the CPU state, for debug overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

/// Everything an instruction can touch outside of the CPU itself.
pub struct Bus<'a> {
    pub memory: &'a mut Memory,
    pub display: &'a mut Display,
    pub keys: &'a dyn KeyInput,
    pub audio: &'a mut dyn Audio,
    pub cancel: &'a CancelToken,
}

#[allow(non_snake_case)]
pub struct Cpu {
    // program counter
    pub PC: u16,

    // data registers: V0 - VF
    pub V: Registers,

    // address register
    pub I: u16,

    // subroutine stack
    pub stack: CallStack,

    // delay timer
    pub DT: u8,

    // sound timer
    pub ST: u8,

    // random number generator
    rng: Box<dyn RandomSource>,
}

impl Cpu {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Cpu {
            PC: PROGRAM_START as u16,
            V: Registers::default(),
            I: 0,
            stack: CallStack::new(),
            DT: 0,
            ST: 0,
            rng,
        }
    }

    /// CPU backed by `WyRand`, seeded from `seed` or from system entropy.
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };
        Cpu::new(Box::new(BufferedRng::<WyRand, 8>::new(rng)))
    }

    /// Back to the power-on state. The random generator is not touched,
    /// see `Platform::reset` for reseeding.
    pub fn reset(&mut self) {
        self.PC = PROGRAM_START as u16;
        self.V = Registers::default();
        self.I = 0;
        self.stack = CallStack::new();
        self.DT = 0;
        self.ST = 0;
    }

    pub fn set_rng(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    /// Decrement both timers, stopping at zero.
    pub fn tick_timers(&mut self) {
        self.DT = self.DT.saturating_sub(1);
        self.ST = self.ST.saturating_sub(1);
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            v: *self.V.as_array(),
            i: self.I,
            pc: self.PC,
            sp: self.stack.len(),
            delay_timer: self.DT,
            sound_timer: self.ST,
        }
    }

    /// Fetch, decode and execute a single instruction.
    pub fn step(&mut self, bus: &mut Bus<'_>) -> Result<()> {
        let pc = self.PC;
        let opcode = bus.memory.read_word(pc as usize)?;
        let [a, b] = opcode.to_be_bytes();
        self.PC += 2;

        let instruction = match Instruction::decode(a, b) {
            Some(instruction) => instruction,
            None => return Err(Error::UnknownOpcode { opcode, pc }),
        };

        log::trace!("{:#05X}: {:04X} {}", pc, opcode, instruction);
        self.execute(instruction, pc, bus)
    }

    fn skip(&mut self) {
        self.PC += 2;
    }

    fn execute(&mut self, instruction: Instruction, pc: u16, bus: &mut Bus<'_>) -> Result<()> {
        use Instruction::*;

        const F: usize = 0xF;

        match instruction {
            // 00E0 - clear the screen
            Cls => bus.display.clear(),
            // 00EE - return from subroutine
            Ret => {
                self.PC = self.stack.pop().ok_or(Error::StackUnderflow { pc })?;
            }
            // 1NNN - jump to address NNN
            Jump(addr) => self.PC = addr,
            // 2NNN - call subroutine at NNN
            Call(addr) => {
                if !self.stack.push(self.PC) {
                    return Err(Error::StackOverflow { pc });
                }
                self.PC = addr;
            }
            // 3XNN - skip next if VX == NN
            SkipEqByte(x, nn) => {
                if self.V[x.index()] == nn {
                    self.skip();
                }
            }
            // 4XNN - skip next if VX != NN
            SkipNeByte(x, nn) => {
                if self.V[x.index()] != nn {
                    self.skip();
                }
            }
            // 5XY0 - skip next if VX == VY
            SkipEqReg(x, y) => {
                if self.V[x.index()] == self.V[y.index()] {
                    self.skip();
                }
            }
            // 9XY0 - skip next if VX != VY
            SkipNeReg(x, y) => {
                if self.V[x.index()] != self.V[y.index()] {
                    self.skip();
                }
            }
            // 6XNN - Set VX to NN
            LoadByte(x, nn) => self.V[x.index()] = nn,
            // 7XNN - Set VX to VX + NN (ignore VF)
            AddByte(x, nn) => self.V[x.index()] = self.V[x.index()].wrapping_add(nn),
            // 8XY0 - Set VX = VY
            Load(x, y) => self.V[x.index()] = self.V[y.index()],
            // 8XY1 - Set VX = VX | VY
            Or(x, y) => self.V[x.index()] |= self.V[y.index()],
            // 8XY2 - Set VX = VX & VY
            And(x, y) => self.V[x.index()] &= self.V[y.index()],
            // 8XY3 - Set VX = VX ^ VY
            Xor(x, y) => self.V[x.index()] ^= self.V[y.index()],
            // 8XY4 - Set VX = VX + VY, set VF to 1 if carry
            Add(x, y) => {
                let (result, carry) = self.V[x.index()].overflowing_add(self.V[y.index()]);
                self.V[x.index()] = result;
                self.V[F] = carry as u8;
            }
            // 8XY5 - Set VX = VX - VY, set VF to 0 if borrow
            Sub(x, y) => {
                let (result, borrow) = self.V[x.index()].overflowing_sub(self.V[y.index()]);
                self.V[x.index()] = result;
                self.V[F] = (!borrow) as u8;
            }
            // 8XY7 - Set VX = VY - VX, set VF to 0 if borrow
            SubN(x, y) => {
                let (result, borrow) = self.V[y.index()].overflowing_sub(self.V[x.index()]);
                self.V[x.index()] = result;
                self.V[F] = (!borrow) as u8;
            }
            // 8XY6 - Set VX = VX >> 1; set VF to shifted bit
            // the flag is written last, so it survives when X is F
            ShiftRight(x) => {
                let value = self.V[x.index()];
                self.V[x.index()] = value >> 1;
                self.V[F] = value & 1;
            }
            // 8XYE - Set VX = VX << 1; set VF to shifted bit
            ShiftLeft(x) => {
                let value = self.V[x.index()];
                self.V[x.index()] = value << 1;
                self.V[F] = value >> 7;
            }
            // ANNN - Set I = NNN
            LoadIndex(addr) => self.I = addr,
            // BNNN - Jump to address NNN + V0
            JumpV0(addr) => {
                let target = addr as usize + self.V[0x0] as usize;
                if target >= MEM_SIZE {
                    return Err(Error::OutOfBoundsAddress { address: target });
                }
                self.PC = target as u16;
            }
            // CXNN - Set VX to a random number with mask NN
            Random(x, nn) => self.V[x.index()] = self.rng.next_byte() & nn,
            // DXYN - Draw N rows from I at (VX, VY); set VF on collision
            Draw(x, y, n) => {
                let sprite = bus.memory.slice(self.I as usize, n as usize)?;
                let collision = bus
                    .display
                    .draw(self.V[x.index()], self.V[y.index()], sprite);
                self.V[F] = collision as u8;
            }
            // EX9E - Skip next if the key on VX value is pressed
            SkipKey(x) => {
                if bus.keys.last_key() == Some(self.V[x.index()]) {
                    self.skip();
                }
            }
            // EXA1 - Skip next if the key on VX value is NOT pressed
            SkipNotKey(x) => {
                if bus.keys.last_key() != Some(self.V[x.index()]) {
                    self.skip();
                }
            }
            // FX07 - Store the DT value into VX
            LoadDelay(x) => self.V[x.index()] = self.DT,
            // FX0A - Wait for a key press and store the digit on VX
            WaitKey(x) => match bus.keys.wait_for_key(bus.cancel) {
                Ok(key) => self.V[x.index()] = key,
                Err(err) => {
                    // point back at FX0A, so `Platform::resume` waits again
                    self.PC = pc;
                    return Err(err);
                }
            },
            // FX15 - Store the VX value into DT
            SetDelay(x) => self.DT = self.V[x.index()],
            // FX18 - Store the VX value into ST and start the tone
            SetSound(x) => {
                self.ST = self.V[x.index()];
                if self.ST > 0 {
                    let duration_ms = self.ST as u32 * 1000 / TIMER_HZ;
                    bus.audio.beep(BEEP_FREQUENCY_HZ, duration_ms);
                }
            }
            // FX1E - Set I = I + VX, wrapping at 12 bits; VF is set on overflow
            AddIndex(x) => {
                let sum = self.I as usize + self.V[x.index()] as usize;
                self.I = (sum & 0xFFF) as u16;
                self.V[F] = (sum >= MEM_SIZE) as u8;
            }
            // FX29 - Set the address of the sprite of digit on VX to I
            LoadGlyph(x) => self.I = Memory::glyph_address(self.V[x.index()]) as u16,
            // FX33 - Store BCD of VX into I, I+1 and I+2
            StoreBcd(x) => {
                let value = self.V[x.index()];
                let digits = bus.memory.slice_mut(self.I as usize, 3)?;
                digits.copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
            }
            // FX55 - Store from V0 to VX, starting on I
            // I is left untouched
            StoreRegs(x) => {
                let count = x.index() + 1;
                let area = bus.memory.slice_mut(self.I as usize, count)?;
                area.copy_from_slice(&self.V.0[..count]);
            }
            // FX65 - Load from I into V0 -> VX
            // I is left untouched
            LoadRegs(x) => {
                let count = x.index() + 1;
                let area = bus.memory.slice(self.I as usize, count)?;
                self.V.0[..count].copy_from_slice(area);
            }
        }

        Ok(())
    }
}
