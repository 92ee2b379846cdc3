use std::fmt;

#[inline(always)]
pub fn nibble_h(b: u8) -> u8 {
    (b >> 4) & 0xF
}

#[inline(always)]
pub fn nibble_l(b: u8) -> u8 {
    b & 0xF
}

#[inline(always)]
pub fn nnn(a: u8, b: u8) -> u16 {
    (((a as u16) << 8) | (b as u16)) & 0xFFF
}

/// One of the data registers V0 - VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(u8);

impl Reg {
    /// The flag register.
    pub const VF: Reg = Reg(0xF);

    pub fn new(index: u8) -> Option<Reg> {
        if index <= 0xF {
            Some(Reg(index))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    // nibbles are always valid register indexes
    fn from_nibble(n: u8) -> Reg {
        Reg(n & 0xF)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:X}", self.0)
    }
}

/// A decoded CHIP-8 instruction.
///
/// Naming follows the usual opcode tables: `x` and `y` are register
/// operands, `nn` an immediate byte, `nnn` an address and `n` a row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqByte(Reg, u8),
    /// 4XNN
    SkipNeByte(Reg, u8),
    /// 5XY0
    SkipEqReg(Reg, Reg),
    /// 6XNN
    LoadByte(Reg, u8),
    /// 7XNN
    AddByte(Reg, u8),
    /// 8XY0
    Load(Reg, Reg),
    /// 8XY1
    Or(Reg, Reg),
    /// 8XY2
    And(Reg, Reg),
    /// 8XY3
    Xor(Reg, Reg),
    /// 8XY4
    Add(Reg, Reg),
    /// 8XY5
    Sub(Reg, Reg),
    /// 8XY6, Y is ignored
    ShiftRight(Reg),
    /// 8XY7
    SubN(Reg, Reg),
    /// 8XYE, Y is ignored
    ShiftLeft(Reg),
    /// 9XY0
    SkipNeReg(Reg, Reg),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpV0(u16),
    /// CXNN
    Random(Reg, u8),
    /// DXYN
    Draw(Reg, Reg, u8),
    /// EX9E
    SkipKey(Reg),
    /// EXA1
    SkipNotKey(Reg),
    /// FX07
    LoadDelay(Reg),
    /// FX0A
    WaitKey(Reg),
    /// FX15
    SetDelay(Reg),
    /// FX18
    SetSound(Reg),
    /// FX1E
    AddIndex(Reg),
    /// FX29
    LoadGlyph(Reg),
    /// FX33
    StoreBcd(Reg),
    /// FX55
    StoreRegs(Reg),
    /// FX65
    LoadRegs(Reg),
}

impl Instruction {
    /// Decode the two bytes of an opcode, as they are laid out in memory.
    /// Returns `None` for bit patterns that are not instructions.
    pub fn decode(a: u8, b: u8) -> Option<Instruction> {
        use Instruction::*;

        let x = Reg::from_nibble(nibble_l(a));
        let y = Reg::from_nibble(nibble_h(b));

        let instruction = match nibble_h(a) {
            0x0 if a == 0x00 && b == 0xE0 => Cls,
            0x0 if a == 0x00 && b == 0xEE => Ret,
            0x1 => Jump(nnn(a, b)),
            0x2 => Call(nnn(a, b)),
            0x3 => SkipEqByte(x, b),
            0x4 => SkipNeByte(x, b),
            0x5 if nibble_l(b) == 0x0 => SkipEqReg(x, y),
            0x6 => LoadByte(x, b),
            0x7 => AddByte(x, b),
            0x8 => match nibble_l(b) {
                0x0 => Load(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => Add(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x),
                0x7 => SubN(x, y),
                0xE => ShiftLeft(x),
                _ => return None,
            },
            0x9 if nibble_l(b) == 0x0 => SkipNeReg(x, y),
            0xA => LoadIndex(nnn(a, b)),
            0xB => JumpV0(nnn(a, b)),
            0xC => Random(x, b),
            0xD => Draw(x, y, nibble_l(b)),
            0xE if b == 0x9E => SkipKey(x),
            0xE if b == 0xA1 => SkipNotKey(x),
            0xF => match b {
                0x07 => LoadDelay(x),
                0x0A => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1E => AddIndex(x),
                0x29 => LoadGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return None,
            },
            _ => return None,
        };

        Some(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jump(addr) => write!(f, "JP {:#05X}", addr),
            Call(addr) => write!(f, "CALL {:#05X}", addr),
            SkipEqByte(x, nn) => write!(f, "SE {}, {:#04X}", x, nn),
            SkipNeByte(x, nn) => write!(f, "SNE {}, {:#04X}", x, nn),
            SkipEqReg(x, y) => write!(f, "SE {}, {}", x, y),
            LoadByte(x, nn) => write!(f, "LD {}, {:#04X}", x, nn),
            AddByte(x, nn) => write!(f, "ADD {}, {:#04X}", x, nn),
            Load(x, y) => write!(f, "LD {}, {}", x, y),
            Or(x, y) => write!(f, "OR {}, {}", x, y),
            And(x, y) => write!(f, "AND {}, {}", x, y),
            Xor(x, y) => write!(f, "XOR {}, {}", x, y),
            Add(x, y) => write!(f, "ADD {}, {}", x, y),
            Sub(x, y) => write!(f, "SUB {}, {}", x, y),
            ShiftRight(x) => write!(f, "SHR {}", x),
            SubN(x, y) => write!(f, "SUBN {}, {}", x, y),
            ShiftLeft(x) => write!(f, "SHL {}", x),
            SkipNeReg(x, y) => write!(f, "SNE {}, {}", x, y),
            LoadIndex(addr) => write!(f, "LD I, {:#05X}", addr),
            JumpV0(addr) => write!(f, "JP V0, {:#05X}", addr),
            Random(x, nn) => write!(f, "RND {}, {:#04X}", x, nn),
            Draw(x, y, n) => write!(f, "DRW {}, {}, {}", x, y, n),
            SkipKey(x) => write!(f, "SKP {}", x),
            SkipNotKey(x) => write!(f, "SKNP {}", x),
            LoadDelay(x) => write!(f, "LD {}, DT", x),
            WaitKey(x) => write!(f, "LD {}, K", x),
            SetDelay(x) => write!(f, "LD DT, {}", x),
            SetSound(x) => write!(f, "LD ST, {}", x),
            AddIndex(x) => write!(f, "ADD I, {}", x),
            LoadGlyph(x) => write!(f, "LD F, {}", x),
            StoreBcd(x) => write!(f, "LD B, {}", x),
            StoreRegs(x) => write!(f, "LD [I], {}", x),
            LoadRegs(x) => write!(f, "LD {}, [I]", x),
        }
    }
}
