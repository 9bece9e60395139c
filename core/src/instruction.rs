use std::fmt;

use rand::Rng;

use crate::error::Result;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A decoded opcode along with the fields it operates on.
///
/// `x` and `y` name registers, `nn` is an immediate byte, `addr` a 12-bit address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Clear,
    Return,
    Call { addr: u16 },
    Jump { addr: u16 },
    SkipEq { x: u8, nn: u8 },
    SkipNe { x: u8, nn: u8 },
    SkipEqReg { x: u8, y: u8 },
    Load { x: u8, nn: u8 },
    Add { x: u8, nn: u8 },
    Move { x: u8, y: u8 },
    Or { x: u8, y: u8 },
    And { x: u8, y: u8 },
    Xor { x: u8, y: u8 },
    AddReg { x: u8, y: u8 },
    Sub { x: u8, y: u8 },
    ShiftRight { x: u8 },
    SubN { x: u8, y: u8 },
    ShiftLeft { x: u8 },
    SkipNeReg { x: u8, y: u8 },
    LoadI { addr: u16 },
    JumpV0 { addr: u16 },
    Random { x: u8, nn: u8 },
    Draw { x: u8, y: u8, n: u8 },
    SkipPressed { x: u8 },
    SkipNotPressed { x: u8 },
    LoadDelay { x: u8 },
    AwaitKey { x: u8 },
    SetDelay { x: u8 },
    SetSound { x: u8 },
    AddI { x: u8 },
    LoadGlyph { x: u8 },
    Bcd { x: u8 },
    Store { x: u8 },
    Read { x: u8 },
}

impl Instruction {
    /// Selects the Instruction for a given Opcode, or None if it isn't one
    pub fn decode(op: &dyn Opcode) -> Option<Instruction> {
        let (x, y, n, nn, addr) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Clear,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x0, ..) => Instruction::Call { addr },
            (0x1, ..) => Instruction::Jump { addr },
            (0x2, ..) => Instruction::Call { addr },
            (0x3, ..) => Instruction::SkipEq { x, nn },
            (0x4, ..) => Instruction::SkipNe { x, nn },
            (0x5, ..) => Instruction::SkipEqReg { x, y },
            (0x6, ..) => Instruction::Load { x, nn },
            (0x7, ..) => Instruction::Add { x, nn },
            (0x8, .., 0x0) => Instruction::Move { x, y },
            (0x8, .., 0x1) => Instruction::Or { x, y },
            (0x8, .., 0x2) => Instruction::And { x, y },
            (0x8, .., 0x3) => Instruction::Xor { x, y },
            (0x8, .., 0x4) => Instruction::AddReg { x, y },
            (0x8, .., 0x5) => Instruction::Sub { x, y },
            (0x8, .., 0x6) => Instruction::ShiftRight { x },
            (0x8, .., 0x7) => Instruction::SubN { x, y },
            (0x8, .., 0xE) => Instruction::ShiftLeft { x },
            (0x9, ..) => Instruction::SkipNeReg { x, y },
            (0xA, ..) => Instruction::LoadI { addr },
            (0xB, ..) => Instruction::JumpV0 { addr },
            (0xC, ..) => Instruction::Random { x, nn },
            (0xD, ..) => Instruction::Draw { x, y, n },
            (0xE, .., 0x9, 0xE) => Instruction::SkipPressed { x },
            (0xE, .., 0xA, 0x1) => Instruction::SkipNotPressed { x },
            (0xF, .., 0x0, 0x7) => Instruction::LoadDelay { x },
            (0xF, .., 0x0, 0xA) => Instruction::AwaitKey { x },
            (0xF, .., 0x1, 0x5) => Instruction::SetDelay { x },
            (0xF, .., 0x1, 0x8) => Instruction::SetSound { x },
            (0xF, .., 0x1, 0xE) => Instruction::AddI { x },
            (0xF, .., 0x2, 0x9) => Instruction::LoadGlyph { x },
            (0xF, .., 0x3, 0x3) => Instruction::Bcd { x },
            (0xF, .., 0x5, 0x5) => Instruction::Store { x },
            (0xF, .., 0x6, 0x5) => Instruction::Read { x },
            _ => return None,
        };
        Some(instruction)
    }

    /// Applies the instruction to `state`.
    /// `state.pc` is expected to already point past the instruction's opcode.
    pub fn execute<R: Rng + ?Sized>(
        self,
        state: &mut State,
        keypad: &Keypad,
        rng: &mut R,
    ) -> Result<()> {
        match self {
            Instruction::Clear => clr(state),
            Instruction::Return => rts(state),
            Instruction::Call { addr } => call(state, addr),
            Instruction::Jump { addr } => jump(state, addr),
            Instruction::SkipEq { x, nn } => ske(state, x, nn),
            Instruction::SkipNe { x, nn } => skne(state, x, nn),
            Instruction::SkipEqReg { x, y } => skre(state, x, y),
            Instruction::Load { x, nn } => load(state, x, nn),
            Instruction::Add { x, nn } => add(state, x, nn),
            Instruction::Move { x, y } => mv(state, x, y),
            Instruction::Or { x, y } => or(state, x, y),
            Instruction::And { x, y } => and(state, x, y),
            Instruction::Xor { x, y } => xor(state, x, y),
            Instruction::AddReg { x, y } => addr(state, x, y),
            Instruction::Sub { x, y } => sub(state, x, y),
            Instruction::ShiftRight { x } => shr(state, x),
            Instruction::SubN { x, y } => subn(state, x, y),
            Instruction::ShiftLeft { x } => shl(state, x),
            Instruction::SkipNeReg { x, y } => skrne(state, x, y),
            Instruction::LoadI { addr } => loadi(state, addr),
            Instruction::JumpV0 { addr } => jumpi(state, addr),
            Instruction::Random { x, nn } => rand(state, x, nn, rng),
            Instruction::Draw { x, y, n } => draw(state, x, y, n),
            Instruction::SkipPressed { x } => skpr(state, x, keypad),
            Instruction::SkipNotPressed { x } => skup(state, x, keypad),
            Instruction::LoadDelay { x } => moved(state, x),
            Instruction::AwaitKey { x } => keyd(state, x),
            Instruction::SetDelay { x } => loads(state, x),
            Instruction::SetSound { x } => ld(state, x),
            Instruction::AddI { x } => addi(state, x),
            Instruction::LoadGlyph { x } => ldspr(state, x),
            Instruction::Bcd { x } => bcd(state, x),
            Instruction::Store { x } => stor(state, x),
            Instruction::Read { x } => read(state, x),
        }
    }
}

/// Conventional Chip-8 assembly mnemonics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Clear => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Call { addr } => write!(f, "CALL {:#05X}", addr),
            Instruction::Jump { addr } => write!(f, "JP {:#05X}", addr),
            Instruction::SkipEq { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            Instruction::SkipNe { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::Load { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            Instruction::Add { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Instruction::Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::ShiftRight { x } => write!(f, "SHR V{:X}", x),
            Instruction::SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            Instruction::SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadI { addr } => write!(f, "LD I, {:#05X}", addr),
            Instruction::JumpV0 { addr } => write!(f, "JP V0, {:#05X}", addr),
            Instruction::Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipPressed { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipNotPressed { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::AwaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddI { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            Instruction::Bcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::Store { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::Read { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
