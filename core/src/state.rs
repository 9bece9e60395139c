use std::fmt;

use crate::constants::{INSTRUCTION_SIZE, PROGRAM_START, STACK_DEPTH};
use crate::error::{Error, Result};
use crate::frame_buffer::FrameBuffer;
use crate::memory::Memory;

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented once per step while nonzero
/// - `sound_flag` is raised when the sound timer runs out
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
/// - 64x32 frame buffer, with `draw_flag` raised whenever it changes
///
/// ## Input
/// - Emulation halts while `register_needing_key` is waiting for a keypress
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: Memory,
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub sound_flag: bool,
    pub register_needing_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory: Memory::new(),
            frame_buffer: FrameBuffer::new(),
            draw_flag: false,
            sound_flag: false,
            register_needing_key: None,
        }
    }

    /// Sets VF; used as a carry, borrow or collision flag
    pub fn set_flag(&mut self, flag: bool) {
        self.v[0xF] = flag as u8;
    }

    /// Skips the next instruction when `condition` holds
    pub fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(INSTRUCTION_SIZE);
        }
    }

    /// Pushes a return address.
    /// Errors carry the address of the instruction that overflowed the stack.
    pub fn push(&mut self, addr: u16) -> Result<()> {
        let depth = self.sp as usize;
        if depth == STACK_DEPTH {
            return Err(Error::StackOverflow {
                pc: self.current_instruction(),
                depth,
            });
        }
        self.stack[depth] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow {
                pc: self.current_instruction(),
            });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }

    /// Decrements both timers, raising `sound_flag` when the sound timer runs out
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
            if self.sound_timer == 0 {
                self.sound_flag = true;
            }
        }
    }

    /// The address of the instruction being executed; pc has already moved past it
    fn current_instruction(&self) -> u16 {
        self.pc.wrapping_sub(INSTRUCTION_SIZE)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Register dump, one line for the control registers then one per register/stack slot
impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[PC:{:#05X} SP:{:#04X} I:{:#05X} DT:{:#04X} ST:{:#04X}]",
            self.pc, self.sp, self.i, self.delay_timer, self.sound_timer
        )?;
        for (r, (v, s)) in self.v.iter().zip(self.stack.iter()).enumerate() {
            writeln!(f, "\tv{:X}:{:#04X}    s{:X}:{:#05X}", r, v, r, s)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = State::new();
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
        assert_eq!(state.i, 0);
        assert_eq!(state.v, [0; 16]);
        assert!(!state.draw_flag);
        assert!(!state.sound_flag);
    }

    #[test]
    fn test_push_pop() {
        let mut state = State::new();
        state.push(0x234).unwrap();
        state.push(0x456).unwrap();
        assert_eq!(state.sp, 2);
        assert_eq!(state.pop().unwrap(), 0x456);
        assert_eq!(state.pop().unwrap(), 0x234);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_stack_overflow() {
        let mut state = State::new();
        state.pc = 0x302;
        for addr in 0..STACK_DEPTH as u16 {
            state.push(addr).unwrap();
        }
        assert!(matches!(
            state.push(0xFFF),
            Err(Error::StackOverflow { pc: 0x300, depth: 16 })
        ));
        assert_eq!(state.sp as usize, STACK_DEPTH);
    }

    #[test]
    fn test_stack_underflow() {
        let mut state = State::new();
        state.pc = 0x202;
        assert!(matches!(
            state.pop(),
            Err(Error::StackUnderflow { pc: 0x200 })
        ));
    }

    #[test]
    fn test_timers_count_down_to_zero() {
        let mut state = State::new();
        state.delay_timer = 1;
        state.tick_timers();
        assert_eq!(state.delay_timer, 0);
        state.tick_timers();
        assert_eq!(state.delay_timer, 0);
    }

    #[test]
    fn test_sound_flag_raised_once() {
        let mut state = State::new();
        state.sound_timer = 2;
        state.tick_timers();
        assert!(!state.sound_flag);
        state.tick_timers();
        assert!(state.sound_flag);
        state.sound_flag = false;
        state.tick_timers();
        assert!(!state.sound_flag);
    }
}
