use std::collections::VecDeque;
use std::io::Read;

use log::{info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{
    INSTRUCTION_SIZE, KEY_COUNT, MAX_PROGRAM_SIZE, MAX_SAVED_STATES, PROGRAM_START,
};
use crate::error::{Error, Result};
use crate::frame_buffer::FrameBuffer;
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::state::State;

/// What a call to `Chip8::step` did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cycle {
    /// An instruction was fetched and executed
    Executed(Instruction),
    /// Still waiting on a keypress for `LD Vx, K`; nothing was fetched
    AwaitingKey,
    /// A keypress satisfied `LD Vx, K`
    KeyCaptured { register: u8, key: u8 },
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - the random number generator behind `RND Vx, nn`
///
/// Supplies interfaces for:
/// - loading roms
/// - advancing and reversing the CPU
/// - handing over keypresses awaited by the CPU
/// - consuming the redraw and sound flags
/// - inspecting its frame buffer for rendering by some display
///
/// The keypad itself is owned by the host and lent to each `step`.
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    max_saved_states: usize,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A session whose random numbers are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(MAX_SAVED_STATES),
            max_saved_states: MAX_SAVED_STATES,
            rng,
        }
    }

    /// Sets how many past states are kept for rewinding; 0 disables rewinding
    pub fn with_history(mut self, max_saved_states: usize) -> Self {
        self.max_saved_states = max_saved_states;
        self.previous_states.truncate(max_saved_states);
        self
    }

    /// Back to the power-on state; the loaded program is lost
    pub fn reset(&mut self) {
        self.state = State::new();
        self.previous_states.clear();
    }

    /// Copies `bytes` into memory starting at `addr`
    pub fn load(&mut self, bytes: &[u8], addr: u16) -> Result<()> {
        self.state.memory.write_bytes(addr as usize, bytes)
    }

    /// Load a rom from a source file to the start of the program region
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        self.load(&rom, PROGRAM_START)?;
        info!("loaded {} byte rom at {:#05X}", rom.len(), PROGRAM_START);
        Ok(rom.len())
    }

    /// Advances the CPU by a single cycle
    /// - if awaiting a keypress, checks the keypad instead of fetching
    /// - otherwise fetches, decodes and executes the next opcode
    /// - then decrements the timers
    ///
    /// An unknown opcode is reported before anything but pc has changed.
    pub fn step(&mut self, keypad: &Keypad) -> Result<Cycle> {
        self.save_state();

        let cycle = match self.state.register_needing_key {
            Some(register) => match keypad.first_pressed() {
                Some(key) => {
                    self.capture_key(register, key);
                    Cycle::KeyCaptured { register, key }
                }
                None => Cycle::AwaitingKey,
            },
            None => Cycle::Executed(self.execute_next(keypad)?),
        };

        self.state.tick_timers();
        Ok(cycle)
    }

    fn execute_next(&mut self, keypad: &Keypad) -> Result<Instruction> {
        let pc = self.state.pc;
        let op = self.state.memory.read_word(pc as usize)?;
        self.state.pc = pc.wrapping_add(INSTRUCTION_SIZE);

        let instruction =
            Instruction::decode(&op).ok_or(Error::UnknownOpcode { opcode: op, pc })?;
        trace!(
            "{:04X} {:<16} v{:02X?} i{:04X} pc{:04X}",
            op,
            instruction.to_string(),
            self.state.v,
            self.state.i,
            pc
        );
        instruction.execute(&mut self.state, keypad, &mut self.rng)?;
        Ok(instruction)
    }

    /// Hands a keypress straight to a pending `LD Vx, K`.
    /// Returns whether the key was needed.
    pub fn supply_key(&mut self, key: u8) -> Result<bool> {
        if key as usize >= KEY_COUNT {
            return Err(Error::InvalidKey { key });
        }
        match self.state.register_needing_key {
            Some(register) => {
                self.capture_key(register, key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn capture_key(&mut self, register: u8, key: u8) {
        self.state.v[register as usize] = key;
        self.state.register_needing_key = None;
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.state.register_needing_key.is_some()
    }

    /// Returns the FrameBuffer if the display should be redrawn, lowering the redraw flag
    pub fn take_frame(&mut self) -> Option<&FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Returns whether a sound should be played, lowering the sound flag
    pub fn take_sound(&mut self) -> bool {
        std::mem::replace(&mut self.state.sound_flag, false)
    }

    pub fn redraw_flag(&self) -> bool {
        self.state.draw_flag
    }

    pub fn sound_flag(&self) -> bool {
        self.state.sound_flag
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Reverses the CPU by a single cycle if possible
    /// - if there are previous_states, pops the last one and restores it
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Puts the current state in previous_states
    /// - if there are already `max_saved_states` saved then the oldest is dropped
    fn save_state(&mut self) {
        if self.max_saved_states == 0 {
            return;
        }
        if self.previous_states.len() == self.max_saved_states {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chip8_with(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load(program, PROGRAM_START).unwrap();
        chip8
    }

    #[test]
    fn test_steps_pc_past_opcode() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        assert_eq!(
            chip8.step(&Keypad::new()).unwrap(),
            Cycle::Executed(Instruction::Clear)
        );
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_unknown_opcode_leaves_state_alone() {
        let mut chip8 = chip8_with(&[0x60, 0x42, 0xF0, 0xFF]);
        chip8.state.delay_timer = 5;
        chip8.step(&Keypad::new()).unwrap();
        let before = chip8.state;

        let result = chip8.step(&Keypad::new());
        assert!(matches!(
            result,
            Err(Error::UnknownOpcode { opcode: 0xF0FF, pc: 0x202 })
        ));
        assert_eq!(chip8.state.pc, 0x204);
        assert_eq!(chip8.state.v, before.v);
        assert_eq!(chip8.state.i, before.i);
        assert_eq!(chip8.state.delay_timer, before.delay_timer);
        assert_eq!(
            chip8.state.memory.bytes(0, 4096).unwrap(),
            before.memory.bytes(0, 4096).unwrap()
        );
    }

    #[test]
    fn test_fetch_past_memory() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.pc = 0xFFF;
        assert!(matches!(
            chip8.step(&Keypad::new()),
            Err(Error::AddressOutOfRange { addr: 0xFFF, len: 2 })
        ));
        assert_eq!(chip8.state.pc, 0xFFF);
    }

    #[test]
    fn test_call_and_return() {
        // 0x200 CALL 0x300; 0x300 RET
        let mut chip8 = chip8_with(&[0x23, 0x00]);
        chip8.load(&[0x00, 0xEE], 0x300).unwrap();
        chip8.step(&Keypad::new()).unwrap();
        assert_eq!(chip8.state.pc, 0x300);
        chip8.step(&Keypad::new()).unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.sp, 0);
    }

    #[test]
    fn test_runaway_recursion_overflows() {
        // 0x200 CALL 0x200
        let mut chip8 = chip8_with(&[0x22, 0x00]);
        for _ in 0..16 {
            chip8.step(&Keypad::new()).unwrap();
        }
        assert!(matches!(
            chip8.step(&Keypad::new()),
            Err(Error::StackOverflow { pc: 0x200, depth: 16 })
        ));
    }

    #[test]
    fn test_timers_tick_each_step() {
        // LD V0, 0x01; LD ST, V0; JP 0x204
        let mut chip8 = chip8_with(&[0x60, 0x01, 0xF0, 0x18, 0x12, 0x04]);
        chip8.state.delay_timer = 3;
        chip8.step(&Keypad::new()).unwrap();
        assert_eq!(chip8.state.delay_timer, 2);
        assert!(!chip8.sound_flag());

        chip8.step(&Keypad::new()).unwrap();
        assert_eq!(chip8.state.sound_timer, 0);
        assert!(chip8.take_sound());
        assert!(!chip8.sound_flag());

        chip8.step(&Keypad::new()).unwrap();
        assert_eq!(chip8.state.sound_timer, 0);
        assert!(!chip8.take_sound());
    }

    #[test]
    fn test_waits_for_key() {
        // LD V3, K; LD V4, 0x01
        let mut chip8 = chip8_with(&[0xF3, 0x0A, 0x64, 0x01]);
        chip8.step(&Keypad::new()).unwrap();
        assert!(chip8.is_awaiting_key());

        assert_eq!(chip8.step(&Keypad::new()).unwrap(), Cycle::AwaitingKey);
        assert_eq!(chip8.state.pc, 0x202);

        let mut keypad = Keypad::new();
        keypad.press(0xB).unwrap();
        assert_eq!(
            chip8.step(&keypad).unwrap(),
            Cycle::KeyCaptured { register: 3, key: 0xB }
        );
        assert_eq!(chip8.state.v[3], 0xB);
        assert!(!chip8.is_awaiting_key());

        chip8.step(&keypad).unwrap();
        assert_eq!(chip8.state.v[4], 0x1);
    }

    #[test]
    fn test_timers_tick_while_waiting_for_key() {
        let mut chip8 = chip8_with(&[0xF3, 0x0A]);
        chip8.state.delay_timer = 10;
        chip8.step(&Keypad::new()).unwrap();
        chip8.step(&Keypad::new()).unwrap();
        assert_eq!(chip8.state.delay_timer, 8);
    }

    #[test]
    fn test_captures_supplied_keys() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.register_needing_key = Some(0x1);
        assert!(chip8.supply_key(0xE).unwrap());
        assert_eq!(chip8.state.register_needing_key, None);
        assert_eq!(chip8.state.v[0x1], 0xE);
        assert!(!chip8.supply_key(0xE).unwrap());
    }

    #[test]
    fn test_rejects_supplied_keys_off_the_keypad() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.register_needing_key = Some(0x1);
        assert!(matches!(chip8.supply_key(0x10), Err(Error::InvalidKey { key: 0x10 })));
        assert!(chip8.is_awaiting_key());
    }

    #[test]
    fn test_take_frame_once_per_change() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        assert!(chip8.take_frame().is_none());
        chip8.step(&Keypad::new()).unwrap();
        assert!(chip8.take_frame().is_some());
        assert!(chip8.take_frame().is_none());
    }

    #[test]
    fn test_load_rom() {
        let mut chip8 = Chip8::with_seed(0);
        let mut rom: &[u8] = &[0x00, 0xE0, 0x12, 0x00];
        assert_eq!(chip8.load_rom(&mut rom).unwrap(), 4);
        assert_eq!(
            chip8.state.memory.bytes(0x200, 4).unwrap(),
            &[0x00, 0xE0, 0x12, 0x00]
        );
    }

    #[test]
    fn test_load_rom_too_large() {
        let mut chip8 = Chip8::with_seed(0);
        let rom = vec![0xAA; MAX_PROGRAM_SIZE + 1];
        assert!(matches!(
            chip8.load_rom(&mut rom.as_slice()),
            Err(Error::RomTooLarge { size: 3585, max: 3584 })
        ));
    }

    #[test]
    fn test_load_into_font_is_rejected() {
        let mut chip8 = Chip8::with_seed(0);
        assert!(matches!(
            chip8.load(&[0x00], 0x100),
            Err(Error::ProtectedWrite { addr: 0x100 })
        ));
    }

    #[test]
    fn test_seeded_sessions_agree() {
        // RND V0, 0xFF
        let mut a = chip8_with(&[0xC0, 0xFF]);
        let mut b = chip8_with(&[0xC0, 0xFF]);
        a.step(&Keypad::new()).unwrap();
        b.step(&Keypad::new()).unwrap();
        assert_eq!(a.state.v[0], b.state.v[0]);
    }

    #[test]
    fn test_rewind_restores_previous_state() {
        let mut chip8 = chip8_with(&[0x60, 0x42, 0x61, 0x24]);
        chip8.step(&Keypad::new()).unwrap();
        chip8.step(&Keypad::new()).unwrap();
        assert!(chip8.rewind());
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.v[1], 0x0);
        assert!(chip8.rewind());
        assert_eq!(chip8.state.pc, 0x200);
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_drops_old_saved_states() {
        let mut chip8 = Chip8::with_seed(0).with_history(4);
        for _ in 0..4 {
            chip8.save_state();
        }
        assert_eq!(4, chip8.previous_states.len());
        chip8.save_state();
        assert_eq!(4, chip8.previous_states.len());
    }

    #[test]
    fn test_history_disabled() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]).with_history(0);
        chip8.step(&Keypad::new()).unwrap();
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_reset() {
        let mut chip8 = chip8_with(&[0x60, 0x42]);
        chip8.step(&Keypad::new()).unwrap();
        chip8.reset();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.v[0], 0x0);
        assert_eq!(chip8.state.memory.read_byte(0x200).unwrap(), 0x0);
    }
}
