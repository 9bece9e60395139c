pub use chip8::{Chip8, Cycle};
pub use constants::CLOCK_SPEED;
pub use error::{Error, Result};
pub use frame_buffer::FrameBuffer;
pub use instruction::Instruction;
pub use keypad::Keypad;
pub use opcode::Opcode;
pub use state::State;

mod chip8;
pub mod constants;
mod error;
mod frame_buffer;
mod instruction;
mod keypad;
pub mod memory;
mod opcode;
mod operations;
pub mod state;
