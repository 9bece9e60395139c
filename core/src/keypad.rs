use crate::constants::KEY_COUNT;
use crate::error::{Error, Result};

/// # Keypad
/// The pressed status of the 16 hexadecimal keys.
///
/// Owned by the host, which updates it from its input devices between steps.
/// The interpreter only ever reads it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: u8) -> Result<()> {
        self.set(key, true)
    }

    pub fn release(&mut self, key: u8) -> Result<()> {
        self.set(key, false)
    }

    /// Keys outside of 0..F are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// The lowest key currently held down
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }

    fn set(&mut self, key: u8, pressed: bool) -> Result<()> {
        let slot = self
            .keys
            .get_mut(key as usize)
            .ok_or(Error::InvalidKey { key })?;
        *slot = pressed;
        Ok(())
    }
}

impl From<[bool; KEY_COUNT]> for Keypad {
    fn from(keys: [bool; KEY_COUNT]) -> Self {
        Keypad { keys }
    }
}
