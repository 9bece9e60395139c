use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use anyhow::{Context, Error, Result};
use log::{debug, error, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use display::Display;
use vm8_core::{Chip8, Keypad};

use crate::keymap::keymap;
use crate::sound::{Beeper, Mute, Sound};
use crate::Args;

pub fn run(args: &Args) -> Result<()> {
    let chip8 = match args.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };
    let mut chip8 = chip8.with_history(args.history);

    // Load ROM
    let file = File::open(&args.rom)
        .with_context(|| format!("unable to open {}", args.rom.display()))?;
    let mut reader = BufReader::new(file);
    chip8
        .load_rom(&mut reader)
        .with_context(|| format!("unable to load {}", args.rom.display()))?;

    // Get SDL2 context
    let sdl = sdl2::init().map_err(Error::msg)?;
    let mut display = Display::new(&sdl, args.scale).context("unable to open a window")?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute)
    } else {
        Box::new(Beeper::new(&sdl).map_err(Error::msg)?)
    };
    let mut events = sdl.event_pump().map_err(Error::msg)?;
    let mut keypad = Keypad::new();

    // Set initial timing
    let cycle_time = Duration::from_secs(1) / args.hz;
    let mut last_cycle = Instant::now();

    // Whether or not the clock speed should be respected
    let mut fast_forward = false;
    // Whether the game's state should be cycled forwards or backwards
    let mut rewind = false;

    'event: loop {
        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = chip8.take_frame() {
            display.render(frame)?;
        }
        if chip8.take_sound() {
            sound.beep();
        }
        sound.update();

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => keypad.press(kc)?,
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Escape, _) => rewind = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => keypad.release(kc)?,
                    (Keycode::Space, _) => fast_forward = false,
                    (Keycode::Escape, _) => rewind = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if rewind {
            if chip8.rewind() {
                display.render(chip8.frame_buffer())?;
            }
        } else if let Err(e) = chip8.step(&keypad) {
            error!("halting: {}", e);
            debug!("{:?}", chip8.state());
            return Err(e.into());
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    info!("window closed");
    Ok(())
}
