use std::path::PathBuf;

use clap::Parser;

use vm8_core::constants::MAX_SAVED_STATES;
use vm8_core::CLOCK_SPEED;

mod keymap;
mod run;
mod sound;

/// Keys: 1234/QWER/ASDF/ZXCV for the keypad, hold Space to fast forward and Escape to rewind.
#[derive(Parser, Debug)]
#[command(name = "vm8", about = "Run a Chip-8 rom.")]
pub struct Args {
    /// Rom image to load at 0x200.
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Instructions executed per second.
    #[arg(long, default_value_t = CLOCK_SPEED, value_parser = clap::value_parser!(u32).range(1..))]
    hz: u32,

    /// Size of each Chip-8 pixel on screen.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Number of past cycles kept for rewinding (0 disables rewinding).
    #[arg(long, default_value_t = MAX_SAVED_STATES)]
    history: usize,

    /// Seed for the random number generator, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Don't open an audio device.
    #[arg(long)]
    mute: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    run::run(&args)
}
