use anyhow::Context;
use chip8vm::{key_channel, Config, Platform};
use clap::Parser;

mod app;
mod beep;
mod keymap;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// ROM file to load
    #[clap(value_parser)]
    filename: String,

    /// Instructions executed per 60Hz frame
    #[clap(long, value_parser, default_value_t = 8)]
    cycles_per_frame: u32,

    /// Size of each CHIP-8 pixel on screen
    #[clap(long, value_parser, default_value_t = 10)]
    scale: u32,

    /// Seed for the random number generator
    #[clap(long, value_parser)]
    seed: Option<u64>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    // parse command-line arguments
    let cli = Cli::parse();

    // open the rom
    let rom = std::fs::File::open(&cli.filename)
        .with_context(|| format!("error opening rom file: {}", &cli.filename))?;

    // build the machine, wired to the keyboard and the speaker
    let (keys, key_receiver) = key_channel();
    let (beeper, beeps) = beep::channel();
    let config = Config {
        rng_seed: cli.seed,
        ..Config::default()
    };

    let mut platform = Platform::new(config, key_receiver, beeper);
    platform.load_rom(rom).context("error loading rom")?;

    // run
    let settings = app::Settings {
        cycles_per_frame: cli.cycles_per_frame,
        scale: cli.scale,
    };
    app::run(platform, keys, beeps, settings)?;
    Ok(())
}
