use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::error::{Error, Result};
use crate::TermInt;

const MIN_GRID_WIDTH: TermInt = 8;
const MIN_GRID_HEIGHT: TermInt = 6;
const MAX_GRID_SIDE: TermInt = 60;

/// Command line flags.
#[derive(Debug, Parser)]
#[command(name = "cocobot", version, about = "Cocobot OS, a toy desktop in your terminal")]
pub struct Args {
    /// Milliseconds between two snake steps
    #[arg(long, default_value_t = 150)]
    pub tick_ms: u64,

    /// Snake board width, in cells
    #[arg(long, default_value_t = 20)]
    pub grid_width: TermInt,

    /// Snake board height, in cells
    #[arg(long, default_value_t = 15)]
    pub grid_height: TermInt,

    /// Start with sound disabled
    #[arg(long)]
    pub mute: bool,

    /// Seed for food placement and the console's made-up figures
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file (stdout belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tick: Duration,
    pub grid: (TermInt, TermInt),
    pub sound: bool,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tick: Duration::from_millis(150),
            grid: (20, 15),
            sound: true,
            seed: None,
            log_file: None,
        }
    }
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.tick_ms == 0 {
            return Err(Error::Config("--tick-ms must be positive".into()));
        }

        let sides = MIN_GRID_WIDTH..=MAX_GRID_SIDE;
        if !sides.contains(&args.grid_width) {
            return Err(Error::Config(format!(
                "--grid-width must be between {} and {}",
                MIN_GRID_WIDTH, MAX_GRID_SIDE
            )));
        }
        if !(MIN_GRID_HEIGHT..=MAX_GRID_SIDE).contains(&args.grid_height) {
            return Err(Error::Config(format!(
                "--grid-height must be between {} and {}",
                MIN_GRID_HEIGHT, MAX_GRID_SIDE
            )));
        }

        Ok(Config {
            tick: Duration::from_millis(args.tick_ms),
            grid: (args.grid_width, args.grid_height),
            sound: !args.mute,
            seed: args.seed,
            log_file: args.log_file,
        })
    }
}
