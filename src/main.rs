mod audio;
mod canvas;
mod config;
mod console;
mod desktop;
mod error;
mod game;
mod logging;
mod screen;
mod snake;
mod window;

use std::process::exit;

use clap::Parser;
use log::{error, info};

use crate::config::{Args, Config};

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() {
    let args = Args::parse();

    let result = Config::try_from(args).and_then(|config| {
        logging::init(config.log_file.as_deref())?;
        info!("starting with {:?}", config);
        desktop::run(&config)
    });

    // The desktop has given the terminal back by now, so stderr is safe.
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("cocobot: {}", e);
        exit(1);
    }
}
