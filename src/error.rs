use std::io;

use thiserror::Error;

use crate::TermInt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("terminal is {width}x{height}, need at least {min_width}x{min_height}")]
    TerminalTooSmall {
        width: TermInt,
        height: TermInt,
        min_width: TermInt,
        min_height: TermInt,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not set up logging: {0}")]
    Logging(String),

    #[cfg(feature = "audio")]
    #[error("audio output unavailable: {0}")]
    Audio(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_small_names_both_sizes() {
        let e = Error::TerminalTooSmall { width: 40, height: 12, min_width: 64, min_height: 20 };
        assert_eq!(e.to_string(), "terminal is 40x12, need at least 64x20");
    }

    #[cfg(feature = "audio")]
    #[test]
    fn audio_failures_say_what_broke() {
        let e = Error::Audio("no default output device".into());
        assert_eq!(e.to_string(), "audio output unavailable: no default output device");
    }
}
