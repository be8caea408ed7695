//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use nodemcu_protocol::DEFAULT_BLOCK_SIZE;

/// Access files on an ESP8266 running NodeMCU.
#[derive(Parser, Debug)]
#[command(name = "nodemcu-load", version, about, long_about = None)]
pub struct Cli {
    /// Address of the TCP-bridged UART (e.g. ser2net).
    #[arg(short, long, env = "NODEMCU_ADDRESS", default_value = "127.0.0.1:2000")]
    pub address: String,

    /// Read timeout in seconds.
    #[arg(short, long, env = "NODEMCU_TIMEOUT", default_value_t = 2.0)]
    pub timeout: f64,

    /// Bytes transferred per statement when reading or writing files.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Copy everything received from the device to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub action: Action,
}

impl Cli {
    /// The read timeout as a duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout.max(0.001))
    }
}

/// The operation to perform.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Write the contents of stdin (or a local file) to a file in flash.
    #[command(visible_alias = "w")]
    Write {
        /// File name on the device.
        filename: String,
        /// Local file to upload instead of stdin.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the contents of a file in flash to stdout.
    #[command(visible_alias = "r")]
    Read {
        /// File name on the device.
        filename: String,
    },

    /// List all files and their sizes in bytes.
    #[command(visible_alias = "ls")]
    List,

    /// Delete a file.
    #[command(visible_alias = "rm")]
    Delete {
        /// File name on the device.
        filename: String,
    },

    /// Rename a file.
    #[command(visible_alias = "rename")]
    Move {
        /// Current file name.
        old: String,
        /// New file name.
        new: String,
    },

    /// Format the flash.
    Format,

    /// Execute a file in flash and print its output.
    Dofile {
        /// File name on the device.
        filename: String,
    },

    /// Restart the device.
    #[command(visible_alias = "reset")]
    Restart,
}
