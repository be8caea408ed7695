//! nodemcu-load: command-line access to the flash file system of an ESP8266
//! running NodeMCU, reached through a TCP-bridged UART.

mod args;
mod report;

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use nodemcu_protocol::{Channel, NodeMcuError, Session, TcpChannel, Version, SUPPORTED_VERSIONS};
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::args::{Action, Cli};

/// Errors reported by the command-line tool.
#[derive(Debug, Error)]
enum AppError {
    /// Could not connect to the device.
    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The device runs a firmware version this tool does not speak.
    #[error(
        "incompatible NodeMCU version {found} (supported: {} up to but excluding {})",
        SUPPORTED_VERSIONS.start,
        SUPPORTED_VERSIONS.end
    )]
    IncompatibleVersion { found: Version },

    /// The protocol failed.
    #[error(transparent)]
    Protocol(#[from] NodeMcuError),

    /// Local I/O failed.
    #[error("local I/O error: {0}")]
    Io(#[from] io::Error),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nodemcu_load=info,nodemcu_protocol=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    debug!("connecting to {}", cli.address);
    let channel = TcpChannel::connect(&cli.address, cli.read_timeout()).map_err(|source| {
        AppError::Connect {
            address: cli.address.clone(),
            source,
        }
    })?;

    let mut session = if cli.verbose {
        Session::with_verbose(channel, Box::new(io::stderr()))
    } else {
        Session::new(channel)
    };

    // Also brings the stream into sync
    session.flush()?;
    let version = session.get_version()?;
    if !version.is_supported() {
        return Err(AppError::IncompatibleVersion { found: version });
    }

    execute(&mut session, cli)
}

fn execute<C: Channel>(session: &mut Session<C>, cli: &Cli) -> Result<(), AppError> {
    let block_size = cli.block_size;
    match &cli.action {
        Action::Write { filename, input } => {
            let data = match input {
                Some(path) => fs::read(path)?,
                None => {
                    let mut data = Vec::new();
                    io::stdin().read_to_end(&mut data)?;
                    data
                }
            };
            session.write_file_with_block_size(filename, &data, block_size)?;
            info!("wrote {} bytes to {}", data.len(), filename);
        }
        Action::Read { filename } => {
            let data = session.read_file_with_block_size(filename, block_size)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }
        Action::List => {
            let files = session.list_files()?;
            print!("{}", report::format_listing(&files));
        }
        Action::Delete { filename } => {
            session.remove_file(filename)?;
        }
        Action::Move { old, new } => {
            session.rename_file(old, new)?;
        }
        Action::Format => {
            session.format()?;
            info!("format requested; the device does not report completion");
        }
        Action::Dofile { filename } => {
            let output = session.dofile(filename)?;
            print!("{}", output);
        }
        Action::Restart => {
            session.restart()?;
        }
    }
    Ok(())
}
