use clap::{ArgAction, Args, Subcommand};
use std::path::PathBuf;

use tracing::info;
use vperiph_engine::{EngineConfig, ScreenId};
use vperiph_transport::{Baud, SerialConfig, SerialLink};

use crate::exit::{transport_error, CliResult};
use crate::output::OutputFormat;

pub mod run;
pub mod screens;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive the virtual peripherals until interrupted.
    Run(RunArgs),
    /// Send a single line to the board.
    Send(SendArgs),
    /// List the registered screens.
    Screens(ScreensArgs),
    /// Show version information.
    Version(VersionArgs),
}

impl Command {
    /// `-v` count of the subcommand, 0 where it has none.
    pub fn verbosity(&self) -> u8 {
        match self {
            Command::Run(args) => args.verbose,
            _ => 0,
        }
    }
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Screens(args) => screens::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the board is attached.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial device of the board. Without --port or --socket nothing is
    /// opened and the session runs dry.
    #[arg(long, short = 'p', env = "VPERIPH_PORT", conflicts_with = "socket")]
    pub port: Option<PathBuf>,
    /// Unix socket speaking the line protocol, e.g. a simulator.
    #[arg(long)]
    pub socket: Option<PathBuf>,
    /// Line speed of the serial device (9600, 19200, 38400, 115200).
    #[arg(long, short = 'b', default_value_t = 9600)]
    pub baud: u32,
}

impl LinkArgs {
    pub fn open(&self) -> CliResult<SerialLink> {
        if let Some(path) = &self.port {
            let baud = Baud::try_from(self.baud)
                .map_err(|err| transport_error("invalid line speed", err))?;
            return SerialLink::open(&SerialConfig::new(path, baud))
                .map_err(|err| transport_error("cannot open serial device", err));
        }
        if let Some(path) = &self.socket {
            return SerialLink::connect_socket(path)
                .map_err(|err| transport_error("cannot connect socket", err));
        }
        info!("no serial interface given, running dry");
        Ok(SerialLink::dry_run())
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Increase verbosity (-v debug, -vv trace, -vvv also screen updates).
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
    /// Enable debug output and announce it in the version reply.
    #[arg(long, short = 'd')]
    pub debug: bool,
    /// Animate screen ID in test mode.
    #[arg(
        long,
        short = 't',
        value_name = "ID",
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub test: Option<u8>,
    /// Emit a debug message every N ticks (implies --debug).
    #[arg(long, short = 'm', value_name = "N", default_value_t = 0)]
    pub messages: u32,
    /// Stop after N ticks.
    #[arg(long, value_name = "N")]
    pub ticks: Option<u64>,
}

impl RunArgs {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            debug: self.debug,
            verbose: self.verbose,
            test_screen: self.test.and_then(ScreenId::new),
            ..EngineConfig::default()
        }
        .with_message_interval(self.messages)
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Line to send, without terminator.
    #[arg(allow_hyphen_values = true)]
    pub line: String,
    /// Collect reply lines for this long (e.g. 2s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub wait: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ScreensArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
