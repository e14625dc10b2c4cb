use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cpm80_core::core::LogTracer;
use cpm80_core::cpu::z80::HaltReason;
use cpm80_machines::bios::{MAX_DRIVES, TPA_BASE};
use cpm80_machines::machine::drive_letter;
use cpm80_machines::{CpmMachine, Disk, StdioConsole};
use log::LevelFilter;

mod config;

use config::{Config, Mode};

#[derive(Parser, Debug)]
#[command(name = "cpm80", version, about = "Run CP/M 2.2 programs on an 8080/Z80 engine")]
struct Args {
    /// Program image (.COM) to load and run. Without one, boots from drive A.
    image: Option<PathBuf>,

    /// Instruction set to start in.
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Disk image for the next drive, A: first. Repeatable.
    #[arg(short = 'd', long = "drive", value_name = "PATH")]
    drives: Vec<PathBuf>,

    /// Where the image is loaded and started (hex or decimal).
    #[arg(long, value_name = "ADDR", value_parser = config::parse_address)]
    load_address: Option<u16>,

    /// Log every instruction with a register dump.
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// More log output. Repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let mut level = config.log_level(args.verbose)?;
    if args.trace {
        level = LevelFilter::Trace;
    }
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let mode = args.mode.or(config.mode).unwrap_or_default();
    let mut machine = CpmMachine::new(StdioConsole::new(), mode.into());

    let drives = if args.drives.is_empty() {
        config.drives
    } else {
        args.drives
    };
    if drives.len() > MAX_DRIVES {
        bail!("{} drives given, at most {MAX_DRIVES} are supported", drives.len());
    }
    for (drive, path) in drives.iter().enumerate() {
        let disk = Disk::open(path)
            .with_context(|| format!("opening {}: {}", drive_letter(drive), path.display()))?;
        machine.mount(drive, disk)?;
    }

    let load_address = args
        .load_address
        .or(config.load_address)
        .unwrap_or(TPA_BASE);
    if let Some(image) = args.image.or(config.boot) {
        machine
            .load_program_file(load_address, &image)
            .with_context(|| format!("loading {}", image.display()))?;
    } else if drives.is_empty() {
        bail!("nothing to run: give a program image or a boot disk with --drive");
    }

    let summary = if args.trace {
        machine.run_traced(&mut LogTracer)
    } else {
        machine.run()
    };
    machine.shutdown().context("writing disk images back")?;

    if let HaltReason::InvalidOpcode(invalid) = summary.reason {
        bail!("stopped on {invalid}");
    }
    Ok(())
}
