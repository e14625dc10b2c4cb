//! Optional TOML settings, overridden by command-line flags.
//!
//! ```toml
//! mode = "8080"
//! boot = "games/zork1.com"
//! drives = ["a.dsk", "b.dsk"]
//! load_address = 0x0100
//! log_level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cpm80_core::cpu::z80::CpuMode;
use log::LevelFilter;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum Mode {
    #[serde(rename = "8080", alias = "i8080")]
    #[value(name = "8080", alias = "i8080")]
    I8080,
    #[default]
    #[serde(rename = "z80")]
    #[value(name = "z80")]
    Z80,
}

impl From<Mode> for CpuMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::I8080 => CpuMode::I80,
            Mode::Z80 => CpuMode::Z80,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mode: Option<Mode>,
    /// Program image run when none is given on the command line.
    pub boot: Option<PathBuf>,
    /// Disk images for drives A: to D:, in order.
    pub drives: Vec<PathBuf>,
    pub load_address: Option<u16>,
    pub log_level: Option<String>,
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cpm80").join("config.toml"))
}

impl Config {
    /// Read `explicit` if given (it must exist), otherwise the default
    /// location if present, otherwise an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config =
            Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Base level from the file, raised one step per `-v`.
    pub fn log_level(&self, verbose: u8) -> Result<LevelFilter> {
        let base = match &self.log_level {
            Some(name) => name
                .parse::<LevelFilter>()
                .with_context(|| format!("unknown log level {name:?}"))?,
            None => LevelFilter::Warn,
        };
        Ok(raise(base, verbose))
    }
}

fn raise(level: LevelFilter, steps: u8) -> LevelFilter {
    const ORDER: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let index = ORDER.iter().position(|&l| l == level).unwrap_or(2);
    ORDER[(index + steps as usize).min(ORDER.len() - 1)]
}

/// Parse `0x100`, `100h` or `256`.
pub fn parse_address(text: &str) -> Result<u16, String> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else if let Some(hex) = text.strip_suffix('h').or_else(|| text.strip_suffix('H')) {
        u16::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|e| format!("bad address {text:?}: {e}"))
}
