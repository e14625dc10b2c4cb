pub mod bios;
pub mod console;
pub mod disk;
pub mod error;
pub mod machine;

pub use bios::{BiosFunction, BootSource, CpmBios};
pub use console::{Console, ScriptedConsole, StdioConsole};
pub use disk::Disk;
pub use error::{MachineError, Result};
pub use machine::CpmMachine;
