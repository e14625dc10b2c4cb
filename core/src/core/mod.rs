pub mod memory;
pub mod ports;
pub mod trace;

pub use memory::{MEMORY_SIZE, Memory};
pub use ports::{BIOS_TRAP_PORT, MODE_PORT, NullPorts, PortHandler, TrapAction};
pub use trace::{LogTracer, NoTrace, TraceHook};
