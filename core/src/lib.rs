pub mod core;
pub mod cpu;

pub mod prelude {
    pub use crate::core::{Memory, NoTrace, NullPorts, PortHandler, TraceHook, TrapAction};
    pub use crate::cpu::Cpu;
    pub use crate::cpu::z80::{CpuMode, Flag, Flags, HaltReason, RunSummary, Z80};
}
