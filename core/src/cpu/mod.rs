/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Zero every register and flag. The CPU mode is kept.
    fn reset(&mut self);

    /// Query if the last instruction stopped the fetch-execute loop
    fn is_halted(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, Z80State};

// 8080/Z80 execution engine
pub mod z80;
pub use z80::Z80;
