#![allow(dead_code)]

use cpm80_core::prelude::*;

/// Port handler that records every output and answers BIOS traps with a
/// fixed action.
pub struct RecordingPorts {
    /// (port, value) for every write outside the reserved ports.
    pub outputs: Vec<(u8, u8)>,
    /// PC (already past the OUT) at each BIOS trap.
    pub traps: Vec<u16>,
    pub trap_action: TrapAction,
}

impl RecordingPorts {
    pub fn new() -> Self {
        Self {
            outputs: Vec::new(),
            traps: Vec::new(),
            trap_action: TrapAction::Continue,
        }
    }

    pub fn halting() -> Self {
        Self {
            trap_action: TrapAction::Halt,
            ..Self::new()
        }
    }
}

impl PortHandler for RecordingPorts {
    fn bios_call(&mut self, cpu: &mut Z80) -> TrapAction {
        self.traps.push(cpu.pc);
        self.trap_action
    }

    fn port_out(&mut self, port: u8, value: u8) {
        self.outputs.push((port, value));
    }
}

/// Z80-mode CPU with `program` loaded at address 0.
pub fn cpu_with(program: &[u8]) -> Z80 {
    let mut cpu = Z80::new();
    cpu.mem.load(0, program);
    cpu
}

/// 8080-mode CPU with `program` loaded at address 0.
pub fn i80_with(program: &[u8]) -> Z80 {
    let mut cpu = Z80::with_mode(CpuMode::I80);
    cpu.mem.load(0, program);
    cpu
}

/// Execute one instruction with no BIOS attached and return its T-states.
pub fn run_instruction(cpu: &mut Z80) -> u32 {
    cpu.step(&mut NullPorts)
}
