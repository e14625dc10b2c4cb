//! Per-instruction debug hook. Purely observational: hooks get a shared
//! reference to the CPU and can never feed back into execution.

use crate::cpu::CpuStateTrait;
use crate::cpu::z80::{Z80, disasm};

/// Called once per fetched instruction, before it executes.
pub trait TraceHook {
    fn on_fetch(&mut self, pc: u16, opcode: u8, cpu: &Z80);
}

/// Hook that does nothing. The default for [`Z80::run`].
#[derive(Default, Debug, Clone, Copy)]
pub struct NoTrace;

impl TraceHook for NoTrace {
    #[inline]
    fn on_fetch(&mut self, _pc: u16, _opcode: u8, _cpu: &Z80) {}
}

/// Disassembles every instruction and logs it with a register dump at
/// `trace` level.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogTracer;

impl TraceHook for LogTracer {
    fn on_fetch(&mut self, pc: u16, _opcode: u8, cpu: &Z80) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        let (text, _len) = disasm::disassemble(&cpu.mem, pc, cpu.mode);
        log::trace!("{pc:04X}  {text:<20} {}", cpu.snapshot());
    }
}
