use crate::cpu::z80::{HaltReason, InvalidOpcode, Z80};

impl Z80 {
    /// NOP — 4 T
    pub(crate) fn op_nop(&mut self) {
        self.states = 4;
    }

    /// HALT: zero T-states. With interrupts permanently masked nothing can
    /// resume a halted CPU, so HALT ends the run. PC is left past the opcode.
    pub(crate) fn op_halt(&mut self) {
        self.halt_reason = Some(HaltReason::Halt);
        self.states = 0;
    }

    /// DI / EI — 4 T. Interrupts are never delivered; kept for opcode
    /// compatibility.
    pub(crate) fn op_di_ei(&mut self) {
        self.states = 4;
    }

    /// IM 0/1/2 — 8 T (ED prefix). No-op.
    pub(crate) fn op_im(&mut self) {
        self.states = 8;
    }

    /// Shared handler for every unmapped table entry: report and stop.
    pub(crate) fn invalid_opcode(&mut self, opcode: u8) {
        let invalid = InvalidOpcode {
            addr: self.instr_pc,
            set: self.iset,
            opcode,
        };
        log::warn!("{invalid}");
        self.halt_reason = Some(HaltReason::InvalidOpcode(invalid));
        self.states = 0;
    }
}
