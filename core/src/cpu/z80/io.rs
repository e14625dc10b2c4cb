use crate::core::{BIOS_TRAP_PORT, MODE_PORT, PortHandler, TrapAction};
use crate::cpu::z80::{CpuMode, HaltReason, Z80};

impl Z80 {
    /// Route one output byte. Returns false when the BIOS asked to stop, in
    /// which case the halt reason is already recorded.
    pub(crate) fn port_write<H: PortHandler + ?Sized>(
        &mut self,
        port: u8,
        value: u8,
        ports: &mut H,
    ) -> bool {
        match port {
            BIOS_TRAP_PORT => match ports.bios_call(self) {
                TrapAction::Continue => true,
                TrapAction::Halt => {
                    self.halt_reason = Some(HaltReason::Trap);
                    false
                }
            },
            MODE_PORT => {
                match CpuMode::from_port_value(value) {
                    Some(mode) => {
                        log::debug!("mode switch to {mode:?} at {:04X}", self.instr_pc);
                        self.mode = mode;
                    }
                    None => log::warn!(
                        "ignored mode port value {value:02X} at {:04X}",
                        self.instr_pc
                    ),
                }
                true
            }
            _ => {
                ports.port_out(port, value);
                true
            }
        }
    }

    /// OUT (n),A — 11 T, or 0 T when a BIOS trap stops the machine.
    pub(crate) fn op_out_n_a<H: PortHandler + ?Sized>(&mut self, ports: &mut H) {
        let port = self.fetch8();
        self.states = if self.port_write(port, self.a, ports) { 11 } else { 0 };
    }

    /// IN A,(n) — 11 T. No input devices are attached: the port byte is
    /// consumed and A keeps its value.
    pub(crate) fn op_in_a_n(&mut self) {
        let _port = self.fetch8();
        self.states = 11;
    }

    /// IN r,(C) — 12 T (ED prefix). Same as IN A,(n): nothing is read.
    pub(crate) fn op_in_r_c(&mut self, _opcode: u8) {
        self.states = 12;
    }

    /// OUT (C),r — 12 T (ED prefix). ED 71 writes zero.
    /// Opcode mask: 01 rrr 001
    pub(crate) fn op_out_c_r<H: PortHandler + ?Sized>(&mut self, opcode: u8, ports: &mut H) {
        let r = (opcode >> 3) & 0x07;
        let value = if r == 6 { 0 } else { self.get_reg8(r) };
        self.states = if self.port_write(self.c, value, ports) { 12 } else { 0 };
    }
}
