//! Block transfer, compare and output. The repeating forms run their whole
//! loop inside one instruction and charge `16 + 8 × iterations` T-states.
//! A zero counter at entry means a full wrap-around pass (65,536 for BC,
//! 256 for B).

use crate::core::PortHandler;
use crate::cpu::z80::{Flag, Flags, Z80, alu};

/// Base cost of a block instruction; repeating forms add 8 per iteration.
const BLOCK_BASE_STATES: u32 = 16;
const BLOCK_REPEAT_STATES: u32 = 8;

fn repeat_cost(iterations: u32) -> u32 {
    BLOCK_BASE_STATES + BLOCK_REPEAT_STATES * iterations
}

impl Z80 {
    /// Bit 3 of the block opcodes selects decrement (LDD, CPD, OUTD...).
    fn block_step(opcode: u8) -> u16 {
        if opcode & 0x08 == 0 { 1 } else { 0xFFFF }
    }

    /// One LDI/LDD transfer: (DE) <- (HL), HL and DE stepped, BC decremented.
    fn block_transfer(&mut self, step: u16) {
        let hl = self.get_hl();
        let de = self.get_de();
        let val = self.mem.get8(hl);
        self.mem.put8(de, val);
        self.set_hl(hl.wrapping_add(step));
        self.set_de(de.wrapping_add(step));
        self.set_bc(self.get_bc().wrapping_sub(1));
    }

    fn set_transfer_flags(&mut self) {
        self.f = self
            .f
            .keep(&[Flag::S, Flag::Z, Flag::C])
            .with(Flag::PV, self.get_bc() != 0);
    }

    /// One CPI/CPD compare. Returns true on a match.
    fn block_compare(&mut self, step: u16) -> bool {
        let hl = self.get_hl();
        let val = self.mem.get8(hl);
        self.set_hl(hl.wrapping_add(step));
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);
        self.f = alu::compare8_ed(self.a, val, self.f, bc);
        self.a == val
    }

    /// One OUTI/OUTD: B decremented, (HL) written to port C, HL stepped.
    /// Returns false if the write stopped the machine.
    fn block_output<H: PortHandler + ?Sized>(&mut self, step: u16, ports: &mut H) -> bool {
        self.b = self.b.wrapping_sub(1);
        let hl = self.get_hl();
        let val = self.mem.get8(hl);
        self.set_hl(hl.wrapping_add(step));
        let running = self.port_write(self.c, val, ports);
        self.f = Flags::sz(self.b)
            .with(Flag::N, true)
            .with(Flag::C, self.f.carry());
        running
    }

    /// LDI / LDD — 16 T
    pub(crate) fn op_ldi_ldd(&mut self, opcode: u8) {
        self.block_transfer(Self::block_step(opcode));
        self.set_transfer_flags();
        self.states = BLOCK_BASE_STATES;
    }

    /// LDIR / LDDR
    pub(crate) fn op_ldir_lddr(&mut self, opcode: u8) {
        let step = Self::block_step(opcode);
        let mut iterations = 0u32;
        loop {
            self.block_transfer(step);
            iterations += 1;
            if self.get_bc() == 0 {
                break;
            }
        }
        self.set_transfer_flags();
        self.states = repeat_cost(iterations);
    }

    /// CPI / CPD — 16 T
    pub(crate) fn op_cpi_cpd(&mut self, opcode: u8) {
        self.block_compare(Self::block_step(opcode));
        self.states = BLOCK_BASE_STATES;
    }

    /// CPIR / CPDR: stop on a match or when BC reaches zero.
    pub(crate) fn op_cpir_cpdr(&mut self, opcode: u8) {
        let step = Self::block_step(opcode);
        let mut iterations = 0u32;
        loop {
            let found = self.block_compare(step);
            iterations += 1;
            if found || self.get_bc() == 0 {
                break;
            }
        }
        self.states = repeat_cost(iterations);
    }

    /// OUTI / OUTD — 16 T
    pub(crate) fn op_outi_outd<H: PortHandler + ?Sized>(&mut self, opcode: u8, ports: &mut H) {
        let running = self.block_output(Self::block_step(opcode), ports);
        self.states = if running { BLOCK_BASE_STATES } else { 0 };
    }

    /// OTIR / OTDR: repeat until B reaches zero.
    pub(crate) fn op_otir_otdr<H: PortHandler + ?Sized>(&mut self, opcode: u8, ports: &mut H) {
        let step = Self::block_step(opcode);
        let mut iterations = 0u32;
        loop {
            if !self.block_output(step, ports) {
                self.states = 0;
                return;
            }
            iterations += 1;
            if self.b == 0 {
                break;
            }
        }
        self.states = repeat_cost(iterations);
    }
}
