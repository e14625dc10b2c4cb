use crate::cpu::z80::{CpuMode, Flag, Flags, Z80, alu};

impl Z80 {
    /// ALU A,r — 4 T; ALU A,(HL) — 7 T; ALU A,(IX+d) — 19 T; ALU A,IXH — 8 T
    /// Opcode mask: 10 ooo rrr
    pub(crate) fn op_alu_r(&mut self, opcode: u8) {
        let op = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        let val = if src == 6 {
            let addr = self.operand_addr();
            self.states = if self.indexed() { 19 } else { 7 };
            self.mem.get8(addr)
        } else {
            self.states = if self.indexed() { 8 } else { 4 };
            self.get_reg8_ix(src)
        };
        self.perform_alu_op(op, val);
    }

    /// ALU A,n — 7 T
    /// Opcode mask: 11 ooo 110
    pub(crate) fn op_alu_n(&mut self, opcode: u8) {
        let n = self.fetch8();
        self.perform_alu_op((opcode >> 3) & 0x07, n);
        self.states = 7;
    }

    /// INC r / DEC r — 4 T; (HL) 11 T; (IX+d) 23 T; IXH/IXL 8 T
    /// Opcode mask: 00 rrr 10x (x: 0=INC, 1=DEC)
    pub(crate) fn op_inc_dec_r(&mut self, opcode: u8) {
        let r = (opcode >> 3) & 0x07;
        let is_dec = opcode & 0x01 != 0;
        let step = |val: u8, flags: Flags| {
            if is_dec {
                alu::dec8(val, flags)
            } else {
                alu::inc8(val, flags)
            }
        };

        if r == 6 {
            let addr = self.operand_addr();
            let result = step(self.mem.get8(addr), self.f);
            self.mem.put8(addr, result.value);
            self.f = result.flags;
            self.states = if self.indexed() { 23 } else { 11 };
        } else {
            let result = step(self.get_reg8_ix(r), self.f);
            self.set_reg8_ix(r, result.value);
            self.f = result.flags;
            self.states = if self.indexed() { 8 } else { 4 };
        }
    }

    /// NEG — 8 T (ED prefix). Flags as SUB from zero, P/V always overflow.
    pub(crate) fn op_neg(&mut self) {
        let result = alu::sub8(0, self.a, false, CpuMode::Z80);
        self.a = result.value;
        self.f = result.flags;
        self.states = 8;
    }

    /// DAA — 4 T
    pub(crate) fn op_daa(&mut self) {
        let result = alu::daa(self.a, self.f);
        self.a = result.value;
        self.f = result.flags;
        self.states = 4;
    }

    /// CPL — 4 T. H and N set, others kept.
    pub(crate) fn op_cpl(&mut self) {
        self.a = !self.a;
        self.f = self.f.with(Flag::H, true).with(Flag::N, true);
        self.states = 4;
    }

    /// SCF — 4 T
    pub(crate) fn op_scf(&mut self) {
        self.f = self
            .f
            .with(Flag::C, true)
            .with(Flag::H, false)
            .with(Flag::N, false);
        self.states = 4;
    }

    /// CCF — 4 T. H takes the old carry.
    pub(crate) fn op_ccf(&mut self) {
        let old_c = self.f.carry();
        self.f = self
            .f
            .with(Flag::C, !old_c)
            .with(Flag::H, old_c)
            .with(Flag::N, false);
        self.states = 4;
    }
}
