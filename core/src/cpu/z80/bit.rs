use crate::cpu::z80::{IndexMode, Z80, alu};

impl Z80 {
    /// Memory operand of a CB-family instruction: (HL), or (IX+d)/(IY+d)
    /// with the displacement already taken from the DD CB d / FD CB d stream.
    pub(crate) fn cb_operand_addr(&self) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => self.ix.wrapping_add(self.disp),
            IndexMode::IY => self.iy.wrapping_add(self.disp),
        }
    }

    /// BIT b,r — 8 T; BIT b,(HL) — 12 T; BIT b,(IX+d) — 20 T
    /// Opcode mask: 01 bbb rrr
    pub(crate) fn op_bit_r(&mut self, opcode: u8) {
        let bit = (opcode >> 3) & 0x07;
        let r = opcode & 0x07;
        let val = if r == 6 {
            self.states = if self.indexed() { 20 } else { 12 };
            self.mem.get8(self.cb_operand_addr())
        } else {
            self.states = 8;
            self.get_reg8(r)
        };
        self.f = alu::bit_test(bit, val, self.f);
    }

    /// RES b,r / SET b,r — 8 T; (HL) 15 T; (IX+d) 23 T. No flags.
    /// Opcode mask: 1s bbb rrr (s: 0=RES, 1=SET)
    pub(crate) fn op_res_set_r(&mut self, opcode: u8) {
        let mask = 1u8 << ((opcode >> 3) & 0x07);
        let set = opcode & 0x40 != 0;
        let apply = |val: u8| if set { val | mask } else { val & !mask };
        let r = opcode & 0x07;
        if r == 6 {
            let addr = self.cb_operand_addr();
            let val = apply(self.mem.get8(addr));
            self.mem.put8(addr, val);
            self.states = if self.indexed() { 23 } else { 15 };
        } else {
            let val = apply(self.get_reg8(r));
            self.set_reg8(r, val);
            self.states = 8;
        }
    }
}
