use crate::cpu::z80::{Z80, alu};

impl Z80 {
    /// ADD HL,rr — 11 T; ADD IX,rr — 15 T
    /// Opcode mask: 00 rr1 001. rr=2 names the destination itself.
    pub(crate) fn op_add_hl_rr(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let result = alu::add16(self.get_rp(2), self.get_rp(rp), self.f);
        self.set_rp(2, result.value);
        self.f = result.flags;
        self.states = if self.indexed() { 15 } else { 11 };
    }

    /// INC rr / DEC rr — 6 T; INC IX / DEC IX — 10 T. No flags.
    /// Opcode mask: 00 rrx 011 (x: 0=INC, 1=DEC)
    pub(crate) fn op_inc_dec_rr(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let val = self.get_rp(rp);
        let val = if opcode & 0x08 == 0 {
            val.wrapping_add(1)
        } else {
            val.wrapping_sub(1)
        };
        self.set_rp(rp, val);
        self.states = if self.indexed() { 10 } else { 6 };
    }

    /// ADC HL,rr — 15 T (ED prefix)
    pub(crate) fn op_adc_hl_rr(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let result = alu::adc16(self.get_hl(), self.get_rp(rp), self.f.carry());
        self.set_hl(result.value);
        self.f = result.flags;
        self.states = 15;
    }

    /// SBC HL,rr — 15 T (ED prefix)
    pub(crate) fn op_sbc_hl_rr(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let result = alu::sbc16(self.get_hl(), self.get_rp(rp), self.f.carry());
        self.set_hl(result.value);
        self.f = result.flags;
        self.states = 15;
    }
}
