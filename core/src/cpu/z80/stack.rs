use crate::cpu::z80::Z80;

impl Z80 {
    /// Push a word: high byte to SP-1, low byte to SP-2.
    pub(crate) fn push16(&mut self, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        self.mem.put8(self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.mem.put8(self.sp, val as u8);
    }

    /// Pop a word: low byte from SP, high byte from SP+1.
    pub(crate) fn pop16(&mut self) -> u16 {
        let lo = self.mem.get8(self.sp);
        self.sp = self.sp.wrapping_add(1);
        let hi = self.mem.get8(self.sp);
        self.sp = self.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// PUSH rr — 11 T; PUSH IX — 15 T
    /// Opcode mask: 11 rr0 101 (rr: 0=BC, 1=DE, 2=HL/IX/IY, 3=AF)
    pub(crate) fn op_push(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let val = self.get_rp_af(rp);
        self.push16(val);
        self.states = if self.indexed() { 15 } else { 11 };
    }

    /// POP rr — 10 T; POP IX — 14 T
    /// Opcode mask: 11 rr0 001
    pub(crate) fn op_pop(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let val = self.pop16();
        self.set_rp_af(rp, val);
        self.states = if self.indexed() { 14 } else { 10 };
    }
}
