use crate::cpu::z80::{Flag, Flags, Z80, alu};

impl Z80 {
    // --- Accumulator rotates (4 T, S/Z/P/V kept, H and N clear) ---

    fn set_rotate_a_flags(&mut self, carry: bool) {
        self.f = self
            .f
            .keep(&[Flag::S, Flag::Z, Flag::PV])
            .with(Flag::C, carry);
        self.states = 4;
    }

    /// RLCA: bit 7 goes to both C and bit 0.
    pub(crate) fn op_rlca(&mut self) {
        let carry = self.a & 0x80 != 0;
        self.a = self.a.rotate_left(1);
        self.set_rotate_a_flags(carry);
    }

    /// RRCA: bit 0 goes to both C and bit 7.
    pub(crate) fn op_rrca(&mut self) {
        let carry = self.a & 0x01 != 0;
        self.a = self.a.rotate_right(1);
        self.set_rotate_a_flags(carry);
    }

    /// RLA: rotate left through carry.
    pub(crate) fn op_rla(&mut self) {
        let carry = self.a & 0x80 != 0;
        self.a = (self.a << 1) | self.f.carry() as u8;
        self.set_rotate_a_flags(carry);
    }

    /// RRA: rotate right through carry.
    pub(crate) fn op_rra(&mut self) {
        let carry = self.a & 0x01 != 0;
        self.a = (self.a >> 1) | ((self.f.carry() as u8) << 7);
        self.set_rotate_a_flags(carry);
    }

    /// CB rotate/shift — 8 T; (HL) 15 T; DD CB d / FD CB d 23 T
    /// Opcode mask: 00 ooo rrr
    pub(crate) fn op_rotate_shift_r(&mut self, opcode: u8) {
        let op = (opcode >> 3) & 0x07;
        let r = opcode & 0x07;
        if r == 6 {
            let addr = self.cb_operand_addr();
            let result = alu::rotate_shift(op, self.mem.get8(addr), self.f);
            self.mem.put8(addr, result.value);
            self.f = result.flags;
            self.states = if self.indexed() { 23 } else { 15 };
        } else {
            let result = alu::rotate_shift(op, self.get_reg8(r), self.f);
            self.set_reg8(r, result.value);
            self.f = result.flags;
            self.states = 8;
        }
    }

    // --- Nibble rotates (ED prefix, 18 T) ---

    /// RRD: the low nibble of (HL) moves into A, A's low nibble moves into
    /// the high nibble of (HL).
    pub(crate) fn op_rrd(&mut self) {
        let addr = self.get_hl();
        let m = self.mem.get8(addr);
        self.mem.put8(addr, (self.a << 4) | (m >> 4));
        self.a = (self.a & 0xF0) | (m & 0x0F);
        self.set_nibble_rotate_flags();
    }

    /// RLD: the high nibble of (HL) moves into A, A's low nibble moves into
    /// the low nibble of (HL).
    pub(crate) fn op_rld(&mut self) {
        let addr = self.get_hl();
        let m = self.mem.get8(addr);
        self.mem.put8(addr, (m << 4) | (self.a & 0x0F));
        self.a = (self.a & 0xF0) | (m >> 4);
        self.set_nibble_rotate_flags();
    }

    fn set_nibble_rotate_flags(&mut self) {
        self.f = Flags::szp(self.a).with(Flag::C, self.f.carry());
        self.states = 18;
    }
}
