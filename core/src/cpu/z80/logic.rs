use crate::cpu::z80::{Z80, alu};

impl Z80 {
    /// The eight accumulator operations selected by bits 5-3 of the opcode:
    /// 0=ADD 1=ADC 2=SUB 3=SBC 4=AND 5=XOR 6=OR 7=CP.
    pub(crate) fn perform_alu_op(&mut self, op: u8, val: u8) {
        let carry = self.f.carry();
        let result = match op & 0x07 {
            0 => alu::add8(self.a, val, false, self.mode),
            1 => alu::add8(self.a, val, carry, self.mode),
            2 => alu::sub8(self.a, val, false, self.mode),
            3 => alu::sub8(self.a, val, carry, self.mode),
            4 => alu::and8(self.a, val),
            5 => alu::xor8(self.a, val),
            6 => alu::or8(self.a, val),
            7 => {
                // CP: flags only
                self.f = alu::compare8(self.a, val, self.mode);
                return;
            }
            _ => unreachable!(),
        };
        self.a = result.value;
        self.f = result.flags;
    }
}
