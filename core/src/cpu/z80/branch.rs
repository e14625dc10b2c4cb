use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    /// Evaluate a 3-bit condition code:
    /// 0=NZ 1=Z 2=NC 3=C 4=PO 5=PE 6=P 7=M.
    pub(crate) fn eval_condition(&self, cc: u8) -> bool {
        let flag = match cc >> 1 {
            0 => Flag::Z,
            1 => Flag::C,
            2 => Flag::PV,
            _ => Flag::S,
        };
        self.f.get(flag) == (cc & 0x01 != 0)
    }

    // --- Jumps ---

    /// JP nn — 10 T
    pub(crate) fn op_jp_nn(&mut self) {
        self.pc = self.get16_pc_p();
        self.states = 10;
    }

    /// JP cc,nn — 10 T whether or not the jump is taken.
    /// Opcode mask: 11 ccc 010
    pub(crate) fn op_jp_cc_nn(&mut self, opcode: u8) {
        let target = self.get16_pc_p();
        if self.eval_condition((opcode >> 3) & 0x07) {
            self.pc = target;
        }
        self.states = 10;
    }

    /// JP (HL) — 4 T; JP (IX) — 8 T
    pub(crate) fn op_jp_hl(&mut self) {
        self.pc = self.get_rp(2);
        self.states = if self.indexed() { 8 } else { 4 };
    }

    /// JR e — 12 T. The offset is relative to the following instruction.
    pub(crate) fn op_jr_e(&mut self) {
        let d = self.fetch_disp();
        self.pc = self.pc.wrapping_add(d);
        self.states = 12;
    }

    /// JR cc,e — 12 T taken, 7 T not taken
    /// Opcode mask: 001 cc 000 (cc: 0=NZ, 1=Z, 2=NC, 3=C)
    pub(crate) fn op_jr_cc_e(&mut self, opcode: u8) {
        let d = self.fetch_disp();
        if self.eval_condition((opcode >> 3) & 0x03) {
            self.pc = self.pc.wrapping_add(d);
            self.states = 12;
        } else {
            self.states = 7;
        }
    }

    /// DJNZ e — 13 T taken, 8 T not taken
    pub(crate) fn op_djnz(&mut self) {
        let d = self.fetch_disp();
        self.b = self.b.wrapping_sub(1);
        if self.b != 0 {
            self.pc = self.pc.wrapping_add(d);
            self.states = 13;
        } else {
            self.states = 8;
        }
    }

    // --- Calls and returns ---

    /// CALL nn — 17 T
    pub(crate) fn op_call_nn(&mut self) {
        let target = self.get16_pc_p();
        self.push16(self.pc);
        self.pc = target;
        self.states = 17;
    }

    /// CALL cc,nn — 17 T taken, 10 T not taken
    /// Opcode mask: 11 ccc 100
    pub(crate) fn op_call_cc_nn(&mut self, opcode: u8) {
        let target = self.get16_pc_p();
        if self.eval_condition((opcode >> 3) & 0x07) {
            self.push16(self.pc);
            self.pc = target;
            self.states = 17;
        } else {
            self.states = 10;
        }
    }

    /// RET — 10 T
    pub(crate) fn op_ret(&mut self) {
        self.pc = self.pop16();
        self.states = 10;
    }

    /// RET cc — 11 T taken, 5 T not taken
    /// Opcode mask: 11 ccc 000
    pub(crate) fn op_ret_cc(&mut self, opcode: u8) {
        if self.eval_condition((opcode >> 3) & 0x07) {
            self.pc = self.pop16();
            self.states = 11;
        } else {
            self.states = 5;
        }
    }

    /// RST p — 11 T. Target is bits 5-3 times 8.
    /// Opcode mask: 11 ppp 111
    pub(crate) fn op_rst(&mut self, opcode: u8) {
        self.push16(self.pc);
        self.pc = (opcode & 0x38) as u16;
        self.states = 11;
    }

    /// RETN / RETI — 14 T (ED prefix). Interrupts are never taken, so both
    /// behave as a plain return.
    pub(crate) fn op_retn(&mut self) {
        self.pc = self.pop16();
        self.states = 14;
    }
}
