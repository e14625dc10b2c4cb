use std::mem::swap;

use crate::cpu::z80::Z80;

impl Z80 {
    /// EX AF,AF' — 4 T
    pub(crate) fn op_ex_af_af(&mut self) {
        swap(&mut self.a, &mut self.a_prime);
        swap(&mut self.f, &mut self.f_prime);
        self.states = 4;
    }

    /// EXX — 4 T. Swaps BC, DE and HL with their shadows.
    pub(crate) fn op_exx(&mut self) {
        swap(&mut self.b, &mut self.b_prime);
        swap(&mut self.c, &mut self.c_prime);
        swap(&mut self.d, &mut self.d_prime);
        swap(&mut self.e, &mut self.e_prime);
        swap(&mut self.h, &mut self.h_prime);
        swap(&mut self.l, &mut self.l_prime);
        self.states = 4;
    }

    /// EX DE,HL — 4 T. Always the real HL, even after a DD/FD prefix.
    pub(crate) fn op_ex_de_hl(&mut self) {
        swap(&mut self.d, &mut self.h);
        swap(&mut self.e, &mut self.l);
        self.states = 4;
    }

    /// EX (SP),HL — 19 T; EX (SP),IX — 23 T
    pub(crate) fn op_ex_sp_hl(&mut self) {
        let top = self.mem.get16(self.sp);
        self.mem.put16(self.sp, self.get_rp(2));
        self.set_rp(2, top);
        self.states = if self.indexed() { 23 } else { 19 };
    }
}
