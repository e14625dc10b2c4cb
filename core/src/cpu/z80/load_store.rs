use crate::cpu::z80::{Flag, Flags, Z80};

impl Z80 {
    // --- 8-bit loads ---

    /// LD (BC),A / LD (DE),A — 7 T
    /// Opcode mask: 000 r0 010 (r: 0=BC, 1=DE)
    pub(crate) fn op_ld_rp_a(&mut self, opcode: u8) {
        let addr = if opcode & 0x10 == 0 { self.get_bc() } else { self.get_de() };
        self.mem.put8(addr, self.a);
        self.states = 7;
    }

    /// LD A,(BC) / LD A,(DE) — 7 T
    pub(crate) fn op_ld_a_rp(&mut self, opcode: u8) {
        let addr = if opcode & 0x10 == 0 { self.get_bc() } else { self.get_de() };
        self.a = self.mem.get8(addr);
        self.states = 7;
    }

    /// LD (nn),A — 13 T
    pub(crate) fn op_ld_nn_a(&mut self) {
        let addr = self.get16_pc_p();
        self.mem.put8(addr, self.a);
        self.states = 13;
    }

    /// LD A,(nn) — 13 T
    pub(crate) fn op_ld_a_nn(&mut self) {
        let addr = self.get16_pc_p();
        self.a = self.mem.get8(addr);
        self.states = 13;
    }

    /// LD r,n — 7 T; LD (HL),n — 10 T; LD (IX+d),n — 19 T; LD IXH,n — 11 T
    /// Opcode mask: 00 rrr 110
    pub(crate) fn op_ld_r_n(&mut self, opcode: u8) {
        let r = (opcode >> 3) & 0x07;
        if r == 6 {
            // Displacement comes before the immediate
            let addr = self.operand_addr();
            let n = self.fetch8();
            self.mem.put8(addr, n);
            self.states = if self.indexed() { 19 } else { 10 };
        } else {
            let n = self.fetch8();
            self.set_reg8_ix(r, n);
            self.states = if self.indexed() { 11 } else { 7 };
        }
    }

    /// LD r,r' — 4 T; LD r,(HL) / LD (HL),r — 7 T; indexed memory forms 19 T
    /// Opcode mask: 01 ddd sss
    ///
    /// With a DD/FD prefix, H and L name IXH/IXL (IYH/IYL) only when the other
    /// operand is also a register; next to (IX+d) they stay H and L.
    pub(crate) fn op_ld_r_r(&mut self, opcode: u8) {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        let mem_cost = if self.indexed() { 19 } else { 7 };

        if src == 6 {
            let addr = self.operand_addr();
            let val = self.mem.get8(addr);
            self.set_reg8(dst, val);
            self.states = mem_cost;
        } else if dst == 6 {
            let addr = self.operand_addr();
            self.mem.put8(addr, self.get_reg8(src));
            self.states = mem_cost;
        } else {
            let val = self.get_reg8_ix(src);
            self.set_reg8_ix(dst, val);
            self.states = if self.indexed() { 8 } else { 4 };
        }
    }

    // --- 16-bit loads ---

    /// LD rr,nn — 10 T; LD IX,nn — 14 T
    /// Opcode mask: 00 rr0 001 (rr: 0=BC, 1=DE, 2=HL/IX/IY, 3=SP)
    pub(crate) fn op_ld_rr_nn(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let val = self.get16_pc_p();
        self.set_rp(rp, val);
        self.states = if self.indexed() { 14 } else { 10 };
    }

    /// LD (nn),HL — 16 T; LD (nn),IX — 20 T. Low byte first.
    pub(crate) fn op_ld_nn_hl(&mut self) {
        let addr = self.get16_pc_p();
        self.mem.put16(addr, self.get_rp(2));
        self.states = if self.indexed() { 20 } else { 16 };
    }

    /// LD HL,(nn) — 16 T; LD IX,(nn) — 20 T
    pub(crate) fn op_ld_hl_nn_ind(&mut self) {
        let addr = self.get16_pc_p();
        let val = self.mem.get16(addr);
        self.set_rp(2, val);
        self.states = if self.indexed() { 20 } else { 16 };
    }

    /// LD SP,HL — 6 T; LD SP,IX — 10 T
    pub(crate) fn op_ld_sp_hl(&mut self) {
        self.sp = self.get_rp(2);
        self.states = if self.indexed() { 10 } else { 6 };
    }

    /// LD (nn),rr — 20 T (ED prefix)
    /// Opcode mask: 01 rr0 011
    pub(crate) fn op_ld_nn_rr_ed(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let addr = self.get16_pc_p();
        self.mem.put16(addr, self.get_rp(rp));
        self.states = 20;
    }

    /// LD rr,(nn) — 20 T (ED prefix)
    /// Opcode mask: 01 rr1 011
    pub(crate) fn op_ld_rr_nn_ed(&mut self, opcode: u8) {
        let rp = (opcode >> 4) & 0x03;
        let addr = self.get16_pc_p();
        let val = self.mem.get16(addr);
        self.set_rp(rp, val);
        self.states = 20;
    }

    // --- Special registers (ED prefix) ---

    /// LD I,A — 9 T
    pub(crate) fn op_ld_i_a(&mut self) {
        self.i = self.a;
        self.states = 9;
    }

    /// LD R,A — 9 T. Writes all eight bits.
    pub(crate) fn op_ld_r_a(&mut self) {
        self.r = self.a;
        self.states = 9;
    }

    /// LD A,I — 9 T
    pub(crate) fn op_ld_a_i(&mut self) {
        self.a = self.i;
        self.f = self.special_load_flags(self.a);
        self.states = 9;
    }

    /// LD A,R — 9 T
    pub(crate) fn op_ld_a_r(&mut self) {
        self.a = self.r;
        self.f = self.special_load_flags(self.a);
        self.states = 9;
    }

    /// S, Z from the value, H and N clear, C kept. P/V copies IFF2, which is
    /// always clear because interrupts stay masked.
    fn special_load_flags(&self, val: u8) -> Flags {
        Flags::sz(val).with(Flag::C, self.f.carry())
    }
}
