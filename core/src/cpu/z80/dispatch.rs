//! Opcode dispatch: one match per table, driven by a small prefix state
//! machine. Each prefix byte is a transition on [`Z80::iset`]; the table
//! reached when a non-prefix byte arrives executes the instruction.

use crate::core::PortHandler;
use crate::cpu::z80::{CpuMode, IndexMode, InstructionSet, Z80};

impl Z80 {
    pub(crate) fn dispatch<H: PortHandler + ?Sized>(&mut self, first: u8, ports: &mut H) {
        let mut opcode = first;
        loop {
            match (self.iset, opcode) {
                (InstructionSet::Base, _) if self.mode == CpuMode::I80 => {
                    return self.execute_i80(opcode, ports);
                }
                (InstructionSet::Base, 0xCB) => self.iset = InstructionSet::CB,
                (InstructionSet::Base, 0xDD) => {
                    self.iset = InstructionSet::DD;
                    self.index_mode = IndexMode::IX;
                }
                (InstructionSet::Base, 0xED) => self.iset = InstructionSet::ED,
                (InstructionSet::Base, 0xFD) => {
                    self.iset = InstructionSet::FD;
                    self.index_mode = IndexMode::IY;
                }
                (InstructionSet::Base, _) => return self.execute_z80(opcode, ports),
                (InstructionSet::CB, _) => return self.execute_cb(opcode),
                (InstructionSet::ED, _) => return self.execute_ed(opcode, ports),
                (InstructionSet::DD | InstructionSet::FD, 0xCB) => {
                    // DD CB d op: displacement precedes the final opcode byte
                    self.iset = if self.iset == InstructionSet::DD {
                        InstructionSet::DDCB
                    } else {
                        InstructionSet::FDCB
                    };
                    self.disp = self.fetch_disp();
                }
                (InstructionSet::DD | InstructionSet::FD, _) => {
                    return self.execute_index(opcode);
                }
                (InstructionSet::DDCB | InstructionSet::FDCB, _) => {
                    return self.execute_index_cb(opcode);
                }
            }
            opcode = self.fetch8();
        }
    }

    /// Base table in 8080 mode: the shared set, with every Z80 extension
    /// (relative jumps, shadow exchanges, prefixes) invalid.
    fn execute_i80<H: PortHandler + ?Sized>(&mut self, opcode: u8, ports: &mut H) {
        match opcode {
            0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => self.invalid_opcode(opcode),
            0xCB | 0xD9 | 0xDD | 0xED | 0xFD => self.invalid_opcode(opcode),
            _ => self.execute_common(opcode, ports),
        }
    }

    /// Base table in Z80 mode. Prefix bytes never reach here.
    fn execute_z80<H: PortHandler + ?Sized>(&mut self, opcode: u8, ports: &mut H) {
        match opcode {
            // EX AF, AF' — 4 T
            0x08 => self.op_ex_af_af(),
            // DJNZ e — 13/8 T
            0x10 => self.op_djnz(),
            // JR e — 12 T
            0x18 => self.op_jr_e(),
            // JR cc,e — 12/7 T (NZ/Z/NC/C only)
            op if (op & 0xE7) == 0x20 => self.op_jr_cc_e(op),
            // EXX — 4 T
            0xD9 => self.op_exx(),
            _ => self.execute_common(opcode, ports),
        }
    }

    /// Instructions shared by the 8080 and Z80 base tables.
    fn execute_common<H: PortHandler + ?Sized>(&mut self, opcode: u8, ports: &mut H) {
        match opcode {
            // NOP — 4 T
            0x00 => self.op_nop(),
            // HALT: stops the loop
            0x76 => self.op_halt(),

            // --- Load/Store ---

            // LD (BC), A / LD (DE), A — 7 T
            0x02 | 0x12 => self.op_ld_rp_a(opcode),
            // LD A, (BC) / LD A, (DE) — 7 T
            0x0A | 0x1A => self.op_ld_a_rp(opcode),
            // LD (nn), HL — 16 T
            0x22 => self.op_ld_nn_hl(),
            // LD HL, (nn) — 16 T
            0x2A => self.op_ld_hl_nn_ind(),
            // LD (nn), A — 13 T
            0x32 => self.op_ld_nn_a(),
            // LD A, (nn) — 13 T
            0x3A => self.op_ld_a_nn(),
            // LD rr, nn (0x01/0x11/0x21/0x31) — 10 T
            op if (op & 0xCF) == 0x01 => self.op_ld_rr_nn(op),
            // LD r, n (0x06, 0x0E, ... 0x3E) — 7 T / 10 T for (HL)
            op if (op & 0xC7) == 0x06 => self.op_ld_r_n(op),
            // LD r, r' (0x40-0x7F excluding 0x76) — 4/7 T
            op if (op & 0xC0) == 0x40 => self.op_ld_r_r(op),
            // LD SP, HL — 6 T
            0xF9 => self.op_ld_sp_hl(),

            // --- Exchange ---

            // EX DE, HL — 4 T
            0xEB => self.op_ex_de_hl(),
            // EX (SP), HL — 19 T
            0xE3 => self.op_ex_sp_hl(),

            // --- Stack ---

            // PUSH rr (0xC5/D5/E5/F5) — 11 T
            op if (op & 0xCF) == 0xC5 => self.op_push(op),
            // POP rr (0xC1/D1/E1/F1) — 10 T
            op if (op & 0xCF) == 0xC1 => self.op_pop(op),

            // --- 8-bit math and logic ---

            // ALU A, r (0x80 - 0xBF) — 4 T (reg) or 7 T ((HL))
            op if (op & 0xC0) == 0x80 => self.op_alu_r(op),
            // ALU A, n (0xC6, 0xCE, ... 0xFE) — 7 T
            op if (op & 0xC7) == 0xC6 => self.op_alu_n(op),
            // INC r / DEC r — 4 T (reg) or 11 T ((HL))
            op if (op & 0xC6) == 0x04 => self.op_inc_dec_r(op),

            // --- 16-bit math ---

            // ADD HL,rr (0x09/0x19/0x29/0x39) — 11 T
            op if (op & 0xCF) == 0x09 => self.op_add_hl_rr(op),
            // INC rr / DEC rr — 6 T
            op if (op & 0xC7) == 0x03 => self.op_inc_dec_rr(op),

            // --- Accumulator rotates — 4 T ---
            0x07 => self.op_rlca(),
            0x0F => self.op_rrca(),
            0x17 => self.op_rla(),
            0x1F => self.op_rra(),

            // --- Misc ALU — 4 T ---
            0x27 => self.op_daa(),
            0x2F => self.op_cpl(),
            0x37 => self.op_scf(),
            0x3F => self.op_ccf(),

            // --- Branch/Control Flow ---

            // JP nn — 10 T
            0xC3 => self.op_jp_nn(),
            // JP (HL) — 4 T
            0xE9 => self.op_jp_hl(),
            // CALL nn — 17 T
            0xCD => self.op_call_nn(),
            // RET — 10 T
            0xC9 => self.op_ret(),
            // JP cc,nn — 10 T
            op if (op & 0xC7) == 0xC2 => self.op_jp_cc_nn(op),
            // CALL cc,nn — 17/10 T
            op if (op & 0xC7) == 0xC4 => self.op_call_cc_nn(op),
            // RET cc — 11/5 T
            op if (op & 0xC7) == 0xC0 => self.op_ret_cc(op),
            // RST p — 11 T
            op if (op & 0xC7) == 0xC7 => self.op_rst(op),

            // --- I/O ---

            // OUT (n),A — 11 T
            0xD3 => self.op_out_n_a(ports),
            // IN A,(n) — 11 T
            0xDB => self.op_in_a_n(),

            // DI / EI — 4 T
            0xF3 | 0xFB => self.op_di_ei(),

            _ => self.invalid_opcode(opcode),
        }
    }

    /// CB prefix: rotates, shifts and bit operations. Every entry is mapped.
    fn execute_cb(&mut self, opcode: u8) {
        match opcode {
            // RLC/RRC/RL/RR/SLA/SRA/SLL/SRL r — 8 T / 15 T for (HL)
            0x00..=0x3F => self.op_rotate_shift_r(opcode),
            // BIT b, r — 8 T / 12 T for (HL)
            0x40..=0x7F => self.op_bit_r(opcode),
            // RES b, r / SET b, r — 8 T / 15 T for (HL)
            0x80..=0xFF => self.op_res_set_r(opcode),
        }
    }

    /// DD/FD prefix: HL-based instructions rewritten to use IX/IY.
    /// `index_mode` already names the register.
    fn execute_index(&mut self, opcode: u8) {
        let touches_index = |r: u8| matches!(r, 4..=6);
        match opcode {
            // ADD IX,rr — 15 T
            op if (op & 0xCF) == 0x09 => self.op_add_hl_rr(op),
            // LD IX,nn — 14 T
            0x21 => self.op_ld_rr_nn(opcode),
            // LD (nn),IX / LD IX,(nn) — 20 T
            0x22 => self.op_ld_nn_hl(),
            0x2A => self.op_ld_hl_nn_ind(),
            // INC IX / DEC IX — 10 T
            0x23 | 0x2B => self.op_inc_dec_rr(opcode),
            // INC/DEC IXH, IXL, (IX+d)
            0x24 | 0x25 | 0x2C | 0x2D | 0x34 | 0x35 => self.op_inc_dec_r(opcode),
            // LD IXH,n / LD IXL,n / LD (IX+d),n
            0x26 | 0x2E | 0x36 => self.op_ld_r_n(opcode),
            // LD r,r' where either side is H, L or (HL)
            0x76 => self.invalid_opcode(opcode),
            op if (op & 0xC0) == 0x40
                && (touches_index(op & 0x07) || touches_index((op >> 3) & 0x07)) =>
            {
                self.op_ld_r_r(op)
            }
            // ALU A, IXH/IXL/(IX+d)
            op if (op & 0xC0) == 0x80 && touches_index(op & 0x07) => self.op_alu_r(op),
            // POP IX — 14 T / PUSH IX — 15 T
            0xE1 => self.op_pop(opcode),
            0xE5 => self.op_push(opcode),
            // EX (SP),IX — 23 T
            0xE3 => self.op_ex_sp_hl(),
            // JP (IX) — 8 T
            0xE9 => self.op_jp_hl(),
            // LD SP,IX — 10 T
            0xF9 => self.op_ld_sp_hl(),
            _ => self.invalid_opcode(opcode),
        }
    }

    /// DD CB d op / FD CB d op: CB operations on (IX+d)/(IY+d).
    fn execute_index_cb(&mut self, opcode: u8) {
        // Only the memory form (low bits 110) is documented
        match opcode {
            op if (op & 0x07) != 0x06 => self.invalid_opcode(op),
            0x00..=0x3F => self.op_rotate_shift_r(opcode),
            0x40..=0x7F => self.op_bit_r(opcode),
            0x80..=0xFF => self.op_res_set_r(opcode),
        }
    }

    /// ED prefix: Z80 extended instructions.
    fn execute_ed<H: PortHandler + ?Sized>(&mut self, opcode: u8, ports: &mut H) {
        match opcode {
            // --- Specific ED opcodes (low 3 bits = 111) ---
            0x47 => self.op_ld_i_a(),   // LD I,A — 9T
            0x4F => self.op_ld_r_a(),   // LD R,A — 9T
            0x57 => self.op_ld_a_i(),   // LD A,I — 9T
            0x5F => self.op_ld_a_r(),   // LD A,R — 9T
            0x67 => self.op_rrd(),      // RRD — 18T
            0x6F => self.op_rld(),      // RLD — 18T

            // --- Block transfer/compare/output ---
            0xA0 | 0xA8 => self.op_ldi_ldd(opcode),              // LDI/LDD — 16T
            0xA1 | 0xA9 => self.op_cpi_cpd(opcode),              // CPI/CPD — 16T
            0xA3 | 0xAB => self.op_outi_outd(opcode, ports),     // OUTI/OUTD — 16T
            0xB0 | 0xB8 => self.op_ldir_lddr(opcode),            // LDIR/LDDR
            0xB1 | 0xB9 => self.op_cpir_cpdr(opcode),            // CPIR/CPDR
            0xB3 | 0xBB => self.op_otir_otdr(opcode, ports),     // OTIR/OTDR

            // --- Pattern-based (40-7F range, low 3 bits 0-6) ---
            op if (op & 0xC7) == 0x40 => self.op_in_r_c(op),         // IN r,(C) — 12T
            op if (op & 0xC7) == 0x41 => self.op_out_c_r(op, ports), // OUT (C),r — 12T
            op if (op & 0xCF) == 0x42 => self.op_sbc_hl_rr(op),      // SBC HL,rr — 15T
            op if (op & 0xCF) == 0x43 => self.op_ld_nn_rr_ed(op),    // LD (nn),rr — 20T
            op if (op & 0xC7) == 0x44 => self.op_neg(),              // NEG — 8T
            op if (op & 0xC7) == 0x45 => self.op_retn(),             // RETN/RETI — 14T
            op if (op & 0xC7) == 0x46 => self.op_im(),               // IM 0/1/2 — 8T
            op if (op & 0xCF) == 0x4A => self.op_adc_hl_rr(op),      // ADC HL,rr — 15T
            op if (op & 0xCF) == 0x4B => self.op_ld_rr_nn_ed(op),    // LD rr,(nn) — 20T

            _ => self.invalid_opcode(opcode),
        }
    }
}
