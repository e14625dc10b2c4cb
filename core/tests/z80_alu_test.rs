use cpm80_core::cpu::z80::alu;
use cpm80_core::prelude::*;
mod common;
use common::{cpu_with, i80_with, run_instruction};

// ============================================================
// 8-bit ADD / ADC / SUB / SBC
// ============================================================

#[test]
fn test_add_a_b() {
    let mut cpu = cpu_with(&[0x80]); // ADD A, B
    cpu.a = 0x12;
    cpu.b = 0x34;

    let states = run_instruction(&mut cpu);
    assert_eq!(states, 4, "ADD A,r should be 4 T-states");
    assert_eq!(cpu.a, 0x46);
    assert!(!cpu.f.carry(), "C should be clear");
    assert!(!cpu.f.subtract(), "N should be clear");
}

#[test]
fn test_add_a_n_carry_and_zero() {
    let mut cpu = cpu_with(&[0xC6, 0x01]); // ADD A, 01h
    cpu.a = 0xFF;

    let states = run_instruction(&mut cpu);
    assert_eq!(states, 7, "ADD A,n should be 7 T-states");
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.f.zero(), "Z should be set");
    assert!(cpu.f.carry(), "C should be set");
    assert!(cpu.f.half_carry(), "H should be set");
    assert!(!cpu.f.parity_overflow(), "no signed overflow");
}

#[test]
fn test_add_signed_overflow() {
    let mut cpu = cpu_with(&[0xC6, 0x01]);
    cpu.a = 0x7F;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.f.sign(), "S should be set");
    assert!(cpu.f.parity_overflow(), "PV should report overflow");
}

#[test]
fn test_adc_uses_carry() {
    let mut cpu = cpu_with(&[0x89]); // ADC A, C
    cpu.a = 0x10;
    cpu.c = 0x20;
    cpu.f = Flags::from_bits(0x01);

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x31);
    assert!(!cpu.f.carry());
}

#[test]
fn test_add_a_hl_indirect() {
    let mut cpu = cpu_with(&[0x86]); // ADD A, (HL)
    cpu.a = 0x01;
    cpu.set_hl(0x4000);
    cpu.mem.put8(0x4000, 0x02);

    let states = run_instruction(&mut cpu);
    assert_eq!(states, 7, "ALU (HL) should be 7 T-states");
    assert_eq!(cpu.a, 0x03);
}

#[test]
fn test_sub_borrow() {
    let mut cpu = cpu_with(&[0x90]); // SUB B
    cpu.a = 0x10;
    cpu.b = 0x20;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0xF0);
    assert!(cpu.f.carry(), "C should be set (borrow)");
    assert!(cpu.f.subtract(), "N should be set");
    assert!(cpu.f.sign());
}

#[test]
fn test_sub_half_borrow() {
    let mut cpu = cpu_with(&[0xD6, 0x01]); // SUB 01h
    cpu.a = 0x10;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x0F);
    assert!(cpu.f.half_carry(), "H should be set (borrow from bit 4)");
    assert!(!cpu.f.carry());
}

#[test]
fn test_sbc_with_borrow_in() {
    let mut cpu = cpu_with(&[0x9A]); // SBC A, D
    cpu.a = 0x05;
    cpu.d = 0x05;
    cpu.f = Flags::from_bits(0x01);

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0xFF);
    assert!(cpu.f.carry(), "borrow out of bit 7");
}

#[test]
fn test_sub_signed_overflow() {
    let mut cpu = cpu_with(&[0xD6, 0x01]);
    cpu.a = 0x80;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x7F);
    assert!(cpu.f.parity_overflow(), "PV set: -128 - 1 overflows");
}

#[test]
fn test_cp_discards_result() {
    let mut cpu = cpu_with(&[0xFE, 0x42]); // CP 42h
    cpu.a = 0x42;

    let states = run_instruction(&mut cpu);
    assert_eq!(states, 7);
    assert_eq!(cpu.a, 0x42, "A should be unchanged");
    assert!(cpu.f.zero(), "Z should be set (equal)");
    assert!(cpu.f.subtract());
}

// ============================================================
// Logic
// ============================================================

#[test]
fn test_and_sets_h_and_parity() {
    let mut cpu = cpu_with(&[0xE6, 0x0F]); // AND 0Fh
    cpu.a = 0x3C;
    cpu.f = Flags::from_bits(0x01);

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x0C);
    assert!(cpu.f.half_carry(), "AND sets H");
    assert!(cpu.f.parity_overflow(), "0x0C has even parity");
    assert!(!cpu.f.carry(), "C cleared");
}

#[test]
fn test_xor_a_clears() {
    let mut cpu = cpu_with(&[0xAF]); // XOR A
    cpu.a = 0x5A;
    cpu.f = Flags::from_bits(0xFF);

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.f.bits(), 0x44, "only Z and PV should be set");
}

#[test]
fn test_or_odd_parity() {
    let mut cpu = cpu_with(&[0xB1]); // OR C
    cpu.a = 0x01;
    cpu.c = 0x02;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x03);
    assert!(cpu.f.parity_overflow(), "0x03 has even parity");

    let mut cpu = cpu_with(&[0xB1]);
    cpu.a = 0x01;
    cpu.c = 0x00;
    run_instruction(&mut cpu);
    assert!(!cpu.f.parity_overflow(), "0x01 has odd parity");
}

// ============================================================
// INC r / DEC r
// ============================================================

#[test]
fn test_inc_r_preserves_carry() {
    let mut cpu = cpu_with(&[0x04]); // INC B
    cpu.b = 0x0F;
    cpu.f = Flags::from_bits(0x01);

    let states = run_instruction(&mut cpu);
    assert_eq!(states, 4);
    assert_eq!(cpu.b, 0x10);
    assert!(cpu.f.half_carry(), "H should be set");
    assert!(cpu.f.carry(), "C should be preserved");
}

#[test]
fn test_inc_overflow() {
    let mut cpu = cpu_with(&[0x3C]); // INC A
    cpu.a = 0x7F;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.f.parity_overflow(), "PV set on 7F -> 80");
}

#[test]
fn test_dec_to_zero() {
    let mut cpu = cpu_with(&[0x0D]); // DEC C
    cpu.c = 0x01;

    run_instruction(&mut cpu);
    assert_eq!(cpu.c, 0x00);
    assert!(cpu.f.zero());
    assert!(cpu.f.subtract());
}

#[test]
fn test_inc_hl_indirect() {
    let mut cpu = cpu_with(&[0x34]); // INC (HL)
    cpu.set_hl(0x4000);
    cpu.mem.put8(0x4000, 0xFF);

    let states = run_instruction(&mut cpu);
    assert_eq!(states, 11, "INC (HL) should be 11 T-states");
    assert_eq!(cpu.mem.get8(0x4000), 0x00);
    assert!(cpu.f.zero());
}

#[test]
fn test_dec_hl_indirect_overflow() {
    let mut cpu = cpu_with(&[0x35]); // DEC (HL)
    cpu.set_hl(0x4000);
    cpu.mem.put8(0x4000, 0x80);

    run_instruction(&mut cpu);
    assert_eq!(cpu.mem.get8(0x4000), 0x7F);
    assert!(cpu.f.parity_overflow(), "PV set on 80 -> 7F");
    assert!(cpu.f.half_carry());
}

// ============================================================
// 16-bit ADD / INC / DEC
// ============================================================

#[test]
fn test_add_hl_bc() {
    let mut cpu = cpu_with(&[0x09]); // ADD HL, BC
    cpu.set_hl(0x1000);
    cpu.set_bc(0x2000);

    let states = run_instruction(&mut cpu);
    assert_eq!(states, 11, "ADD HL,rr should be 11 T-states");
    assert_eq!(cpu.get_hl(), 0x3000);
    assert!(!cpu.f.carry(), "C should be clear");
    assert!(!cpu.f.subtract(), "N should be clear");
}

#[test]
fn test_add_hl_de_carry() {
    let mut cpu = cpu_with(&[0x19]); // ADD HL, DE
    cpu.set_hl(0x8000);
    cpu.set_de(0x8000);

    run_instruction(&mut cpu);
    assert_eq!(cpu.get_hl(), 0x0000);
    assert!(cpu.f.carry(), "C should be set");
}

#[test]
fn test_add_hl_half_carry() {
    let mut cpu = cpu_with(&[0x09]);
    cpu.set_hl(0x0FFF);
    cpu.set_bc(0x0001);

    run_instruction(&mut cpu);
    assert_eq!(cpu.get_hl(), 0x1000);
    assert!(cpu.f.half_carry(), "H should be set");
}

#[test]
fn test_add_hl_preserves_szpv() {
    let mut cpu = cpu_with(&[0x09]);
    cpu.set_hl(0x1000);
    cpu.set_bc(0x0001);
    cpu.f = Flags::from_bits(0xC4); // S=1, Z=1, PV=1

    run_instruction(&mut cpu);
    assert_eq!(cpu.f.bits() & 0xC4, 0xC4, "S, Z, PV should be preserved");
}

#[test]
fn test_add_hl_sp() {
    let mut cpu = cpu_with(&[0x39]); // ADD HL, SP
    cpu.set_hl(0x0010);
    cpu.sp = 0x0020;

    run_instruction(&mut cpu);
    assert_eq!(cpu.get_hl(), 0x0030);
}

#[test]
fn test_inc_dec_rr_leave_flags() {
    let mut cpu = cpu_with(&[0x03, 0x1B]); // INC BC; DEC DE
    cpu.set_bc(0x1234);
    cpu.set_de(0x0000);
    cpu.f = Flags::from_bits(0xFF);

    assert_eq!(run_instruction(&mut cpu), 6, "INC rr should be 6 T-states");
    assert_eq!(run_instruction(&mut cpu), 6, "DEC rr should be 6 T-states");
    assert_eq!(cpu.get_bc(), 0x1235);
    assert_eq!(cpu.get_de(), 0xFFFF, "DEC DE should wrap around");
    assert_eq!(cpu.f.bits(), 0xFF, "16-bit INC/DEC should not affect flags");
}

// ============================================================
// CPL / SCF / CCF
// ============================================================

#[test]
fn test_cpl() {
    let mut cpu = cpu_with(&[0x2F]);
    cpu.a = 0x5A;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0xA5);
    assert!(cpu.f.half_carry() && cpu.f.subtract(), "CPL sets H and N");
}

#[test]
fn test_scf_ccf() {
    let mut cpu = cpu_with(&[0x37, 0x3F]); // SCF; CCF
    cpu.f = Flags::from_bits(0x12); // H, N

    run_instruction(&mut cpu);
    assert!(cpu.f.carry(), "SCF sets C");
    assert!(!cpu.f.half_carry() && !cpu.f.subtract());

    run_instruction(&mut cpu);
    assert!(!cpu.f.carry(), "CCF complements C");
    assert!(cpu.f.half_carry(), "CCF copies old C into H");
}

// ============================================================
// DAA: the 13-row BCD adjustment table
// ============================================================

/// (N, C in, H in, A in, A out, C out, H out)
const DAA_TABLE: [(bool, bool, bool, u8, u8, bool, bool); 13] = [
    (false, false, false, 0x45, 0x45, false, false), // 0-9 / 0-9: +00
    (false, false, false, 0x3B, 0x41, false, true), // 0-8 / A-F: +06
    (false, false, true, 0x52, 0x58, false, false), // 0-9 H / 0-3: +06
    (false, false, false, 0xA5, 0x05, true, false), // A-F / 0-9: +60
    (false, false, false, 0x9C, 0x02, true, true), // 9-F / A-F: +66
    (false, false, true, 0xB2, 0x18, true, false), // A-F H / 0-3: +66
    (false, true, false, 0x25, 0x85, true, false), // C 0-2 / 0-9: +60
    (false, true, false, 0x1D, 0x83, true, true), // C 0-2 / A-F: +66
    (false, true, true, 0x31, 0x97, true, false), // C 0-3 H / 0-3: +66
    (true, false, false, 0x45, 0x45, false, false), // sub 0-9 / 0-9: +00
    (true, false, true, 0x87, 0x81, false, false), // sub 0-8 H / 6-F: +FA
    (true, true, false, 0x75, 0x15, true, false), // sub C 7-F / 0-9: +A0
    (true, true, true, 0x77, 0x11, true, false), // sub C 6-F H / 6-F: +9A
];

#[test]
fn test_daa_table() {
    for (row, &(n, c, h, a_in, a_out, c_out, h_out)) in DAA_TABLE.iter().enumerate() {
        let mut cpu = cpu_with(&[0x27]); // DAA
        cpu.a = a_in;
        cpu.f = Flags::default()
            .with(Flag::N, n)
            .with(Flag::C, c)
            .with(Flag::H, h);

        let states = run_instruction(&mut cpu);
        assert_eq!(states, 4, "row {row}: DAA should be 4 T-states");
        assert_eq!(cpu.a, a_out, "row {row}: A after DAA of {a_in:02X}");
        assert_eq!(cpu.f.carry(), c_out, "row {row}: C after DAA");
        assert_eq!(cpu.f.half_carry(), h_out, "row {row}: H after DAA");
        assert_eq!(cpu.f.subtract(), n, "row {row}: N is preserved");
    }
}

#[test]
fn test_daa_half_carry() {
    // 0x3B + 0x06 carries out of bit 3
    let r = alu::daa(0x3B, Flags::default());
    assert!(r.flags.half_carry());
    // 0x52 + 0x06 does not
    let r = alu::daa(0x52, Flags::default().with(Flag::H, true));
    assert!(!r.flags.half_carry());
    // After a subtraction H survives only when the low nibble borrowed
    let r = alu::daa(0x87, Flags::default().with(Flag::N, true).with(Flag::H, true));
    assert!(!r.flags.half_carry());
}

#[test]
fn test_bcd_addition_sequence() {
    // LD A,15h; ADD A,27h; DAA -> 42h
    let mut cpu = cpu_with(&[0x3E, 0x15, 0xC6, 0x27, 0x27]);
    run_instruction(&mut cpu);
    run_instruction(&mut cpu);
    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x42);
    assert!(!cpu.f.carry());
}

// ============================================================
// Mode-dependent P/V
// ============================================================

#[test]
fn test_add_pv_by_mode() {
    // 0x60 + 0x60 = 0xC0: signed overflow, even parity
    let mut z80 = cpu_with(&[0xC6, 0x60]);
    z80.a = 0x60;
    run_instruction(&mut z80);

    let mut i80 = i80_with(&[0xC6, 0x60]);
    i80.a = 0x60;
    run_instruction(&mut i80);

    assert_eq!(z80.a, i80.a);
    assert!(z80.f.parity_overflow(), "Z80: PV reports overflow");
    assert!(!i80.f.parity_overflow(), "8080: PV clear for even parity");
    assert_eq!(
        z80.f.bits() & !0x04,
        i80.f.bits() & !0x04,
        "S, Z, H, N, C are mode-independent"
    );
}

#[test]
fn test_sub_pv_by_mode() {
    // 0x03 - 0x02 = 0x01: no overflow, odd parity
    let mut z80 = cpu_with(&[0xD6, 0x02]);
    z80.a = 0x03;
    run_instruction(&mut z80);

    let mut i80 = i80_with(&[0xD6, 0x02]);
    i80.a = 0x03;
    run_instruction(&mut i80);

    assert!(!z80.f.parity_overflow(), "Z80: no overflow");
    assert!(i80.f.parity_overflow(), "8080: PV set for odd parity");
}

#[test]
fn test_cp_pv_by_mode() {
    let z80 = alu::compare8(0x80, 0x01, CpuMode::Z80);
    let i80 = alu::compare8(0x80, 0x01, CpuMode::I80);
    // 0x7F: overflow, odd parity
    assert!(z80.parity_overflow());
    assert!(i80.parity_overflow());
    let z80 = alu::compare8(0x05, 0x02, CpuMode::Z80);
    let i80 = alu::compare8(0x05, 0x02, CpuMode::I80);
    // 0x03: no overflow, even parity
    assert!(!z80.parity_overflow());
    assert!(!i80.parity_overflow());
}

#[test]
fn test_logic_parity_same_in_both_modes() {
    let mut i80 = i80_with(&[0xE6, 0x03]); // AND 03h
    i80.a = 0xFF;
    run_instruction(&mut i80);
    assert!(i80.f.parity_overflow(), "logic ops report even parity in 8080 mode too");
}
