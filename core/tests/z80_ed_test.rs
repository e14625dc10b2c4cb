use cpm80_core::prelude::*;
mod common;
use common::{RecordingPorts, cpu_with, i80_with, run_instruction};

// --- NEG ---

#[test]
fn test_neg() {
    let mut cpu = cpu_with(&[0xED, 0x44]); // NEG
    cpu.a = 0x01;

    assert_eq!(run_instruction(&mut cpu), 8, "NEG should be 8 T-states");
    assert_eq!(cpu.a, 0xFF);
    assert!(cpu.f.carry(), "C set for non-zero A");
    assert!(cpu.f.subtract());
}

#[test]
fn test_neg_80_overflows() {
    let mut cpu = cpu_with(&[0xED, 0x44]);
    cpu.a = 0x80;

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.f.parity_overflow(), "NEG 80h overflows");
}

#[test]
fn test_neg_zero() {
    let mut cpu = cpu_with(&[0xED, 0x44]);
    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.f.zero());
    assert!(!cpu.f.carry());
}

// --- 16-bit ADC / SBC ---

#[test]
fn test_sbc_hl_de() {
    let mut cpu = cpu_with(&[0xED, 0x52]); // SBC HL,DE
    cpu.set_hl(0x1000);
    cpu.set_de(0x0FFF);
    cpu.f = Flags::from_bits(0x01);

    assert_eq!(run_instruction(&mut cpu), 15, "SBC HL,rr should be 15 T-states");
    assert_eq!(cpu.get_hl(), 0x0000);
    assert!(cpu.f.zero(), "Z from the full 16-bit result");
    assert!(cpu.f.subtract());
    assert!(!cpu.f.carry());
}

#[test]
fn test_sbc_hl_borrow_and_overflow() {
    let mut cpu = cpu_with(&[0xED, 0x42]); // SBC HL,BC
    cpu.set_hl(0x8000);
    cpu.set_bc(0x0001);

    run_instruction(&mut cpu);
    assert_eq!(cpu.get_hl(), 0x7FFF);
    assert!(cpu.f.parity_overflow(), "signed overflow");
    assert!(!cpu.f.sign());

    let mut cpu = cpu_with(&[0xED, 0x42]);
    cpu.set_hl(0x0000);
    cpu.set_bc(0x0001);
    run_instruction(&mut cpu);
    assert_eq!(cpu.get_hl(), 0xFFFF);
    assert!(cpu.f.carry(), "borrow");
    assert!(cpu.f.sign());
}

#[test]
fn test_adc_hl_sp() {
    let mut cpu = cpu_with(&[0xED, 0x7A]); // ADC HL,SP
    cpu.set_hl(0x7FFF);
    cpu.sp = 0x0000;
    cpu.f = Flags::from_bits(0x01);

    assert_eq!(run_instruction(&mut cpu), 15);
    assert_eq!(cpu.get_hl(), 0x8000);
    assert!(cpu.f.parity_overflow());
    assert!(cpu.f.sign());
    assert!(cpu.f.half_carry(), "carry out of bit 11");
}

// --- Nibble rotates ---

#[test]
fn test_rrd() {
    let mut cpu = cpu_with(&[0xED, 0x67]); // RRD
    cpu.a = 0x84;
    cpu.set_hl(0x5000);
    cpu.mem.put8(0x5000, 0x20);

    assert_eq!(run_instruction(&mut cpu), 18, "RRD should be 18 T-states");
    assert_eq!(cpu.a, 0x80);
    assert_eq!(cpu.mem.get8(0x5000), 0x42);
    assert!(cpu.f.sign());
}

#[test]
fn test_rld() {
    let mut cpu = cpu_with(&[0xED, 0x6F]); // RLD
    cpu.a = 0x7A;
    cpu.set_hl(0x5000);
    cpu.mem.put8(0x5000, 0x31);
    cpu.f = Flags::from_bits(0x01);

    assert_eq!(run_instruction(&mut cpu), 18);
    assert_eq!(cpu.a, 0x73);
    assert_eq!(cpu.mem.get8(0x5000), 0x1A);
    assert!(cpu.f.carry(), "C preserved");
}

// --- Control ---

#[test]
fn test_retn_reti() {
    for opcode in [0x45, 0x4D] {
        let mut cpu = cpu_with(&[0xED, opcode]);
        cpu.sp = 0x8000;
        cpu.mem.put16(0x8000, 0x2345);

        assert_eq!(run_instruction(&mut cpu), 14);
        assert_eq!(cpu.pc, 0x2345);
        assert_eq!(cpu.sp, 0x8002);
    }
}

#[test]
fn test_im_is_noop() {
    let mut cpu = cpu_with(&[0xED, 0x46, 0xED, 0x56, 0xED, 0x5E]);
    for _ in 0..3 {
        assert_eq!(run_instruction(&mut cpu), 8);
    }
    assert_eq!(cpu.pc, 6);
}

// --- I/O through C ---

#[test]
fn test_out_c_r() {
    let mut cpu = cpu_with(&[0xED, 0x79, 0xED, 0x71]); // OUT (C),A; OUT (C),0
    cpu.a = 0x55;
    cpu.c = 0x40;
    let mut ports = RecordingPorts::new();

    assert_eq!(cpu.step(&mut ports), 12);
    assert_eq!(cpu.step(&mut ports), 12);
    assert_eq!(ports.outputs, vec![(0x40, 0x55), (0x40, 0x00)]);
}

#[test]
fn test_in_r_c_leaves_registers() {
    let mut cpu = cpu_with(&[0xED, 0x78]); // IN A,(C)
    cpu.a = 0x12;
    cpu.f = Flags::from_bits(0x81);

    assert_eq!(run_instruction(&mut cpu), 12);
    assert_eq!(cpu.a, 0x12);
    assert_eq!(cpu.f.bits(), 0x81);
}

// --- Unmapped entries ---

#[test]
fn test_ed_unmapped() {
    for opcode in [0x00, 0x77, 0x7F, 0xA2, 0xB2, 0xFF] {
        let mut cpu = cpu_with(&[0xED, opcode]);
        assert_eq!(run_instruction(&mut cpu), 0, "ED {opcode:02X} should be invalid");
        match cpu.halt_reason() {
            Some(HaltReason::InvalidOpcode(inv)) => {
                assert_eq!(inv.opcode, opcode);
                assert_eq!(inv.to_string(), format!("invalid opcode ED {opcode:02X} at 0000"));
            }
            other => panic!("expected invalid opcode, got {other:?}"),
        }
    }
}

#[test]
fn test_ed_prefix_invalid_in_8080_mode() {
    let mut cpu = i80_with(&[0xED, 0x44]);
    assert_eq!(run_instruction(&mut cpu), 0);
    assert_eq!(cpu.pc, 1, "only the prefix byte was consumed");
}
