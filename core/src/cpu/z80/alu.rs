//! Flag-exact arithmetic and logic.
//!
//! Every function here is pure: it takes operands (plus the incoming flags
//! where some of them survive) and returns the result together with the new
//! flag byte. Instruction handlers decide where the result goes.
//!
//! Only `add8`, `sub8` and `compare8` depend on [`CpuMode`]: in 8080 mode
//! their P/V bit reports parity using the inverted convention this engine has
//! always had (set when the result has an odd number of one bits), in Z80
//! mode it reports signed overflow.

use crate::cpu::z80::CpuMode;
use crate::cpu::z80::flags::{Flag, Flags, parity};

/// Result of an 8-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: Flags,
}

/// Result of a 16-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult16 {
    pub value: u16,
    pub flags: Flags,
}

fn arith_pv(mode: CpuMode, value: u8, overflow: bool) -> bool {
    match mode {
        CpuMode::I80 => !parity(value),
        CpuMode::Z80 => overflow,
    }
}

// --- 8-bit arithmetic ---

/// a + b + carry. H is the carry out of bit 3, C the carry out of bit 7.
pub fn add8(a: u8, b: u8, carry: bool, mode: CpuMode) -> AluResult {
    let c = carry as u8;
    let sum = a as u16 + b as u16 + c as u16;
    let value = sum as u8;

    let mut flags = Flags::sz(value);
    flags.set(Flag::H, (a & 0x0F) + (b & 0x0F) + c > 0x0F);
    flags.set(Flag::C, sum > 0xFF);
    // Overflow: operands share a sign the result does not
    let overflow = (a ^ value) & (b ^ value) & 0x80 != 0;
    flags.set(Flag::PV, arith_pv(mode, value, overflow));
    AluResult { value, flags }
}

/// minuend - subtrahend - borrow. H is the borrow into bit 4, C the borrow
/// out of bit 7, N is set.
pub fn sub8(a: u8, b: u8, borrow: bool, mode: CpuMode) -> AluResult {
    let c = borrow as u8;
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = Flags::sz(value).with(Flag::N, true);
    flags.set(Flag::H, (a & 0x0F) < (b & 0x0F) + c);
    flags.set(Flag::C, (a as u16) < b as u16 + c as u16);
    // Overflow: operands differ in sign and the result took the subtrahend's
    let overflow = (a ^ b) & (a ^ value) & 0x80 != 0;
    flags.set(Flag::PV, arith_pv(mode, value, overflow));
    AluResult { value, flags }
}

/// CP: the flags of `a - b`, result discarded.
pub fn compare8(a: u8, b: u8, mode: CpuMode) -> Flags {
    sub8(a, b, false, mode).flags
}

/// Compare used by CPI/CPD/CPIR/CPDR. C is left alone and P/V reports
/// whether the byte counter (already decremented) is non-zero.
pub fn compare8_ed(a: u8, b: u8, flags: Flags, bc: u16) -> Flags {
    let value = a.wrapping_sub(b);
    Flags::sz(value)
        .with(Flag::H, (a & 0x0F) < (b & 0x0F))
        .with(Flag::N, true)
        .with(Flag::PV, bc != 0)
        .with(Flag::C, flags.carry())
}

/// INC: like add8 by one, except C is preserved and P/V is overflow only.
pub fn inc8(a: u8, flags: Flags) -> AluResult {
    let value = a.wrapping_add(1);
    let flags = Flags::sz(value)
        .with(Flag::H, a & 0x0F == 0x0F)
        .with(Flag::PV, a == 0x7F)
        .with(Flag::C, flags.carry());
    AluResult { value, flags }
}

/// DEC: like sub8 by one, except C is preserved and P/V is overflow only.
pub fn dec8(a: u8, flags: Flags) -> AluResult {
    let value = a.wrapping_sub(1);
    let flags = Flags::sz(value)
        .with(Flag::H, a & 0x0F == 0x00)
        .with(Flag::PV, a == 0x80)
        .with(Flag::N, true)
        .with(Flag::C, flags.carry());
    AluResult { value, flags }
}

// --- 8-bit logic ---

pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult {
        value,
        flags: Flags::szp(value).with(Flag::H, true),
    }
}

pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult {
        value,
        flags: Flags::szp(value),
    }
}

pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult {
        value,
        flags: Flags::szp(value),
    }
}

/// Decimal adjust after a BCD add (N clear) or subtract (N set).
///
/// The correction is 0x06 when the low nibble overflowed (H set or > 9) and
/// 0x60 when the whole byte did (C set or > 0x99); it is added after an
/// addition and subtracted after a subtraction.
pub fn daa(a: u8, flags: Flags) -> AluResult {
    let n = flags.subtract();
    let old_h = flags.half_carry();
    let old_c = flags.carry();
    let lo = a & 0x0F;

    let mut correction = 0u8;
    let mut carry = old_c;
    if old_h || lo > 9 {
        correction |= 0x06;
    }
    if old_c || a > 0x99 {
        correction |= 0x60;
        carry = true;
    }

    let value = if n {
        a.wrapping_sub(correction)
    } else {
        a.wrapping_add(correction)
    };
    let half = if n { old_h && lo < 6 } else { lo > 9 };

    let flags = Flags::szp(value)
        .with(Flag::N, n)
        .with(Flag::H, half)
        .with(Flag::C, carry);
    AluResult { value, flags }
}

// --- Rotates, shifts and bit tests (CB family) ---

/// CB rotate/shift selected by bits 5-3 of the opcode:
/// 0=RLC 1=RRC 2=RL 3=RR 4=SLA 5=SRA 6=SLL 7=SRL.
/// S, Z and parity from the result, H and N clear, C the bit shifted out.
pub fn rotate_shift(op: u8, value: u8, flags: Flags) -> AluResult {
    let carry_in = flags.carry() as u8;
    let (result, carry_out) = match op & 0x07 {
        0 => (value.rotate_left(1), value & 0x80 != 0),
        1 => (value.rotate_right(1), value & 0x01 != 0),
        2 => ((value << 1) | carry_in, value & 0x80 != 0),
        3 => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
        4 => (value << 1, value & 0x80 != 0),
        5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
        6 => ((value << 1) | 0x01, value & 0x80 != 0),
        7 => (value >> 1, value & 0x01 != 0),
        _ => unreachable!(),
    };
    AluResult {
        value: result,
        flags: Flags::szp(result).with(Flag::C, carry_out),
    }
}

/// BIT b: Z (and P/V) set when the bit is clear, H set, N clear, C kept.
/// S mirrors the tested bit only for bit 7.
pub fn bit_test(bit: u8, value: u8, flags: Flags) -> Flags {
    let set = value & (1 << (bit & 0x07)) != 0;
    Flags::default()
        .with(Flag::Z, !set)
        .with(Flag::PV, !set)
        .with(Flag::S, bit == 7 && set)
        .with(Flag::H, true)
        .with(Flag::C, flags.carry())
}

// --- 16-bit arithmetic ---

/// ADD HL,ss: H from bit 11, C from bit 15, N clear; S, Z and P/V kept.
pub fn add16(a: u16, b: u16, flags: Flags) -> AluResult16 {
    let sum = a as u32 + b as u32;
    let flags = flags
        .keep(&[Flag::S, Flag::Z, Flag::PV])
        .with(Flag::H, (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF)
        .with(Flag::C, sum > 0xFFFF);
    AluResult16 {
        value: sum as u16,
        flags,
    }
}

/// ADC HL,ss: every flag from the 16-bit result, P/V is overflow.
pub fn adc16(a: u16, b: u16, carry: bool) -> AluResult16 {
    let c = carry as u32;
    let sum = a as u32 + b as u32 + c;
    let value = sum as u16;
    let flags = Flags::default()
        .with(Flag::S, value & 0x8000 != 0)
        .with(Flag::Z, value == 0)
        .with(Flag::H, (a & 0x0FFF) as u32 + (b & 0x0FFF) as u32 + c > 0x0FFF)
        .with(Flag::PV, (a ^ value) & (b ^ value) & 0x8000 != 0)
        .with(Flag::C, sum > 0xFFFF);
    AluResult16 { value, flags }
}

/// SBC HL,ss: every flag from the 16-bit result, P/V is overflow, N set.
pub fn sbc16(a: u16, b: u16, borrow: bool) -> AluResult16 {
    let c = borrow as u32;
    let value = a.wrapping_sub(b).wrapping_sub(c as u16);
    let flags = Flags::default()
        .with(Flag::S, value & 0x8000 != 0)
        .with(Flag::Z, value == 0)
        .with(Flag::H, ((a & 0x0FFF) as u32) < (b & 0x0FFF) as u32 + c)
        .with(Flag::PV, (a ^ b) & (a ^ value) & 0x8000 != 0)
        .with(Flag::N, true)
        .with(Flag::C, (a as u32) < b as u32 + c);
    AluResult16 { value, flags }
}
