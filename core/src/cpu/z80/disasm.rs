//! Text disassembly for trace output and diagnostics.
//!
//! Both modes are rendered with Zilog mnemonics. Entries the engine treats
//! as invalid come out as `DB` lines covering the bytes that were consumed,
//! so the returned length always matches what the engine would fetch before
//! reporting the opcode.

use crate::core::Memory;
use crate::cpu::z80::CpuMode;

const R: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const RP: [&str; 4] = ["BC", "DE", "HL", "SP"];
const RP_AF: [&str; 4] = ["BC", "DE", "HL", "AF"];
const CC: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];
const ALU: [&str; 8] = [
    "ADD A,", "ADC A,", "SUB ", "SBC A,", "AND ", "XOR ", "OR ", "CP ",
];
const ROT: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SLL", "SRL"];
const ACC_OPS: [&str; 8] = ["RLCA", "RRCA", "RLA", "RRA", "DAA", "CPL", "SCF", "CCF"];

/// Base opcodes with no 8080 meaning.
const I80_INVALID: [u8; 12] = [
    0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD,
];

struct Cursor<'a> {
    mem: &'a Memory,
    start: u16,
    pc: u16,
}

impl Cursor<'_> {
    fn byte(&mut self) -> u8 {
        let val = self.mem.get8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    fn word(&mut self) -> u16 {
        let val = self.mem.get16(self.pc);
        self.pc = self.pc.wrapping_add(2);
        val
    }

    fn len(&self) -> u16 {
        self.pc.wrapping_sub(self.start)
    }

    /// Relative branch target, computed from the address after the offset.
    fn rel(&mut self) -> String {
        let d = self.byte() as i8 as i16 as u16;
        format!("{:04X}H", self.pc.wrapping_add(d))
    }

    fn imm8(&mut self) -> String {
        format!("{:02X}H", self.byte())
    }

    fn imm16(&mut self) -> String {
        format!("{:04X}H", self.word())
    }

    /// `DB` over every byte consumed so far.
    fn db(&self) -> String {
        let bytes: Vec<String> = (0..self.len())
            .map(|i| format!("{:02X}H", self.mem.get8(self.start.wrapping_add(i))))
            .collect();
        format!("DB {}", bytes.join(","))
    }
}

fn indexed_operand(name: &str, d: i8) -> String {
    let sign = if d < 0 { '-' } else { '+' };
    format!("({name}{sign}{:02X}H)", d.unsigned_abs())
}

/// Decode one instruction at `pc`. Returns the text and its length in bytes.
pub fn disassemble(mem: &Memory, pc: u16, mode: CpuMode) -> (String, u16) {
    let mut cur = Cursor { mem, start: pc, pc };
    let op = cur.byte();
    let text = match (mode, op) {
        (CpuMode::I80, op) if I80_INVALID.contains(&op) => cur.db(),
        (CpuMode::I80, op) => base(&mut cur, op, None),
        (CpuMode::Z80, 0xCB) => {
            let op = cur.byte();
            cb(op, R[(op & 0x07) as usize].to_string())
        }
        (CpuMode::Z80, 0xDD) => index(&mut cur, "IX"),
        (CpuMode::Z80, 0xED) => ed(&mut cur),
        (CpuMode::Z80, 0xFD) => index(&mut cur, "IY"),
        (CpuMode::Z80, op) => base(&mut cur, op, None),
    };
    (text, cur.len())
}

/// 8-bit operand by register index. Under an index prefix 4/5 name the
/// index halves and 6 consumes a displacement.
fn reg(cur: &mut Cursor, r: u8, ix: Option<&str>) -> String {
    match (r, ix) {
        (6, Some(name)) => {
            let d = cur.byte() as i8;
            indexed_operand(name, d)
        }
        (4, Some(name)) => format!("{name}H"),
        (5, Some(name)) => format!("{name}L"),
        _ => R[r as usize].to_string(),
    }
}

fn base(cur: &mut Cursor, op: u8, ix: Option<&str>) -> String {
    let x = op >> 6;
    let y = (op >> 3) & 0x07;
    let z = op & 0x07;
    let p = (y >> 1) as usize;
    let q = y & 0x01;
    let hl = ix.unwrap_or("HL");
    let rp = |i: usize| if i == 2 { hl } else { RP[i] };

    match (x, z) {
        (0, 0) => match y {
            0 => "NOP".to_string(),
            1 => "EX AF,AF'".to_string(),
            2 => format!("DJNZ {}", cur.rel()),
            3 => format!("JR {}", cur.rel()),
            _ => format!("JR {},{}", CC[(y - 4) as usize], cur.rel()),
        },
        (0, 1) if q == 0 => format!("LD {},{}", rp(p), cur.imm16()),
        (0, 1) => format!("ADD {hl},{}", rp(p)),
        (0, 2) => match (p, q) {
            (0, 0) => "LD (BC),A".to_string(),
            (1, 0) => "LD (DE),A".to_string(),
            (2, 0) => format!("LD ({}),{hl}", cur.imm16()),
            (3, 0) => format!("LD ({}),A", cur.imm16()),
            (0, _) => "LD A,(BC)".to_string(),
            (1, _) => "LD A,(DE)".to_string(),
            (2, _) => format!("LD {hl},({})", cur.imm16()),
            _ => format!("LD A,({})", cur.imm16()),
        },
        (0, 3) => format!("{} {}", if q == 0 { "INC" } else { "DEC" }, rp(p)),
        (0, 4) => format!("INC {}", reg(cur, y, ix)),
        (0, 5) => format!("DEC {}", reg(cur, y, ix)),
        (0, 6) => {
            let dst = reg(cur, y, ix);
            format!("LD {dst},{}", cur.imm8())
        }
        (0, _) => ACC_OPS[y as usize].to_string(),
        (1, _) if y == 6 && z == 6 => "HALT".to_string(),
        (1, _) => {
            // Next to (IX+d) the other operand stays a plain H/L
            let mem_form = y == 6 || z == 6;
            let side = |cur: &mut Cursor, r: u8| {
                if mem_form && r != 6 {
                    R[r as usize].to_string()
                } else {
                    reg(cur, r, ix)
                }
            };
            let dst = side(cur, y);
            let src = side(cur, z);
            format!("LD {dst},{src}")
        }
        (2, _) => format!("{}{}", ALU[y as usize], reg(cur, z, ix)),
        (3, 0) => format!("RET {}", CC[y as usize]),
        (3, 1) if q == 0 => format!("POP {}", if p == 2 { hl } else { RP_AF[p] }),
        (3, 1) => match p {
            0 => "RET".to_string(),
            1 => "EXX".to_string(),
            2 => format!("JP ({hl})"),
            _ => format!("LD SP,{hl}"),
        },
        (3, 2) => format!("JP {},{}", CC[y as usize], cur.imm16()),
        (3, 3) => match y {
            0 => format!("JP {}", cur.imm16()),
            2 => format!("OUT ({}),A", cur.imm8()),
            3 => format!("IN A,({})", cur.imm8()),
            4 => format!("EX (SP),{hl}"),
            5 => "EX DE,HL".to_string(),
            6 => "DI".to_string(),
            7 => "EI".to_string(),
            _ => cur.db(),
        },
        (3, 4) => format!("CALL {},{}", CC[y as usize], cur.imm16()),
        (3, 5) if q == 0 => format!("PUSH {}", if p == 2 { hl } else { RP_AF[p] }),
        (3, 5) if p == 0 => format!("CALL {}", cur.imm16()),
        (3, 5) => cur.db(),
        (3, 6) => format!("{}{}", ALU[y as usize], cur.imm8()),
        _ => format!("RST {:02X}H", y * 8),
    }
}

fn cb(op: u8, operand: String) -> String {
    let y = (op >> 3) & 0x07;
    match op >> 6 {
        0 => format!("{} {operand}", ROT[y as usize]),
        1 => format!("BIT {y},{operand}"),
        2 => format!("RES {y},{operand}"),
        _ => format!("SET {y},{operand}"),
    }
}

/// Opcodes the DD/FD tables accept.
fn index_valid(op: u8) -> bool {
    let touches = |r: u8| matches!(r, 4..=6);
    match op {
        op if (op & 0xCF) == 0x09 => true,
        0x21 | 0x22 | 0x2A | 0x23 | 0x2B => true,
        0x24 | 0x25 | 0x2C | 0x2D | 0x34 | 0x35 | 0x26 | 0x2E | 0x36 => true,
        0x76 => false,
        op if (op & 0xC0) == 0x40 => touches(op & 0x07) || touches((op >> 3) & 0x07),
        op if (op & 0xC0) == 0x80 => touches(op & 0x07),
        0xE1 | 0xE3 | 0xE5 | 0xE9 | 0xF9 => true,
        _ => false,
    }
}

fn index(cur: &mut Cursor, name: &str) -> String {
    let op = cur.byte();
    if op == 0xCB {
        let d = cur.byte() as i8;
        let op = cur.byte();
        if op & 0x07 != 0x06 {
            return cur.db();
        }
        return cb(op, indexed_operand(name, d));
    }
    if index_valid(op) {
        base(cur, op, Some(name))
    } else {
        cur.db()
    }
}

fn ed(cur: &mut Cursor) -> String {
    let op = cur.byte();
    let y = (op >> 3) & 0x07;
    let p = (y >> 1) as usize;
    let q = y & 0x01;
    let fixed = match op {
        0x47 => Some("LD I,A"),
        0x4F => Some("LD R,A"),
        0x57 => Some("LD A,I"),
        0x5F => Some("LD A,R"),
        0x67 => Some("RRD"),
        0x6F => Some("RLD"),
        0xA0 => Some("LDI"),
        0xA8 => Some("LDD"),
        0xA1 => Some("CPI"),
        0xA9 => Some("CPD"),
        0xA3 => Some("OUTI"),
        0xAB => Some("OUTD"),
        0xB0 => Some("LDIR"),
        0xB8 => Some("LDDR"),
        0xB1 => Some("CPIR"),
        0xB9 => Some("CPDR"),
        0xB3 => Some("OTIR"),
        0xBB => Some("OTDR"),
        _ => None,
    };
    if let Some(text) = fixed {
        return text.to_string();
    }
    if op & 0xC0 != 0x40 {
        return cur.db();
    }
    match op & 0x07 {
        0 if y == 6 => "IN (C)".to_string(),
        0 => format!("IN {},(C)", R[y as usize]),
        1 if y == 6 => "OUT (C),0".to_string(),
        1 => format!("OUT (C),{}", R[y as usize]),
        2 if q == 0 => format!("SBC HL,{}", RP[p]),
        2 => format!("ADC HL,{}", RP[p]),
        3 if q == 0 => format!("LD ({}),{}", cur.imm16(), RP[p]),
        3 => format!("LD {},({})", RP[p], cur.imm16()),
        4 => "NEG".to_string(),
        5 if y == 1 => "RETI".to_string(),
        5 => "RETN".to_string(),
        6 => format!("IM {}", [0, 0, 1, 2][(y & 0x03) as usize]),
        _ => cur.db(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dis(bytes: &[u8], mode: CpuMode) -> (String, u16) {
        let mut mem = Memory::new();
        mem.load(0x0100, bytes);
        disassemble(&mem, 0x0100, mode)
    }

    #[test]
    fn test_base_instructions() {
        assert_eq!(dis(&[0x00], CpuMode::Z80), ("NOP".to_string(), 1));
        assert_eq!(dis(&[0x3E, 0x42], CpuMode::Z80), ("LD A,42H".to_string(), 2));
        assert_eq!(dis(&[0xCD, 0x34, 0x12], CpuMode::Z80), ("CALL 1234H".to_string(), 3));
        assert_eq!(dis(&[0x7E], CpuMode::Z80), ("LD A,(HL)".to_string(), 1));
        assert_eq!(dis(&[0xF5], CpuMode::Z80), ("PUSH AF".to_string(), 1));
        assert_eq!(dis(&[0xFF], CpuMode::Z80), ("RST 38H".to_string(), 1));
    }

    #[test]
    fn test_relative_target() {
        // JR to itself
        assert_eq!(dis(&[0x18, 0xFE], CpuMode::Z80), ("JR 0100H".to_string(), 2));
        assert_eq!(dis(&[0x20, 0x03], CpuMode::Z80), ("JR NZ,0105H".to_string(), 2));
    }

    #[test]
    fn test_8080_invalid_renders_db() {
        assert_eq!(dis(&[0x10, 0x00], CpuMode::I80), ("DB 10H".to_string(), 1));
        assert_eq!(dis(&[0xD9], CpuMode::I80), ("DB D9H".to_string(), 1));
        assert_eq!(dis(&[0x76], CpuMode::I80), ("HALT".to_string(), 1));
    }

    #[test]
    fn test_indexed_forms() {
        assert_eq!(
            dis(&[0xDD, 0x36, 0x05, 0x99], CpuMode::Z80),
            ("LD (IX+05H),99H".to_string(), 4)
        );
        assert_eq!(
            dis(&[0xFD, 0xCB, 0xFE, 0x46], CpuMode::Z80),
            ("BIT 0,(IY-02H)".to_string(), 4)
        );
        assert_eq!(dis(&[0xDD, 0x66, 0x01], CpuMode::Z80), ("LD H,(IX+01H)".to_string(), 3));
        assert_eq!(dis(&[0xDD, 0x7C], CpuMode::Z80), ("LD A,IXH".to_string(), 2));
        assert_eq!(dis(&[0xDD, 0xE9], CpuMode::Z80), ("JP (IX)".to_string(), 2));
        assert_eq!(dis(&[0xDD, 0x00], CpuMode::Z80), ("DB DDH,00H".to_string(), 2));
    }

    #[test]
    fn test_ed_forms() {
        assert_eq!(dis(&[0xED, 0xB0], CpuMode::Z80), ("LDIR".to_string(), 2));
        assert_eq!(dis(&[0xED, 0x52], CpuMode::Z80), ("SBC HL,DE".to_string(), 2));
        assert_eq!(
            dis(&[0xED, 0x73, 0x00, 0x80], CpuMode::Z80),
            ("LD (8000H),SP".to_string(), 4)
        );
        assert_eq!(dis(&[0xED, 0x5E], CpuMode::Z80), ("IM 2".to_string(), 2));
        assert_eq!(dis(&[0xED, 0x00], CpuMode::Z80), ("DB EDH,00H".to_string(), 2));
    }
}
