pub mod alu;
mod bit;
mod block;
mod branch;
mod control;
pub mod disasm;
mod dispatch;
mod exchange;
pub mod flags;
mod io;
mod load_store;
mod logic;
mod math16;
mod math8;
mod shift;
mod stack;

use crate::core::{Memory, NoTrace, PortHandler, TraceHook};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, Z80State},
};

pub use flags::{Flag, Flags};

/// Which instruction set the base dispatch table and the ALU follow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CpuMode {
    /// Intel 8080: Z80-only opcodes are invalid, P/V reports parity.
    I80,
    /// Zilog Z80: prefixed tables enabled, P/V reports overflow.
    #[default]
    Z80,
}

impl CpuMode {
    /// Decode an accumulator value written to the mode port.
    pub fn from_port_value(value: u8) -> Option<Self> {
        match value {
            0xFF => Some(CpuMode::I80),
            0xFE => Some(CpuMode::Z80),
            _ => None,
        }
    }
}

/// Dispatch table the current instruction was decoded through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InstructionSet {
    #[default]
    Base,
    CB,
    DD,
    DDCB,
    ED,
    FD,
    FDCB,
}

impl InstructionSet {
    /// Prefix bytes that lead to this table, for diagnostics.
    pub fn prefix(self) -> &'static str {
        match self {
            InstructionSet::Base => "",
            InstructionSet::CB => "CB ",
            InstructionSet::DD => "DD ",
            InstructionSet::DDCB => "DD CB ",
            InstructionSet::ED => "ED ",
            InstructionSet::FD => "FD ",
            InstructionSet::FDCB => "FD CB ",
        }
    }
}

/// Register that stands in for HL while a DD/FD instruction executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexMode {
    HL,
    IX,
    IY,
}

/// An opcode with no mapping in the table it was decoded through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidOpcode {
    /// Address of the instruction's first byte (including prefixes).
    pub addr: u16,
    pub set: InstructionSet,
    pub opcode: u8,
}

impl std::fmt::Display for InvalidOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid opcode {}{:02X} at {:04X}",
            self.set.prefix(),
            self.opcode,
            self.addr
        )
    }
}

/// Why the fetch-execute loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// A HALT instruction executed.
    Halt,
    /// An unmapped opcode was fetched.
    InvalidOpcode(InvalidOpcode),
    /// The BIOS collaborator asked the machine to stop.
    Trap,
}

/// Totals reported by [`Z80::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed, counting the one that halted.
    pub instructions: u64,
    /// Sum of T-states reported by every instruction.
    pub states: u64,
    pub reason: HaltReason,
}

pub struct Z80 {
    // Registers
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    // Shadow Registers
    pub a_prime: u8,
    pub f_prime: Flags,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    // Index & Special Registers
    pub ix: u16,
    pub iy: u16,
    pub i: u8,
    pub r: u8,
    pub sp: u16,
    pub pc: u16,

    pub mode: CpuMode,
    pub mem: Memory,

    /// Table the current instruction was decoded through.
    pub iset: InstructionSet,
    /// T-states charged by the last instruction. Zero stops the loop.
    pub states: u32,

    // Internal state
    pub(crate) refresh: u32, // T-states not yet folded into R
    pub(crate) index_mode: IndexMode,
    pub(crate) disp: u16, // Sign-extended DDCB/FDCB displacement
    pub(crate) instr_pc: u16,
    pub(crate) halt_reason: Option<HaltReason>,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    pub fn new() -> Self {
        Self::with_mode(CpuMode::default())
    }

    pub fn with_mode(mode: CpuMode) -> Self {
        Self {
            a: 0,
            f: Flags::default(),
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            a_prime: 0,
            f_prime: Flags::default(),
            b_prime: 0,
            c_prime: 0,
            d_prime: 0,
            e_prime: 0,
            h_prime: 0,
            l_prime: 0,
            ix: 0,
            iy: 0,
            i: 0,
            r: 0,
            sp: 0,
            pc: 0,
            mode,
            mem: Memory::new(),
            iset: InstructionSet::Base,
            states: 0,
            refresh: 0,
            index_mode: IndexMode::HL,
            disp: 0,
            instr_pc: 0,
            halt_reason: None,
        }
    }

    // Helpers for 16-bit register access
    pub fn get_bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn set_bc(&mut self, val: u16) { self.b = (val >> 8) as u8; self.c = val as u8; }

    pub fn get_de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn set_de(&mut self, val: u16) { self.d = (val >> 8) as u8; self.e = val as u8; }

    pub fn get_hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    pub fn set_hl(&mut self, val: u16) { self.h = (val >> 8) as u8; self.l = val as u8; }

    pub fn get_af(&self) -> u16 { ((self.a as u16) << 8) | self.f.bits() as u16 }
    pub fn set_af(&mut self, val: u16) { self.a = (val >> 8) as u8; self.f = Flags::from_bits(val as u8); }

    /// Why the last [`Z80::step`] returned zero, if it did.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halt_reason
    }

    // --- Operand fetch ---

    /// Read the byte at PC and advance PC.
    pub(crate) fn fetch8(&mut self) -> u8 {
        let val = self.mem.get8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    /// Read the little-endian word at PC and advance PC by two.
    pub fn get16_pc_p(&mut self) -> u16 {
        let val = self.mem.get16(self.pc);
        self.pc = self.pc.wrapping_add(2);
        val
    }

    /// Read a signed displacement byte at PC, sign-extended to 16 bits.
    pub(crate) fn fetch_disp(&mut self) -> u16 {
        self.fetch8() as i8 as i16 as u16
    }

    // --- Register decode ---

    /// Get 8-bit register by index (0=B 1=C 2=D 3=E 4=H 5=L 7=A).
    /// Index 6 is NOT handled here; callers must handle (HL)/(IX+d)/(IY+d) separately.
    pub fn get_reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            7 => self.a,
            _ => unreachable!("get_reg8 called with index {}", index),
        }
    }

    pub fn set_reg8(&mut self, index: u8, val: u8) {
        match index {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            7 => self.a = val,
            _ => unreachable!("set_reg8 called with index {}", index),
        }
    }

    /// Get 8-bit register by index, respecting IX/IY prefix for H/L (undocumented IXH/IXL/IYH/IYL).
    pub(crate) fn get_reg8_ix(&self, index: u8) -> u8 {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => (self.ix >> 8) as u8,
            (5, IndexMode::IX) => self.ix as u8,
            (4, IndexMode::IY) => (self.iy >> 8) as u8,
            (5, IndexMode::IY) => self.iy as u8,
            _ => self.get_reg8(index),
        }
    }

    pub(crate) fn set_reg8_ix(&mut self, index: u8, val: u8) {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => self.ix = (self.ix & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IX) => self.ix = (self.ix & 0xFF00) | val as u16,
            (4, IndexMode::IY) => self.iy = (self.iy & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IY) => self.iy = (self.iy & 0xFF00) | val as u16,
            _ => self.set_reg8(index, val),
        }
    }

    /// Effective address of the (HL)/(IX+d)/(IY+d) operand. For IX/IY the
    /// displacement byte is consumed from the instruction stream.
    pub(crate) fn operand_addr(&mut self) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => {
                let d = self.fetch_disp();
                self.ix.wrapping_add(d)
            }
            IndexMode::IY => {
                let d = self.fetch_disp();
                self.iy.wrapping_add(d)
            }
        }
    }

    /// True while executing a DD/FD-prefixed instruction.
    pub(crate) fn indexed(&self) -> bool {
        self.index_mode != IndexMode::HL
    }

    /// Get 16-bit register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    /// Index 2 respects current index_mode for DD/FD prefixed instructions.
    pub(crate) fn get_rp(&self, index: u8) -> u16 {
        match index {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => match self.index_mode {
                IndexMode::HL => self.get_hl(),
                IndexMode::IX => self.ix,
                IndexMode::IY => self.iy,
            },
            3 => self.sp,
            _ => unreachable!("get_rp called with index {}", index),
        }
    }

    /// Set 16-bit register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    pub(crate) fn set_rp(&mut self, index: u8, val: u16) {
        match index {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => match self.index_mode {
                IndexMode::HL => self.set_hl(val),
                IndexMode::IX => self.ix = val,
                IndexMode::IY => self.iy = val,
            },
            3 => self.sp = val,
            _ => unreachable!("set_rp called with index {}", index),
        }
    }

    /// Get 16-bit register pair by index for PUSH/POP (0=BC, 1=DE, 2=HL/IX/IY, 3=AF).
    pub(crate) fn get_rp_af(&self, index: u8) -> u16 {
        match index {
            3 => self.get_af(),
            _ => self.get_rp(index),
        }
    }

    /// Set 16-bit register pair by index for PUSH/POP (0=BC, 1=DE, 2=HL/IX/IY, 3=AF).
    pub(crate) fn set_rp_af(&mut self, index: u8, val: u16) {
        match index {
            3 => self.set_af(val),
            _ => self.set_rp(index, val),
        }
    }

    // --- Fetch-execute loop ---

    /// Reset, then execute until an instruction reports zero T-states.
    pub fn run<H: PortHandler + ?Sized>(&mut self, ports: &mut H) -> RunSummary {
        self.run_with(ports, &mut NoTrace)
    }

    /// [`Z80::run`] with a debug hook called before every instruction.
    pub fn run_with<H, T>(&mut self, ports: &mut H, trace: &mut T) -> RunSummary
    where
        H: PortHandler + ?Sized,
        T: TraceHook + ?Sized,
    {
        self.reset();
        let mut instructions = 0u64;
        let mut states = 0u64;
        loop {
            let cost = self.step_with(ports, trace);
            instructions += 1;
            if cost == 0 {
                let reason = self.halt_reason.unwrap_or(HaltReason::Halt);
                log::debug!(
                    "stopped after {instructions} instructions, {states} T-states: {reason:?}"
                );
                return RunSummary {
                    instructions,
                    states,
                    reason,
                };
            }
            states += cost as u64;
        }
    }

    /// Execute exactly one instruction and return its T-states (zero on
    /// HALT, invalid opcode or a BIOS stop request).
    pub fn step<H: PortHandler + ?Sized>(&mut self, ports: &mut H) -> u32 {
        self.step_with(ports, &mut NoTrace)
    }

    pub fn step_with<H, T>(&mut self, ports: &mut H, trace: &mut T) -> u32
    where
        H: PortHandler + ?Sized,
        T: TraceHook + ?Sized,
    {
        self.instr_pc = self.pc;
        self.iset = InstructionSet::Base;
        self.index_mode = IndexMode::HL;
        self.halt_reason = None;

        let opcode = self.fetch8();
        trace.on_fetch(self.instr_pc, opcode, self);

        self.states = 0;
        self.dispatch(opcode, ports);
        if self.states == 0 && self.halt_reason.is_none() {
            self.halt_reason = Some(HaltReason::Halt);
        }
        self.refresh_r(self.states);
        self.states
    }

    /// Fold elapsed T-states into R: one step per 4 T-states, low 7 bits
    /// only, bit 7 preserved.
    fn refresh_r(&mut self, states: u32) {
        self.refresh += states;
        let steps = self.refresh / 4;
        self.refresh %= 4;
        let low = (self.r as u32 + steps) & 0x7F;
        self.r = (self.r & 0x80) | low as u8;
    }
}

impl Cpu for Z80 {
    fn reset(&mut self) {
        self.a = 0;
        self.f = Flags::default();
        self.set_bc(0);
        self.set_de(0);
        self.set_hl(0);
        self.a_prime = 0;
        self.f_prime = Flags::default();
        self.b_prime = 0;
        self.c_prime = 0;
        self.d_prime = 0;
        self.e_prime = 0;
        self.h_prime = 0;
        self.l_prime = 0;
        self.ix = 0;
        self.iy = 0;
        self.i = 0;
        self.r = 0;
        self.sp = 0;
        self.pc = 0;
        self.iset = InstructionSet::Base;
        self.states = 0;
        self.refresh = 0;
        self.index_mode = IndexMode::HL;
        self.disp = 0;
        self.instr_pc = 0;
        self.halt_reason = None;
    }

    fn is_halted(&self) -> bool {
        self.halt_reason.is_some()
    }
}

impl CpuStateTrait for Z80 {
    type Snapshot = Z80State;

    fn snapshot(&self) -> Z80State {
        Z80State {
            a: self.a,
            f: self.f.bits(),
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            a_prime: self.a_prime,
            f_prime: self.f_prime.bits(),
            b_prime: self.b_prime,
            c_prime: self.c_prime,
            d_prime: self.d_prime,
            e_prime: self.e_prime,
            h_prime: self.h_prime,
            l_prime: self.l_prime,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.r,
        }
    }
}
