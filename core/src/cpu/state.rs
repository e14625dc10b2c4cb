//! Register snapshots.

use std::fmt;

/// Read-only copy of a CPU's registers, for tracing and assertions.
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// Register file of the 8080/Z80 engine at one instant. `f` and `f_prime`
/// hold the raw flag bytes; the `_prime` fields are the alternate set
/// swapped in by `EXX` and `EX AF,AF'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Z80State {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub a_prime: u8,
    pub f_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    /// Refresh counter; only the low seven bits count.
    pub r: u8,
}

impl fmt::Display for Z80State {
    /// One-line register dump used by the instruction tracer.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |bit: u8, c: char| if self.f & bit != 0 { c } else { '-' };
        write!(
            f,
            "AF={:02X}{:02X} BC={:02X}{:02X} DE={:02X}{:02X} HL={:02X}{:02X} \
             IX={:04X} IY={:04X} SP={:04X} [{}{}{}{}{}{}]",
            self.a,
            self.f,
            self.b,
            self.c,
            self.d,
            self.e,
            self.h,
            self.l,
            self.ix,
            self.iy,
            self.sp,
            flag(0x80, 'S'),
            flag(0x40, 'Z'),
            flag(0x10, 'H'),
            flag(0x04, 'P'),
            flag(0x02, 'N'),
            flag(0x01, 'C'),
        )
    }
}
