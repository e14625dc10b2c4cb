//! Flag register value type.

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flag {
    C = 0x01,  // Carry
    N = 0x02,  // Add/Subtract
    PV = 0x04, // Parity/Overflow
    H = 0x10,  // Half Carry
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

/// The F register. Backed by a single byte so it can be pushed, popped and
/// exchanged verbatim; bits 3 and 5 are carried but never computed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn get(self, flag: Flag) -> bool {
        self.0 & flag as u8 != 0
    }

    pub fn set(&mut self, flag: Flag, on: bool) {
        if on {
            self.0 |= flag as u8;
        } else {
            self.0 &= !(flag as u8);
        }
    }

    /// Builder form of [`Flags::set`].
    #[must_use]
    pub fn with(mut self, flag: Flag, on: bool) -> Self {
        self.set(flag, on);
        self
    }

    /// Keep only the listed flags, clearing everything else.
    #[must_use]
    pub fn keep(self, flags: &[Flag]) -> Self {
        let mask = flags.iter().fold(0u8, |m, &f| m | f as u8);
        Self(self.0 & mask)
    }

    /// S and Z derived from `value`, all other bits clear.
    pub const fn sz(value: u8) -> Self {
        let mut bits = value & Flag::S as u8;
        if value == 0 {
            bits |= Flag::Z as u8;
        }
        Self(bits)
    }

    /// S, Z and even parity derived from `value`.
    pub const fn szp(value: u8) -> Self {
        let mut flags = Self::sz(value);
        if parity(value) {
            flags.0 |= Flag::PV as u8;
        }
        flags
    }

    pub const fn carry(self) -> bool {
        self.get(Flag::C)
    }

    pub const fn zero(self) -> bool {
        self.get(Flag::Z)
    }

    pub const fn sign(self) -> bool {
        self.get(Flag::S)
    }

    pub const fn parity_overflow(self) -> bool {
        self.get(Flag::PV)
    }

    pub const fn half_carry(self) -> bool {
        self.get(Flag::H)
    }

    pub const fn subtract(self) -> bool {
        self.get(Flag::N)
    }
}

/// True when `value` has an even number of set bits.
pub const fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_individual_flags() {
        let mut f = Flags::default();
        f.set(Flag::C, true);
        f.set(Flag::Z, true);
        assert_eq!(f.bits(), 0x41);
        assert!(f.carry());
        assert!(f.zero());
        f.set(Flag::C, false);
        assert_eq!(f.bits(), 0x40);
    }

    #[test]
    fn raw_bits_survive_round_trip() {
        // POP AF must restore undocumented bits too.
        let f = Flags::from_bits(0xFF);
        assert_eq!(f.bits(), 0xFF);
    }

    #[test]
    fn keep_masks_other_flags() {
        let f = Flags::from_bits(0xFF).keep(&[Flag::S, Flag::Z, Flag::PV]);
        assert_eq!(f.bits(), 0xC4);
    }

    #[test]
    fn szp_from_value() {
        assert_eq!(Flags::szp(0x00).bits(), 0x44);
        assert_eq!(Flags::szp(0x80).bits(), 0x80); // one bit: odd parity
        assert_eq!(Flags::szp(0x81).bits(), 0x84);
    }
}
