//! Flat 64KB memory store owned by the execution engine.

/// Size of the addressable space. Every `u16` address is in range.
pub const MEMORY_SIZE: usize = 0x10000;

/// Byte-addressable memory with little-endian 16-bit accessors.
///
/// Addresses are `u16`, so no access can fall outside the store. Multi-byte
/// accesses that straddle `0xFFFF` wrap around to `0x0000`.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8; MEMORY_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory").field("size", &MEMORY_SIZE).finish()
    }
}

impl Memory {
    /// Zero-filled store.
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; MEMORY_SIZE]),
        }
    }

    pub fn get8(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    pub fn put8(&mut self, addr: u16, val: u8) {
        self.bytes[addr as usize] = val;
    }

    /// Little-endian word: low byte at `addr`, high byte at `addr + 1`.
    pub fn get16(&self, addr: u16) -> u16 {
        let lo = self.get8(addr) as u16;
        let hi = self.get8(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub fn put16(&mut self, addr: u16, val: u16) {
        self.put8(addr, val as u8);
        self.put8(addr.wrapping_add(1), (val >> 8) as u8);
    }

    /// Copy `data` into the store starting at `addr`, wrapping past `0xFFFF`.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        if start + data.len() <= MEMORY_SIZE {
            self.bytes[start..start + data.len()].copy_from_slice(data);
        } else {
            for (i, &byte) in data.iter().enumerate() {
                self.put8(addr.wrapping_add(i as u16), byte);
            }
        }
    }

    /// Copy `dest.len()` bytes out of the store starting at `addr`.
    pub fn read(&self, addr: u16, dest: &mut [u8]) {
        let start = addr as usize;
        if start + dest.len() <= MEMORY_SIZE {
            dest.copy_from_slice(&self.bytes[start..start + dest.len()]);
        } else {
            for (i, byte) in dest.iter_mut().enumerate() {
                *byte = self.get8(addr.wrapping_add(i as u16));
            }
        }
    }
}
