//! CP/M 2.2 BIOS and a minimal BDOS, serviced through the engine's trap port.
//!
//! Every BIOS vector at [`BIOS_BASE`] is itself a three-byte stub
//! `OUT (0FFh),A ; RET`, so a program calling `BIOS_BASE + 3 * n` traps with
//! PC at `BIOS_BASE + 3 * n + 2` and function `n` can be recovered from the
//! PC alone. The BDOS entry point at [`BDOS_ENTRY`] uses the same stub.
//!
//! High memory layout (all below 0x10000):
//!
//! ```text
//! FD00  BDOS stub
//! FE00  17 BIOS vectors (stubs)
//! FE40  sector translation table (26 bytes)
//! FE5A  disk parameter block
//! FE69  directory buffer (128 bytes)
//! FEF0  four disk parameter headers (16 bytes each)
//! FF30  allocation and check vectors, per drive
//! ```

use cpm80_core::core::{BIOS_TRAP_PORT, MEMORY_SIZE, Memory, PortHandler, TrapAction};
use cpm80_core::cpu::z80::Z80;

use crate::console::Console;
use crate::disk::{Disk, SECTOR_SIZE};

pub const BDOS_ENTRY: u16 = 0xFD00;
pub const BIOS_BASE: u16 = 0xFE00;
pub const XLT_ADDR: u16 = 0xFE40;
pub const DPB_ADDR: u16 = 0xFE5A;
pub const DIRBUF_ADDR: u16 = 0xFE69;
pub const DPH_BASE: u16 = 0xFEF0;
pub const DPH_SIZE: u16 = 16;
pub const VECTORS_BASE: u16 = 0xFF30;
pub const ALV_SIZE: u16 = 31;
pub const CSV_SIZE: u16 = 16;

/// Drives A to D.
pub const MAX_DRIVES: usize = 4;

pub const DEFAULT_DMA: u16 = 0x0080;
/// Transient program area start, where `.COM` files run.
pub const TPA_BASE: u16 = 0x0100;

/// OUT (0FFh),A ; RET
const TRAP_STUB: [u8; 3] = [0xD3, BIOS_TRAP_PORT, 0xC9];

/// Standard skew-6 translation for 26-sector tracks.
pub const SKEW_TABLE: [u8; 26] = [
    1, 7, 13, 19, 25, 5, 11, 17, 23, 3, 9, 15, 21, 2, 8, 14, 20, 26, 6, 12, 18, 24, 4, 10, 16, 22,
];

/// SPT, BSH, BLM, EXM, DSM, DRM, AL0, AL1, CKS, OFF for 8" SSSD.
const DPB: [u8; 15] = [
    26, 0, // SPT
    3,  // BSH
    7,  // BLM
    0,  // EXM
    242, 0, // DSM
    63, 0, // DRM
    0xC0, 0x00, // AL0, AL1
    16, 0, // CKS
    2, 0, // OFF
];

/// BDOS version reported by function 12: CP/M 2.2.
const BDOS_VERSION: u16 = 0x0022;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiosFunction {
    Boot,
    WBoot,
    Const,
    Conin,
    Conout,
    List,
    Punch,
    Reader,
    Home,
    SelDsk,
    SetTrk,
    SetSec,
    SetDma,
    Read,
    Write,
    ListSt,
    SecTran,
}

impl BiosFunction {
    const ALL: [BiosFunction; 17] = [
        BiosFunction::Boot,
        BiosFunction::WBoot,
        BiosFunction::Const,
        BiosFunction::Conin,
        BiosFunction::Conout,
        BiosFunction::List,
        BiosFunction::Punch,
        BiosFunction::Reader,
        BiosFunction::Home,
        BiosFunction::SelDsk,
        BiosFunction::SetTrk,
        BiosFunction::SetSec,
        BiosFunction::SetDma,
        BiosFunction::Read,
        BiosFunction::Write,
        BiosFunction::ListSt,
        BiosFunction::SecTran,
    ];

    pub fn from_index(index: u16) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Address of this function's vector.
    pub fn vector(self) -> u16 {
        BIOS_BASE + 3 * self as u16
    }

    /// Identify the function from the PC a trap stub leaves behind.
    fn from_trap_pc(pc: u16) -> Option<Self> {
        let offset = pc.wrapping_sub(2).wrapping_sub(BIOS_BASE);
        if offset % 3 != 0 {
            return None;
        }
        Self::from_index(offset / 3)
    }
}

/// Where BOOT finds the program to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootSource {
    /// An image is already in memory at this address.
    Program(u16),
    /// Read track 0 sector 1 of drive A to [`TPA_BASE`] and run it.
    Disk,
}

pub fn dph_addr(drive: usize) -> u16 {
    DPH_BASE + DPH_SIZE * drive as u16
}

fn alv_addr(drive: usize) -> u16 {
    VECTORS_BASE + (ALV_SIZE + CSV_SIZE) * drive as u16
}

fn csv_addr(drive: usize) -> u16 {
    alv_addr(drive) + ALV_SIZE
}

fn jp(mem: &mut Memory, at: u16, target: u16) {
    mem.put8(at, 0xC3);
    mem.put16(at.wrapping_add(1), target);
}

/// Write the BDOS stub, the BIOS vectors, the disk tables and the cold
/// start jump at 0000h into `mem`.
pub fn install(mem: &mut Memory) {
    jp(mem, 0x0000, BiosFunction::Boot.vector());
    mem.load(BDOS_ENTRY, &TRAP_STUB);
    for function in BiosFunction::ALL {
        mem.load(function.vector(), &TRAP_STUB);
    }
    mem.load(XLT_ADDR, &SKEW_TABLE);
    mem.load(DPB_ADDR, &DPB);
    for drive in 0..MAX_DRIVES {
        let dph = dph_addr(drive);
        let fields = [XLT_ADDR, 0, 0, 0, DIRBUF_ADDR, DPB_ADDR, csv_addr(drive), alv_addr(drive)];
        for (i, field) in fields.into_iter().enumerate() {
            mem.put16(dph + 2 * i as u16, field);
        }
    }
}

/// BIOS state plus the devices it drives. Implements [`PortHandler`] so it
/// can be handed straight to the engine.
pub struct CpmBios<C: Console> {
    pub console: C,
    pub disks: [Option<Disk>; MAX_DRIVES],
    pub boot: BootSource,
    drive: usize,
    track: u16,
    sector: u16,
    dma: u16,
}

impl<C: Console> CpmBios<C> {
    pub fn new(console: C) -> Self {
        Self {
            console,
            disks: Default::default(),
            boot: BootSource::Disk,
            drive: 0,
            track: 0,
            sector: 1,
            dma: DEFAULT_DMA,
        }
    }

    pub fn dma(&self) -> u16 {
        self.dma
    }

    /// Return a 16-bit result the way both BIOS and BDOS do: in HL, with A=L
    /// and B=H.
    fn ret_hl(cpu: &mut Z80, value: u16) {
        cpu.set_hl(value);
        cpu.a = value as u8;
        cpu.b = (value >> 8) as u8;
    }

    fn bios(&mut self, function: BiosFunction, cpu: &mut Z80) -> TrapAction {
        log::debug!("BIOS {function:?} BC={:04X} DE={:04X}", cpu.get_bc(), cpu.get_de());
        match function {
            BiosFunction::Boot => return self.cold_boot(cpu),
            BiosFunction::WBoot => {
                log::info!("warm boot requested, stopping");
                return TrapAction::Halt;
            }
            BiosFunction::Const => cpu.a = if self.console.status() { 0xFF } else { 0x00 },
            BiosFunction::Conin => match self.console.read() {
                Some(ch) => cpu.a = ch,
                None => return TrapAction::Halt,
            },
            BiosFunction::Conout => self.console.write(cpu.c),
            BiosFunction::List | BiosFunction::Punch => {
                log::trace!("{function:?} discarded {:02X}", cpu.c);
            }
            // No reader attached: end of file
            BiosFunction::Reader => cpu.a = 0x1A,
            BiosFunction::ListSt => cpu.a = 0xFF,
            BiosFunction::Home => self.track = 0,
            BiosFunction::SelDsk => {
                let drive = cpu.c as usize;
                if drive < MAX_DRIVES && self.disks[drive].is_some() {
                    self.drive = drive;
                    cpu.set_hl(dph_addr(drive));
                } else {
                    log::debug!("select of missing drive {drive}");
                    cpu.set_hl(0);
                }
            }
            BiosFunction::SetTrk => self.track = cpu.get_bc(),
            BiosFunction::SetSec => self.sector = cpu.get_bc(),
            BiosFunction::SetDma => self.dma = cpu.get_bc(),
            BiosFunction::Read => cpu.a = self.read_sector(&mut cpu.mem) as u8,
            BiosFunction::Write => cpu.a = self.write_sector(&cpu.mem) as u8,
            BiosFunction::SecTran => {
                let logical = cpu.get_bc();
                let table = cpu.get_de();
                let physical = if table == 0 {
                    logical
                } else {
                    cpu.mem.get8(table.wrapping_add(logical)) as u16
                };
                cpu.set_hl(physical);
            }
        }
        TrapAction::Continue
    }

    /// READ: copy the selected sector to the DMA buffer. Returns the CP/M
    /// status, 0 on success and 1 on error.
    fn read_sector(&mut self, mem: &mut Memory) -> bool {
        let Some(disk) = self.disks[self.drive].as_ref() else {
            return true;
        };
        match disk.read_sector(self.track, self.sector) {
            Some(data) => {
                mem.load(self.dma, data);
                false
            }
            None => {
                log::warn!("read outside geometry: track {} sector {}", self.track, self.sector);
                true
            }
        }
    }

    fn write_sector(&mut self, mem: &Memory) -> bool {
        let Some(disk) = self.disks[self.drive].as_mut() else {
            return true;
        };
        let mut data = [0u8; SECTOR_SIZE];
        mem.read(self.dma, &mut data);
        if disk.write_sector(self.track, self.sector, &data) {
            false
        } else {
            log::warn!("write outside geometry: track {} sector {}", self.track, self.sector);
            true
        }
    }

    /// BOOT: set up page zero and a stack whose return address warm-boots,
    /// then start the program.
    fn cold_boot(&mut self, cpu: &mut Z80) -> TrapAction {
        jp(&mut cpu.mem, 0x0000, BiosFunction::WBoot.vector());
        cpu.mem.put8(0x0003, 0x00); // IOBYTE
        cpu.mem.put8(0x0004, 0x00); // current drive A
        jp(&mut cpu.mem, 0x0005, BDOS_ENTRY);
        self.drive = 0;
        self.track = 0;
        self.sector = 1;
        self.dma = DEFAULT_DMA;

        let start = match self.boot {
            BootSource::Program(addr) => addr,
            BootSource::Disk => {
                self.dma = TPA_BASE;
                if self.disks[0].is_none() || self.read_sector(&mut cpu.mem) {
                    log::error!("no bootable disk in drive A");
                    return TrapAction::Halt;
                }
                self.dma = DEFAULT_DMA;
                TPA_BASE
            }
        };

        cpu.sp = BDOS_ENTRY - 2;
        cpu.mem.put16(cpu.sp, 0x0000);
        cpu.pc = start;
        log::info!("boot: starting at {start:04X}");
        TrapAction::Continue
    }

    fn bdos(&mut self, cpu: &mut Z80) -> TrapAction {
        let function = cpu.c;
        log::trace!("BDOS {function} DE={:04X}", cpu.get_de());
        let result: u16 = match function {
            0 => {
                log::info!("program terminated through BDOS 0");
                return TrapAction::Halt;
            }
            1 => match self.console.read() {
                Some(ch) => {
                    self.console.write(ch);
                    ch as u16
                }
                None => return TrapAction::Halt,
            },
            2 => {
                self.console.write(cpu.e);
                0
            }
            6 => match cpu.e {
                0xFF => {
                    if self.console.status() {
                        self.console.read().unwrap_or(0) as u16
                    } else {
                        0
                    }
                }
                0xFE => self.console_status(),
                ch => {
                    self.console.write(ch);
                    0
                }
            },
            9 => {
                let start = cpu.get_de();
                let mut addr = start;
                let mut terminated = false;
                for _ in 0..MEMORY_SIZE {
                    let ch = cpu.mem.get8(addr);
                    if ch == b'$' {
                        terminated = true;
                        break;
                    }
                    self.console.write(ch);
                    addr = addr.wrapping_add(1);
                }
                if !terminated {
                    log::warn!("BDOS 9: no '$' terminator in memory from {start:04X}");
                }
                0
            }
            10 => {
                if !self.read_line(cpu) {
                    return TrapAction::Halt;
                }
                0
            }
            11 => self.console_status(),
            12 => BDOS_VERSION,
            _ => {
                log::warn!("unsupported BDOS function {function}");
                0x00FF
            }
        };
        Self::ret_hl(cpu, result);
        TrapAction::Continue
    }

    fn console_status(&mut self) -> u16 {
        if self.console.status() { 0xFF } else { 0x00 }
    }

    /// BDOS 10: buffered line input. DE points at the maximum length; the
    /// count goes to DE+1 and the characters from DE+2. Returns false when
    /// input ended before anything was typed.
    fn read_line(&mut self, cpu: &mut Z80) -> bool {
        let buf = cpu.get_de();
        let max = cpu.mem.get8(buf) as usize;
        let mut line: Vec<u8> = Vec::with_capacity(max);
        loop {
            let Some(ch) = self.console.read() else {
                if line.is_empty() {
                    return false;
                }
                break;
            };
            match ch {
                b'\r' | b'\n' => break,
                0x08 | 0x7F => {
                    if line.pop().is_some() {
                        for b in [0x08, b' ', 0x08] {
                            self.console.write(b);
                        }
                    }
                }
                _ if line.len() < max => {
                    self.console.write(ch);
                    line.push(ch);
                }
                _ => {}
            }
        }
        self.console.write(b'\r');
        cpu.mem.put8(buf.wrapping_add(1), line.len() as u8);
        cpu.mem.load(buf.wrapping_add(2), &line);
        true
    }
}

impl<C: Console> PortHandler for CpmBios<C> {
    fn bios_call(&mut self, cpu: &mut Z80) -> TrapAction {
        if cpu.pc == BDOS_ENTRY + 2 {
            return self.bdos(cpu);
        }
        match BiosFunction::from_trap_pc(cpu.pc) {
            Some(function) => self.bios(function, cpu),
            None => {
                log::warn!("trap from {:04X} outside the BIOS vectors", cpu.pc.wrapping_sub(2));
                TrapAction::Halt
            }
        }
    }

    fn port_out(&mut self, port: u8, value: u8) {
        log::trace!("OUT {port:02X} <- {value:02X}");
    }
}
