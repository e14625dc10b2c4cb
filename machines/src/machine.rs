use std::fs;
use std::path::Path;

use cpm80_core::core::{NoTrace, TraceHook};
use cpm80_core::cpu::z80::{CpuMode, RunSummary, Z80};

use crate::bios::{self, BDOS_ENTRY, BootSource, CpmBios, MAX_DRIVES, TPA_BASE};
use crate::console::Console;
use crate::disk::Disk;
use crate::error::{MachineError, Result};

/// A CP/M 2.2 computer: the engine, 64KB of memory and a BIOS wired to a
/// console and up to four disk drives.
///
/// Execution starts at 0000h, which jumps to the BIOS cold boot. BOOT
/// prepares page zero and jumps to the loaded program, or reads the boot
/// sector from drive A when nothing was loaded.
pub struct CpmMachine<C: Console> {
    pub cpu: Z80,
    pub bios: CpmBios<C>,
}

impl<C: Console> CpmMachine<C> {
    pub fn new(console: C, mode: CpuMode) -> Self {
        Self {
            cpu: Z80::with_mode(mode),
            bios: CpmBios::new(console),
        }
    }

    /// Place a program image at `addr` and boot into it.
    pub fn load_program(&mut self, addr: u16, image: &[u8]) -> Result<()> {
        if addr as usize + image.len() > BDOS_ENTRY as usize {
            return Err(MachineError::ImageTooLarge {
                addr,
                len: image.len(),
                limit: BDOS_ENTRY,
            });
        }
        self.cpu.mem.load(addr, image);
        self.bios.boot = BootSource::Program(addr);
        log::info!("loaded {} bytes at {addr:04X}", image.len());
        Ok(())
    }

    /// Load a `.COM`-style image from a file.
    pub fn load_program_file(&mut self, addr: u16, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = fs::read(path).map_err(|e| MachineError::io(path, e))?;
        self.load_program(addr, &image)
    }

    /// Load a program at the start of the transient program area.
    pub fn load_com(&mut self, image: &[u8]) -> Result<()> {
        self.load_program(TPA_BASE, image)
    }

    /// Insert a disk into drive `drive` (0 = A).
    pub fn mount(&mut self, drive: usize, disk: Disk) -> Result<()> {
        if drive >= MAX_DRIVES {
            return Err(MachineError::NoSuchDrive(drive));
        }
        if let Some(path) = disk.path() {
            log::info!("drive {}: {}", drive_letter(drive), path.display());
        }
        self.bios.disks[drive] = Some(disk);
        Ok(())
    }

    pub fn disk(&self, drive: usize) -> Option<&Disk> {
        self.bios.disks.get(drive)?.as_ref()
    }

    pub fn console(&self) -> &C {
        &self.bios.console
    }

    /// Run from 0000h until the machine stops.
    pub fn run(&mut self) -> RunSummary {
        self.run_traced(&mut NoTrace)
    }

    pub fn run_traced<T: TraceHook + ?Sized>(&mut self, trace: &mut T) -> RunSummary {
        bios::install(&mut self.cpu.mem);
        let summary = self.cpu.run_with(&mut self.bios, trace);
        log::info!(
            "halted: {:?} after {} instructions, {} T-states",
            summary.reason,
            summary.instructions,
            summary.states
        );
        summary
    }

    /// Write modified file-backed disks back to their images.
    pub fn shutdown(&mut self) -> Result<()> {
        for disk in self.bios.disks.iter_mut().flatten() {
            disk.flush()?;
        }
        Ok(())
    }
}

pub fn drive_letter(drive: usize) -> char {
    (b'A' + drive as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;

    #[test]
    fn test_mount_rejects_missing_drive() {
        let mut machine = CpmMachine::new(ScriptedConsole::default(), CpuMode::Z80);
        assert!(machine.mount(3, Disk::blank()).is_ok());
        assert!(matches!(
            machine.mount(4, Disk::blank()),
            Err(MachineError::NoSuchDrive(4))
        ));
        assert!(machine.disk(3).is_some());
        assert!(machine.disk(0).is_none());
    }

    #[test]
    fn test_load_limit() {
        let mut machine = CpmMachine::new(ScriptedConsole::default(), CpuMode::Z80);
        let fits = vec![0u8; (BDOS_ENTRY - TPA_BASE) as usize];
        assert!(machine.load_com(&fits).is_ok());
        let too_big = vec![0u8; fits.len() + 1];
        assert!(matches!(
            machine.load_com(&too_big),
            Err(MachineError::ImageTooLarge { addr: 0x0100, .. })
        ));
    }

    #[test]
    fn test_drive_letter() {
        assert_eq!(drive_letter(0), 'A');
        assert_eq!(drive_letter(3), 'D');
    }
}
