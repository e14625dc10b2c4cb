use crate::cpu::z80::Z80;

/// Writing any value here hands control to the BIOS collaborator.
pub const BIOS_TRAP_PORT: u8 = 0xFF;

/// Writing here switches the CPU mode: A=0xFF selects 8080, A=0xFE selects Z80.
pub const MODE_PORT: u8 = 0xFE;

/// What the engine should do after a BIOS trap returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapAction {
    /// Resume at the current PC (the BIOS may have changed it).
    Continue,
    /// Stop the fetch-execute loop.
    Halt,
}

/// I/O port hook consumed by `OUT` instructions.
///
/// Port `0xFE` is decoded by the engine itself. Port `0xFF` calls
/// [`PortHandler::bios_call`] with full access to registers and memory; the
/// BIOS selects its function from the current PC and returns results in
/// registers following the 8080/Z80 calling convention. Every other port is
/// passed to [`PortHandler::port_out`], which defaults to a no-op.
pub trait PortHandler {
    /// Service a write to [`BIOS_TRAP_PORT`].
    fn bios_call(&mut self, cpu: &mut Z80) -> TrapAction;

    /// Write to an unreserved output port.
    fn port_out(&mut self, _port: u8, _value: u8) {}
}

/// Port handler with no BIOS attached: a trap stops the machine.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullPorts;

impl PortHandler for NullPorts {
    fn bios_call(&mut self, cpu: &mut Z80) -> TrapAction {
        log::warn!("BIOS trap at {:04X} with no BIOS attached", cpu.pc);
        TrapAction::Halt
    }
}

impl<T: PortHandler + ?Sized> PortHandler for &mut T {
    fn bios_call(&mut self, cpu: &mut Z80) -> TrapAction {
        (**self).bios_call(cpu)
    }

    fn port_out(&mut self, port: u8, value: u8) {
        (**self).port_out(port, value)
    }
}
