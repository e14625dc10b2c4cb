//! Character devices behind the BIOS console functions.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

/// Console seen by CONST/CONIN/CONOUT and the BDOS character calls.
pub trait Console {
    /// True when [`Console::read`] has a character ready.
    fn status(&mut self) -> bool;

    /// Next input character, blocking. `None` means input is exhausted,
    /// which stops the machine.
    fn read(&mut self) -> Option<u8>;

    fn write(&mut self, byte: u8);
}

/// Host terminal on stdin/stdout. Line feeds from the host arrive as
/// carriage returns, the CP/M line terminator.
///
/// Input is pumped by a background thread into a channel so that
/// [`Console::status`] can poll without blocking.
#[derive(Debug)]
pub struct StdioConsole {
    input: Receiver<u8>,
    peeked: Option<u8>,
    eof: bool,
}

impl Default for StdioConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioConsole {
    pub fn new() -> Self {
        Self::from_reader(io::stdin())
    }

    /// Console whose input comes from `reader` instead of stdin.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("console-input".into())
            .spawn(move || pump_input(reader, tx));
        if let Err(e) = spawned {
            log::error!("cannot start console input thread: {e}");
        }
        Self {
            input: rx,
            peeked: None,
            eof: false,
        }
    }
}

/// Forward bytes from `reader` until end of input or a read error, which
/// drops the sender and marks the console exhausted.
fn pump_input<R: Read>(mut reader: R, tx: Sender<u8>) {
    let mut buf = [0u8; 64];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("console read failed: {e}");
                return;
            }
        };
        for &byte in &buf[..n] {
            let byte = if byte == b'\n' { b'\r' } else { byte };
            if tx.send(byte).is_err() {
                return;
            }
        }
    }
}

impl Console for StdioConsole {
    fn status(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }
        if self.eof {
            return false;
        }
        match self.input.try_recv() {
            Ok(byte) => {
                self.peeked = Some(byte);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.eof = true;
                false
            }
        }
    }

    fn read(&mut self) -> Option<u8> {
        if let Some(byte) = self.peeked.take() {
            return Some(byte);
        }
        if self.eof {
            return None;
        }
        let _ = io::stdout().flush();
        match self.input.recv() {
            Ok(byte) => Some(byte),
            Err(_) => {
                self.eof = true;
                None
            }
        }
    }

    fn write(&mut self, byte: u8) {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(&[byte]) {
            log::warn!("console write failed: {e}");
        }
        if byte == b'\n' {
            let _ = out.flush();
        }
    }
}

/// Console fed from a fixed script, collecting everything written.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    input: VecDeque<u8>,
    pub output: Vec<u8>,
}

impl ScriptedConsole {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    /// Output as text, lossy.
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Console for ScriptedConsole {
    fn status(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write(&mut self, byte: u8) {
        self.output.push(byte);
    }
}

impl<T: Console + ?Sized> Console for &mut T {
    fn status(&mut self) -> bool {
        (**self).status()
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn write(&mut self, byte: u8) {
        (**self).write(byte)
    }
}
