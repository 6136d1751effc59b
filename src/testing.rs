//! Host-side stand-ins for the boot image's hardware.

use am33xx_uart::mmio::Mmio;
use std::collections::HashMap;
use std::sync::Mutex;

/// A flat register map that records every write.
///
/// Registers never written read as zero.
#[derive(Default)]
pub struct FakeMmio {
    regs: Mutex<HashMap<usize, u32>>,
    writes: Mutex<Vec<(usize, u32)>>,
}

impl FakeMmio {
    /// The boot image only holds `'static` handles, so the fake lives for the whole test run.
    pub fn leak() -> &'static Self {
        Box::leak(Box::default())
    }

    /// Sets a register without recording a write.
    pub fn poke(&self, addr: usize, value: u32) {
        self.regs.lock().unwrap().insert(addr, value);
    }

    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.lock().unwrap().clone()
    }
}

impl Mmio for FakeMmio {
    fn read(&self, addr: usize) -> u32 {
        self.regs.lock().unwrap().get(&addr).copied().unwrap_or(0)
    }

    fn write(&self, addr: usize, value: u32) {
        self.writes.lock().unwrap().push((addr, value));
        self.regs.lock().unwrap().insert(addr, value);
    }
}
