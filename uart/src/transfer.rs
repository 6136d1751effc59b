//! Byte transfer primitives.

use crate::mmio::Registers;
use crate::soc::uart::{LSR, LSR_RX_DATA_READY, LSR_TX_HOLDING_EMPTY, RHR, THR};
use core::fmt;

/// Writes a single byte, spinning until the transmit holding register is empty.
///
/// Always transfers exactly one byte. There is no timeout: only use it for short writes such as
/// console output.
pub fn put_byte(uart: &Registers, byte: u8) -> usize {
    while uart.read(LSR) & LSR_TX_HOLDING_EMPTY == 0 {
        core::hint::spin_loop();
    }
    uart.write(THR, byte as u32);
    1
}

/// Returns the next received byte, if any. Never blocks.
pub fn get_byte(uart: &Registers) -> Option<u8> {
    if uart.read(LSR) & LSR_RX_DATA_READY != 0 {
        Some((uart.read(RHR) & 0xFF) as u8)
    } else {
        None
    }
}

/// Polled output on a fixed unit, usable before (and independently of) the serial framework.
pub struct EarlyConsole<'a> {
    uart: Registers<'a>,
}

impl<'a> EarlyConsole<'a> {
    pub const fn new(uart: Registers<'a>) -> Self {
        Self { uart }
    }
}

impl fmt::Write for EarlyConsole<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.bytes() {
            put_byte(&self.uart, c);
        }
        Ok(())
    }
}
