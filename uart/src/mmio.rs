//! Memory-mapped register access.

use crate::Error;
use core::ptr;

/// 32-bit accesses to device registers, by physical address.
pub trait Mmio: Sync {
    fn read(&self, addr: usize) -> u32;
    fn write(&self, addr: usize, value: u32);
}

/// Volatile accesses straight to the hardware.
pub struct Volatile {
    _private: (),
}

impl Volatile {
    /// Creates a new accessor.
    ///
    /// # Safety
    ///
    /// Every address later read or written through this accessor must be a mapped, 4-byte aligned
    /// device register.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Mmio for Volatile {
    fn read(&self, addr: usize) -> u32 {
        // SAFETY: the creator of this accessor vouched that `addr` is a device register.
        unsafe { ptr::read_volatile(addr as *const u32) }
    }

    fn write(&self, addr: usize, value: u32) {
        // SAFETY: see `read`.
        unsafe { ptr::write_volatile(addr as *mut u32, value) }
    }
}

/// A register block: a base address and the accessor used to reach it.
#[derive(Clone, Copy)]
pub struct Registers<'a> {
    io: &'a dyn Mmio,
    base: usize,
}

impl<'a> Registers<'a> {
    pub const fn new(io: &'a dyn Mmio, base: usize) -> Self {
        Self { io, base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    pub fn read(&self, offset: usize) -> u32 {
        self.io.read(self.base + offset)
    }

    pub fn write(&self, offset: usize, value: u32) {
        self.io.write(self.base + offset, value)
    }

    /// Replaces the bits selected by `mask` with the corresponding bits of `value`.
    pub fn modify(&self, offset: usize, mask: u32, value: u32) {
        let current = self.read(offset);
        self.write(offset, (current & !mask) | (value & mask));
    }

    pub fn set_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, bits, bits);
    }

    pub fn clear_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, bits, 0);
    }

    /// Polls a register until `done` accepts its value, returning that value.
    ///
    /// Gives up with [Error::HardwareTimeout] after `limit` reads.
    pub fn wait(
        &self,
        offset: usize,
        limit: u32,
        what: &'static str,
        done: impl Fn(u32) -> bool,
    ) -> Result<u32, Error> {
        for _ in 0..limit {
            let value = self.read(offset);
            if done(value) {
                return Ok(value);
            }
            core::hint::spin_loop();
        }

        log::warn!(
            "no {what} after {limit} polls of {:#010x}",
            self.base + offset
        );
        Err(Error::HardwareTimeout { what })
    }
}
