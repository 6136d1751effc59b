//! Serial framework glue: owns the receive buffers and the device directory, and brings the
//! UART units up at boot.

use crate::intc::Intc;
use crate::platform::{BOARD, INTC_BASE};
use am33xx_uart::Error;
use am33xx_uart::device::DeviceRecord;
use am33xx_uart::mmio::Volatile;
use am33xx_uart::registry::{self, DeviceDirectory, DeviceFlags, Registry};
use am33xx_uart::ring::{DrainPump, RingBuffer};
use am33xx_uart::soc::UNIT_COUNT;
use spin::{Mutex, Once};

// SAFETY: the image runs with the MMU off, only physical register addresses go through MMIO.
pub static MMIO: Volatile = unsafe { Volatile::new() };
pub static INTC: Intc = Intc::new(&MMIO, INTC_BASE);
pub static DIRECTORY: Directory = Directory::new();

static PUMP: DrainPump = DrainPump;
static RX_BUFFERS: [RingBuffer; UNIT_COUNT] = [const { RingBuffer::new() }; UNIT_COUNT];
static REGISTRY: Once<Registry<'static>> = Once::new();

/// A published device.
#[derive(Clone, Copy)]
pub struct Entry {
    pub name: &'static str,
    pub flags: DeviceFlags,
    pub device: &'static DeviceRecord<'static>,
}

/// Fixed-capacity device directory.
pub struct Directory {
    entries: Mutex<[Option<Entry>; UNIT_COUNT]>,
}

impl Directory {
    const fn new() -> Self {
        Self {
            entries: Mutex::new([None; UNIT_COUNT]),
        }
    }

    pub fn find(&self, name: &str) -> Option<Entry> {
        self.entries
            .lock()
            .iter()
            .flatten()
            .find(|entry| entry.name == name)
            .copied()
    }

    /// Snapshot of the published devices.
    pub fn entries(&self) -> impl Iterator<Item = Entry> {
        let entries = *self.entries.lock();
        entries.into_iter().flatten()
    }
}

impl DeviceDirectory<'static> for Directory {
    fn register(
        &self,
        name: &'static str,
        flags: DeviceFlags,
        device: &'static DeviceRecord<'static>,
    ) -> Result<(), Error> {
        let mut entries = self.entries.lock();
        let slot = entries
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(Error::RegistrationRejected { name })?;
        *slot = Some(Entry {
            name,
            flags,
            device,
        });
        log::debug!("registered {name}");
        Ok(())
    }
}

/// Brings the serial units up.
///
/// Returns 0 on success and -1 if the bring-up stalled.
pub fn serial_init() -> i32 {
    let registry = REGISTRY.call_once(|| Registry::new(BOARD, &MMIO, &INTC, &PUMP, &RX_BUFFERS));
    start(registry, &DIRECTORY)
}

fn start(registry: &'static Registry<'static>, directory: &Directory) -> i32 {
    match registry::init(registry, directory) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("serial: {err}");
            -1
        }
    }
}
