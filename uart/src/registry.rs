//! Boot-time bring-up and registration of the enabled units.
//!
//! The sequence is strictly one-directional:
//!
//! ```text
//! Unpowered -> DomainOn -> ClocksOn -> PinsMuxed
//!           -> Unit(i) { Configured -> IsrInstalled -> Registered } for each enabled i
//!           -> Ready
//! ```
//!
//! There is no rollback. A failing step leaves the machine where it was and the failure is
//! reported as a [BootError] naming that stage.

use crate::config::LineConfig;
use crate::device::{DeviceRecord, SerialUnit};
use crate::mmio::{Mmio, Registers};
use crate::ring::RingBuffer;
use crate::soc::{CONTROL_MODULE_BASE, PRCM_BASE, UNIT_COUNT, UNITS, UnitSet};
use crate::{Error, pinmux, prcm};
use bitflags::bitflags;

// ————————————————————————————— Collaborators —————————————————————————————— //

/// Something to run when an interrupt line fires.
pub trait InterruptHandler: Sync {
    fn handle_interrupt(&self);
}

/// Where the interrupt controller delivers a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Irq,
    Fiq,
}

/// The platform's interrupt controller.
pub trait InterruptController<'a>: Sync {
    /// Installs `handler` for line `irq`. `name` is informational.
    fn install(&self, irq: u32, handler: &'a dyn InterruptHandler, name: &'static str);

    /// Sets the priority and delivery route of a line.
    fn set_route(&self, irq: u32, priority: u8, route: Route);

    fn mask(&self, irq: u32);

    fn unmask(&self, irq: u32);
}

/// The serial framework routine that empties a unit into its ring buffer.
///
/// Called from interrupt context with the unit's line masked.
pub trait ReceivePump: Sync {
    fn receive(&self, device: &DeviceRecord<'_>);
}

/// The directory devices are published in.
pub trait DeviceDirectory<'a> {
    fn register(
        &self,
        name: &'static str,
        flags: DeviceFlags,
        device: &'a DeviceRecord<'a>,
    ) -> Result<(), Error>;
}

bitflags! {
    /// Capabilities advertised when publishing a device.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DeviceFlags: u16 {
        const READ = 0x001;
        const WRITE = 0x002;
        const RDWR = Self::READ.bits() | Self::WRITE.bits();
        const STREAM = 0x040;
        const INT_RX = 0x100;
    }
}

/// Capabilities of every UART unit.
pub const UART_FLAGS: DeviceFlags = DeviceFlags::RDWR
    .union(DeviceFlags::INT_RX)
    .union(DeviceFlags::STREAM);

// ————————————————————————————— Configuration —————————————————————————————— //

/// Board-level choices handed to the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    /// Units to bring up. Every other unit is left alone.
    pub enabled: UnitSet,
    /// How many times a hardware status register is polled before giving up.
    pub spin_limit: u32,
}

impl BoardConfig {
    pub const DEFAULT_SPIN_LIMIT: u32 = 1_000_000;

    pub const fn new(enabled: UnitSet) -> Self {
        Self {
            enabled,
            spin_limit: Self::DEFAULT_SPIN_LIMIT,
        }
    }
}

// —————————————————————————————— Boot Stages ——————————————————————————————— //

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitStep {
    Configured,
    IsrInstalled,
    Registered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootStage {
    Unpowered,
    DomainOn,
    ClocksOn,
    PinsMuxed,
    Unit { unit: usize, step: UnitStep },
    Ready,
}

/// Bring-up failed, and stalled after reaching `stage`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("serial bring-up stalled at {stage:?}")]
pub struct BootError {
    pub stage: BootStage,
    #[source]
    pub source: Error,
}

// ———————————————————————————————— Registry ———————————————————————————————— //

/// Device records of the enabled units, indexed by unit number.
pub struct Registry<'a> {
    config: BoardConfig,
    io: &'a dyn Mmio,
    intc: &'a dyn InterruptController<'a>,
    records: [Option<DeviceRecord<'a>>; UNIT_COUNT],
}

impl<'a> Registry<'a> {
    /// Creates a record for every enabled unit. No hardware is touched until [init].
    pub fn new(
        config: BoardConfig,
        io: &'a dyn Mmio,
        intc: &'a dyn InterruptController<'a>,
        pump: &'a dyn ReceivePump,
        rx_buffers: &'a [RingBuffer; UNIT_COUNT],
    ) -> Self {
        let records = core::array::from_fn(|unit| {
            config.enabled.contains(unit).then(|| {
                let uart = Registers::new(io, UNITS[unit].base);
                DeviceRecord::new(unit, uart, &rx_buffers[unit], intc, pump)
            })
        });

        Self {
            config,
            io,
            intc,
            records,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn get(&self, unit: usize) -> Option<&DeviceRecord<'a>> {
        self.records.get(unit)?.as_ref()
    }

    /// Iterates over the records of enabled units.
    pub fn devices(&self) -> impl Iterator<Item = &DeviceRecord<'a>> {
        self.records.iter().flatten()
    }
}

/// Brings every enabled unit up and publishes it in `directory`.
///
/// Receive interrupts are enabled in each unit but left masked at the interrupt controller: the
/// owner unmasks them with [crate::device::Control::UnmaskRx] once it is ready to consume.
pub fn init<'a>(
    registry: &'a Registry<'a>,
    directory: &dyn DeviceDirectory<'a>,
) -> Result<(), BootError> {
    let mut stage = BootStage::Unpowered;

    match bring_up(registry, directory, &mut stage) {
        Ok(()) => {
            log::info!("serial: {} unit(s) ready", registry.config().enabled.len());
            Ok(())
        }
        Err(source) => {
            log::error!("serial: bring-up stalled at {stage:?}: {source}");
            Err(BootError { stage, source })
        }
    }
}

fn bring_up<'a>(
    registry: &'a Registry<'a>,
    directory: &dyn DeviceDirectory<'a>,
    stage: &mut BootStage,
) -> Result<(), Error> {
    let BoardConfig {
        enabled,
        spin_limit,
    } = *registry.config();
    let prcm = Registers::new(registry.io, PRCM_BASE);

    prcm::power_on_peripheral_domain(&prcm, spin_limit)?;
    advance(stage, BootStage::DomainOn);

    prcm::enable_uart_clocks(&prcm, enabled, spin_limit)?;
    advance(stage, BootStage::ClocksOn);

    pinmux::configure(&Registers::new(registry.io, CONTROL_MODULE_BASE), enabled);
    advance(stage, BootStage::PinsMuxed);

    for device in registry.devices() {
        let unit = device.unit();
        let irq = device.controller().irq;

        device.configure(LineConfig::default())?;
        advance(stage, BootStage::Unit { unit, step: UnitStep::Configured });

        device.enable_rx_interrupt();
        registry.intc.install(irq, device, device.name());
        registry.intc.set_route(irq, 0, Route::Irq);
        advance(stage, BootStage::Unit { unit, step: UnitStep::IsrInstalled });

        registry.intc.mask(irq);
        directory.register(device.name(), UART_FLAGS, device)?;
        advance(stage, BootStage::Unit { unit, step: UnitStep::Registered });
    }

    advance(stage, BootStage::Ready);
    Ok(())
}

fn advance(stage: &mut BootStage, next: BootStage) {
    log::debug!("serial: {stage:?} -> {next:?}");
    *stage = next;
}
