//! AM335x memory map and per-unit wiring.
//!
//! All the chip-specific values (base addresses, interrupt lines, register layout) live here so
//! the rest of the driver only speaks in terms of units and fields.

/// Base address of the power, reset and clock management module.
pub const PRCM_BASE: usize = 0x44E0_0000;

/// Base address of the control module, which holds the pad configuration registers.
pub const CONTROL_MODULE_BASE: usize = 0x44E1_0000;

/// Functional clock of every UART unit.
pub const UART_CLOCK_HZ: u32 = 48_000_000;

/// Number of physical UART units on the chip.
pub const UNIT_COUNT: usize = 6;

/// A physical UART unit: where its registers live and which interrupt line it raises.
#[derive(Debug, PartialEq, Eq)]
pub struct UnitController {
    pub base: usize,
    pub irq: u32,
}

pub static UNITS: [UnitController; UNIT_COUNT] = [
    UnitController { base: 0x44E0_9000, irq: 72 },
    UnitController { base: 0x4802_2000, irq: 73 },
    UnitController { base: 0x4802_4000, irq: 74 },
    UnitController { base: 0x481A_6000, irq: 44 },
    UnitController { base: 0x481A_8000, irq: 45 },
    UnitController { base: 0x481A_A000, irq: 46 },
];

/// Names under which units are published.
pub const UNIT_NAMES: [&str; UNIT_COUNT] = ["uart0", "uart1", "uart2", "uart3", "uart4", "uart5"];

// ——————————————————————————————— Unit Sets ———————————————————————————————— //

/// The set of units a board actually uses.
///
/// Units outside of the set are skipped by every bring-up phase and never touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitSet(u8);

impl UnitSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self((1 << UNIT_COUNT) - 1);

    /// Returns a copy of the set with `unit` added.
    ///
    /// Panics if `unit` does not exist on this chip.
    pub const fn with(self, unit: usize) -> Self {
        assert!(unit < UNIT_COUNT, "no such UART unit");
        Self(self.0 | 1 << unit)
    }

    pub const fn contains(self, unit: usize) -> bool {
        unit < UNIT_COUNT && self.0 & (1 << unit) != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the enabled unit indices, in increasing order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..UNIT_COUNT).filter(move |&unit| self.contains(unit))
    }
}

// ——————————————————————————— UART Register Map ———————————————————————————— //

/// Register offsets and fields shared by every UART unit.
pub(crate) mod uart {
    pub const RHR: usize = 0x00;
    pub const THR: usize = 0x00;
    /// Divisor latch low, aliases RHR/THR while `LCR_DIV_EN` is raised.
    pub const DLL: usize = 0x00;
    pub const IER: usize = 0x04;
    /// Divisor latch high, aliases IER while `LCR_DIV_EN` is raised.
    pub const DLH: usize = 0x04;
    pub const IIR: usize = 0x08;
    pub const LCR: usize = 0x0C;
    pub const LSR: usize = 0x14;
    pub const MDR1: usize = 0x20;
    pub const MDR2: usize = 0x24;

    pub const IER_RHR: u32 = 1 << 0;

    pub const LSR_RX_DATA_READY: u32 = 1 << 0;
    pub const LSR_TX_HOLDING_EMPTY: u32 = 1 << 5;

    pub const LCR_CHAR_LENGTH: u32 = 0x3;
    pub const LCR_CHAR_LENGTH_8: u32 = 0x3;
    pub const LCR_NB_STOP: u32 = 1 << 2;
    pub const LCR_PARITY_EN: u32 = 1 << 3;
    pub const LCR_DIV_EN: u32 = 1 << 7;

    pub const DLH_MASK: u32 = 0x3F;

    /// UART 16x mode, no IrDA/CIR.
    pub const MDR1_UART_16X: u32 = 0;

    // Interrupt type patterns reported in IIR bits 5:1.
    pub const IIR_RX_DATA: u32 = 0x02 << 1;
    pub const IIR_RX_TIMEOUT: u32 = 0x06 << 1;
}
