//! Pad multiplexing for the UART signals.

use crate::mmio::Registers;
use crate::soc::{UNIT_COUNT, UnitSet};

/// Input buffer enabled.
const RXACTIVE: u32 = 1 << 5;

/// Pad configuration registers of each unit, as (control module offset, value) pairs.
///
/// The low three bits select the mux mode carrying the UART signal on that pad.
const PADS: [&[(usize, u32)]; UNIT_COUNT] = [
    // uart0_rxd, uart0_txd
    &[(0x970, RXACTIVE), (0x974, 0)],
    // uart1_rxd, uart1_txd
    &[(0x980, RXACTIVE), (0x984, 0)],
    // spi0_sclk, spi0_d0
    &[(0x950, RXACTIVE), (0x954, 0)],
    // ecap0_in_pwm0_out (TX only)
    &[(0x964, 1)],
    // gpmc_wait0, gpmc_wpn
    &[(0x870, RXACTIVE | 6), (0x874, 6)],
    // lcd_data9, lcd_data8
    &[(0x8C4, RXACTIVE | 4), (0x8C0, 4)],
];

/// Returns the pad settings routing `unit`'s signals.
pub fn pads(unit: usize) -> &'static [(usize, u32)] {
    PADS[unit]
}

/// Routes the UART signals of every unit in `units` to their pads.
pub fn configure(control: &Registers, units: UnitSet) {
    for unit in units.iter() {
        for &(offset, value) in pads(unit) {
            control.write(offset, value);
        }
    }
}
