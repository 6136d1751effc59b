//! Platform-specific constants and configuration.
//!
//! All board-level choices (console, interrupt controller, which UART units are wired up) are
//! defined in this module to make porting to another AM335x board straightforward.

use am33xx_uart::registry::BoardConfig;
use am33xx_uart::soc::UnitSet;

/// Base address of the interrupt controller (INTC).
pub const INTC_BASE: usize = 0x4820_0000;

/// Base address of the console UART (UART0, routed to the debug header).
pub const CONSOLE_BASE: usize = 0x44E0_9000;

/// Directory name of the console unit, the one the boot image echoes on.
pub const CONSOLE_NAME: &str = "uart0";

/// Units brought up at boot, selected with the `uartN` cargo features.
pub const ENABLED_UNITS: UnitSet = {
    let mut units = UnitSet::EMPTY;
    if cfg!(feature = "uart0") {
        units = units.with(0);
    }
    if cfg!(feature = "uart1") {
        units = units.with(1);
    }
    if cfg!(feature = "uart2") {
        units = units.with(2);
    }
    if cfg!(feature = "uart3") {
        units = units.with(3);
    }
    if cfg!(feature = "uart4") {
        units = units.with(4);
    }
    if cfg!(feature = "uart5") {
        units = units.with(5);
    }
    units
};

pub const BOARD: BoardConfig = BoardConfig::new(ENABLED_UNITS);
