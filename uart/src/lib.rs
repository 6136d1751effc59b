//! Driver for the UART blocks of the TI AM335x.
//!
//! Bring-up goes power domain, then functional clocks, then pad multiplexing, then per-unit
//! programming and interrupt wiring. After that every enabled unit is published to the owning
//! serial framework through the [registry::DeviceDirectory] seam.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod device;
pub mod mmio;
pub mod pinmux;
pub mod prcm;
pub mod registry;
pub mod ring;
pub mod soc;
pub mod transfer;

#[cfg(test)]
mod testing;

use config::{BaudRate, BitOrder, DataBits, Invert};
use thiserror::Error;

// ————————————————————————————————— Errors ————————————————————————————————— //

/// A line configuration the hardware can not run.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported baud rate {0:?}")]
    BaudRate(BaudRate),
    #[error("unsupported word length {0:?}")]
    DataBits(DataBits),
    #[error("unsupported bit order {0:?}")]
    BitOrder(BitOrder),
    #[error("unsupported signal inversion {0:?}")]
    Invert(Invert),
}

/// UART driver error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid line configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("hardware did not report {what}")]
    HardwareTimeout { what: &'static str },
    #[error("device directory rejected {name}")]
    RegistrationRejected { name: &'static str },
}
