//! Line configuration: framing and baud rate.
//!
//! The serial framework speaks in terms of an abstract [LineConfig]. Only 115200 baud, 8 data
//! bits, LSB first and normal polarity are wired up on this chip; anything else is refused with a
//! [ConfigError] before a single register is written.

use crate::ConfigError;
use crate::mmio::Registers;
use crate::soc::UART_CLOCK_HZ;
use crate::soc::uart::{
    DLH, DLH_MASK, DLL, LCR, LCR_CHAR_LENGTH, LCR_CHAR_LENGTH_8, LCR_DIV_EN, LCR_NB_STOP,
    LCR_PARITY_EN, MDR1, MDR1_UART_16X, MDR2,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaudRate {
    B2400 = 2400,
    B4800 = 4800,
    B9600 = 9600,
    B19200 = 19200,
    B38400 = 38400,
    B57600 = 57600,
    B115200 = 115200,
    B230400 = 230400,
    B460800 = 460800,
    B921600 = 921600,
}

impl BaudRate {
    /// Bits per second.
    pub const fn bps(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataBits {
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    LsbFirst,
    MsbFirst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invert {
    Normal,
    Inverted,
}

/// Framing and speed of a serial line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineConfig {
    pub baud_rate: BaudRate,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub bit_order: BitOrder,
    pub invert: Invert,
}

impl Default for LineConfig {
    /// 115200 8-N-1.
    fn default() -> Self {
        Self {
            baud_rate: BaudRate::B115200,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            bit_order: BitOrder::LsbFirst,
            invert: Invert::Normal,
        }
    }
}

impl LineConfig {
    /// Checks that the hardware can run this configuration and returns the baud divisor.
    pub fn validate(&self) -> Result<u32, ConfigError> {
        if self.data_bits != DataBits::Eight {
            return Err(ConfigError::DataBits(self.data_bits));
        }
        if self.baud_rate != BaudRate::B115200 {
            return Err(ConfigError::BaudRate(self.baud_rate));
        }
        if self.bit_order != BitOrder::LsbFirst {
            return Err(ConfigError::BitOrder(self.bit_order));
        }
        if self.invert != Invert::Normal {
            return Err(ConfigError::Invert(self.invert));
        }
        Ok(divisor(self.baud_rate))
    }
}

/// Baud divisor for the 16x oversampling mode.
const fn divisor(baud_rate: BaudRate) -> u32 {
    UART_CLOCK_HZ / (16 * baud_rate.bps())
}

/// Programs `config` into a unit.
///
/// The divisor latch is only exposed for the two divisor writes: `LCR_DIV_EN` is always cleared
/// again before returning.
pub fn apply(uart: &Registers, config: &LineConfig) -> Result<(), ConfigError> {
    let divisor = config.validate()?;

    uart.modify(LCR, LCR_CHAR_LENGTH, LCR_CHAR_LENGTH_8);
    match config.stop_bits {
        StopBits::One => uart.clear_bits(LCR, LCR_NB_STOP),
        StopBits::Two => uart.set_bits(LCR, LCR_NB_STOP),
    }
    // Only the enable bit is modelled, odd and even program the same.
    match config.parity {
        Parity::None => uart.clear_bits(LCR, LCR_PARITY_EN),
        Parity::Odd | Parity::Even => uart.set_bits(LCR, LCR_PARITY_EN),
    }

    uart.set_bits(LCR, LCR_DIV_EN);
    uart.write(DLL, divisor & 0xFF);
    uart.write(DLH, (divisor >> 8) & DLH_MASK);
    uart.clear_bits(LCR, LCR_DIV_EN);

    uart.write(MDR1, MDR1_UART_16X);
    uart.write(MDR2, 0);
    Ok(())
}
