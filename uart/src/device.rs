//! Per-unit device records: the operations the serial framework drives, and the interrupt
//! service routine.

use crate::Error;
use crate::config::{self, LineConfig};
use crate::mmio::Registers;
use crate::registry::{InterruptController, InterruptHandler, ReceivePump};
use crate::ring::RingBuffer;
use crate::soc::uart::{IER, IER_RHR, IIR, IIR_RX_DATA, IIR_RX_TIMEOUT};
use crate::soc::{UNIT_NAMES, UNITS, UnitController};
use crate::transfer;
use spin::Mutex;

/// Operations a serial framework can perform on a unit.
pub trait SerialUnit {
    /// Programs the line, and remembers the configuration on success.
    fn configure(&self, config: LineConfig) -> Result<(), Error>;

    /// Handles a control request. Unknown requests are accepted and ignored.
    fn control(&self, command: Control);

    /// Blocking write of one byte, returns the number of bytes written.
    fn put_byte(&self, byte: u8) -> usize;

    /// Non-blocking read of one byte.
    fn get_byte(&self) -> Option<u8>;
}

/// Control requests understood by [SerialUnit::control].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Disable the receive interrupt line at the interrupt controller.
    MaskRx,
    /// Enable the receive interrupt line at the interrupt controller.
    UnmaskRx,
    /// Any other framework command.
    Other(u32),
}

/// A registered unit.
pub struct DeviceRecord<'a> {
    unit: usize,
    controller: &'static UnitController,
    config: Mutex<LineConfig>,
    uart: Registers<'a>,
    rx: &'a RingBuffer,
    intc: &'a dyn InterruptController<'a>,
    pump: &'a dyn ReceivePump,
}

impl<'a> DeviceRecord<'a> {
    pub(crate) fn new(
        unit: usize,
        uart: Registers<'a>,
        rx: &'a RingBuffer,
        intc: &'a dyn InterruptController<'a>,
        pump: &'a dyn ReceivePump,
    ) -> Self {
        let controller = &UNITS[unit];
        debug_assert_eq!(uart.base(), controller.base);
        Self {
            unit,
            controller,
            config: Mutex::new(LineConfig::default()),
            uart,
            rx,
            intc,
            pump,
        }
    }

    pub fn unit(&self) -> usize {
        self.unit
    }

    pub fn name(&self) -> &'static str {
        UNIT_NAMES[self.unit]
    }

    pub fn controller(&self) -> &'static UnitController {
        self.controller
    }

    /// The last configuration successfully applied.
    pub fn config(&self) -> LineConfig {
        *self.config.lock()
    }

    /// The framework's receive buffer for this unit.
    pub fn rx_buffer(&self) -> &'a RingBuffer {
        self.rx
    }

    /// Lets the unit raise its interrupt when received data is available.
    pub(crate) fn enable_rx_interrupt(&self) {
        self.uart.write(IER, IER_RHR);
    }
}

impl SerialUnit for DeviceRecord<'_> {
    fn configure(&self, line: LineConfig) -> Result<(), Error> {
        let mut current = self.config.lock();
        config::apply(&self.uart, &line)?;
        *current = line;
        Ok(())
    }

    fn control(&self, command: Control) {
        match command {
            Control::MaskRx => self.intc.mask(self.controller.irq),
            Control::UnmaskRx => self.intc.unmask(self.controller.irq),
            Control::Other(cmd) => log::trace!("{}: ignoring control request {cmd}", self.name()),
        }
    }

    fn put_byte(&self, byte: u8) -> usize {
        transfer::put_byte(&self.uart, byte)
    }

    fn get_byte(&self) -> Option<u8> {
        transfer::get_byte(&self.uart)
    }
}

impl InterruptHandler for DeviceRecord<'_> {
    fn handle_interrupt(&self) {
        let iir = self.uart.read(IIR);

        // Both patterns report received data (FIFO threshold and character timeout).
        if iir & IIR_RX_DATA != 0 || iir & IIR_RX_TIMEOUT != 0 {
            // The line stays masked while the FIFO is drained, the level is re-evaluated once
            // it is unmasked again.
            self.intc.mask(self.controller.irq);
            self.pump.receive(self);
            self.intc.unmask(self.controller.irq);
        } else {
            log::trace!("{}: unhandled interrupt, IIR={iir:#x}", self.name());
        }
    }
}
