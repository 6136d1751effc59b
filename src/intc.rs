//! Minimal driver for the AM335x interrupt controller (INTC).

use am33xx_uart::mmio::{Mmio, Registers};
use am33xx_uart::registry::{InterruptController, InterruptHandler, Route};
use spin::Mutex;

const INTC_SIR_IRQ: usize = 0x40;
const SIR_IRQ_ACTIVEIRQ: u32 = 0x7F;
const INTC_CONTROL: usize = 0x48;
const CONTROL_NEWIRQAGR: u32 = 1 << 0;
const ILR_FIQNIRQ: u32 = 1 << 0;
const ILR_PRIORITY_SHIFT: u32 = 2;
const ILR_PRIORITY_MASK: u32 = 0x3F;

/// Number of interrupt lines.
pub const NR_IRQS: usize = 128;

const fn mir_set(irq: u32) -> usize {
    0x8C + 0x20 * (irq as usize / 32)
}

const fn mir_clear(irq: u32) -> usize {
    0x88 + 0x20 * (irq as usize / 32)
}

const fn ilr(irq: u32) -> usize {
    0x100 + 4 * irq as usize
}

type Slot = Option<(&'static dyn InterruptHandler, &'static str)>;

pub struct Intc {
    regs: Registers<'static>,
    handlers: Mutex<[Slot; NR_IRQS]>,
}

impl Intc {
    pub const fn new(io: &'static dyn Mmio, base: usize) -> Self {
        Self {
            regs: Registers::new(io, base),
            handlers: Mutex::new([None; NR_IRQS]),
        }
    }

    /// Runs the handler of the active line, then lets the controller raise the next one.
    ///
    /// Lines without a handler are acknowledged and otherwise ignored.
    pub fn dispatch(&self) {
        let irq = (self.regs.read(INTC_SIR_IRQ) & SIR_IRQ_ACTIVEIRQ) as usize;
        let slot = self.handlers.lock()[irq];
        if let Some((handler, _)) = slot {
            handler.handle_interrupt();
        }
        self.regs.write(INTC_CONTROL, CONTROL_NEWIRQAGR);
    }
}

impl InterruptController<'static> for Intc {
    fn install(&self, irq: u32, handler: &'static dyn InterruptHandler, name: &'static str) {
        match self.handlers.lock().get_mut(irq as usize) {
            Some(slot) => {
                *slot = Some((handler, name));
                log::debug!("intc: {name} installed on line {irq}");
            }
            None => log::warn!("intc: no line {irq}, {name} not installed"),
        }
    }

    fn set_route(&self, irq: u32, priority: u8, route: Route) {
        let fiq = match route {
            Route::Irq => 0,
            Route::Fiq => ILR_FIQNIRQ,
        };
        let priority = (priority as u32 & ILR_PRIORITY_MASK) << ILR_PRIORITY_SHIFT;
        self.regs.write(ilr(irq), priority | fiq);
    }

    fn mask(&self, irq: u32) {
        self.regs.write(mir_set(irq), 1 << (irq % 32));
    }

    fn unmask(&self, irq: u32) {
        self.regs.write(mir_clear(irq), 1 << (irq % 32));
    }
}
