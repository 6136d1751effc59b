//! Test doubles: a fake chip, interrupt controller and device directory.

use crate::Error;
use crate::device::DeviceRecord;
use crate::mmio::Mmio;
use crate::prcm::{
    CLKACTIVITY_L4LS_GCLK, CLKACTIVITY_UART_GFCLK, CM_PER_L4LS_CLKSTCTRL, PM_PER_PWRSTST,
    POWERSTATE_ON,
};
use crate::registry::{DeviceDirectory, DeviceFlags, InterruptController, InterruptHandler, Route};
use crate::soc::uart::{
    DLH, DLL, LCR, LCR_DIV_EN, LSR, LSR_RX_DATA_READY, LSR_TX_HOLDING_EMPTY, RHR, THR,
};
use crate::soc::{PRCM_BASE, UNITS};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

// ——————————————————————————————— Fake Chip ———————————————————————————————— //

/// Behaviour of a UART block beyond plain storage.
#[derive(Default)]
struct FakeUart {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    dll: u32,
    dlh: u32,
    /// Number of upcoming LSR reads reporting the transmitter as busy.
    tx_busy: u32,
}

#[derive(Default)]
struct SocState {
    regs: HashMap<usize, u32>,
    scripts: HashMap<usize, VecDeque<u32>>,
    reads: HashMap<usize, usize>,
    writes: Vec<(usize, u32)>,
    uarts: HashMap<usize, FakeUart>,
}

/// A register file. Reads return scripted values first, then whatever was last written.
#[derive(Default)]
pub struct FakeSoc {
    state: Mutex<SocState>,
}

impl FakeSoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chip with a powered PER domain, running clocks and all UART units modelled.
    pub fn ready() -> Self {
        let soc = Self::new();
        soc.poke(PRCM_BASE + PM_PER_PWRSTST, POWERSTATE_ON);
        soc.poke(
            PRCM_BASE + CM_PER_L4LS_CLKSTCTRL,
            CLKACTIVITY_L4LS_GCLK | CLKACTIVITY_UART_GFCLK,
        );
        for unit in &UNITS {
            soc.attach_uart(unit.base);
        }
        soc
    }

    /// Models a UART block at `base`: FIFOs, divisor latch and transmitter status.
    pub fn attach_uart(&self, base: usize) {
        self.state.lock().unwrap().uarts.entry(base).or_default();
    }

    /// Sets a register without recording a write.
    pub fn poke(&self, addr: usize, value: u32) {
        self.state.lock().unwrap().regs.insert(addr, value);
    }

    /// Stored value of a register, ignoring scripts and modelled behaviour.
    pub fn peek(&self, addr: usize) -> u32 {
        self.state.lock().unwrap().regs.get(&addr).copied().unwrap_or(0)
    }

    /// Queues values returned by the next reads of `addr`.
    pub fn script(&self, addr: usize, values: &[u32]) {
        let mut state = self.state.lock().unwrap();
        state.scripts.entry(addr).or_default().extend(values);
    }

    pub fn reads_of(&self, addr: usize) -> usize {
        self.state.lock().unwrap().reads.get(&addr).copied().unwrap_or(0)
    }

    /// Every write, in order.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn push_rx(&self, base: usize, bytes: &[u8]) {
        self.with_uart(base, |uart| uart.rx.extend(bytes));
    }

    pub fn tx(&self, base: usize) -> Vec<u8> {
        self.with_uart(base, |uart| uart.tx.clone())
    }

    /// Divisor latch content, as (DLL, DLH).
    pub fn divisor(&self, base: usize) -> (u32, u32) {
        self.with_uart(base, |uart| (uart.dll, uart.dlh))
    }

    pub fn set_tx_busy(&self, base: usize, polls: u32) {
        self.with_uart(base, |uart| uart.tx_busy = polls);
    }

    fn with_uart<T>(&self, base: usize, f: impl FnOnce(&mut FakeUart) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(state.uarts.get_mut(&base).expect("no UART attached at this address"))
    }
}

impl SocState {
    /// Splits an address into a modelled UART base and an offset.
    fn uart_at(&self, addr: usize) -> Option<(usize, usize, bool)> {
        let base = addr & !0xFFF;
        self.uarts.contains_key(&base).then(|| {
            let lcr = self.regs.get(&(base + LCR)).copied().unwrap_or(0);
            (base, addr - base, lcr & LCR_DIV_EN != 0)
        })
    }
}

impl Mmio for FakeSoc {
    fn read(&self, addr: usize) -> u32 {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        *state.reads.entry(addr).or_default() += 1;

        if let Some(value) = state.scripts.get_mut(&addr).and_then(VecDeque::pop_front) {
            return value;
        }

        if let Some((base, offset, latched)) = state.uart_at(addr) {
            let uart = state.uarts.get_mut(&base).unwrap();
            match offset {
                RHR if !latched => return uart.rx.pop_front().map_or(0, u32::from),
                LSR => {
                    let mut lsr = 0;
                    if !uart.rx.is_empty() {
                        lsr |= LSR_RX_DATA_READY;
                    }
                    if uart.tx_busy > 0 {
                        uart.tx_busy -= 1;
                    } else {
                        lsr |= LSR_TX_HOLDING_EMPTY;
                    }
                    return lsr;
                }
                _ => {}
            }
        }

        state.regs.get(&addr).copied().unwrap_or(0)
    }

    fn write(&self, addr: usize, value: u32) {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.writes.push((addr, value));

        if let Some((base, offset, latched)) = state.uart_at(addr) {
            let uart = state.uarts.get_mut(&base).unwrap();
            match offset {
                DLL if latched => {
                    uart.dll = value;
                    return;
                }
                DLH if latched => {
                    uart.dlh = value;
                    return;
                }
                THR => {
                    uart.tx.push(value as u8);
                    return;
                }
                _ => {}
            }
        }

        state.regs.insert(addr, value);
    }
}

// ——————————————————————— Fake Interrupt Controller ———————————————————————— //

#[derive(Default)]
struct IntcState<'a> {
    handlers: Vec<(u32, &'a dyn InterruptHandler, &'static str)>,
    routes: HashMap<u32, (u8, Route)>,
    /// Successive mask states of each line, `true` meaning masked.
    masks: HashMap<u32, Vec<bool>>,
}

#[derive(Default)]
pub struct FakeIntc<'a> {
    state: Mutex<IntcState<'a>>,
}

impl<'a> FakeIntc<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self, irq: u32) -> bool {
        let state = self.state.lock().unwrap();
        state.handlers.iter().any(|&(line, _, _)| line == irq)
    }

    pub fn is_masked(&self, irq: u32) -> Option<bool> {
        let state = self.state.lock().unwrap();
        state.masks.get(&irq).and_then(|history| history.last().copied())
    }

    pub fn mask_history(&self, irq: u32) -> Vec<bool> {
        let state = self.state.lock().unwrap();
        state.masks.get(&irq).cloned().unwrap_or_default()
    }

    pub fn route(&self, irq: u32) -> Option<(u8, Route)> {
        self.state.lock().unwrap().routes.get(&irq).copied()
    }

    /// Raises line `irq`. Returns whether a handler ran: masked lines are not delivered.
    pub fn fire(&self, irq: u32) -> bool {
        let handler = {
            let state = self.state.lock().unwrap();
            let masked = state.masks.get(&irq).and_then(|h| h.last().copied()).unwrap_or(true);
            let handler = state.handlers.iter().find(|&&(line, _, _)| line == irq);
            match handler {
                Some(&(_, handler, _)) if !masked => handler,
                _ => return false,
            }
        };
        handler.handle_interrupt();
        true
    }

    fn set_mask(&self, irq: u32, masked: bool) {
        let mut state = self.state.lock().unwrap();
        state.masks.entry(irq).or_default().push(masked);
    }
}

impl<'a> InterruptController<'a> for FakeIntc<'a> {
    fn install(&self, irq: u32, handler: &'a dyn InterruptHandler, name: &'static str) {
        self.state.lock().unwrap().handlers.push((irq, handler, name));
    }

    fn set_route(&self, irq: u32, priority: u8, route: Route) {
        self.state.lock().unwrap().routes.insert(irq, (priority, route));
    }

    fn mask(&self, irq: u32) {
        self.set_mask(irq, true);
    }

    fn unmask(&self, irq: u32) {
        self.set_mask(irq, false);
    }
}

// ———————————————————————————— Fake Directory —————————————————————————————— //

type Entry<'a> = (&'static str, DeviceFlags, &'a DeviceRecord<'a>);

/// A directory accepting at most `capacity` devices.
pub struct FakeDirectory<'a> {
    capacity: usize,
    entries: Mutex<Vec<Entry<'a>>>,
}

impl<'a> FakeDirectory<'a> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<Entry<'a>> {
        self.entries.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries().iter().map(|&(name, _, _)| name).collect()
    }
}

impl<'a> DeviceDirectory<'a> for FakeDirectory<'a> {
    fn register(
        &self,
        name: &'static str,
        flags: DeviceFlags,
        device: &'a DeviceRecord<'a>,
    ) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() == self.capacity {
            return Err(Error::RegistrationRejected { name });
        }
        entries.push((name, flags, device));
        Ok(())
    }
}
