//! Power and clock sequencing (PRCM) for the UART units.
//!
//! Nothing inside a unit may be touched before the PER power domain is stable and powered, and
//! before the unit's module clock reports fully functional. Every wait is bounded by the caller's
//! spin limit and surfaces [Error::HardwareTimeout] instead of hanging.

use crate::Error;
use crate::mmio::Registers;
use crate::soc::{UNIT_COUNT, UnitSet};

// CM_PER
pub(crate) const CM_PER_L4LS_CLKSTCTRL: usize = 0x000;
const CLKTRCTRL_SW_WKUP: u32 = 0x2;
pub(crate) const CLKACTIVITY_L4LS_GCLK: u32 = 1 << 8;
pub(crate) const CLKACTIVITY_UART_GFCLK: u32 = 1 << 10;

// CM_*_UARTn_CLKCTRL
const MODULEMODE: u32 = 0x3;
pub(crate) const MODULEMODE_ENABLE: u32 = 0x2;
pub(crate) const IDLEST: u32 = 0x3 << 16;

/// Module clock control register of each unit. UART0 sits in the wakeup domain.
pub(crate) const UART_CLKCTRL: [usize; UNIT_COUNT] = [0x4B4, 0x06C, 0x070, 0x074, 0x078, 0x038];

// PRM_PER
pub(crate) const PM_PER_PWRSTST: usize = 0xC08;
pub(crate) const PM_PER_PWRSTCTRL: usize = 0xC0C;
const POWERSTATE: u32 = 0x3;
const POWERSTATE_OFF: u32 = 0x0;
pub(crate) const POWERSTATE_ON: u32 = 0x3;
const PER_MEM_STATEST: u32 = 0x3 << 17;
const PER_MEM_STATEST_OFF: u32 = 0x0;
pub(crate) const PER_MEM_ONSTATE_ON: u32 = 0x3 << 25;
pub(crate) const INTRANSITION: u32 = 1 << 20;

/// Powers the PER domain on, if it is not already.
pub fn power_on_peripheral_domain(prcm: &Registers, limit: u32) -> Result<(), Error> {
    let state = prcm.wait(PM_PER_PWRSTST, limit, "stable PER power state", |state| {
        state & INTRANSITION == 0
    })?;

    if state & POWERSTATE == POWERSTATE_OFF {
        log::debug!("PER domain is off, forcing it on");
        prcm.modify(PM_PER_PWRSTCTRL, POWERSTATE, POWERSTATE_ON);
    }
    if state & PER_MEM_STATEST == PER_MEM_STATEST_OFF {
        prcm.set_bits(PM_PER_PWRSTCTRL, PER_MEM_ONSTATE_ON);
    }

    prcm.wait(PM_PER_PWRSTST, limit, "powered PER domain", |state| {
        state & INTRANSITION == 0 && state & POWERSTATE != POWERSTATE_OFF
    })?;
    Ok(())
}

/// Wakes the L4LS clock domain and enables the module clock of every unit in `units`.
pub fn enable_uart_clocks(prcm: &Registers, units: UnitSet, limit: u32) -> Result<(), Error> {
    prcm.set_bits(CM_PER_L4LS_CLKSTCTRL, CLKTRCTRL_SW_WKUP);
    prcm.wait(CM_PER_L4LS_CLKSTCTRL, limit, "active L4LS clock", |v| {
        v & CLKACTIVITY_L4LS_GCLK != 0
    })?;

    for unit in units.iter() {
        let clkctrl = UART_CLKCTRL[unit];
        prcm.modify(clkctrl, MODULEMODE, MODULEMODE_ENABLE);
        // IDLEST reads 0 once the module is fully functional.
        prcm.wait(clkctrl, limit, "functional UART module", |v| v & IDLEST == 0)?;
        log::debug!("uart{unit}: module clock enabled");
    }

    prcm.wait(CM_PER_L4LS_CLKSTCTRL, limit, "active UART clock", |v| {
        v & CLKACTIVITY_UART_GFCLK != 0
    })?;
    Ok(())
}
