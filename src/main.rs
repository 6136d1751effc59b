#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

mod intc;
mod logger;
mod platform;
mod serial;
#[cfg(test)]
mod testing;

#[cfg(not(test))]
use am33xx_uart::device::{Control, SerialUnit};

#[cfg(not(test))]
#[unsafe(no_mangle)]
fn _start() -> ! {
    logger::init();

    if serial::serial_init() != 0 {
        log::error!("serial bring-up failed, halting");
        halt();
    }

    for entry in serial::DIRECTORY.entries() {
        log::info!("{}: {:?}", entry.name, entry.flags);
    }
    let Some(console) = serial::DIRECTORY.find(platform::CONSOLE_NAME) else {
        log::error!("{} is not registered, halting", platform::CONSOLE_NAME);
        halt();
    };

    // Only the console is consumed, so only its receive interrupt is let through.
    console.device.control(Control::UnmaskRx);
    log::info!("echoing on {}", console.name);
    loop {
        while let Some(byte) = console.device.rx_buffer().pop() {
            console.device.put_byte(byte);
        }
        core::hint::spin_loop();
    }
}

/// Entry point of the IRQ exception vector.
#[cfg(not(test))]
#[unsafe(no_mangle)]
extern "C" fn irq_dispatch() {
    serial::INTC.dispatch();
}

#[cfg(not(test))]
fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

// ————————————————————————————— Panic Handler —————————————————————————————— //

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    halt();
}
