//! Receive ring buffer and the default receive pump.
//!
//! The buffer is a single-producer single-consumer queue: the interrupt service routine pushes
//! (through the pump), the reader pops. Both sides only need atomics, so no lock is ever taken
//! in interrupt context.

use crate::device::{DeviceRecord, SerialUnit};
use crate::registry::ReceivePump;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Capacity of a receive buffer, in bytes.
pub const RX_BUFFER_SIZE: usize = 64;

/// Fixed-capacity circular byte buffer.
pub struct RingBuffer {
    data: [AtomicU8; RX_BUFFER_SIZE],
    /// Total bytes pushed. Only written by the producer.
    head: AtomicUsize,
    /// Total bytes popped. Only written by the consumer.
    tail: AtomicUsize,
    dropped: AtomicUsize,
}

impl RingBuffer {
    pub const fn new() -> Self {
        Self {
            data: [const { AtomicU8::new(0) }; RX_BUFFER_SIZE],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Appends a byte, returns `false` (and drops the byte) if the buffer is full.
    pub fn push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) == RX_BUFFER_SIZE {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.data[head % RX_BUFFER_SIZE].store(byte, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Removes the oldest byte.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        let byte = self.data[tail % RX_BUFFER_SIZE].load(Ordering::Relaxed);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        self.head.load(Ordering::Acquire).wrapping_sub(tail)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes lost because the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves every byte the unit currently holds into its ring buffer.
pub struct DrainPump;

impl ReceivePump for DrainPump {
    fn receive(&self, device: &DeviceRecord<'_>) {
        let rx = device.rx_buffer();
        while let Some(byte) = device.get_byte() {
            rx.push(byte);
        }
    }
}
