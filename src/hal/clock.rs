//! Millisecond system tick.

use crate::hal::cell::TickCell;
use crate::port::Clock;

/// Millisecond counter advanced by the SysTick interrupt.
#[derive(Debug, Default)]
pub struct TickClock {
    ms: TickCell,
}

impl TickClock {
    pub const fn new() -> Self {
        TickClock {
            ms: TickCell::new(0),
        }
    }

    /// SysTick ISR: one millisecond has elapsed.
    pub fn on_systick(&self) {
        self.ms.add(1);
    }

    pub fn advance(&self, ms: u32) {
        self.ms.add(ms);
    }

    pub fn set_ms(&self, ms: u32) {
        self.ms.set(ms);
    }
}

impl Clock for TickClock {
    fn now_ms(&self) -> u32 {
        self.ms.get()
    }
}
