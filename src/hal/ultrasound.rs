//! Ultrasonic transceiver channel.

use crate::hal::cell::{AtomicFlag, TickCell};

/// Flags, ticks and timer state of one trigger/echo sensor.
///
/// The `on_*` methods are the interrupt service routines of the channel;
/// everything else is reached through [`UltrasoundPort`](crate::port::UltrasoundPort).
#[derive(Debug, Default)]
pub struct UltrasoundChannel {
    pub(crate) trigger_ready: AtomicFlag,
    pub(crate) trigger_end: AtomicFlag,
    pub(crate) echo_received: AtomicFlag,
    pub(crate) echo_init_tick: TickCell,
    pub(crate) echo_end_tick: TickCell,
    pub(crate) echo_overflows: TickCell,
    echo_rising_seen: AtomicFlag,
    trigger_high: AtomicFlag,
    trigger_timer_on: AtomicFlag,
    echo_timer_on: AtomicFlag,
    claimed: AtomicFlag,
}

impl UltrasoundChannel {
    pub const fn new() -> Self {
        UltrasoundChannel {
            trigger_ready: AtomicFlag::new(false),
            trigger_end: AtomicFlag::new(false),
            echo_received: AtomicFlag::new(false),
            echo_init_tick: TickCell::new(0),
            echo_end_tick: TickCell::new(0),
            echo_overflows: TickCell::new(0),
            echo_rising_seen: AtomicFlag::new(false),
            trigger_high: AtomicFlag::new(false),
            trigger_timer_on: AtomicFlag::new(false),
            echo_timer_on: AtomicFlag::new(false),
            claimed: AtomicFlag::new(false),
        }
    }

    /// Trigger timer ISR: the trigger pulse has lasted its full width.
    pub fn on_trigger_timer(&self) {
        if self.trigger_timer_on.get() {
            self.trigger_end.set(true);
        }
    }

    /// Echo input-capture ISR.
    ///
    /// The first edge after a reset is the rising edge and stores the init
    /// tick; the second stores the end tick and raises echo-received.
    /// Captures while the echo timer is stopped are ignored.
    pub fn on_echo_capture(&self, tick: u32) {
        if !self.echo_timer_on.get() || self.echo_received.get() {
            return;
        }
        if self.echo_rising_seen.replace(true) {
            self.echo_end_tick.set(tick);
            self.echo_received.set(true);
        } else {
            self.echo_init_tick.set(tick);
            self.echo_overflows.set(0);
        }
    }

    /// Echo timer update ISR: the counter wrapped while timing the echo.
    ///
    /// Only wraps between the rising and the falling edge count.
    pub fn on_echo_overflow(&self) {
        if self.echo_timer_on.get() && self.echo_rising_seen.get() && !self.echo_received.get() {
            self.echo_overflows.add(1);
        }
    }

    /// The rising edge of the current echo has been captured.
    pub fn echo_started(&self) -> bool {
        self.echo_rising_seen.get()
    }

    pub(crate) fn on_measurement_period(&self) {
        self.trigger_ready.set(true);
    }

    pub(crate) fn reset_echo(&self) {
        self.echo_init_tick.set(0);
        self.echo_end_tick.set(0);
        self.echo_overflows.set(0);
        self.echo_received.set(false);
        self.echo_rising_seen.set(false);
    }

    pub(crate) fn start_measurement(&self) {
        self.trigger_ready.set(false);
        self.trigger_high.set(true);
        self.trigger_timer_on.set(true);
        self.echo_timer_on.set(true);
    }

    pub(crate) fn stop_trigger(&self) {
        self.trigger_high.set(false);
        self.trigger_timer_on.set(false);
    }

    pub(crate) fn stop_echo(&self) {
        self.echo_timer_on.set(false);
    }

    pub(crate) fn stop(&self) {
        self.stop_trigger();
        self.stop_echo();
        self.reset_echo();
    }

    /// Returns `false` if the sensor was already claimed.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.replace(true)
    }

    pub(crate) fn release(&self) {
        self.claimed.set(false);
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.get()
    }

    /// Level of the trigger output pin.
    pub fn trigger_high(&self) -> bool {
        self.trigger_high.get()
    }

    pub fn trigger_timer_running(&self) -> bool {
        self.trigger_timer_on.get()
    }

    pub fn echo_timer_running(&self) -> bool {
        self.echo_timer_on.get()
    }
}
