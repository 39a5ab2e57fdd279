//! Hardware port contract.
//!
//! The FSMs never touch registers or interrupt-shared memory directly. They
//! call the narrow interface below, which a HAL implements on top of
//! interrupt-safe cells. Every method takes `&self`: a port is shared
//! between the FSMs and the interrupt handlers that update it.
//!
//! Failures only surface when an id is claimed (`init_*`). After that, a
//! HAL problem shows up as a flag that never becomes true, which the FSMs
//! observe as a stall.

mod error;
mod ids;

pub use error::PortError;
pub use ids::{ButtonId, SensorId};

use std::sync::Arc;

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Debounced push-button input.
pub trait ButtonPort: Clock {
    /// Claim and configure the line.
    fn init_button(&self, id: ButtonId) -> Result<(), PortError>;

    /// Pressed flag maintained by the edge interrupt.
    fn is_pressed(&self, id: ButtonId) -> bool;

    /// Give the line back once its FSM is dropped.
    fn release_button(&self, _id: ButtonId) {}
}

/// Ultrasonic transceiver driven by a trigger pulse and an echo capture.
pub trait UltrasoundPort {
    /// Claim and configure the trigger/echo pins and the three timers.
    fn init_sensor(&self, id: SensorId) -> Result<(), PortError>;

    /// A new measurement may start (set by the measurement-period timer).
    fn trigger_ready(&self, id: SensorId) -> bool;
    fn set_trigger_ready(&self, id: SensorId, ready: bool);

    /// The trigger pulse has lasted long enough (set by the trigger timer).
    fn trigger_end(&self, id: SensorId) -> bool;
    fn set_trigger_end(&self, id: SensorId, end: bool);

    /// Both edges of the echo pulse have been captured.
    fn echo_received(&self, id: SensorId) -> bool;
    fn set_echo_received(&self, id: SensorId, received: bool);

    /// The rising edge of the echo has been captured.
    ///
    /// Ports that cannot tell take a non-zero init tick as the rising edge,
    /// so an edge captured exactly at tick 0 is missed.
    fn echo_started(&self, id: SensorId) -> bool {
        self.echo_init_tick(id) > 0
    }

    fn echo_init_tick(&self, id: SensorId) -> u32;
    fn set_echo_init_tick(&self, id: SensorId, tick: u32);
    fn echo_end_tick(&self, id: SensorId) -> u32;
    fn set_echo_end_tick(&self, id: SensorId, tick: u32);

    /// Echo timer overflows counted since the last reset.
    fn echo_overflows(&self, id: SensorId) -> u32;
    fn set_echo_overflows(&self, id: SensorId, overflows: u32);

    /// Zero both echo ticks and the overflow count, clear echo-received.
    fn reset_echo_ticks(&self, id: SensorId);

    /// Raise the trigger line and arm the trigger, echo and period timers.
    fn start_measurement(&self, id: SensorId);

    /// Lower the trigger line and stop its timer.
    fn stop_trigger_timer(&self, id: SensorId);

    fn stop_echo_timer(&self, id: SensorId);

    /// Halt every timer and signal of the sensor and reset its echo ticks.
    fn stop_sensor(&self, id: SensorId);

    /// Force the measurement-period timer to run so the first cycle starts.
    fn start_new_measurement_cycle(&self);

    /// Give the sensor back once its FSM is dropped.
    fn release_sensor(&self, _id: SensorId) {}
}

macro_rules! forward_ports {
    ($($wrapper:ty),*) => {
        $(
            impl<T: Clock + ?Sized> Clock for $wrapper {
                fn now_ms(&self) -> u32 {
                    (**self).now_ms()
                }
            }

            impl<T: ButtonPort + ?Sized> ButtonPort for $wrapper {
                fn init_button(&self, id: ButtonId) -> Result<(), PortError> {
                    (**self).init_button(id)
                }

                fn is_pressed(&self, id: ButtonId) -> bool {
                    (**self).is_pressed(id)
                }

                fn release_button(&self, id: ButtonId) {
                    (**self).release_button(id)
                }
            }

            impl<T: UltrasoundPort + ?Sized> UltrasoundPort for $wrapper {
                fn init_sensor(&self, id: SensorId) -> Result<(), PortError> {
                    (**self).init_sensor(id)
                }

                fn trigger_ready(&self, id: SensorId) -> bool {
                    (**self).trigger_ready(id)
                }

                fn set_trigger_ready(&self, id: SensorId, ready: bool) {
                    (**self).set_trigger_ready(id, ready)
                }

                fn trigger_end(&self, id: SensorId) -> bool {
                    (**self).trigger_end(id)
                }

                fn set_trigger_end(&self, id: SensorId, end: bool) {
                    (**self).set_trigger_end(id, end)
                }

                fn echo_received(&self, id: SensorId) -> bool {
                    (**self).echo_received(id)
                }

                fn set_echo_received(&self, id: SensorId, received: bool) {
                    (**self).set_echo_received(id, received)
                }

                fn echo_started(&self, id: SensorId) -> bool {
                    (**self).echo_started(id)
                }

                fn echo_init_tick(&self, id: SensorId) -> u32 {
                    (**self).echo_init_tick(id)
                }

                fn set_echo_init_tick(&self, id: SensorId, tick: u32) {
                    (**self).set_echo_init_tick(id, tick)
                }

                fn echo_end_tick(&self, id: SensorId) -> u32 {
                    (**self).echo_end_tick(id)
                }

                fn set_echo_end_tick(&self, id: SensorId, tick: u32) {
                    (**self).set_echo_end_tick(id, tick)
                }

                fn echo_overflows(&self, id: SensorId) -> u32 {
                    (**self).echo_overflows(id)
                }

                fn set_echo_overflows(&self, id: SensorId, overflows: u32) {
                    (**self).set_echo_overflows(id, overflows)
                }

                fn reset_echo_ticks(&self, id: SensorId) {
                    (**self).reset_echo_ticks(id)
                }

                fn start_measurement(&self, id: SensorId) {
                    (**self).start_measurement(id)
                }

                fn stop_trigger_timer(&self, id: SensorId) {
                    (**self).stop_trigger_timer(id)
                }

                fn stop_echo_timer(&self, id: SensorId) {
                    (**self).stop_echo_timer(id)
                }

                fn stop_sensor(&self, id: SensorId) {
                    (**self).stop_sensor(id)
                }

                fn start_new_measurement_cycle(&self) {
                    (**self).start_new_measurement_cycle()
                }

                fn release_sensor(&self, id: SensorId) {
                    (**self).release_sensor(id)
                }
            }
        )*
    };
}

forward_ports!(&T, Arc<T>);
