//! Board registry: the reference implementation of the port traits.

use crate::hal::button::ButtonLine;
use crate::hal::cell::AtomicFlag;
use crate::hal::clock::TickClock;
use crate::hal::ultrasound::UltrasoundChannel;
use crate::port::{ButtonId, ButtonPort, Clock, PortError, SensorId, UltrasoundPort};
use log::{debug, warn};

/// Every line and sensor wired to the controller, indexed by id.
///
/// All state lives in atomic cells, so a `Board` can be shared by
/// reference between the polling loop and the interrupt handlers.
///
/// # Example
///
/// ```
/// use parkassist::hal::Board;
/// use parkassist::port::{ButtonId, ButtonPort, Clock};
///
/// let board = Board::new(1, 1);
/// board.init_button(ButtonId::PARKING).unwrap();
/// board.on_systick();
/// assert_eq!(board.now_ms(), 1);
/// ```
#[derive(Debug)]
pub struct Board {
    clock: TickClock,
    buttons: Vec<ButtonLine>,
    sensors: Vec<UltrasoundChannel>,
    measurement_timer_on: AtomicFlag,
}

impl Default for Board {
    /// The reference board: one parking button, one rear sensor.
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Board {
    /// A board with `buttons` active-low lines and `sensors` transceivers.
    pub fn new(buttons: usize, sensors: usize) -> Self {
        Board {
            clock: TickClock::new(),
            buttons: (0..buttons).map(|_| ButtonLine::default()).collect(),
            sensors: (0..sensors).map(|_| UltrasoundChannel::new()).collect(),
            measurement_timer_on: AtomicFlag::new(false),
        }
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn button(&self, id: ButtonId) -> Result<&ButtonLine, PortError> {
        self.buttons
            .get(id.slot())
            .ok_or(PortError::UnknownButton(id))
    }

    pub fn sensor(&self, id: SensorId) -> Result<&UltrasoundChannel, PortError> {
        self.sensors
            .get(id.slot())
            .ok_or(PortError::UnknownSensor(id))
    }

    /// SysTick ISR.
    pub fn on_systick(&self) {
        self.clock.on_systick();
    }

    /// Measurement-period timer ISR: every claimed sensor may trigger again.
    pub fn on_measurement_timer(&self) {
        if !self.measurement_timer_on.get() {
            return;
        }
        self.sensors
            .iter()
            .filter(|s| s.is_claimed())
            .for_each(UltrasoundChannel::on_measurement_period);
    }

    pub fn measurement_timer_running(&self) -> bool {
        self.measurement_timer_on.get()
    }

    fn with_sensor<R>(&self, id: SensorId, idle: R, f: impl FnOnce(&UltrasoundChannel) -> R) -> R {
        match self.sensor(id) {
            Ok(channel) => f(channel),
            Err(err) => {
                warn!("{}", err);
                idle
            }
        }
    }
}

impl Clock for Board {
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}

impl ButtonPort for Board {
    fn init_button(&self, id: ButtonId) -> Result<(), PortError> {
        let line = self.button(id)?;
        if !line.claim() {
            return Err(PortError::ButtonInUse(id));
        }
        debug!("{} claimed", id);
        Ok(())
    }

    fn is_pressed(&self, id: ButtonId) -> bool {
        match self.button(id) {
            Ok(line) => line.is_pressed(),
            Err(err) => {
                warn!("{}", err);
                false
            }
        }
    }

    fn release_button(&self, id: ButtonId) {
        if let Ok(line) = self.button(id) {
            line.release();
            debug!("{} released", id);
        }
    }
}

impl UltrasoundPort for Board {
    fn init_sensor(&self, id: SensorId) -> Result<(), PortError> {
        let channel = self.sensor(id)?;
        if !channel.claim() {
            return Err(PortError::SensorInUse(id));
        }
        channel.trigger_ready.set(true);
        debug!("{} claimed", id);
        Ok(())
    }

    fn trigger_ready(&self, id: SensorId) -> bool {
        self.with_sensor(id, false, |s| s.trigger_ready.get())
    }

    fn set_trigger_ready(&self, id: SensorId, ready: bool) {
        self.with_sensor(id, (), |s| s.trigger_ready.set(ready))
    }

    fn trigger_end(&self, id: SensorId) -> bool {
        self.with_sensor(id, false, |s| s.trigger_end.get())
    }

    fn set_trigger_end(&self, id: SensorId, end: bool) {
        self.with_sensor(id, (), |s| s.trigger_end.set(end))
    }

    fn echo_received(&self, id: SensorId) -> bool {
        self.with_sensor(id, false, |s| s.echo_received.get())
    }

    fn set_echo_received(&self, id: SensorId, received: bool) {
        self.with_sensor(id, (), |s| s.echo_received.set(received))
    }

    fn echo_started(&self, id: SensorId) -> bool {
        self.with_sensor(id, false, UltrasoundChannel::echo_started)
    }

    fn echo_init_tick(&self, id: SensorId) -> u32 {
        self.with_sensor(id, 0, |s| s.echo_init_tick.get())
    }

    fn set_echo_init_tick(&self, id: SensorId, tick: u32) {
        self.with_sensor(id, (), |s| s.echo_init_tick.set(tick))
    }

    fn echo_end_tick(&self, id: SensorId) -> u32 {
        self.with_sensor(id, 0, |s| s.echo_end_tick.get())
    }

    fn set_echo_end_tick(&self, id: SensorId, tick: u32) {
        self.with_sensor(id, (), |s| s.echo_end_tick.set(tick))
    }

    fn echo_overflows(&self, id: SensorId) -> u32 {
        self.with_sensor(id, 0, |s| s.echo_overflows.get())
    }

    fn set_echo_overflows(&self, id: SensorId, overflows: u32) {
        self.with_sensor(id, (), |s| s.echo_overflows.set(overflows))
    }

    fn reset_echo_ticks(&self, id: SensorId) {
        self.with_sensor(id, (), UltrasoundChannel::reset_echo)
    }

    fn start_measurement(&self, id: SensorId) {
        self.with_sensor(id, (), |s| {
            s.start_measurement();
            self.measurement_timer_on.set(true);
        })
    }

    fn stop_trigger_timer(&self, id: SensorId) {
        self.with_sensor(id, (), UltrasoundChannel::stop_trigger)
    }

    fn stop_echo_timer(&self, id: SensorId) {
        self.with_sensor(id, (), UltrasoundChannel::stop_echo)
    }

    fn stop_sensor(&self, id: SensorId) {
        self.with_sensor(id, (), |s| {
            s.stop();
            self.measurement_timer_on.set(false);
        })
    }

    fn start_new_measurement_cycle(&self) {
        self.measurement_timer_on.set(true);
    }

    fn release_sensor(&self, id: SensorId) {
        if let Ok(channel) = self.sensor(id) {
            channel.stop();
            channel.release();
            debug!("{} released", id);
        }
    }
}
