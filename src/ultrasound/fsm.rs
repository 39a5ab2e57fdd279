//! Trigger/echo measurement FSM.

use crate::builder::{BuildError, MachineBuilder, TransitionBuilder};
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::config::{UltrasoundConfig, NUM_MEASUREMENTS};
use crate::core::TransitionHistory;
use crate::error::ConfigError;
use crate::machine::{FireOutcome, FireStats, Fsm, Machine};
use crate::port::{SensorId, UltrasoundPort};
use crate::state_enum;
use crate::ultrasound::echo::{EchoCapture, TimingAnomaly};
use crate::ultrasound::window::SampleWindow;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

state_enum! {
    /// States of the ultrasound FSM, in index order.
    pub enum UltrasoundState {
        WaitStart,
        TriggerStart,
        WaitEchoStart,
        WaitEchoEnd,
        SetDistance,
    }
    idle: [WaitStart]
}

/// Data the ultrasound transitions read and write.
pub struct UltrasoundContext<P> {
    port: P,
    id: SensorId,
    config: UltrasoundConfig,
    active: bool,
    distance_cm: u32,
    new_measurement: bool,
    window: SampleWindow<NUM_MEASUREMENTS>,
    discarded: u32,
    last_anomaly: Option<TimingAnomaly>,
}

/// Checkpointed sensor data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UltrasoundSnapshot {
    pub id: SensorId,
    pub active: bool,
    pub distance_cm: u32,
    pub new_measurement: bool,
    pub samples: Vec<u32>,
    pub window_index: usize,
    pub discarded: u32,
    pub last_anomaly: Option<TimingAnomaly>,
}

fn can_trigger<P: UltrasoundPort>(ctx: &UltrasoundContext<P>) -> bool {
    ctx.active && ctx.port.trigger_ready(ctx.id)
}

fn trigger_elapsed<P: UltrasoundPort>(ctx: &UltrasoundContext<P>) -> bool {
    ctx.port.trigger_end(ctx.id)
}

fn echo_started<P: UltrasoundPort>(ctx: &UltrasoundContext<P>) -> bool {
    ctx.port.echo_started(ctx.id)
}

fn echo_received<P: UltrasoundPort>(ctx: &UltrasoundContext<P>) -> bool {
    ctx.port.echo_received(ctx.id)
}

fn inactive<P: UltrasoundPort>(ctx: &UltrasoundContext<P>) -> bool {
    !ctx.active
}

fn do_start_measurement<P: UltrasoundPort>(ctx: &mut UltrasoundContext<P>) {
    ctx.port.start_measurement(ctx.id);
}

fn do_stop_trigger<P: UltrasoundPort>(ctx: &mut UltrasoundContext<P>) {
    ctx.port.stop_trigger_timer(ctx.id);
    ctx.port.set_trigger_end(ctx.id, false);
}

fn do_set_distance<P: UltrasoundPort>(ctx: &mut UltrasoundContext<P>) {
    let capture = EchoCapture {
        init_tick: ctx.port.echo_init_tick(ctx.id),
        end_tick: ctx.port.echo_end_tick(ctx.id),
        overflows: ctx.port.echo_overflows(ctx.id),
    };

    match capture.distance_cm(&ctx.config) {
        Ok(sample) => {
            if let Some(median) = ctx.window.push(sample) {
                ctx.distance_cm = median;
                ctx.new_measurement = true;
                debug!("{}: median distance {} cm", ctx.id, median);
            }
        }
        Err(anomaly) => {
            ctx.discarded = ctx.discarded.saturating_add(1);
            ctx.last_anomaly = Some(anomaly);
            warn!("{}: sample discarded: {}", ctx.id, anomaly);
        }
    }

    ctx.port.stop_echo_timer(ctx.id);
    ctx.port.reset_echo_ticks(ctx.id);
}

fn do_stop_measurement<P: UltrasoundPort>(ctx: &mut UltrasoundContext<P>) {
    ctx.port.stop_sensor(ctx.id);
    ctx.port.set_trigger_end(ctx.id, false);
}

fn ultrasound_machine<P: UltrasoundPort>(
) -> Result<Machine<UltrasoundState, UltrasoundContext<P>>, BuildError> {
    use UltrasoundState::*;

    let mut builder =
        MachineBuilder::<UltrasoundState, UltrasoundContext<P>>::new().named("ultrasound");

    builder = builder
        .transition(
            TransitionBuilder::new()
                .from(WaitStart)
                .to(TriggerStart)
                .when(can_trigger::<P>)
                .then(do_start_measurement::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(TriggerStart)
                .to(WaitEchoStart)
                .when(trigger_elapsed::<P>)
                .then(do_stop_trigger::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(WaitEchoStart)
                .to(WaitEchoEnd)
                .when(echo_started::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(WaitEchoEnd)
                .to(SetDistance)
                .when(echo_received::<P>)
                .then(do_set_distance::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(SetDistance)
                .to(TriggerStart)
                .when(can_trigger::<P>)
                .then(do_start_measurement::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(SetDistance)
                .to(WaitStart)
                .when(inactive::<P>)
                .then(do_stop_measurement::<P>),
        )?;

    // Parking rows for a sensor deactivated through `set_active(false)` mid-cycle.
    for from in [TriggerStart, WaitEchoStart, WaitEchoEnd] {
        builder = builder.transition(
            TransitionBuilder::new()
                .from(from)
                .to(WaitStart)
                .when(inactive::<P>)
                .then(do_stop_measurement::<P>),
        )?;
    }

    builder.build()
}

/// Median-filtered distance reader for one ultrasonic sensor.
///
/// The FSM is created inactive; [`start`](Self::start) arms the first
/// measurement. The reported distance changes only when a full window of
/// [`NUM_MEASUREMENTS`] samples completes.
pub struct UltrasoundFsm<P: UltrasoundPort> {
    machine: Machine<UltrasoundState, UltrasoundContext<P>>,
    ctx: UltrasoundContext<P>,
}

impl<P: UltrasoundPort> UltrasoundFsm<P> {
    /// Create the FSM in `WaitStart` and claim `id` on `port`.
    pub fn new(id: SensorId, config: UltrasoundConfig, port: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let machine = ultrasound_machine::<P>()?;
        port.init_sensor(id)?;

        info!(
            "{}: {} m/s, echo period {} ticks",
            id, config.speed_of_sound_m_s, config.echo_timer_period_ticks
        );
        Ok(Self {
            machine,
            ctx: UltrasoundContext {
                port,
                id,
                config,
                active: false,
                distance_cm: 0,
                new_measurement: false,
                window: SampleWindow::new(),
                discarded: 0,
                last_anomaly: None,
            },
        })
    }

    pub fn fire(&mut self) -> FireOutcome<UltrasoundState> {
        self.machine.fire(&mut self.ctx)
    }

    pub fn state(&self) -> UltrasoundState {
        self.machine.current_state()
    }

    /// Activate the sensor and force the first measurement cycle.
    ///
    /// Clears the sample window and the reported distance. A machine left
    /// mid-cycle is moved back to `WaitStart` first.
    pub fn start(&mut self) {
        self.park();
        let ctx = &mut self.ctx;
        ctx.active = true;
        ctx.window.reset();
        ctx.distance_cm = 0;
        ctx.new_measurement = false;
        ctx.port.reset_echo_ticks(ctx.id);
        ctx.port.set_trigger_ready(ctx.id, true);
        ctx.port.start_new_measurement_cycle();
        info!("{}: started", ctx.id);
    }

    /// Deactivate the sensor, halt its timers and trigger line, and return
    /// the machine to `WaitStart`.
    pub fn stop(&mut self) {
        self.ctx.active = false;
        do_stop_measurement(&mut self.ctx);
        self.park();
        info!("{}: stopped", self.ctx.id);
    }

    /// Leave an in-flight measurement; the timers it waits on are gone.
    fn park(&mut self) {
        if matches!(
            self.state(),
            UltrasoundState::TriggerStart
                | UltrasoundState::WaitEchoStart
                | UltrasoundState::WaitEchoEnd
        ) {
            self.machine.set_state(UltrasoundState::WaitStart);
        }
    }

    pub fn is_active(&self) -> bool {
        self.ctx.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.ctx.active = active;
    }

    pub fn is_trigger_ready(&self) -> bool {
        self.ctx.port.trigger_ready(self.ctx.id)
    }

    pub fn new_measurement_ready(&self) -> bool {
        self.ctx.new_measurement
    }

    /// Last median distance in cm; consumes the new-measurement flag.
    pub fn distance(&mut self) -> u32 {
        self.ctx.new_measurement = false;
        self.ctx.distance_cm
    }

    /// Last median distance in cm, leaving the new-measurement flag alone.
    pub fn peek_distance(&self) -> u32 {
        self.ctx.distance_cm
    }

    pub fn window_index(&self) -> usize {
        self.ctx.window.index()
    }

    /// Samples dropped because of a timing anomaly since construction.
    pub fn discarded_samples(&self) -> u32 {
        self.ctx.discarded
    }

    pub fn last_anomaly(&self) -> Option<TimingAnomaly> {
        self.ctx.last_anomaly
    }

    pub fn id(&self) -> SensorId {
        self.ctx.id
    }

    pub fn config(&self) -> &UltrasoundConfig {
        &self.ctx.config
    }

    pub fn port(&self) -> &P {
        &self.ctx.port
    }

    /// Force the FSM into `state`, e.g. out of `WaitEchoEnd` when an echo
    /// never arrives.
    pub fn set_state(&mut self, state: UltrasoundState) {
        self.machine.set_state(state);
    }

    pub fn stats(&self) -> &FireStats {
        self.machine.stats()
    }

    pub fn history(&self) -> &TransitionHistory<UltrasoundState> {
        self.machine.history()
    }

    pub fn checkpoint(&self) -> Checkpoint<UltrasoundState, UltrasoundSnapshot> {
        let ctx = &self.ctx;
        Checkpoint::capture(
            &self.machine,
            UltrasoundSnapshot {
                id: ctx.id,
                active: ctx.active,
                distance_cm: ctx.distance_cm,
                new_measurement: ctx.new_measurement,
                samples: ctx.window.samples().to_vec(),
                window_index: ctx.window.index(),
                discarded: ctx.discarded,
                last_anomaly: ctx.last_anomaly,
            },
        )
    }

    /// Resume from a checkpoint taken from the same sensor.
    ///
    /// Only FSM data is restored; hardware flags stay as the port has them.
    pub fn restore(
        &mut self,
        checkpoint: &Checkpoint<UltrasoundState, UltrasoundSnapshot>,
    ) -> Result<(), CheckpointError> {
        let data = &checkpoint.data;
        if checkpoint.machine != self.machine.name() || data.id != self.ctx.id {
            return Err(CheckpointError::WrongTarget {
                expected: self.ctx.id.to_string(),
                found: format!("{} {}", checkpoint.machine, data.id),
            });
        }
        let window = SampleWindow::from_parts(&data.samples, data.window_index).ok_or_else(|| {
            CheckpointError::ValidationFailed(format!(
                "window of {} samples at index {} does not fit {} slots",
                data.samples.len(),
                data.window_index,
                NUM_MEASUREMENTS
            ))
        })?;

        self.machine
            .restore(checkpoint.current_state, &checkpoint.history, checkpoint.stats);
        let ctx = &mut self.ctx;
        ctx.active = data.active;
        ctx.distance_cm = data.distance_cm;
        ctx.new_measurement = data.new_measurement;
        ctx.window = window;
        ctx.discarded = data.discarded;
        ctx.last_anomaly = data.last_anomaly;
        Ok(())
    }
}

impl<P: UltrasoundPort> Fsm for UltrasoundFsm<P> {
    type State = UltrasoundState;

    fn fire(&mut self) -> FireOutcome<UltrasoundState> {
        UltrasoundFsm::fire(self)
    }

    fn current_state(&self) -> UltrasoundState {
        self.state()
    }

    fn stats(&self) -> &FireStats {
        UltrasoundFsm::stats(self)
    }
}

impl<P: UltrasoundPort> Drop for UltrasoundFsm<P> {
    fn drop(&mut self) {
        self.ctx.port.release_sensor(self.ctx.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{State, StateTransition};
    use crate::hal::Board;
    use crate::port::PortError;

    const ID: SensorId = SensorId::REAR_PARKING;

    fn sensor(board: &Board) -> UltrasoundFsm<&Board> {
        UltrasoundFsm::new(ID, UltrasoundConfig::default(), board).unwrap()
    }

    /// Echo ticks that convert back to exactly `cm`.
    fn ticks_for(cm: u32) -> u32 {
        (cm * 20_000 + 342) / 343
    }

    /// Drive one full cycle from `WaitStart`/`SetDistance` back to `SetDistance`.
    fn measure(fsm: &mut UltrasoundFsm<&Board>, board: &Board, cm: u32) {
        let channel = board.sensor(ID).unwrap();
        board.on_measurement_timer();
        fsm.fire();
        assert_eq!(fsm.state(), UltrasoundState::TriggerStart);

        channel.on_trigger_timer();
        fsm.fire();
        assert_eq!(fsm.state(), UltrasoundState::WaitEchoStart);

        channel.on_echo_capture(100);
        fsm.fire();
        assert_eq!(fsm.state(), UltrasoundState::WaitEchoEnd);

        channel.on_echo_capture(100 + ticks_for(cm));
        fsm.fire();
        assert_eq!(fsm.state(), UltrasoundState::SetDistance);
    }

    #[test]
    fn state_indices_follow_declaration_order() {
        assert_eq!(UltrasoundState::COUNT, 5);
        assert_eq!(UltrasoundState::WaitStart.index(), 0);
        assert_eq!(UltrasoundState::SetDistance.index(), 4);
        assert!(UltrasoundState::WaitStart.is_idle());
    }

    #[test]
    fn inactive_sensor_never_triggers() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        assert!(fsm.is_trigger_ready());

        for _ in 0..10 {
            assert!(!fsm.fire().is_transition());
        }
        assert_eq!(fsm.state(), UltrasoundState::WaitStart);
        assert_eq!(fsm.stats().stalls, 10);
    }

    #[test]
    fn five_samples_yield_the_median() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();

        for cm in [10, 12, 11, 13] {
            measure(&mut fsm, &board, cm);
        }
        assert_eq!(fsm.window_index(), 4);
        assert!(!fsm.new_measurement_ready());
        assert_eq!(fsm.peek_distance(), 0);

        measure(&mut fsm, &board, 9);
        assert_eq!(fsm.window_index(), 0);
        assert!(fsm.new_measurement_ready());
        assert_eq!(fsm.distance(), 11);
        assert!(!fsm.new_measurement_ready());
        assert_eq!(fsm.peek_distance(), 11);
    }

    #[test]
    fn trigger_stop_clears_the_line() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        let channel = board.sensor(ID).unwrap();

        fsm.fire();
        assert!(channel.trigger_high());
        assert!(!fsm.is_trigger_ready());

        channel.on_trigger_timer();
        fsm.fire();
        assert!(!channel.trigger_high());
        assert!(!board.trigger_end(ID));
    }

    #[test]
    fn set_distance_stops_echo_timer_and_resets_ticks() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();

        measure(&mut fsm, &board, 50);

        let channel = board.sensor(ID).unwrap();
        assert!(!channel.echo_timer_running());
        assert_eq!(board.echo_init_tick(ID), 0);
        assert!(!board.echo_received(ID));
    }

    #[test]
    fn overflowing_echo_is_discarded() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        fsm.fire();
        board.sensor(ID).unwrap().on_trigger_timer();
        fsm.fire();

        let channel = board.sensor(ID).unwrap();
        channel.on_echo_capture(10);
        channel.on_echo_overflow();
        channel.on_echo_overflow();
        fsm.fire();
        channel.on_echo_capture(20);
        fsm.fire();

        assert_eq!(fsm.state(), UltrasoundState::SetDistance);
        assert_eq!(fsm.window_index(), 0);
        assert_eq!(fsm.discarded_samples(), 1);
        assert_eq!(
            fsm.last_anomaly(),
            Some(TimingAnomaly::EchoOverflow {
                overflows: 2,
                limit: 1
            })
        );
        assert_eq!(board.echo_overflows(ID), 0);
    }

    #[test]
    fn stop_parks_the_machine_mid_cycle() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        fsm.fire();
        board.sensor(ID).unwrap().on_trigger_timer();
        fsm.fire();
        assert_eq!(fsm.state(), UltrasoundState::WaitEchoStart);

        fsm.stop();
        fsm.fire();

        assert_eq!(fsm.state(), UltrasoundState::WaitStart);
        assert!(!fsm.is_active());
        assert!(!board.measurement_timer_running());
    }

    #[test]
    fn stop_then_start_resets_window_and_distance() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        for cm in [20, 20, 20, 20, 20, 30, 30] {
            measure(&mut fsm, &board, cm);
        }
        assert_eq!(fsm.peek_distance(), 20);
        assert_eq!(fsm.window_index(), 2);

        fsm.stop();
        fsm.fire();
        fsm.start();

        assert_eq!(fsm.window_index(), 0);
        assert_eq!(fsm.peek_distance(), 0);
        assert!(!fsm.new_measurement_ready());
        assert!(fsm.is_trigger_ready());
        assert!(board.measurement_timer_running());
    }

    /// Poll the first cycle forward until the machine sits in `target`.
    fn advance_to(fsm: &mut UltrasoundFsm<&Board>, board: &Board, target: UltrasoundState) {
        let channel = board.sensor(ID).unwrap();
        fsm.fire();
        if fsm.state() != target {
            channel.on_trigger_timer();
            fsm.fire();
        }
        if fsm.state() != target {
            channel.on_echo_capture(100);
            fsm.fire();
        }
        assert_eq!(fsm.state(), target);
    }

    #[test]
    fn stop_then_start_without_a_poll_resumes_measuring() {
        use UltrasoundState::*;

        for in_flight in [TriggerStart, WaitEchoStart, WaitEchoEnd] {
            let board = Board::default();
            let mut fsm = sensor(&board);
            fsm.start();
            advance_to(&mut fsm, &board, in_flight);

            fsm.stop();
            fsm.start();
            assert_eq!(fsm.state(), WaitStart, "from {:?}", in_flight);
            assert!(fsm.is_active());

            for _ in 0..NUM_MEASUREMENTS {
                measure(&mut fsm, &board, 60);
            }
            assert_eq!(fsm.distance(), 60, "from {:?}", in_flight);
        }
    }

    #[test]
    fn stop_returns_to_wait_start_immediately() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        advance_to(&mut fsm, &board, UltrasoundState::WaitEchoEnd);

        fsm.stop();

        assert_eq!(fsm.state(), UltrasoundState::WaitStart);
        assert_eq!(
            fsm.history().last(),
            Some(&StateTransition {
                from: UltrasoundState::WaitEchoEnd,
                to: UltrasoundState::WaitStart,
                fire: fsm.stats().fires,
                dwell: 0,
            })
        );
        assert!(!fsm.fire().is_transition());
    }

    #[test]
    fn echo_rising_at_tick_zero_is_measured() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        let channel = board.sensor(ID).unwrap();

        for _ in 0..NUM_MEASUREMENTS {
            board.on_measurement_timer();
            fsm.fire();
            channel.on_trigger_timer();
            fsm.fire();
            channel.on_echo_capture(0);
            fsm.fire();
            assert_eq!(fsm.state(), UltrasoundState::WaitEchoEnd);
            channel.on_echo_capture(ticks_for(25));
            fsm.fire();
            assert_eq!(fsm.state(), UltrasoundState::SetDistance);
        }

        assert_eq!(fsm.distance(), 25);
    }

    #[test]
    fn overflow_before_the_echo_does_not_lengthen_it() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        let channel = board.sensor(ID).unwrap();

        for _ in 0..NUM_MEASUREMENTS {
            board.on_measurement_timer();
            fsm.fire();
            channel.on_trigger_timer();
            fsm.fire();
            channel.on_echo_overflow();
            channel.on_echo_capture(1_000);
            fsm.fire();
            channel.on_echo_capture(6_831);
            fsm.fire();
        }

        assert_eq!(fsm.discarded_samples(), 0);
        assert_eq!(fsm.distance(), 100);
    }

    #[test]
    fn set_state_recovers_a_lost_echo() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        fsm.fire();
        board.sensor(ID).unwrap().on_trigger_timer();
        fsm.fire();
        board.sensor(ID).unwrap().on_echo_capture(5);
        fsm.fire();
        assert_eq!(fsm.state(), UltrasoundState::WaitEchoEnd);

        for _ in 0..3 {
            fsm.fire();
        }
        assert_eq!(fsm.stats().consecutive_stalls, 3);

        fsm.set_state(UltrasoundState::WaitStart);
        assert_eq!(fsm.state(), UltrasoundState::WaitStart);
        assert_eq!(fsm.stats().consecutive_stalls, 0);
    }

    #[test]
    fn duplicate_sensor_fails_construction() {
        let board = Board::default();
        let _first = sensor(&board);

        let second = UltrasoundFsm::new(ID, UltrasoundConfig::default(), &board);
        assert!(matches!(
            second,
            Err(ConfigError::Port(PortError::SensorInUse(_)))
        ));
    }

    #[test]
    fn invalid_config_fails_before_claiming() {
        let board = Board::default();
        let config = UltrasoundConfig {
            echo_timer_period_ticks: 0,
            ..UltrasoundConfig::default()
        };

        let result = UltrasoundFsm::new(ID, config, &board);

        assert!(matches!(result, Err(ConfigError::InvalidParameter { .. })));
        assert!(!board.sensor(ID).unwrap().is_claimed());
    }

    #[test]
    fn checkpoint_keeps_a_half_filled_window() {
        let board = Board::default();
        let mut fsm = sensor(&board);
        fsm.start();
        for cm in [40, 41, 42] {
            measure(&mut fsm, &board, cm);
        }
        let bytes = fsm.checkpoint().to_bytes().unwrap();
        drop(fsm);

        let mut resumed = sensor(&board);
        let checkpoint = Checkpoint::from_bytes(&bytes).unwrap();
        resumed.restore(&checkpoint).unwrap();

        assert_eq!(resumed.state(), UltrasoundState::SetDistance);
        assert_eq!(resumed.window_index(), 3);
        assert!(resumed.is_active());

        board.start_new_measurement_cycle();
        for cm in [43, 44] {
            measure(&mut resumed, &board, cm);
        }
        assert_eq!(resumed.distance(), 42);
    }
}
