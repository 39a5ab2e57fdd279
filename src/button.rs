//! Debounced push-button FSM.
//!
//! ```text
//! Released --pressed--> PressedWait --deadline--> Pressed
//!    ^                                               |
//!    +---deadline--- ReleasedWait <----released------+
//! ```
//!
//! A level change is only accepted once the debounce deadline set on entry
//! to the wait state has been reached, so contact bounce shorter than the
//! interval never gets past the wait states.

use crate::builder::{BuildError, MachineBuilder, TransitionBuilder};
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::config::ButtonConfig;
use crate::core::TransitionHistory;
use crate::error::ConfigError;
use crate::machine::{FireOutcome, FireStats, Fsm, Machine};
use crate::port::{ButtonId, ButtonPort};
use crate::state_enum;
use log::{debug, info};
use serde::{Deserialize, Serialize};

state_enum! {
    /// States of the button FSM, in index order.
    pub enum ButtonState {
        Released,
        ReleasedWait,
        Pressed,
        PressedWait,
    }
    idle: [Released]
}

/// Data the button transitions read and write.
pub struct ButtonContext<P> {
    port: P,
    id: ButtonId,
    debounce_ms: u32,
    next_timeout: u32,
    tick_pressed: u32,
    duration: u32,
}

/// Checkpointed button data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSnapshot {
    pub id: ButtonId,
    pub debounce_ms: u32,
    pub next_timeout: u32,
    pub tick_pressed: u32,
    pub duration: u32,
}

/// `now` is at or past `deadline`, treating the millisecond clock as wrapping.
fn deadline_reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) as i32 >= 0
}

fn is_pressed<P: ButtonPort>(ctx: &ButtonContext<P>) -> bool {
    ctx.port.is_pressed(ctx.id)
}

fn is_released<P: ButtonPort>(ctx: &ButtonContext<P>) -> bool {
    !ctx.port.is_pressed(ctx.id)
}

fn timeout_elapsed<P: ButtonPort>(ctx: &ButtonContext<P>) -> bool {
    deadline_reached(ctx.port.now_ms(), ctx.next_timeout)
}

fn on_press<P: ButtonPort>(ctx: &mut ButtonContext<P>) {
    let now = ctx.port.now_ms();
    ctx.tick_pressed = now;
    ctx.next_timeout = now.wrapping_add(ctx.debounce_ms);
}

fn on_release<P: ButtonPort>(ctx: &mut ButtonContext<P>) {
    let now = ctx.port.now_ms();
    ctx.duration = now.wrapping_sub(ctx.tick_pressed);
    ctx.next_timeout = now.wrapping_add(ctx.debounce_ms);
    debug!("{} held for {} ms", ctx.id, ctx.duration);
}

fn button_machine<P: ButtonPort>() -> Result<Machine<ButtonState, ButtonContext<P>>, BuildError> {
    use ButtonState::*;

    MachineBuilder::<ButtonState, ButtonContext<P>>::new()
        .named("button")
        .transition(
            TransitionBuilder::new()
                .from(Released)
                .to(PressedWait)
                .when(is_pressed::<P>)
                .then(on_press::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(PressedWait)
                .to(Pressed)
                .when(timeout_elapsed::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(Pressed)
                .to(ReleasedWait)
                .when(is_released::<P>)
                .then(on_release::<P>),
        )?
        .transition(
            TransitionBuilder::new()
                .from(ReleasedWait)
                .to(Released)
                .when(timeout_elapsed::<P>),
        )?
        .build()
}

/// Debounced reader for one button line.
///
/// The FSM claims its line on construction and releases it when dropped.
///
/// # Example
///
/// ```
/// use parkassist::button::{ButtonFsm, ButtonState};
/// use parkassist::config::ButtonConfig;
/// use parkassist::hal::Board;
/// use parkassist::port::ButtonId;
///
/// let board = Board::default();
/// let mut button = ButtonFsm::new(ButtonId::PARKING, ButtonConfig::with_debounce(50), &board).unwrap();
///
/// board.button(ButtonId::PARKING).unwrap().set_pressed(true);
/// button.fire();
/// assert_eq!(button.state(), ButtonState::PressedWait);
///
/// board.clock().advance(50);
/// button.fire();
/// assert_eq!(button.state(), ButtonState::Pressed);
/// ```
pub struct ButtonFsm<P: ButtonPort> {
    machine: Machine<ButtonState, ButtonContext<P>>,
    ctx: ButtonContext<P>,
}

impl<P: ButtonPort> ButtonFsm<P> {
    /// Create the FSM in `Released` and claim `id` on `port`.
    pub fn new(id: ButtonId, config: ButtonConfig, port: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let machine = button_machine::<P>()?;
        port.init_button(id)?;

        info!("{}: debounce {} ms", id, config.debounce_ms);
        Ok(Self {
            machine,
            ctx: ButtonContext {
                port,
                id,
                debounce_ms: config.debounce_ms,
                next_timeout: 0,
                tick_pressed: 0,
                duration: 0,
            },
        })
    }

    pub fn fire(&mut self) -> FireOutcome<ButtonState> {
        self.machine.fire(&mut self.ctx)
    }

    pub fn state(&self) -> ButtonState {
        self.machine.current_state()
    }

    /// `false` only while the button rests in `Released`.
    pub fn check_activity(&self) -> bool {
        self.state() != ButtonState::Released
    }

    /// Duration of the last completed press, in ms.
    pub fn duration(&self) -> u32 {
        self.ctx.duration
    }

    pub fn reset_duration(&mut self) {
        self.ctx.duration = 0;
    }

    pub fn debounce_ms(&self) -> u32 {
        self.ctx.debounce_ms
    }

    pub fn id(&self) -> ButtonId {
        self.ctx.id
    }

    /// Deadline of the current wait state, in clock ms.
    pub fn next_timeout(&self) -> u32 {
        self.ctx.next_timeout
    }

    pub fn port(&self) -> &P {
        &self.ctx.port
    }

    /// Force the FSM into `state`.
    pub fn set_state(&mut self, state: ButtonState) {
        self.machine.set_state(state);
    }

    pub fn stats(&self) -> &FireStats {
        self.machine.stats()
    }

    pub fn history(&self) -> &TransitionHistory<ButtonState> {
        self.machine.history()
    }

    pub fn checkpoint(&self) -> Checkpoint<ButtonState, ButtonSnapshot> {
        Checkpoint::capture(
            &self.machine,
            ButtonSnapshot {
                id: self.ctx.id,
                debounce_ms: self.ctx.debounce_ms,
                next_timeout: self.ctx.next_timeout,
                tick_pressed: self.ctx.tick_pressed,
                duration: self.ctx.duration,
            },
        )
    }

    /// Resume from a checkpoint taken from the same button.
    pub fn restore(
        &mut self,
        checkpoint: &Checkpoint<ButtonState, ButtonSnapshot>,
    ) -> Result<(), CheckpointError> {
        let data = &checkpoint.data;
        if checkpoint.machine != self.machine.name() || data.id != self.ctx.id {
            return Err(CheckpointError::WrongTarget {
                expected: self.ctx.id.to_string(),
                found: format!("{} {}", checkpoint.machine, data.id),
            });
        }
        if data.debounce_ms != self.ctx.debounce_ms {
            return Err(CheckpointError::ValidationFailed(format!(
                "debounce {} ms does not match the configured {} ms",
                data.debounce_ms, self.ctx.debounce_ms
            )));
        }

        self.machine
            .restore(checkpoint.current_state, &checkpoint.history, checkpoint.stats);
        self.ctx.next_timeout = data.next_timeout;
        self.ctx.tick_pressed = data.tick_pressed;
        self.ctx.duration = data.duration;
        Ok(())
    }
}

impl<P: ButtonPort> Fsm for ButtonFsm<P> {
    type State = ButtonState;

    fn fire(&mut self) -> FireOutcome<ButtonState> {
        ButtonFsm::fire(self)
    }

    fn current_state(&self) -> ButtonState {
        self.state()
    }

    fn stats(&self) -> &FireStats {
        ButtonFsm::stats(self)
    }
}

impl<P: ButtonPort> Drop for ButtonFsm<P> {
    fn drop(&mut self) {
        self.ctx.port.release_button(self.ctx.id);
    }
}
