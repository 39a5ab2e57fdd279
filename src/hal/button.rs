//! Push-button line.

use crate::hal::cell::AtomicFlag;

/// One button input with its edge-interrupt state.
#[derive(Debug)]
pub struct ButtonLine {
    pressed: AtomicFlag,
    active_low: bool,
    claimed: AtomicFlag,
}

impl Default for ButtonLine {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ButtonLine {
    /// `active_low`: the pin reads low while the button is held (pull-up
    /// wiring, as on the reference board's user button).
    pub const fn new(active_low: bool) -> Self {
        ButtonLine {
            pressed: AtomicFlag::new(false),
            active_low,
            claimed: AtomicFlag::new(false),
        }
    }

    /// EXTI ISR: the pin changed level and now reads `pin_high`.
    pub fn on_edge(&self, pin_high: bool) {
        self.pressed.set(pin_high != self.active_low);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.get()
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.set(pressed);
    }

    /// Returns `false` if the line was already claimed.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.replace(true)
    }

    pub(crate) fn release(&self) {
        self.claimed.set(false);
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_low_line_is_pressed_when_pin_low() {
        let line = ButtonLine::new(true);
        line.on_edge(false);
        assert!(line.is_pressed());
        line.on_edge(true);
        assert!(!line.is_pressed());
    }

    #[test]
    fn active_high_line_is_pressed_when_pin_high() {
        let line = ButtonLine::new(false);
        line.on_edge(true);
        assert!(line.is_pressed());
    }

    #[test]
    fn claim_is_exclusive_until_released() {
        let line = ButtonLine::default();
        assert!(line.claim());
        assert!(!line.claim());
        line.release();
        assert!(line.claim());
    }
}
