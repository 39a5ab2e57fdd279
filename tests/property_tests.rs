//! Property-based tests for the FSM engine and the parking FSMs.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use parkassist::button::{ButtonFsm, ButtonState};
use parkassist::config::{ButtonConfig, UltrasoundConfig, NUM_MEASUREMENTS};
use parkassist::core::{State, HISTORY_CAPACITY};
use parkassist::hal::Board;
use parkassist::port::{ButtonId, SensorId, UltrasoundPort};
use parkassist::ultrasound::{median, ticks_to_cm, SampleWindow, UltrasoundFsm, UltrasoundState};
use proptest::prelude::*;

prop_compose! {
    fn arbitrary_ultrasound_state()(variant in 0..5u8) -> UltrasoundState {
        match variant {
            0 => UltrasoundState::WaitStart,
            1 => UltrasoundState::TriggerStart,
            2 => UltrasoundState::WaitEchoStart,
            3 => UltrasoundState::WaitEchoEnd,
            _ => UltrasoundState::SetDistance,
        }
    }
}

fn ticks_for(cm: u32) -> u32 {
    (cm * 20_000 + 342) / 343
}

proptest! {
    #[test]
    fn stalled_fires_never_move_the_machine(
        state in arbitrary_ultrasound_state(),
        fires in 1..50usize,
    ) {
        // The sensor is active but no hardware flag is raised, so no guard holds.
        let board = Board::default();
        let mut fsm = UltrasoundFsm::new(SensorId::REAR_PARKING, UltrasoundConfig::default(), &board).unwrap();
        fsm.set_active(true);
        board.set_trigger_ready(SensorId::REAR_PARKING, false);
        fsm.set_state(state);

        for _ in 0..fires {
            prop_assert!(!fsm.fire().is_transition());
        }
        prop_assert_eq!(fsm.state(), state);
        prop_assert_eq!(fsm.stats().stalls, fires as u64);
    }

    #[test]
    fn state_index_is_within_count(state in arbitrary_ultrasound_state()) {
        prop_assert!(state.index() < UltrasoundState::COUNT);
    }

    #[test]
    fn window_index_stays_in_range(samples in prop::collection::vec(0..500u32, 0..40)) {
        let mut window = SampleWindow::<NUM_MEASUREMENTS>::new();
        for sample in samples {
            window.push(sample);
            prop_assert!(window.index() < NUM_MEASUREMENTS);
        }
    }

    #[test]
    fn median_splits_the_window(mut samples in prop::collection::vec(any::<u32>(), 5)) {
        let m = median(&mut samples.clone());
        let below = samples.iter().filter(|&&s| s <= m).count();
        let above = samples.iter().filter(|&&s| s >= m).count();
        prop_assert!(below >= 3);
        prop_assert!(above >= 3);
        samples.sort_unstable();
        prop_assert_eq!(m, samples[2]);
    }

    #[test]
    fn conversion_round_trips_whole_centimetres(cm in 0..1_000u32) {
        prop_assert_eq!(ticks_to_cm(u64::from(ticks_for(cm)), 343), cm);
    }

    #[test]
    fn full_windows_report_their_median(
        distances in prop::collection::vec(2..400u32, NUM_MEASUREMENTS..4 * NUM_MEASUREMENTS),
    ) {
        let board = Board::default();
        let channel = board.sensor(SensorId::REAR_PARKING).unwrap();
        let mut fsm = UltrasoundFsm::new(SensorId::REAR_PARKING, UltrasoundConfig::default(), &board).unwrap();
        fsm.start();

        for &cm in &distances {
            board.on_measurement_timer();
            fsm.fire();
            channel.on_trigger_timer();
            fsm.fire();
            channel.on_echo_capture(7);
            fsm.fire();
            channel.on_echo_capture(7 + ticks_for(cm));
            fsm.fire();
            prop_assert_eq!(fsm.state(), UltrasoundState::SetDistance);
            prop_assert!(fsm.window_index() < NUM_MEASUREMENTS);
        }

        let completed = distances.len() / NUM_MEASUREMENTS;
        let last_window = &distances[(completed - 1) * NUM_MEASUREMENTS..completed * NUM_MEASUREMENTS];
        let expected = median(&mut last_window.to_vec());
        prop_assert_eq!(fsm.peek_distance(), expected);
        prop_assert_eq!(fsm.window_index(), distances.len() % NUM_MEASUREMENTS);
    }

    #[test]
    fn bounce_shorter_than_debounce_stays_in_wait(
        debounce in 10..200u32,
        bounces in prop::collection::vec(any::<bool>(), 1..30),
    ) {
        let board = Board::default();
        let line = board.button(ButtonId::PARKING).unwrap();
        let mut fsm = ButtonFsm::new(ButtonId::PARKING, ButtonConfig::with_debounce(debounce), &board).unwrap();

        line.set_pressed(true);
        fsm.fire();
        prop_assert_eq!(fsm.state(), ButtonState::PressedWait);

        let step = (debounce - 1) / bounces.len() as u32;
        for pressed in bounces {
            board.clock().advance(step);
            line.set_pressed(pressed);
            fsm.fire();
            prop_assert_eq!(fsm.state(), ButtonState::PressedWait);
        }
    }

    #[test]
    fn held_press_reaches_pressed_within_one_interval(
        debounce in 1..500u32,
        start in any::<u32>(),
        poll in 1..20u32,
    ) {
        let board = Board::default();
        board.clock().set_ms(start);
        let line = board.button(ButtonId::PARKING).unwrap();
        let mut fsm = ButtonFsm::new(ButtonId::PARKING, ButtonConfig::with_debounce(debounce), &board).unwrap();

        line.set_pressed(true);
        fsm.fire();

        let mut waited = 0;
        while fsm.state() != ButtonState::Pressed {
            prop_assert!(waited < debounce + poll);
            board.clock().advance(poll);
            waited += poll;
            fsm.fire();
        }

        let hold = 1_000;
        board.clock().advance(hold);
        line.set_pressed(false);
        fsm.fire();
        prop_assert_eq!(fsm.duration(), waited + hold);
    }

    #[test]
    fn history_never_exceeds_capacity(presses in 1..40usize) {
        let board = Board::default();
        let line = board.button(ButtonId::PARKING).unwrap();
        let mut fsm = ButtonFsm::new(ButtonId::PARKING, ButtonConfig::with_debounce(1), &board).unwrap();

        for _ in 0..presses {
            line.set_pressed(true);
            fsm.fire();
            board.clock().advance(1);
            fsm.fire();
            line.set_pressed(false);
            fsm.fire();
            board.clock().advance(1);
            fsm.fire();
        }

        prop_assert!(fsm.history().len() <= HISTORY_CAPACITY);
        prop_assert_eq!(fsm.stats().transitions, 4 * presses as u64);
        prop_assert_eq!(fsm.state(), ButtonState::Released);
    }
}
