//! Parking Assist Main Loop
//!
//! This example polls the parking button and the rear ultrasonic sensor
//! against the reference board, with interrupts simulated between polls.
//!
//! Key concepts:
//! - Both FSMs share one `Board` by reference
//! - Interrupt handlers only raise flags and store timer ticks
//! - A full press and release toggles parking mode
//! - A distance is reported once per window of five samples
//!
//! Run with: cargo run --example parking_loop

use parkassist::button::{ButtonFsm, ButtonState};
use parkassist::config::{ButtonConfig, UltrasoundConfig, ECHO_TIMER_PERIOD_TICKS};
use parkassist::hal::Board;
use parkassist::port::{ButtonId, SensorId};
use parkassist::ultrasound::{UltrasoundFsm, UltrasoundState};
use parkassist::FireOutcome;

const MEASUREMENT_PERIOD_MS: u32 = 60;

/// Echo length in 1 µs timer ticks for an obstacle `cm` away.
fn echo_ticks(cm: u32) -> u32 {
    (cm * 20_000 + 342) / 343
}

fn main() {
    println!("=== Parking Assist Main Loop ===\n");

    let board = Board::default();
    let mut button =
        ButtonFsm::new(ButtonId::PARKING, ButtonConfig::default(), &board).unwrap();
    let mut sensor =
        UltrasoundFsm::new(SensorId::REAR_PARKING, UltrasoundConfig::default(), &board).unwrap();
    let line = board.button(ButtonId::PARKING).unwrap();
    let channel = board.sensor(SensorId::REAR_PARKING).unwrap();

    println!("Button debounce: {} ms", button.debounce_ms());
    println!("Sensor state: {:?}\n", sensor.state());

    let mut obstacle_cm = 150;
    let mut parking = false;

    for ms in 0..4_000u32 {
        board.on_systick();
        if ms % MEASUREMENT_PERIOD_MS == 0 {
            board.on_measurement_timer();
        }

        // Two presses: parking mode on, then off again.
        match ms {
            100 | 3_200 => line.on_edge(false),
            400 | 3_500 => line.on_edge(true),
            _ => {}
        }

        if let FireOutcome::Transitioned {
            to: ButtonState::Released,
            ..
        } = button.fire()
        {
            parking = !parking;
            if parking {
                sensor.start();
            } else {
                sensor.stop();
            }
            println!(
                "[{:>4} ms] button held {} ms, parking mode {}",
                ms,
                button.duration(),
                if parking { "on" } else { "off" }
            );
        }

        sensor.fire();
        match sensor.state() {
            UltrasoundState::TriggerStart => channel.on_trigger_timer(),
            UltrasoundState::WaitEchoStart => {
                let rise = (ms * 1_000) % ECHO_TIMER_PERIOD_TICKS;
                let mut fall = rise + echo_ticks(obstacle_cm);
                channel.on_echo_capture(rise);
                if fall >= ECHO_TIMER_PERIOD_TICKS {
                    channel.on_echo_overflow();
                    fall -= ECHO_TIMER_PERIOD_TICKS;
                }
                channel.on_echo_capture(fall);
                obstacle_cm = obstacle_cm.saturating_sub(2).max(20);
            }
            UltrasoundState::SetDistance if sensor.new_measurement_ready() => {
                println!("[{:>4} ms] obstacle at {} cm", ms, sensor.distance());
            }
            _ => {}
        }
    }

    println!("\nFinal sensor state: {:?}", sensor.state());
    println!("Sensor transitions: {}", sensor.stats().transitions);
    println!("Samples discarded: {}", sensor.discarded_samples());

    println!("\n=== Example Complete ===");
}
