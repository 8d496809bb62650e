//! Tests for TDM window timing
//!
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test timing_tests

use pinlink_firmware::config::{ConfigError, LinkConfig, MAX_PACKET_LENGTH, MAX_WINDOW_FIELD};
use pinlink_firmware::radio::timing::{TimingParameters, WindowInputs};
use pinlink_firmware::types::AirRate;

fn inputs(kbps: u8, preamble: u8) -> WindowInputs {
    WindowInputs {
        air_rate: AirRate::from_kbps(kbps).unwrap(),
        preamble_length: preamble,
        lbt: false,
        max_window_ms: 131,
        num_channels: 20,
    }
}

// =============================================================================
// Derivation Tests
// =============================================================================

#[test]
fn default_link_timing() {
    let timing = TimingParameters::calculate(&inputs(64, 10));
    assert_eq!(timing.ticks_per_byte(), 9);
    assert_eq!(timing.packet_latency(), 130);
    assert_eq!(timing.silence_period(), 260);
    assert_eq!(timing.max_data_packet_length(), 250);
    assert_eq!(timing.tx_window_width(), 7_140);
    assert_eq!(timing.lbt_min_time(), 0);
    assert_eq!(timing.trailing_gap(), 130);
}

#[test]
fn deterministic() {
    for kbps in [2, 4, 8, 16, 19, 24, 32, 48, 64, 96, 128, 192, 250] {
        for preamble in 6..=64 {
            let a = TimingParameters::calculate(&inputs(kbps, preamble));
            let b = TimingParameters::calculate(&inputs(kbps, preamble));
            assert_eq!(a, b);
        }
    }
}

#[test]
fn slow_air_rate_ticks_per_byte() {
    // (8 + 4000) / 16 + 1
    let timing = TimingParameters::calculate(&inputs(2, 10));
    assert_eq!(timing.ticks_per_byte(), 251);
    assert_eq!(timing.packet_latency(), 13 * 251 + 13);
}

// =============================================================================
// Preamble Adjustment Tests
// =============================================================================

#[test]
fn longer_preamble_adds_latency() {
    let timing = TimingParameters::calculate(&inputs(64, 14));
    assert_eq!(timing.packet_latency(), 148);
    assert_eq!(timing.silence_period(), 296);
}

#[test]
fn shorter_preamble_reduces_latency() {
    let timing = TimingParameters::calculate(&inputs(64, 6));
    assert_eq!(timing.packet_latency(), 112);
}

#[test]
fn odd_preamble_rounds_toward_zero() {
    assert_eq!(TimingParameters::calculate(&inputs(64, 7)).packet_latency(), 121);
    assert_eq!(TimingParameters::calculate(&inputs(64, 11)).packet_latency(), 130);
}

// =============================================================================
// Window Cap Tests
// =============================================================================

#[test]
fn window_capped_by_configured_maximum() {
    let timing = TimingParameters::calculate(&WindowInputs {
        max_window_ms: 50,
        ..inputs(64, 10)
    });
    // 50 ms = 3125 ticks
    assert_eq!(timing.tx_window_width(), 3_125);
}

#[test]
fn window_capped_to_field_width() {
    let timing = TimingParameters::calculate(&WindowInputs {
        max_window_ms: 1_000,
        num_channels: 1,
        ..inputs(2, 10)
    });
    assert_eq!(u32::from(timing.tx_window_width()), MAX_WINDOW_FIELD);
}

#[test]
fn window_never_exceeds_field() {
    for kbps in [2, 16, 64, 250] {
        for channels in [1, 50] {
            let timing = TimingParameters::calculate(&WindowInputs {
                max_window_ms: u16::MAX,
                num_channels: channels,
                ..inputs(kbps, 64)
            });
            assert!(u32::from(timing.tx_window_width()) <= MAX_WINDOW_FIELD);
        }
    }
}

#[test]
fn lbt_sets_listen_time() {
    let plain = TimingParameters::calculate(&inputs(64, 10));
    let lbt = TimingParameters::calculate(&WindowInputs {
        lbt: true,
        ..inputs(64, 10)
    });
    // 5000 us / 16
    assert_eq!(lbt.lbt_min_time(), 312);
    assert!(lbt.tx_window_width() >= plain.tx_window_width());
}

// =============================================================================
// Flight Time Tests
// =============================================================================

#[test]
fn pin_packet_flight_time() {
    let timing = TimingParameters::calculate(&inputs(64, 10));
    assert_eq!(timing.flight_time_estimate(3), 157);
}

#[test]
fn flight_time_saturates() {
    let timing = TimingParameters::calculate(&inputs(2, 64));
    assert_eq!(timing.flight_time_estimate(MAX_PACKET_LENGTH), u16::MAX);
    assert_eq!(timing.flight_time_estimate(usize::MAX), u16::MAX);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn from_config_matches_inputs() {
    let config = LinkConfig::new()
        .with_air_rate(64)
        .with_preamble_length(10)
        .with_max_window_ms(131)
        .with_num_channels(20);
    assert_eq!(
        TimingParameters::from_config(&config),
        Ok(TimingParameters::calculate(&inputs(64, 10)))
    );
}

#[test]
fn from_config_rejects_zero_rate() {
    let config = LinkConfig::new().with_air_rate(0);
    assert_eq!(
        TimingParameters::from_config(&config),
        Err(ConfigError::InvalidAirRate)
    );
}
