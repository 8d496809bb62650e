//! Tests for link configuration
//!
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test config_tests

use pinlink_firmware::config::{
    ConfigError, LinkConfig, DEFAULT_AIR_RATE_KBPS, DEFAULT_DUTY_CYCLE, DEFAULT_MAX_WINDOW_MS,
    DEFAULT_PREAMBLE_LENGTH, LINK_UPDATE_INTERVAL_TICKS, MIN_DUTY_CYCLE, REGULATORY_MAX_WINDOW,
    ROLE, SEND_INTERVAL_TICKS,
};
use pinlink_firmware::types::Role;

// =============================================================================
// Constant Tests
// =============================================================================

#[test]
fn intervals_are_half_a_timer_wrap() {
    assert_eq!(LINK_UPDATE_INTERVAL_TICKS, 32_768);
    assert_eq!(SEND_INTERVAL_TICKS, 32_768);
}

#[test]
fn regulatory_window_is_400ms() {
    assert_eq!(REGULATORY_MAX_WINDOW, 25_000);
}

#[test]
fn build_role_follows_feature() {
    let expected = if cfg!(feature = "transmit-only") {
        Role::Transmit
    } else {
        Role::Receive
    };
    assert_eq!(ROLE, expected);
}

// =============================================================================
// LinkConfig Tests
// =============================================================================

#[test]
fn defaults() {
    let config = LinkConfig::default();
    assert_eq!(config.role, ROLE);
    assert_eq!(config.air_rate_kbps, DEFAULT_AIR_RATE_KBPS);
    assert_eq!(config.preamble_length, DEFAULT_PREAMBLE_LENGTH);
    assert_eq!(config.duty_cycle, DEFAULT_DUTY_CYCLE);
    assert_eq!(config.max_window_ms, DEFAULT_MAX_WINDOW_MS);
    assert!(!config.lbt_enabled());
}

#[test]
fn defaults_validate() {
    assert!(LinkConfig::new().validate().is_ok());
}

#[test]
fn builders_chain() {
    let config = LinkConfig::new()
        .with_role(Role::Transmit)
        .with_air_rate(128)
        .with_preamble_length(14)
        .with_duty_cycle(50)
        .with_lbt_rssi(40)
        .with_tx_power(27)
        .with_max_window_ms(80)
        .with_num_channels(1);

    assert_eq!(config.role, Role::Transmit);
    assert_eq!(config.air_rate().map(|r| r.as_kbps()), Some(128));
    assert_eq!(config.preamble_length, 14);
    assert_eq!(config.duty_cycle, 50);
    assert!(config.lbt_enabled());
    assert_eq!(config.tx_power_dbm, 27);
    assert_eq!(config.max_window_ms, 80);
    assert_eq!(config.num_channels, 1);
}

#[test]
fn duty_cycle_bounds() {
    assert!(LinkConfig::new().with_duty_cycle(MIN_DUTY_CYCLE).validate().is_ok());
    assert!(LinkConfig::new().with_duty_cycle(100).validate().is_ok());
    assert_eq!(
        LinkConfig::new().with_duty_cycle(19).validate(),
        Err(ConfigError::DutyCycleOutOfRange(19))
    );
    assert_eq!(
        LinkConfig::new().with_duty_cycle(101).validate(),
        Err(ConfigError::DutyCycleOutOfRange(101))
    );
}

#[test]
fn preamble_bounds() {
    assert!(LinkConfig::new().with_preamble_length(6).validate().is_ok());
    assert!(LinkConfig::new().with_preamble_length(64).validate().is_ok());
    assert_eq!(
        LinkConfig::new().with_preamble_length(5).validate(),
        Err(ConfigError::PreambleOutOfRange(5))
    );
    assert_eq!(
        LinkConfig::new().with_preamble_length(65).validate(),
        Err(ConfigError::PreambleOutOfRange(65))
    );
}

#[test]
fn zero_air_rate_rejected() {
    let config = LinkConfig::new().with_air_rate(0);
    assert!(config.air_rate().is_none());
    assert_eq!(config.validate(), Err(ConfigError::InvalidAirRate));
}

#[test]
fn zero_max_window_rejected() {
    assert_eq!(
        LinkConfig::new().with_max_window_ms(0).validate(),
        Err(ConfigError::MaxWindowZero)
    );
}

#[test]
fn first_error_reported() {
    let config = LinkConfig::new().with_duty_cycle(0).with_air_rate(0);
    assert_eq!(config.validate(), Err(ConfigError::DutyCycleOutOfRange(0)));
}

#[test]
fn error_display() {
    assert_eq!(
        ConfigError::DutyCycleOutOfRange(5).to_string(),
        "duty cycle 5% outside 20..=100%"
    );
    assert_eq!(ConfigError::InvalidAirRate.to_string(), "air rate must be non-zero");
}
