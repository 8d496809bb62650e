//! Pin-State Link Main Application
//!
//! Entry point for the STM32G474-based link endpoint.
//! Brings up the board, then hands it to the link scheduler for good.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::gpio::{Flex, Level, Output, Speed};
use embassy_stm32::usart::{self, Uart};
use {defmt_rtt as _, panic_probe as _};

use pinlink_firmware::drivers::uart_radio::{PaThermistor, UartRadio};
use pinlink_firmware::hal::gpio::{FlexPins, LinkLeds};
use pinlink_firmware::hal::timer::EmbassyTickClock;
use pinlink_firmware::pins::PinMonitor;
use pinlink_firmware::prelude::*;
use pinlink_firmware::radio::integrity::{IntegrityMonitor, Sentinel};
use pinlink_firmware::radio::link::NoConsole;
use pinlink_firmware::radio::scheduler::LinkIo;
use pinlink_firmware::radio::signals::LinkSignals;

/// Flags shared with the pin hook and receive path
static SIGNALS: LinkSignals = LinkSignals::new();

/// Last static below the stack limit (canary.x puts `.stack_canary` after `.uninit`)
#[link_section = ".stack_canary"]
static STACK_CANARY: Sentinel = Sentinel::new();

/// Alone at the bottom of RAM, below `.data`
#[link_section = ".data_canary"]
static DATA_CANARY: Sentinel = Sentinel::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("PinLink firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(embassy_stm32::Config::default());

    let config = match LinkConfig::new().validate() {
        Ok(config) => config,
        Err(err) => defmt::panic!("invalid link config: {}", err),
    };
    let Some(air_rate) = config.air_rate() else {
        defmt::panic!("invalid air rate");
    };
    info!("{}", config);

    // Status LEDs: PA5 radio (green), PA6 activity (red)
    let leds = LinkLeds::new(
        Output::new(p.PA5, Level::Low, Speed::Low),
        Output::new(p.PA6, Level::Low, Speed::Low),
    );

    // User pins 0-5; 4 selects console mode, 5 is its ground
    let user_pins = FlexPins::new([
        Flex::new(p.PB0),
        Flex::new(p.PB1),
        Flex::new(p.PB2),
        Flex::new(p.PB10),
        Flex::new(p.PB11),
        Flex::new(p.PB12),
    ]);
    let mut pins = PinMonitor::new(config.role, user_pins);
    pins.init(&SIGNALS);

    // Modem on USART1: PC4 = TX, PC5 = RX
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = RADIO_UART_BAUD;
    let uart = match Uart::new_blocking(p.USART1, p.PC5, p.PC4, uart_config) {
        Ok(uart) => uart,
        Err(err) => defmt::panic!("radio UART: {}", err),
    };

    // PA thermistor on PA0 (ADC1_IN1)
    let thermistor = PaThermistor::new(Adc::new(p.ADC1), p.PA0.degrade_adc());
    let radio = UartRadio::new(uart, thermistor, air_rate, config.tx_power_dbm);

    let integrity = IntegrityMonitor::new(&STACK_CANARY, &DATA_CANARY);
    info!(
        "canaries: stack {=usize:#x}, data {=usize:#x}",
        core::ptr::addr_of!(STACK_CANARY) as usize,
        core::ptr::addr_of!(DATA_CANARY) as usize
    );
    let io = LinkIo {
        radio,
        clock: EmbassyTickClock::new(),
        leds,
        pins,
        console: NoConsole,
    };
    let mut scheduler = match LinkScheduler::new(&config, io, &SIGNALS, integrity) {
        Ok(scheduler) => scheduler,
        Err(err) => defmt::panic!("link setup: {}", err),
    };

    info!("link up as {}", scheduler.role());
    let fault = scheduler.run().await;
    defmt::panic!("{}", fault);
}
