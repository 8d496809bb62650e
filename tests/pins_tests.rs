//! Tests for the pin change detector
//!
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test pins_tests

use std::cell::RefCell;
use std::rc::Rc;

use pinlink_firmware::pins::{PinMonitor, UserPins};
use pinlink_firmware::protocol::PinStatePacket;
use pinlink_firmware::radio::link::PinHook;
use pinlink_firmware::radio::signals::LinkSignals;
use pinlink_firmware::types::{PinDirection, Role};

/// Simulated board: inputs are what the outside world drives
#[derive(Default)]
struct Board {
    inputs: Vec<bool>,
    levels: Vec<bool>,
    directions: Vec<Option<PinDirection>>,
    level_writes: u32,
}

struct BoardPins(Rc<RefCell<Board>>);

impl UserPins for BoardPins {
    fn count(&self) -> u8 {
        u8::try_from(self.0.borrow().inputs.len()).unwrap()
    }

    fn set_direction(&mut self, pin: u8, direction: PinDirection) -> bool {
        match self.0.borrow_mut().directions.get_mut(usize::from(pin)) {
            Some(slot) => {
                *slot = Some(direction);
                true
            }
            None => false,
        }
    }

    fn set_level(&mut self, pin: u8, high: bool) -> bool {
        let mut board = self.0.borrow_mut();
        board.level_writes += 1;
        match board.levels.get_mut(usize::from(pin)) {
            Some(level) => {
                *level = high;
                true
            }
            None => false,
        }
    }

    fn read(&mut self, pin: u8) -> Option<bool> {
        let board = self.0.borrow();
        let index = usize::from(pin);
        match board.directions.get(index)? {
            Some(PinDirection::Output) => Some(board.levels[index]),
            _ => Some(board.inputs[index]),
        }
    }
}

fn board(pins: usize) -> Rc<RefCell<Board>> {
    Rc::new(RefCell::new(Board {
        inputs: vec![false; pins],
        levels: vec![false; pins],
        directions: vec![None; pins],
        level_writes: 0,
    }))
}

fn monitor(role: Role, board: &Rc<RefCell<Board>>, signals: &LinkSignals) -> PinMonitor<BoardPins> {
    let mut monitor = PinMonitor::new(role, BoardPins(Rc::clone(board)));
    monitor.init(signals);
    monitor
}

// =============================================================================
// Initialisation Tests
// =============================================================================

#[test]
fn transmitter_pins_are_pulled_up_inputs() {
    let signals = LinkSignals::new();
    let board = board(4);
    monitor(Role::Transmit, &board, &signals);

    let board = board.borrow();
    assert!(board.directions.iter().all(|d| *d == Some(PinDirection::Input)));
    assert!(board.levels.iter().all(|&l| l));
}

#[test]
fn receiver_pins_are_low_outputs() {
    let signals = LinkSignals::new();
    let board = board(4);
    monitor(Role::Receive, &board, &signals);

    let board = board.borrow();
    assert!(board.directions.iter().all(|d| *d == Some(PinDirection::Output)));
    assert!(board.levels.iter().all(|&l| !l));
}

#[test]
fn console_pins_configured_on_six_pin_board() {
    let signals = LinkSignals::new();
    let board = board(6);
    monitor(Role::Receive, &board, &signals);

    let board = board.borrow();
    assert_eq!(board.directions[4], Some(PinDirection::Input));
    assert!(board.levels[4], "console pin pull-up");
    assert_eq!(board.directions[5], Some(PinDirection::Output));
    assert!(!board.levels[5]);
}

#[test]
fn packet_seeded_with_pin_count() {
    let signals = LinkSignals::new();
    monitor(Role::Transmit, &board(6), &signals);
    let packet = signals.packet();
    assert_eq!(packet.pin_count(), 4);
    assert!(packet.is_valid());

    let signals = LinkSignals::new();
    monitor(Role::Transmit, &board(2), &signals);
    assert_eq!(signals.packet().pin_count(), 2);
}

// =============================================================================
// Transmit Role Tests
// =============================================================================

#[test]
fn first_sample_requests_update() {
    let signals = LinkSignals::new();
    let board = board(4);
    let mut monitor = monitor(Role::Transmit, &board, &signals);
    board.borrow_mut().inputs = vec![true, false, true, false];

    monitor.check(&signals);
    assert_eq!(signals.packet().pin_state(), 0b0101);
    assert!(signals.take_update());
}

#[test]
fn unchanged_pins_do_not_request_update() {
    let signals = LinkSignals::new();
    let board = board(4);
    let mut monitor = monitor(Role::Transmit, &board, &signals);
    board.borrow_mut().inputs = vec![true, true, false, false];

    monitor.check(&signals);
    assert!(signals.take_update());
    monitor.check(&signals);
    monitor.check(&signals);
    assert!(!signals.take_update());
}

#[test]
fn pin_change_requests_update() {
    let signals = LinkSignals::new();
    let board = board(4);
    let mut monitor = monitor(Role::Transmit, &board, &signals);

    monitor.check(&signals);
    assert!(!signals.take_update(), "all low matches the seeded packet");

    board.borrow_mut().inputs[3] = true;
    monitor.check(&signals);
    assert!(signals.take_update());
    assert_eq!(signals.packet().pin_state(), 0b1000);
}

#[test]
fn only_first_four_pins_sampled() {
    let signals = LinkSignals::new();
    let board = board(6);
    let mut monitor = monitor(Role::Transmit, &board, &signals);
    board.borrow_mut().inputs = vec![false, false, false, false, false, true];

    monitor.check(&signals);
    assert_eq!(signals.packet().pin_state(), 0);
    assert!(!signals.take_update());
}

// =============================================================================
// Receive Role Tests
// =============================================================================

#[test]
fn valid_packet_drives_outputs() {
    let signals = LinkSignals::new();
    let board = board(4);
    let mut monitor = monitor(Role::Receive, &board, &signals);

    signals.set_packet(PinStatePacket::new(4, 0b1010));
    monitor.check(&signals);
    assert_eq!(board.borrow().levels, vec![false, true, false, true]);
}

#[test]
fn repeated_packets_are_idempotent() {
    let signals = LinkSignals::new();
    let board = board(4);
    let mut monitor = monitor(Role::Receive, &board, &signals);
    let after_init = board.borrow().level_writes;

    signals.set_packet(PinStatePacket::new(4, 0b0110));
    monitor.check(&signals);
    assert_eq!(board.borrow().level_writes, after_init + 4);

    for _ in 0..5 {
        signals.set_packet(PinStatePacket::new(4, 0b0110));
        monitor.check(&signals);
    }
    assert_eq!(board.borrow().level_writes, after_init + 4);
}

#[test]
fn packet_count_limits_driven_pins() {
    let signals = LinkSignals::new();
    let board = board(4);
    let mut monitor = monitor(Role::Receive, &board, &signals);
    let after_init = board.borrow().level_writes;

    signals.set_packet(PinStatePacket::new(2, 0b11));
    monitor.check(&signals);
    assert_eq!(board.borrow().level_writes, after_init + 2);
    assert_eq!(board.borrow().levels, vec![true, true, false, false]);
}

#[test]
fn oversized_count_drives_four_pins() {
    let signals = LinkSignals::new();
    let board = board(6);
    let mut monitor = monitor(Role::Receive, &board, &signals);

    signals.set_packet(PinStatePacket::decode(&[8, 0xFF, 0xA5]).unwrap());
    monitor.check(&signals);
    let board = board.borrow();
    assert_eq!(&board.levels[..4], &[true; 4]);
    assert!(!board.levels[5], "console ground untouched");
}

#[test]
fn receiver_never_requests_update() {
    let signals = LinkSignals::new();
    let board = board(4);
    let mut monitor = monitor(Role::Receive, &board, &signals);
    signals.set_packet(PinStatePacket::new(4, 0b1111));
    monitor.check(&signals);
    assert!(!signals.update_pending());
}

// =============================================================================
// Console Mode Tests
// =============================================================================

#[test]
fn console_mode_follows_pin_four() {
    let signals = LinkSignals::new();
    let board = board(6);
    let mut monitor = monitor(Role::Receive, &board, &signals);

    assert!(!monitor.check(&signals));
    board.borrow_mut().inputs[4] = true;
    assert!(monitor.check(&signals));
    board.borrow_mut().inputs[4] = false;
    assert!(!monitor.check(&signals));
}

#[test]
fn no_console_mode_without_pin_five() {
    let signals = LinkSignals::new();
    let board = board(5);
    let mut monitor = monitor(Role::Transmit, &board, &signals);
    board.borrow_mut().inputs[4] = true;
    assert!(!monitor.check(&signals));
}
