//! Link Scheduler
//!
//! The single real-time loop of the firmware. Every iteration it:
//!
//! 1. verifies the integrity sentinels (a failure ends the loop),
//! 2. runs the pin hook, which may request an urgent update,
//! 3. hands the iteration to the command console when console mode is selected,
//! 4. updates the activity indicator every half timer wrap,
//! 5. receives (receiving end) or sends (transmitting end) the pin state.
//!
//! There is no acknowledgement. The transmitting end restates the pin
//! state every half timer wrap and sends a burst of copies whenever it
//! changes, so a lost frame is repaired by the next one.

use crate::config::{
    ConfigError, LinkConfig, BURST_COPIES, LINK_UPDATE_INTERVAL_TICKS, MAX_PACKET_LENGTH,
    SEND_INTERVAL_TICKS,
};
use crate::power::{DutyCycleState, Temperature, ThermalGovernor};
use crate::protocol::{PacketError, PinStatePacket};
use crate::radio::indicator::LinkActivityIndicator;
use crate::radio::integrity::{IntegrityFault, IntegrityMonitor};
use crate::radio::link::{CommandConsole, PinHook, RadioLink, StatusLeds, TimeBase};
use crate::radio::signals::LinkSignals;
use crate::radio::timing::{TimingParameters, WindowInputs};
use crate::types::{LedState, Role, Tick};

/// What one loop iteration did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to send or receive
    Idle,
    /// A pin-state packet was accepted
    Received,
    /// A frame arrived but was not accepted
    Dropped,
    /// Pin state sent `copies` times
    Sent {
        /// Frames handed to the radio
        copies: u8,
    },
    /// A periodic restatement was held back by the duty-cycle budget
    Deferred,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PollOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "idle"),
            Self::Received => defmt::write!(f, "received"),
            Self::Dropped => defmt::write!(f, "dropped"),
            Self::Sent { copies } => defmt::write!(f, "sent x{}", copies),
            Self::Deferred => defmt::write!(f, "deferred"),
        }
    }
}

/// Hardware the scheduler drives
pub struct LinkIo<R, T, L, P, C> {
    /// Transceiver
    pub radio: R,
    /// Tick source
    pub clock: T,
    /// Status LEDs
    pub leds: L,
    /// Pin change detector
    pub pins: P,
    /// Command console
    pub console: C,
}

/// Owner of all link loop state
pub struct LinkScheduler<'s, R, T, L, P, C> {
    role: Role,
    timing: TimingParameters,
    governor: ThermalGovernor,
    duty: DutyCycleState,
    indicator: LinkActivityIndicator,
    integrity: IntegrityMonitor<'s>,
    signals: &'s LinkSignals,
    io: LinkIo<R, T, L, P, C>,
    /// Packet buffer shared by both directions
    pbuf: [u8; MAX_PACKET_LENGTH],
    /// Longest wait for the radio to finish a frame
    tx_wait_limit: u16,
    at_mode_active: bool,
    last_send: Tick,
    last_link_update: Tick,
}

impl<'s, R, T, L, P, C> LinkScheduler<'s, R, T, L, P, C>
where
    R: RadioLink,
    T: TimeBase,
    L: StatusLeds,
    P: PinHook,
    C: CommandConsole,
{
    /// Derive the link timing and take ownership of the hardware
    ///
    /// The timing is computed here, once, from the radio's air rate and the
    /// configured preamble; it cannot change while the scheduler exists.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if `config` does not validate.
    pub fn new(
        config: &LinkConfig,
        io: LinkIo<R, T, L, P, C>,
        signals: &'s LinkSignals,
        integrity: IntegrityMonitor<'s>,
    ) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        let inputs = WindowInputs {
            air_rate: io.radio.air_rate(),
            ..WindowInputs::from_config(&config)?
        };
        let timing = TimingParameters::calculate(&inputs);
        let tx_wait_limit = timing
            .flight_time_estimate(MAX_PACKET_LENGTH)
            .saturating_add(timing.silence_period())
            .min(LINK_UPDATE_INTERVAL_TICKS);

        link_info!(
            "link timing: tpb={} latency={} window={} silence={}",
            timing.ticks_per_byte(),
            timing.packet_latency(),
            timing.tx_window_width(),
            timing.silence_period()
        );

        let now = io.clock.now();
        Ok(Self {
            role: config.role,
            timing,
            governor: ThermalGovernor::new(),
            duty: DutyCycleState::new(config.duty_cycle),
            indicator: LinkActivityIndicator::new(config.role),
            integrity,
            signals,
            io,
            pbuf: [0; MAX_PACKET_LENGTH],
            tx_wait_limit,
            at_mode_active: false,
            last_send: now,
            last_link_update: now,
        })
    }

    /// Get the fixed role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Get the link timing
    #[must_use]
    pub const fn timing(&self) -> &TimingParameters {
        &self.timing
    }

    /// Get the duty-cycle state
    #[must_use]
    pub const fn duty(&self) -> &DutyCycleState {
        &self.duty
    }

    /// Get the shared flags
    #[must_use]
    pub const fn signals(&self) -> &LinkSignals {
        self.signals
    }

    /// Get the hardware
    #[must_use]
    pub const fn io(&self) -> &LinkIo<R, T, L, P, C> {
        &self.io
    }

    /// Check if the console had the last iteration
    #[must_use]
    pub const fn at_mode_active(&self) -> bool {
        self.at_mode_active
    }

    /// Run one loop iteration
    ///
    /// # Errors
    ///
    /// Returns the fault if an integrity sentinel changed. Nothing else runs
    /// in that iteration and the loop must not continue.
    pub fn poll(&mut self) -> Result<PollOutcome, IntegrityFault> {
        if let Err(fault) = self.integrity.check() {
            link_error!("integrity check failed, halting link");
            return Err(fault);
        }

        let console_mode = self.io.pins.check(self.signals);
        if console_mode {
            self.io.leds.set_activity(LedState::On);
            self.at_mode_active = true;
            self.io.console.process();
        } else {
            self.at_mode_active = false;
        }

        let now = self.io.clock.now();
        let since_update = now.elapsed_since(self.last_link_update);
        if since_update > LINK_UPDATE_INTERVAL_TICKS {
            self.link_update(since_update);
            self.last_link_update = now;
        }

        Ok(match self.role {
            Role::Receive => self.receive_step(),
            Role::Transmit => self.transmit_step(now),
        })
    }

    /// Poll forever, yielding between iterations, until a fault stops the loop
    pub async fn run(&mut self) -> IntegrityFault {
        loop {
            match self.poll() {
                Ok(_) => embassy_futures::yield_now().await,
                Err(fault) => return fault,
            }
        }
    }

    fn link_update(&mut self, window_ticks: u16) {
        self.duty.close_window(window_ticks);
        if self.indicator.update(&mut self.io.leds, self.signals) {
            let pa_temp = Temperature::from_celsius(self.io.radio.temperature());
            let power = self.io.radio.transmit_power();
            self.governor.update(&mut self.duty, pa_temp, power);
        }
    }

    fn receive_step(&mut self) -> PollOutcome {
        let Some(len) = self.io.radio.receive(&mut self.pbuf) else {
            return PollOutcome::Idle;
        };

        // the preamble we may have been waiting on became this frame
        self.signals.clear_transmit_wait();

        let frame = &self.pbuf[..len.min(MAX_PACKET_LENGTH)];
        match PinStatePacket::decode(frame) {
            Ok(packet) => {
                self.signals.mark_received();
                self.signals.set_packet(packet);
                PollOutcome::Received
            }
            Err(PacketError::Footer { found }) => {
                // keep the last good packet; the pin hook would skip this one anyway
                link_debug!("pin packet with footer {} ignored", found);
                self.signals.mark_received();
                PollOutcome::Dropped
            }
            Err(PacketError::Length { found, .. }) => {
                link_debug!("dropped {} byte frame", found);
                PollOutcome::Dropped
            }
        }
    }

    fn transmit_step(&mut self, now: Tick) -> PollOutcome {
        let urgent = self.signals.take_update();
        let periodic = now.elapsed_since(self.last_send) > SEND_INTERVAL_TICKS;
        if !urgent && !periodic {
            return PollOutcome::Idle;
        }
        if !urgent && self.duty.over_budget() {
            link_debug!(
                "restatement deferred, duty {}% of {}%",
                self.duty.average_percent(),
                self.duty.budget()
            );
            return PollOutcome::Deferred;
        }

        self.last_send = now;
        let Ok(len) = self.signals.packet().encode_into(&mut self.pbuf) else {
            return PollOutcome::Idle;
        };

        let copies = if urgent { BURST_COPIES + 1 } else { 1 };
        for _ in 0..copies {
            self.send_frame(len);
        }
        PollOutcome::Sent { copies }
    }

    fn send_frame(&mut self, len: usize) {
        self.wait_transmit_idle();
        match self
            .io
            .radio
            .transmit(&self.pbuf[..len], self.timing.trailing_gap())
        {
            Ok(()) => self.duty.record_transmit(self.timing.flight_time_estimate(len)),
            Err(_) => link_warn!("radio rejected {} byte frame", len),
        }
    }

    /// Wait a bounded time for the previous frame to leave the radio
    fn wait_transmit_idle(&mut self) {
        let start = self.io.clock.now();
        while self.io.radio.transmit_in_progress() {
            if self.io.clock.now().elapsed_since(start) > self.tx_wait_limit {
                link_warn!("radio busy for {} ticks, sending anyway", self.tx_wait_limit);
                return;
            }
            core::hint::spin_loop();
        }
    }
}
