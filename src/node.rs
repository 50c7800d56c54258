//! The node's main control loop.
//!
//! [`SensorNode`] owns every component and cycles through three states
//! forever:
//!
//! ```text
//!   ┌──────────┐     ┌──────────┐     ┌──────────┐
//! ─►│  Sample  │────►│ Transmit │────►│  Sleep   │──┐
//!   └──────────┘     └──────────┘     └──────────┘  │
//!        ▲                                          │
//!        └──────────────────────────────────────────┘
//! ```
//!
//! - **Sample**: bump the sequence number, read the temperature, build a
//!   fresh [`Packet`]
//! - **Transmit**: send the packet; the checksum is finalised on the way out
//! - **Sleep**: power down for the jittered interval
//!
//! The sequence number and the [`Lfsr`] are the only state carried from one
//! cycle to the next. A fault while sampling or transmitting skips straight
//! to Sleep; the next cycle's reading supersedes the lost one.

use crate::consts::NodeConfig;
use crate::driver::ManchesterTx;
use crate::error::Error;
use crate::fmt::{info, trace, warning};
use crate::hal::{Converter, LowPower, TxLine, WakeAlarm};
use crate::lfsr::Lfsr;
use crate::packet::{Packet, ReadingType};
use crate::sampler::AnalogSampler;
use crate::sleep::SleepScheduler;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Where the control loop is in its cycle.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum NodeState {
    /// Next step takes a reading.
    #[default]
    Sample,
    /// Next step sends the packet built from the last reading.
    Transmit,
    /// Next step powers down until the next cycle.
    Sleep,
}

/// Outcome of one full Sample → Transmit → Sleep cycle.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct CycleReport {
    /// The packet built this cycle, if sampling succeeded.
    pub packet: Option<Packet>,
    /// Whether the packet went out without a fault.
    pub transmitted: bool,
    /// Alarm periods slept at the end of the cycle.
    pub sleeps: u64,
    /// The first fault of the cycle, if any.
    pub fault: Option<Error>,
}

/// A complete sensor node.
#[derive(Debug)]
pub struct SensorNode<'s, ADC, SP, TX, RP, D, A, S>
where
    ADC: Converter,
    SP: OutputPin,
    TX: TxLine,
    RP: OutputPin,
    D: DelayNs,
    A: WakeAlarm,
    S: LowPower,
{
    /// Temperature sampler.
    pub sampler: AnalogSampler<'s, ADC, SP>,
    /// Radio transmitter.
    pub transmitter: ManchesterTx<TX, RP, D>,
    /// Sleep scheduler.
    pub scheduler: SleepScheduler<A>,
    /// Low-power states, shared by sampling and sleeping.
    pub sleeper: S,
    lfsr: Lfsr,
    node_id: u8,
    seq_no: u16,
    packet: Packet,
    state: NodeState,
    last_sleeps: u64,
}

impl<'s, ADC, SP, TX, RP, D, A, S> SensorNode<'s, ADC, SP, TX, RP, D, A, S>
where
    ADC: Converter,
    SP: OutputPin,
    TX: TxLine,
    RP: OutputPin,
    D: DelayNs,
    A: WakeAlarm,
    S: LowPower,
{
    /// Assembles a node. The sequence counter starts at zero, so the first
    /// packet carries sequence number 1.
    pub fn new(
        sampler: AnalogSampler<'s, ADC, SP>,
        transmitter: ManchesterTx<TX, RP, D>,
        scheduler: SleepScheduler<A>,
        sleeper: S,
        config: &NodeConfig,
    ) -> Self {
        Self {
            sampler,
            transmitter,
            scheduler,
            sleeper,
            lfsr: Lfsr::default(),
            node_id: config.node_id,
            seq_no: 0,
            packet: Packet::default(),
            state: NodeState::Sample,
            last_sleeps: 0,
        }
    }

    /// Replaces the generator state, e.g. with a per-node seed.
    pub fn with_lfsr(mut self, lfsr: Lfsr) -> Self {
        self.lfsr = lfsr;
        self
    }

    /// Brings the hardware to its resting state: alarm wake disabled with
    /// any stale expiry cleared, radio off, data line released.
    pub fn start(&mut self) -> Result<(), Error> {
        self.scheduler.init();
        self.transmitter.idle()?;
        info!("node {} started", self.node_id);
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Sequence number of the most recent packet.
    pub fn seq_no(&self) -> u16 {
        self.seq_no
    }

    /// The most recently built packet.
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// The jitter generator.
    pub fn lfsr(&self) -> &Lfsr {
        &self.lfsr
    }

    /// Alarm periods slept by the most recent Sleep step.
    pub fn last_sleeps(&self) -> u64 {
        self.last_sleeps
    }

    fn sample(&mut self) -> Result<(), Error> {
        self.seq_no = self.seq_no.wrapping_add(1);
        let reading = self
            .sampler
            .read_temperature(&mut self.sleeper, &mut self.lfsr)?;
        self.packet = Packet::new(self.node_id, self.seq_no, ReadingType::Temperature, reading);
        Ok(())
    }

    /// Runs the current state and advances to the next one.
    ///
    /// # Returns
    /// The state the node is now in. On a fault the node has still advanced
    /// (to Sleep) and the fault is returned.
    pub fn step(&mut self) -> Result<NodeState, Error> {
        let (next, result) = match self.state {
            NodeState::Sample => match self.sample() {
                Ok(()) => (NodeState::Transmit, Ok(())),
                Err(e) => (NodeState::Sleep, Err(e)),
            },
            NodeState::Transmit => (
                NodeState::Sleep,
                self.transmitter.transmit(&mut self.packet),
            ),
            NodeState::Sleep => {
                self.last_sleeps = self.scheduler.deep_sleep(&mut self.sleeper, &mut self.lfsr);
                (NodeState::Sample, Ok(()))
            }
        };
        self.state = next;
        result.map(|()| next)
    }

    /// Runs steps until the node is back in Sample, i.e. one full cycle from
    /// wherever it currently is.
    pub fn cycle(&mut self) -> CycleReport {
        let mut report = CycleReport {
            packet: None,
            transmitted: false,
            sleeps: 0,
            fault: None,
        };
        loop {
            let from = self.state;
            match self.step() {
                Ok(_) => match from {
                    NodeState::Sample => report.packet = Some(self.packet),
                    NodeState::Transmit => {
                        report.packet = Some(self.packet);
                        report.transmitted = true;
                    }
                    NodeState::Sleep => report.sleeps = self.last_sleeps,
                },
                Err(e) => {
                    warning!("seq {}: {}", self.seq_no, e);
                    report.fault = report.fault.or(Some(e));
                }
            }
            if self.state == NodeState::Sample {
                return report;
            }
        }
    }

    /// Runs the node forever.
    pub fn run(&mut self) -> ! {
        loop {
            let report = self.cycle();
            trace!(
                "seq {} transmitted {} slept {}",
                self.seq_no, report.transmitted, report.sleeps
            );
        }
    }
}
