//! Constants used across the sensor node firmware.
//!
//! Everything a deployed node needs to know about itself is fixed at build
//! time: its identity, the radio bit timing, the sleep schedule, and how the
//! analog converter is set up. Nothing here is configurable at runtime.
//!
//! ## Key Concepts
//!
//! - **Wire layout**: the packet is 7 bytes, the frame prepends a 5 byte preamble.
//! - **Bit timing**: Manchester half-bits of 500 µs, i.e. 1 kbit/s on air.
//! - **Sleep schedule**: a 2 second alarm repeated to approximate 234 seconds,
//!   plus 0-7 extra repetitions of jitter.
//!
//! The [`NodeConfig`] value bundles these so a board crate can assemble a
//! variant with a different identity or timing as `const` data.

/// Identity of this node, carried in every packet.
pub const NODE_ID: u8 = 3;

/// Duration of one Manchester half-bit, in microseconds.
///
/// Two half-bits make one bit, giving a 1 ms bit period.
pub const HALF_BIT_US: u32 = 500;

/// Time given to the radio front-end after power-up before the first bit.
pub const RADIO_SETTLE_US: u32 = 100;

/// Period of the wake alarm, in milliseconds.
///
/// This is the longest single period the alarm hardware supports that is
/// still a whole number of seconds.
pub const ALARM_PERIOD_MS: u32 = 2_000;

/// Target time between two transmissions, in milliseconds.
pub const SLEEP_TARGET_MS: u32 = 234_000;

/// Mask applied to a random byte to get the number of extra alarm periods.
pub const JITTER_MASK: u8 = 0x07;

/// Value the LFSR is forced to whenever its state is observed to be zero.
pub const LFSR_RESEED: u16 = 0xDEAD;

/// Preamble sent before every packet.
///
/// Four bytes of ones let the receiver lock onto the bit clock; the trailing
/// zero bit of `0x7F` marks the start of the packet.
pub const PREAMBLE: [u8; PREAMBLE_LEN] = [0xFF, 0xFF, 0xFF, 0xFF, 0x7F];

/// Length (in bytes) of [`PREAMBLE`].
pub const PREAMBLE_LEN: usize = 5;

/// Length (in bytes) of a packet on the wire, checksum included.
pub const PACKET_LEN: usize = 7;

/// Length (in bytes) of the packet without its checksum trailer.
pub const PACKET_BODY_LEN: usize = PACKET_LEN - 1;

/// Length (in bytes) of a complete frame: preamble followed by the packet.
pub const FRAME_LEN: usize = PREAMBLE_LEN + PACKET_LEN;

/// Number of half-bit slots a frame occupies on air, including the trailing
/// transition that closes the final bit.
pub const FRAME_HALF_BITS: usize = FRAME_LEN * 16 + 1;

/// Voltage reference selected for the temperature conversion.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Reference {
    /// Supply voltage as reference.
    Vcc,
    /// Internal 1.1 V bandgap reference.
    Internal1V1,
    /// Internal 2.56 V reference.
    Internal2V56,
    /// Voltage applied to the external reference pin.
    External,
}

/// Converter clock divider, relative to the CPU clock.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ClockDivider {
    /// CPU clock / 2
    Div2,
    /// CPU clock / 4
    Div4,
    /// CPU clock / 8
    Div8,
    /// CPU clock / 16
    Div16,
    /// CPU clock / 32
    Div32,
    /// CPU clock / 64
    Div64,
    /// CPU clock / 128
    Div128,
}

impl ClockDivider {
    /// The division factor.
    pub const fn factor(self) -> u16 {
        match self {
            ClockDivider::Div2 => 2,
            ClockDivider::Div4 => 4,
            ClockDivider::Div8 => 8,
            ClockDivider::Div16 => 16,
            ClockDivider::Div32 => 32,
            ClockDivider::Div64 => 64,
            ClockDivider::Div128 => 128,
        }
    }
}

/// Converter settings used for every temperature reading.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct AdcConfig {
    /// Voltage reference.
    pub reference: Reference,
    /// Analog input channel the sensor is wired to.
    pub channel: u8,
    /// Converter clock divider.
    pub divider: ClockDivider,
    /// Whether the conversion-complete interrupt is raised.
    pub complete_interrupt: bool,
}

impl AdcConfig {
    /// Internal 1.1 V reference, channel 2, CPU clock / 64, interrupt on completion.
    pub const TEMPERATURE: AdcConfig = AdcConfig {
        reference: Reference::Internal1V1,
        channel: 2,
        divider: ClockDivider::Div64,
        complete_interrupt: true,
    };
}

/// Build-time configuration of a node.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct NodeConfig {
    /// See [`NODE_ID`]
    pub node_id: u8,
    /// See [`HALF_BIT_US`]
    pub half_bit_us: u32,
    /// See [`RADIO_SETTLE_US`]
    pub radio_settle_us: u32,
    /// See [`ALARM_PERIOD_MS`]
    pub alarm_period_ms: u32,
    /// See [`SLEEP_TARGET_MS`]
    pub sleep_target_ms: u32,
    /// Converter settings for the temperature reading.
    pub adc: AdcConfig,
}

impl NodeConfig {
    /// The configuration built from the constants in this module.
    pub const DEFAULT: NodeConfig = NodeConfig {
        node_id: NODE_ID,
        half_bit_us: HALF_BIT_US,
        radio_settle_us: RADIO_SETTLE_US,
        alarm_period_ms: ALARM_PERIOD_MS,
        sleep_target_ms: SLEEP_TARGET_MS,
        adc: AdcConfig::TEMPERATURE,
    };
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
