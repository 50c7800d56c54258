//! Manchester transmitter for the node's radio.
//!
//! This module provides [`ManchesterTx`], which sends one [`Packet`] per call
//! over a single data line feeding an on-off keyed radio transmitter. Bits
//! are timed with a blocking `embedded-hal` delay; there is no interrupt
//! involvement, and the wake alarm must be disabled while a frame is on air
//! so nothing stretches a half-bit.
//!
//! ## Frame
//!
//! ```text
//! radio on, line driven, 100 µs settle
//! FF FF FF FF 7F          preamble, last zero marks the frame start
//! packet bytes            node_id, seq_no, reading_type, reading, checksum
//! one extra transition    closes the waveform of the final bit
//! radio off, line released and low
//! ```
//!
//! The checksum is recomputed right before the packet bytes are sent, so it
//! always matches the final field values.
//!
//! Delivery is fire-and-forget: no acknowledgement, no retry, no carrier
//! sense. A lost frame is superseded by the next cycle's.
//!
//! ## Example
//!
//! ```rust
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{ErrorType, OutputPin};
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # struct Line;
//! # impl ErrorType for Line { type Error = Infallible; }
//! # impl OutputPin for Line {
//! #     fn set_low(&mut self) -> Result<(), Infallible> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Infallible> { Ok(()) }
//! # }
//! # impl thermonode::hal::TxLine for Line {
//! #     fn drive(&mut self) -> Result<(), Infallible> { Ok(()) }
//! #     fn release(&mut self) -> Result<(), Infallible> { Ok(()) }
//! # }
//! # let (line, radio_power, delay) = (Line, Line, NoopDelay::new());
//! use thermonode::consts::NodeConfig;
//! use thermonode::driver::ManchesterTx;
//! use thermonode::packet::{Packet, ReadingType};
//!
//! let mut tx = ManchesterTx::new(line, radio_power, delay, &NodeConfig::DEFAULT);
//! let mut packet = Packet::new(3, 1, ReadingType::Temperature, 512);
//! tx.transmit(&mut packet).unwrap();
//! assert_eq!(tx.frames_sent, 1);
//! ```

use crate::consts::NodeConfig;
use crate::encoding::{encode_byte, frame};
use crate::error::Error;
use crate::fmt::trace;
use crate::hal::{PowerRail, TxLine};
use crate::packet::Packet;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};

/// Drives the data line one half-bit at a time and remembers its level.
#[derive(Debug)]
struct Modulator<TX, D> {
    line: TX,
    delay: D,
    half_bit_us: u32,
    level: bool,
}

impl<TX: TxLine, D: DelayNs> Modulator<TX, D> {
    fn write(&mut self, level: bool) -> Result<(), Error> {
        let result = if level {
            self.line.set_high()
        } else {
            self.line.set_low()
        };
        result.map_err(|e| Error::TxLine(e.kind()))?;
        self.level = level;
        Ok(())
    }

    fn half_bit(&mut self) {
        self.delay.delay_us(self.half_bit_us);
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        for level in encode_byte(byte) {
            self.write(level)?;
            self.half_bit();
        }
        Ok(())
    }

    /// Sends the preamble and the sealed packet, then the closing transition.
    fn send_frame(&mut self, packet: &mut Packet, settle_us: u32) -> Result<(), Error> {
        self.line.drive().map_err(|e| Error::TxLine(e.kind()))?;
        self.delay.delay_us(settle_us);

        packet.seal();
        for byte in frame(packet) {
            self.send_byte(byte)?;
        }

        self.write(!self.level)?;
        self.half_bit();
        Ok(())
    }

    /// Releases the line and leaves it low.
    fn release(&mut self) -> Result<(), Error> {
        self.line.release().map_err(|e| Error::TxLine(e.kind()))?;
        self.write(false)
    }
}

/// Manchester transmitter: a data line, the radio supply line, and a delay.
///
/// ## Type Parameters
///
/// - `TX`: the data line, a [`TxLine`]
/// - `RADIO`: the radio supply, an [`OutputPin`]
/// - `D`: blocking delay used for bit timing
#[derive(Debug)]
pub struct ManchesterTx<TX, RADIO, D>
where
    TX: TxLine,
    RADIO: OutputPin,
    D: DelayNs,
{
    /// Radio supply line.
    pub radio: RADIO,
    modulator: Modulator<TX, D>,
    settle_us: u32,
    /// Frames sent without a line or power fault. Wraps.
    pub frames_sent: u32,
}

impl<TX, RADIO, D> ManchesterTx<TX, RADIO, D>
where
    TX: TxLine,
    RADIO: OutputPin,
    D: DelayNs,
{
    /// Creates a transmitter using the half-bit and settle timing from `config`.
    ///
    /// Nothing is written to the hardware; call [`ManchesterTx::idle`] once at
    /// startup to put the radio and the line in their resting state.
    pub fn new(line: TX, radio: RADIO, delay: D, config: &NodeConfig) -> Self {
        Self {
            radio,
            modulator: Modulator {
                line,
                delay,
                half_bit_us: config.half_bit_us,
                level: false,
            },
            settle_us: config.radio_settle_us,
            frames_sent: 0,
        }
    }

    /// Powers the radio down and releases the line.
    pub fn idle(&mut self) -> Result<(), Error> {
        self.radio
            .set_low()
            .map_err(|e| Error::RadioPower(e.kind()))?;
        self.modulator.release()
    }

    /// Sends `packet` as one frame, storing its freshly computed checksum.
    ///
    /// The radio is powered down and the line released on every exit path,
    /// including a fault halfway through the frame.
    pub fn transmit(&mut self, packet: &mut Packet) -> Result<(), Error> {
        let radio = PowerRail::acquire(&mut self.radio).map_err(|e| Error::RadioPower(e.kind()))?;
        let sent = self.modulator.send_frame(packet, self.settle_us);
        let powered_down = radio.release().map_err(|e| Error::RadioPower(e.kind()));
        let released = self.modulator.release();
        sent?;
        powered_down?;
        released?;

        self.frames_sent = self.frames_sent.wrapping_add(1);
        trace!("sent frame for seq {}", packet.seq_no);
        Ok(())
    }
}
