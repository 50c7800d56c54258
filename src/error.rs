//! Error types.
//!
//! The node itself has almost nothing that can fail: register-level
//! collaborators are infallible, and transmission is fire-and-forget. What is
//! left are faults reported by `embedded-hal` pins, and the decode failures a
//! receiver sees when it turns a captured waveform back into a packet.

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// Failure reported by one of the node's output lines.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// The temperature sensor supply line could not be switched.
    #[error("sensor power line fault: {0:?}")]
    SensorPower(ErrorKind),
    /// The radio supply line could not be switched.
    #[error("radio power line fault: {0:?}")]
    RadioPower(ErrorKind),
    /// The transmit line could not be driven or released.
    #[error("transmit line fault: {0:?}")]
    TxLine(ErrorKind),
}

/// Failure while decoding a received frame or packet.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DecodeError {
    /// Fewer bytes or half-bits than the layout requires.
    #[error("truncated input: needed {needed}, got {got}")]
    Truncated {
        /// Required length
        needed: usize,
        /// Length actually available
        got: usize,
    },
    /// A bit period without a mid-bit transition.
    #[error("invalid Manchester symbol at half-bit {0}")]
    InvalidSymbol(usize),
    /// No run of ones followed by the frame-start zero was found.
    #[error("no preamble found")]
    NoPreamble,
    /// The checksum trailer does not match the packet body.
    #[error("bad checksum: expected {expected:#04x}, found {found:#04x}")]
    BadChecksum {
        /// Checksum computed over the received body
        expected: u8,
        /// Checksum carried in the packet
        found: u8,
    },
    /// Half-bit input that does not split into whole bytes.
    #[error("{0} half-bits do not make whole bytes")]
    PartialByte(usize),
}
