//! Timing and interrupt-side helpers.
//!
//! Two interrupts matter to the node:
//!
//! - **conversion complete**: the handler calls [`on_conversion_complete`],
//!   which sets a [`ConversionSignal`] the sampler is waiting on
//! - **wake alarm**: the handler is [`on_alarm`], which does nothing; taking
//!   the interrupt is what ends the low-power state
//!
//! Both handlers are a handful of instructions and never block.
//!
//! Bit timing for the radio is fixed:
//!
//! | Quantity        | Value      |
//! |-----------------|------------|
//! | Half-bit        | 500 µs     |
//! | Bit period      | 1 ms       |
//! | Bit rate        | 1 kbit/s   |
//! | Frame on air    | 96.5 ms    |

mod isr;
pub use isr::*;

mod macros;

use crate::consts::{FRAME_HALF_BITS, HALF_BIT_US};

/// 1 kilobit / second
pub const BITS_PER_SECOND: u16 = 1_000;

/// One bit is two half-bits.
pub const BIT_US: u32 = HALF_BIT_US * 2;

/// Time one frame occupies on air with the given half-bit duration, in
/// microseconds, excluding the radio settle delay.
pub const fn frame_airtime_us(half_bit_us: u32) -> u32 {
    FRAME_HALF_BITS as u32 * half_bit_us
}

/// Bit rate produced by a half-bit duration, in bits per second.
pub const fn bit_rate(half_bit_us: u32) -> u32 {
    1_000_000 / (half_bit_us * 2)
}
