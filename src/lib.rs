//! # thermonode
//!
//! A portable, no_std firmware core for a battery-powered wireless temperature
//! sensor node: sample, frame, transmit over a Manchester-coded radio line,
//! sleep for a jittered interval, repeat.
//!
//! The crate owns the timing-critical logic and talks to the board only
//! through small capabilities:
//! - `embedded-hal` output pins for the sensor and radio supplies
//! - a [`TxLine`](hal::TxLine) for the radio data line
//! - [`Converter`](hal::Converter), [`WakeAlarm`](hal::WakeAlarm) and
//!   [`LowPower`](hal::LowPower) for the converter, the wake alarm and the
//!   sleep states
//! - a `critical-section` protected [`ConversionSignal`](timer::ConversionSignal)
//!   raised from the conversion-complete interrupt
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]` (host builds and tests) |
//! | `log`       | Uses `log` logging |
//! | `defmt-0-3` | Uses `defmt` logging |
//!
//! ## Wire format
//!
//! - Manchester, 500 µs half-bits (1 kbit/s), LSB first, `1` = high then low
//! - Frame: `FF FF FF FF 7F`, then the 7 packet bytes, then one closing transition
//! - Packet: `node_id:u8, seq_no:u16 LE, reading_type:u8, reading:u16 LE, crc8:u8`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use thermonode::consts::{AdcConfig, NodeConfig};
//! use thermonode::driver::ManchesterTx;
//! use thermonode::node::SensorNode;
//! use thermonode::sampler::AnalogSampler;
//! use thermonode::sleep::SleepScheduler;
//!
//! thermonode::init_conversion_signal!();
//!
//! // #[interrupt]
//! fn ADC() {
//!     thermonode::timer::on_conversion_complete(&CONVERSION_SIGNAL);
//! }
//!
//! // #[interrupt]
//! fn WDT() {
//!     thermonode::timer::on_alarm();
//! }
//!
//! fn main() -> ! {
//!     let config = NodeConfig::DEFAULT;
//!     let mut node = SensorNode::new(
//!         AnalogSampler::new(adc, sensor_power, &CONVERSION_SIGNAL, AdcConfig::TEMPERATURE),
//!         ManchesterTx::new(tx_line, radio_power, delay, &config),
//!         SleepScheduler::new(watchdog, &config),
//!         sleep_modes,
//!         &config,
//!     );
//!     let _ = node.start();
//!     // enable interrupts here
//!     node.run()
//! }
//! ```
//!
//! --
//! Designed for `#![no_std]` use on small 8-bit microcontrollers.

#![warn(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use critical_section;
pub use heapless;

pub(crate) mod fmt;

pub mod consts;
pub mod crc;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod hal;
pub mod lfsr;
pub mod node;
pub mod packet;
pub mod sampler;
pub mod sleep;
pub mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{DecodeError, Error};
pub use node::{NodeState, SensorNode};
pub use packet::{Packet, ReadingType};
