//! Long, jittered sleep built from a short periodic alarm.
//!
//! The wake alarm cannot run for anywhere near the time between two
//! readings, so the scheduler arms it with a short period and powers down
//! repeatedly:
//!
//! ```text
//! iterations = sleep_target / alarm_period + (random byte & 7)
//! ```
//!
//! With the reference timing that is 117 to 124 periods of 2 seconds. The
//! extra 0-7 periods keep nodes that were powered up together from waking,
//! and transmitting, in lockstep forever.
//!
//! The alarm may only wake the processor inside [`SleepScheduler::deep_sleep`].
//! Outside of it the wake interrupt is disabled so it cannot disturb
//! sampling or stretch a half-bit on the radio.

use crate::consts::{JITTER_MASK, NodeConfig};
use crate::fmt::debug;
use crate::hal::{LowPower, WakeAlarm};
use crate::lfsr::Lfsr;

/// Number of alarm periods to sleep for a target duration and a jitter byte.
///
/// Only the low three bits of `jitter` are used, so the result lies in
/// `target_ms / period_ms ..= target_ms / period_ms + 7` for every pair of
/// `u32` inputs. A zero period yields just the jitter.
pub const fn sleep_iterations(target_ms: u32, period_ms: u32, jitter: u8) -> u64 {
    let base = if period_ms == 0 {
        0
    } else {
        target_ms / period_ms
    };
    base as u64 + (jitter & JITTER_MASK) as u64
}

/// Drives the wake alarm and the deepest low-power state.
#[derive(Debug)]
pub struct SleepScheduler<A: WakeAlarm> {
    /// The wake alarm.
    pub alarm: A,
    period_ms: u32,
    target_ms: u32,
}

impl<A: WakeAlarm> SleepScheduler<A> {
    /// Creates a scheduler using the alarm period and sleep target from `config`.
    pub fn new(alarm: A, config: &NodeConfig) -> Self {
        Self {
            alarm,
            period_ms: config.alarm_period_ms,
            target_ms: config.sleep_target_ms,
        }
    }

    /// Puts the alarm into its resting state. Call once at startup, before
    /// the first [`deep_sleep`](Self::deep_sleep).
    ///
    /// An expiry left over from before interrupts were enabled would
    /// otherwise end the first power-down immediately, so it is cleared
    /// before the period is set.
    pub fn init(&mut self) {
        self.alarm.disable_wake();
        self.alarm.clear_expired();
        self.alarm.configure_period(self.period_ms);
    }

    /// Iterations with no jitter.
    pub fn base_iterations(&self) -> u64 {
        sleep_iterations(self.target_ms, self.period_ms, 0)
    }

    /// Iterations for a given jitter byte.
    pub fn iterations(&self, jitter: u8) -> u64 {
        sleep_iterations(self.target_ms, self.period_ms, jitter)
    }

    /// Sleeps for the target duration plus jitter drawn from `lfsr`.
    ///
    /// # Returns
    /// The number of alarm periods slept.
    pub fn deep_sleep<S: LowPower>(&mut self, sleeper: &mut S, lfsr: &mut Lfsr) -> u64 {
        self.alarm.reset();
        self.alarm.enable_wake();

        let iterations = self.iterations(lfsr.next_byte());
        debug!("sleeping for {} alarm periods", iterations);
        for _ in 0..iterations {
            sleeper.enter_power_down();
        }

        self.alarm.disable_wake();
        iterations
    }
}
