//! Jitter source for the sleep schedule.
//!
//! A 16-bit Fibonacci LFSR with taps at bits 15, 13, 12 and 10. Each call to
//! [`Lfsr::next_byte`] shifts the register left eight times, feeding the XOR
//! of the taps into bit 0, and returns the low byte.
//!
//! On its own the sequence is identical on every node that powers up at the
//! same moment, which is exactly what the jitter is meant to break. So every
//! converter sample is folded in through [`Lfsr::mix`], which lets the least
//! significant bit of analog noise swap bits 15 and 3 of the state. This is a
//! decorrelation trick, not a source of cryptographic randomness.
//!
//! The all-zero state is a fixed point of the shift. It is replaced by
//! [`LFSR_RESEED`] whenever it is seen.

use crate::consts::LFSR_RESEED;
use crate::fmt::debug;

const TAPS: [u8; 4] = [15, 13, 12, 10];

/// The generator state. One per node, alive for as long as the node is powered.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Lfsr {
    state: u16,
}

impl Default for Lfsr {
    /// Power-on state: zero, which the first draw replaces with [`LFSR_RESEED`].
    fn default() -> Self {
        Self { state: 0 }
    }
}

impl Lfsr {
    /// Creates a generator with an explicit seed. A zero seed is accepted and
    /// corrected on first use.
    pub const fn new(seed: u16) -> Self {
        Self { state: seed }
    }

    /// Current register contents.
    pub const fn state(&self) -> u16 {
        self.state
    }

    /// Advances the register by a single bit.
    fn step(&mut self) {
        let feedback = TAPS
            .iter()
            .fold(0u16, |bit, &tap| bit ^ ((self.state >> tap) & 1));
        self.state = (self.state << 1) | feedback;
    }

    /// Produces the next pseudo-random byte.
    pub fn next_byte(&mut self) -> u8 {
        if self.state == 0 {
            debug!("lfsr state degenerated to zero, reseeding");
            self.state = LFSR_RESEED;
        }
        for _ in 0..8 {
            self.step();
        }
        self.state as u8
    }

    /// Folds a converter sample into the state.
    ///
    /// Only the low bit of `sample` matters: when it is set and bits 15 and 3
    /// of the state differ, both are flipped.
    pub fn mix(&mut self, sample: u8) {
        if sample & 1 == 0 {
            return;
        }
        let high = (self.state >> 15) & 1;
        let low = (self.state >> 3) & 1;
        if high != low {
            self.state ^= (1 << 15) | (1 << 3);
        }
    }
}
