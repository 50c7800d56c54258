use core::cell::Cell;
use core::fmt;
use critical_section::Mutex;
use nb::Error::WouldBlock;

/// One-shot flag raised by the conversion-complete interrupt.
///
/// The interrupt handler is the only writer that sets it, the sampler is the
/// only reader. Every access goes through `critical_section::with`, so the
/// flag can live in a `static` shared with the handler.
///
/// # Example
/// ```rust
/// use thermonode::timer::{ConversionSignal, on_conversion_complete};
///
/// static SIGNAL: ConversionSignal = ConversionSignal::new();
///
/// // #[interrupt]
/// fn ADC() {
///     on_conversion_complete(&SIGNAL);
/// }
/// # ADC();
/// # assert!(SIGNAL.take());
/// ```
pub struct ConversionSignal {
    done: Mutex<Cell<bool>>,
}

impl ConversionSignal {
    /// A lowered signal, usable in a `static` initializer.
    pub const fn new() -> Self {
        Self {
            done: Mutex::new(Cell::new(false)),
        }
    }

    /// Raises the signal.
    pub fn notify(&self) {
        critical_section::with(|cs| self.done.borrow(cs).set(true));
    }

    /// Lowers the signal without looking at it.
    pub fn clear(&self) {
        critical_section::with(|cs| self.done.borrow(cs).set(false));
    }

    /// Lowers the signal and reports whether it was raised.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.done.borrow(cs).replace(false))
    }

    /// Current state, without consuming it.
    pub fn is_raised(&self) -> bool {
        critical_section::with(|cs| self.done.borrow(cs).get())
    }

    /// Non-blocking poll: consumes a raised signal, otherwise `WouldBlock`.
    pub fn poll(&self) -> nb::Result<(), core::convert::Infallible> {
        if self.take() { Ok(()) } else { Err(WouldBlock) }
    }
}

impl Default for ConversionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConversionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionSignal")
            .field("raised", &self.is_raised())
            .finish()
    }
}

/// Body of the conversion-complete interrupt handler.
#[inline]
pub fn on_conversion_complete(signal: &ConversionSignal) {
    signal.notify();
}

/// Body of the wake alarm interrupt handler.
///
/// Deliberately empty: the interrupt exists only to end the low-power state.
#[inline]
pub fn on_alarm() {}
