//! Hardware collaborators.
//!
//! The node core never touches registers. A board crate provides these
//! capabilities and the rest of the firmware drives them:
//!
//! - power lines for the sensor and the radio: any [`OutputPin`]
//! - the transmit line: [`TxLine`], an [`OutputPin`] that can also be released
//! - the analog converter: [`Converter`]
//! - the periodic wake alarm (a watchdog in interrupt mode): [`WakeAlarm`]
//! - low-power states: [`LowPower`]
//!
//! Register-level capabilities are infallible, as they are on the target.
//! Pins keep the fallible `embedded-hal` signatures.
//!
//! Power sequencing is expressed with scoped guards. [`PowerRail`] holds a
//! supply line high and [`ConverterSession`] holds the converter enabled;
//! both switch off again when released or dropped, so an early return can
//! not leave the radio or the sensor powered.

use crate::consts::AdcConfig;
use embedded_hal::digital::OutputPin;

/// The radio data line.
///
/// Between transmissions the line is released (high impedance) so it draws
/// nothing and does not disturb the radio front-end.
pub trait TxLine: OutputPin {
    /// Turns the output driver on.
    fn drive(&mut self) -> Result<(), Self::Error>;

    /// Turns the output driver off, leaving the line floating.
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// The analog-to-digital converter.
///
/// Completion is reported out of band: the conversion-complete interrupt calls
/// [`on_conversion_complete`](crate::timer::on_conversion_complete).
pub trait Converter {
    /// Enables the converter with the given reference, channel, clock divider
    /// and completion interrupt setting.
    fn configure(&mut self, config: &AdcConfig);

    /// Starts one conversion.
    fn start_conversion(&mut self);

    /// Result of the last finished conversion, at the converter's native width.
    fn read_result(&mut self) -> u16;

    /// Disables the converter.
    fn disable(&mut self);
}

/// Periodic wake alarm.
pub trait WakeAlarm {
    /// Sets the alarm period, in milliseconds.
    fn configure_period(&mut self, period_ms: u32);

    /// Clears an expiry flag left pending from before interrupts were enabled.
    fn clear_expired(&mut self);

    /// Restarts the current period.
    fn reset(&mut self);

    /// Lets the alarm interrupt wake the processor.
    fn enable_wake(&mut self);

    /// Stops the alarm from waking the processor.
    fn disable_wake(&mut self);
}

/// Processor low-power states. Both return once an enabled interrupt fires.
pub trait LowPower {
    /// Lightest state, keeping the converter clocked.
    ///
    /// Called after the conversion signal was seen lowered. A completion
    /// interrupt that fires between that check and the sleep instruction
    /// must still end the idle, or the processor sleeps with nothing left to
    /// wake it. Implementations disable interrupts, re-check the pending
    /// completion, and only then enable interrupts and sleep as one
    /// uninterruptible pair (`sei; sleep` on AVR). Returning early on any
    /// wake is fine; the caller polls again.
    fn enter_idle(&mut self);

    /// Deepest state; only the wake alarm brings the processor back.
    fn enter_power_down(&mut self);
}

/// A supply line held high for as long as the guard lives.
#[derive(Debug)]
pub struct PowerRail<'a, P: OutputPin> {
    pin: &'a mut P,
    on: bool,
}

impl<'a, P: OutputPin> PowerRail<'a, P> {
    /// Switches the supply on.
    pub fn acquire(pin: &'a mut P) -> Result<Self, P::Error> {
        pin.set_high()?;
        Ok(Self { pin, on: true })
    }

    /// Switches the supply off and reports whether that worked.
    pub fn release(mut self) -> Result<(), P::Error> {
        self.on = false;
        self.pin.set_low()
    }
}

impl<P: OutputPin> Drop for PowerRail<'_, P> {
    fn drop(&mut self) {
        if self.on {
            let _ = self.pin.set_low();
        }
    }
}

/// The converter configured and enabled for as long as the guard lives.
#[derive(Debug)]
pub struct ConverterSession<'a, C: Converter> {
    adc: &'a mut C,
    enabled: bool,
}

impl<'a, C: Converter> ConverterSession<'a, C> {
    /// Configures and enables the converter.
    pub fn open(adc: &'a mut C, config: &AdcConfig) -> Self {
        adc.configure(config);
        Self { adc, enabled: true }
    }

    /// Access to the enabled converter.
    pub fn adc(&mut self) -> &mut C {
        self.adc
    }

    /// Disables the converter.
    pub fn close(mut self) {
        self.enabled = false;
        self.adc.disable();
    }
}

impl<C: Converter> Drop for ConverterSession<'_, C> {
    fn drop(&mut self) {
        if self.enabled {
            self.adc.disable();
        }
    }
}
