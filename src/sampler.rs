//! Two-stage temperature sampling.
//!
//! A reading is taken as:
//!
//! 1. power up the sensor
//! 2. enable the converter ([`AdcConfig::TEMPERATURE`])
//! 3. convert once and throw the result away; the first conversion after a
//!    reference or channel change is not reliable
//! 4. convert again and keep that result
//! 5. disable the converter and power the sensor down
//!
//! Every conversion result is also folded into the [`Lfsr`].
//!
//! While a conversion runs the processor sits in the idle low-power state.
//! It can be woken by something other than the conversion-complete
//! interrupt, so the wait re-checks the [`ConversionSignal`] after every
//! wake and goes back to idle if the conversion is not done yet.
//!
//! The wait has no timeout. If the converter never signals, the node stays
//! in idle indefinitely; the wake alarm is disabled during sampling and
//! cannot rescue it.

use crate::consts::AdcConfig;
use crate::error::Error;
use crate::fmt::trace;
use crate::hal::{Converter, ConverterSession, LowPower, PowerRail};
use crate::lfsr::Lfsr;
use crate::timer::ConversionSignal;
use embedded_hal::digital::{Error as _, OutputPin};

/// Temperature sampler built from a converter and the sensor's supply line.
#[derive(Debug)]
pub struct AnalogSampler<'s, ADC, PWR>
where
    ADC: Converter,
    PWR: OutputPin,
{
    /// The converter.
    pub adc: ADC,
    /// Sensor supply line.
    pub sensor_power: PWR,
    signal: &'s ConversionSignal,
    config: AdcConfig,
}

impl<'s, ADC, PWR> AnalogSampler<'s, ADC, PWR>
where
    ADC: Converter,
    PWR: OutputPin,
{
    /// Creates a sampler.
    ///
    /// # Arguments
    /// - `adc`: the converter
    /// - `sensor_power`: line switching the sensor supply
    /// - `signal`: raised by the conversion-complete interrupt handler
    /// - `config`: converter settings, usually [`AdcConfig::TEMPERATURE`]
    pub fn new(adc: ADC, sensor_power: PWR, signal: &'s ConversionSignal, config: AdcConfig) -> Self {
        Self {
            adc,
            sensor_power,
            signal,
            config,
        }
    }

    /// Takes one temperature reading and returns the raw converter value.
    ///
    /// The sensor supply and the converter are switched off again on every
    /// exit path.
    pub fn read_temperature<S: LowPower>(
        &mut self,
        sleeper: &mut S,
        lfsr: &mut Lfsr,
    ) -> Result<u16, Error> {
        let rail = PowerRail::acquire(&mut self.sensor_power)
            .map_err(|e| Error::SensorPower(e.kind()))?;
        let mut session = ConverterSession::open(&mut self.adc, &self.config);

        let _ = convert(session.adc(), sleeper, self.signal, lfsr);
        let reading = convert(session.adc(), sleeper, self.signal, lfsr);

        session.close();
        rail.release().map_err(|e| Error::SensorPower(e.kind()))?;
        trace!("temperature reading {}", reading);
        Ok(reading)
    }
}

/// Runs a single conversion, idling until the completion signal is seen.
fn convert<C, S>(adc: &mut C, sleeper: &mut S, signal: &ConversionSignal, lfsr: &mut Lfsr) -> u16
where
    C: Converter,
    S: LowPower,
{
    signal.clear();
    adc.start_conversion();
    loop {
        match signal.poll() {
            Ok(()) => break,
            // A completion racing this sleep is handled by `enter_idle`.
            Err(nb::Error::WouldBlock) => sleeper.enter_idle(),
            Err(nb::Error::Other(never)) => match never {},
        }
    }
    let raw = adc.read_result();
    lfsr.mix(raw as u8);
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Board, Op, SimAdc, SimSleeper};
    use crate::timer::on_conversion_complete;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::io::ErrorKind as IoErrorKind;

    fn power_cycle() -> PinMock {
        PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ])
    }

    #[test]
    fn test_second_conversion_is_reported() {
        static SIGNAL: ConversionSignal = ConversionSignal::new();
        let board = Board::new(&SIGNAL, &[300, 305]);
        let mut sampler = AnalogSampler::new(
            SimAdc(board.clone()),
            power_cycle(),
            &SIGNAL,
            AdcConfig::TEMPERATURE,
        );
        let mut sleeper = SimSleeper(board.clone());
        let mut lfsr = Lfsr::new(0x1234);

        assert_eq!(sampler.read_temperature(&mut sleeper, &mut lfsr), Ok(305));
        assert_eq!(
            board.borrow().ops(),
            [
                Op::AdcConfigure(AdcConfig::TEMPERATURE),
                Op::AdcStart,
                Op::Idle,
                Op::AdcRead(300),
                Op::AdcStart,
                Op::Idle,
                Op::AdcRead(305),
                Op::AdcDisable,
            ]
        );
        sampler.sensor_power.done();
    }

    #[test]
    fn test_both_samples_feed_entropy() {
        static SIGNAL: ConversionSignal = ConversionSignal::new();
        let board = Board::new(&SIGNAL, &[301, 305]);
        let mut sampler = AnalogSampler::new(
            SimAdc(board.clone()),
            power_cycle(),
            &SIGNAL,
            AdcConfig::TEMPERATURE,
        );
        let mut lfsr = Lfsr::new(0x8000);
        let _ = sampler.read_temperature(&mut SimSleeper(board), &mut lfsr);

        let mut expected = Lfsr::new(0x8000);
        expected.mix(301u16 as u8);
        expected.mix(305u16 as u8);
        assert_eq!(lfsr, expected);
        sampler.sensor_power.done();
    }

    #[test]
    fn test_spurious_wakes_are_tolerated() {
        static SIGNAL: ConversionSignal = ConversionSignal::new();
        let board = Board::new(&SIGNAL, &[10, 20]);
        board.borrow_mut().spurious_wakes = 3;
        let mut sampler = AnalogSampler::new(
            SimAdc(board.clone()),
            power_cycle(),
            &SIGNAL,
            AdcConfig::TEMPERATURE,
        );
        let mut lfsr = Lfsr::default();

        assert_eq!(
            sampler.read_temperature(&mut SimSleeper(board.clone()), &mut lfsr),
            Ok(20)
        );
        assert_eq!(board.borrow().count(Op::Idle), 5);
        sampler.sensor_power.done();
    }

    /// Completion interrupt lands after the poll but before the sleep; the
    /// sleeper re-checks with interrupts masked and skips the sleep.
    #[derive(Debug)]
    struct LateCompletion {
        signal: &'static ConversionSignal,
        slept: u32,
    }

    impl LowPower for LateCompletion {
        fn enter_idle(&mut self) {
            on_conversion_complete(self.signal);
            let pending = critical_section::with(|_| self.signal.is_raised());
            if !pending {
                self.slept += 1;
            }
        }

        fn enter_power_down(&mut self) {}
    }

    #[test]
    fn test_completion_just_before_idle_is_not_lost() {
        static SIGNAL: ConversionSignal = ConversionSignal::new();
        let board = Board::new(&SIGNAL, &[40, 41]);
        let mut sampler = AnalogSampler::new(
            SimAdc(board.clone()),
            power_cycle(),
            &SIGNAL,
            AdcConfig::TEMPERATURE,
        );
        let mut sleeper = LateCompletion {
            signal: &SIGNAL,
            slept: 0,
        };
        let mut lfsr = Lfsr::default();

        assert_eq!(sampler.read_temperature(&mut sleeper, &mut lfsr), Ok(41));
        assert_eq!(sleeper.slept, 0);
        assert_eq!(board.borrow().count(Op::AdcRead(41)), 1);
        sampler.sensor_power.done();
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        static SIGNAL: ConversionSignal = ConversionSignal::new();
        SIGNAL.notify();
        let board = Board::new(&SIGNAL, &[1, 2]);
        let mut sampler = AnalogSampler::new(
            SimAdc(board.clone()),
            power_cycle(),
            &SIGNAL,
            AdcConfig::TEMPERATURE,
        );
        let mut lfsr = Lfsr::default();

        assert_eq!(
            sampler.read_temperature(&mut SimSleeper(board.clone()), &mut lfsr),
            Ok(2)
        );
        assert_eq!(board.borrow().count(Op::Idle), 2);
        sampler.sensor_power.done();
    }

    #[test]
    fn test_sensor_power_fault_skips_conversion() {
        static SIGNAL: ConversionSignal = ConversionSignal::new();
        let board = Board::new(&SIGNAL, &[]);
        let power = PinMock::new(&[PinTransaction::set(PinState::High)
            .with_error(MockError::Io(IoErrorKind::NotConnected))]);
        let mut sampler =
            AnalogSampler::new(SimAdc(board.clone()), power, &SIGNAL, AdcConfig::TEMPERATURE);
        let mut lfsr = Lfsr::default();

        assert!(matches!(
            sampler.read_temperature(&mut SimSleeper(board.clone()), &mut lfsr),
            Err(Error::SensorPower(_))
        ));
        assert!(board.borrow().ops().is_empty());
        sampler.sensor_power.done();
    }
}
