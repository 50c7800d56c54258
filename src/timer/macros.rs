/// Declares the static `CONVERSION_SIGNAL` shared by the sampler and the
/// conversion-complete interrupt handler.
///
/// # Example
/// ```rust
/// thermonode::init_conversion_signal!();
///
/// // #[interrupt]
/// fn ADC() {
///     thermonode::timer::on_conversion_complete(&CONVERSION_SIGNAL);
/// }
/// # ADC();
/// # assert!(CONVERSION_SIGNAL.take());
/// ```
#[macro_export]
macro_rules! init_conversion_signal {
    () => {
        pub static CONVERSION_SIGNAL: $crate::timer::ConversionSignal =
            $crate::timer::ConversionSignal::new();
    };
}
