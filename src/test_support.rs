//! Simulated board for host tests.
//!
//! Every simulated peripheral shares one [`Board`], which keeps a clock
//! advanced by [`SimDelay`] and an ordered log of everything the firmware did.
//! The log can be replayed into half-bit levels and fed to the Manchester
//! decoder, so tests check the frame that actually went out on the line.

use crate::consts::{AdcConfig, FRAME_HALF_BITS};
use crate::hal::{Converter, LowPower, TxLine, WakeAlarm};
use crate::timer::{ConversionSignal, on_alarm, on_conversion_complete};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_mock::eh1::MockError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

/// Something the firmware did to the board.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Op {
    SensorPower(bool),
    RadioPower(bool),
    LineDrive,
    LineRelease,
    LineLevel(bool),
    AdcConfigure(AdcConfig),
    AdcStart,
    AdcRead(u16),
    AdcDisable,
    Idle,
    PowerDown,
    AlarmPeriod(u32),
    AlarmClear,
    AlarmReset,
    AlarmWake(bool),
}

#[derive(Default, Debug)]
pub struct Board {
    pub now_ns: u64,
    pub log: Vec<(u64, Op)>,
    pub samples: VecDeque<u16>,
    pub result: u16,
    pub in_flight: bool,
    pub spurious_wakes: u32,
    pub alarm_wake: bool,
    pub signal: Option<&'static ConversionSignal>,
}

pub type Shared = Rc<RefCell<Board>>;

impl Board {
    pub fn new(signal: &'static ConversionSignal, samples: &[u16]) -> Shared {
        Rc::new(RefCell::new(Board {
            samples: samples.iter().copied().collect(),
            signal: Some(signal),
            ..Board::default()
        }))
    }

    fn record(&mut self, op: Op) {
        self.log.push((self.now_ns, op));
    }

    pub fn ops(&self) -> Vec<Op> {
        self.log.iter().map(|&(_, op)| op).collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.log.iter().filter(|&&(_, o)| o == op).count()
    }

    /// Line level in every half-bit slot of the first frame, sampled in the
    /// middle of each slot.
    pub fn frame_halves(&self, half_bit_us: u32) -> Vec<bool> {
        let half = half_bit_us as u64 * 1_000;
        let drive = self
            .log
            .iter()
            .position(|&(_, op)| op == Op::LineDrive)
            .expect("line never driven");
        let t0 = self.log[drive..]
            .iter()
            .find(|&&(_, op)| matches!(op, Op::LineLevel(_)))
            .map(|&(t, _)| t)
            .expect("no bits sent");
        (0..FRAME_HALF_BITS as u64)
            .map(|k| self.level_at(t0 + k * half + half / 2))
            .collect()
    }

    fn level_at(&self, t: u64) -> bool {
        self.log
            .iter()
            .take_while(|&&(at, _)| at <= t)
            .filter_map(|&(_, op)| match op {
                Op::LineLevel(level) => Some(level),
                _ => None,
            })
            .last()
            .unwrap_or(false)
    }
}

#[derive(Debug)]
pub struct SimDelay(pub Shared);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().now_ns += ns as u64;
    }
}

#[derive(Debug)]
pub struct SimLine(pub Shared);

impl ErrorType for SimLine {
    type Error = Infallible;
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().record(Op::LineLevel(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().record(Op::LineLevel(true));
        Ok(())
    }
}

impl TxLine for SimLine {
    fn drive(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().record(Op::LineDrive);
        Ok(())
    }

    fn release(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().record(Op::LineRelease);
        Ok(())
    }
}

/// Data line whose `fail_at`-th level write (counting from 1) fails and
/// leaves the line where it was.
#[derive(Debug)]
pub struct FlakyLine {
    pub board: Shared,
    pub fail_at: usize,
    pub writes: usize,
}

impl FlakyLine {
    pub fn new(board: &Shared, fail_at: usize) -> Self {
        Self {
            board: board.clone(),
            fail_at,
            writes: 0,
        }
    }

    fn set(&mut self, level: bool) -> Result<(), MockError> {
        self.writes += 1;
        if self.writes == self.fail_at {
            return Err(MockError::Io(std::io::ErrorKind::BrokenPipe));
        }
        self.board.borrow_mut().record(Op::LineLevel(level));
        Ok(())
    }
}

impl ErrorType for FlakyLine {
    type Error = MockError;
}

impl OutputPin for FlakyLine {
    fn set_low(&mut self) -> Result<(), MockError> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), MockError> {
        self.set(true)
    }
}

impl TxLine for FlakyLine {
    fn drive(&mut self) -> Result<(), MockError> {
        self.board.borrow_mut().record(Op::LineDrive);
        Ok(())
    }

    fn release(&mut self) -> Result<(), MockError> {
        self.board.borrow_mut().record(Op::LineRelease);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Rail {
    Sensor,
    Radio,
}

#[derive(Debug)]
pub struct SimRail(pub Shared, pub Rail);

impl ErrorType for SimRail {
    type Error = Infallible;
}

impl OutputPin for SimRail {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.switch(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.switch(true);
        Ok(())
    }
}

impl SimRail {
    fn switch(&mut self, on: bool) {
        let op = match self.1 {
            Rail::Sensor => Op::SensorPower(on),
            Rail::Radio => Op::RadioPower(on),
        };
        self.0.borrow_mut().record(op);
    }
}

#[derive(Debug)]
pub struct SimAdc(pub Shared);

impl Converter for SimAdc {
    fn configure(&mut self, config: &AdcConfig) {
        self.0.borrow_mut().record(Op::AdcConfigure(*config));
    }

    fn start_conversion(&mut self) {
        let mut board = self.0.borrow_mut();
        board.record(Op::AdcStart);
        board.result = board.samples.pop_front().expect("converter ran out of samples");
        board.in_flight = true;
    }

    fn read_result(&mut self) -> u16 {
        let mut board = self.0.borrow_mut();
        let result = board.result;
        board.record(Op::AdcRead(result));
        result
    }

    fn disable(&mut self) {
        self.0.borrow_mut().record(Op::AdcDisable);
    }
}

#[derive(Debug)]
pub struct SimAlarm(pub Shared);

impl WakeAlarm for SimAlarm {
    fn configure_period(&mut self, period_ms: u32) {
        self.0.borrow_mut().record(Op::AlarmPeriod(period_ms));
    }

    fn clear_expired(&mut self) {
        self.0.borrow_mut().record(Op::AlarmClear);
    }

    fn reset(&mut self) {
        self.0.borrow_mut().record(Op::AlarmReset);
    }

    fn enable_wake(&mut self) {
        let mut board = self.0.borrow_mut();
        board.alarm_wake = true;
        board.record(Op::AlarmWake(true));
    }

    fn disable_wake(&mut self) {
        let mut board = self.0.borrow_mut();
        board.alarm_wake = false;
        board.record(Op::AlarmWake(false));
    }
}

/// Low-power states. Entering idle completes an in-flight conversion, unless
/// a spurious wake is queued; power-down requires the alarm to be armed.
#[derive(Debug)]
pub struct SimSleeper(pub Shared);

impl LowPower for SimSleeper {
    fn enter_idle(&mut self) {
        let mut board = self.0.borrow_mut();
        board.record(Op::Idle);
        if board.spurious_wakes > 0 {
            board.spurious_wakes -= 1;
            return;
        }
        assert!(board.in_flight, "idle with nothing to wake the processor");
        board.in_flight = false;
        if let Some(signal) = board.signal {
            on_conversion_complete(signal);
        }
    }

    fn enter_power_down(&mut self) {
        let mut board = self.0.borrow_mut();
        board.record(Op::PowerDown);
        assert!(board.alarm_wake, "power-down with the wake alarm disabled");
        on_alarm();
    }
}
