#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use phase_dimmer::{ConversionAdc, Watchdog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub line: Line,
    pub high: bool,
}

/// Levels of both lines plus every write in order.
#[derive(Default)]
pub struct Bench {
    pub levels: [bool; 2],
    pub writes: Vec<Write>,
    pub overlaps: u32,
}

impl Bench {
    pub fn shared() -> Rc<RefCell<Bench>> {
        Rc::new(RefCell::new(Bench::default()))
    }

    pub fn level(&self, line: Line) -> bool {
        self.levels[line as usize]
    }
}

#[derive(Debug)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockPin {
    line: Line,
    bench: Rc<RefCell<Bench>>,
    pub fail: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new(line: Line, bench: &Rc<RefCell<Bench>>) -> Self {
        Self {
            line,
            bench: Rc::clone(bench),
            fail: Rc::new(Cell::new(false)),
        }
    }

    fn write(&mut self, high: bool) -> Result<(), PinFault> {
        if self.fail.get() {
            return Err(PinFault);
        }

        let mut bench = self.bench.borrow_mut();
        bench.levels[self.line as usize] = high;
        bench.writes.push(Write {
            line: self.line,
            high,
        });

        if bench.levels[0] && bench.levels[1] {
            bench.overlaps += 1;
        }

        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = PinFault;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

/// ADC statistics visible to the test after the ADC moved into the dimmer.
#[derive(Default)]
pub struct AdcProbe {
    pub starts: Cell<u32>,
    pub polls: Cell<u32>,
    pub reads: Cell<u32>,
    pub in_flight: Cell<bool>,
}

/// 8-bit ADC that stays busy for `latency` polls after each start and then
/// yields the next scripted sample (repeating the last one once exhausted).
pub struct MockAdc {
    samples: VecDeque<u16>,
    last: u16,
    latency: u32,
    remaining: u32,
    pub probe: Rc<AdcProbe>,
}

impl MockAdc {
    pub fn new(latency: u32, samples: &[u16]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            last: 0,
            latency,
            remaining: 0,
            probe: Rc::new(AdcProbe::default()),
        }
    }

    /// ADC whose conversions never finish.
    pub fn stalled() -> Self {
        Self::new(u32::MAX, &[])
    }
}

impl ConversionAdc for MockAdc {
    const RESOLUTION_BITS: u8 = 8;

    fn start_conversion(&mut self) {
        assert!(
            !self.probe.in_flight.get(),
            "conversion started while another is in flight"
        );
        self.probe.in_flight.set(true);
        self.probe.starts.set(self.probe.starts.get() + 1);
        self.remaining = self.latency;
    }

    fn is_conversion_in_progress(&mut self) -> bool {
        self.probe.polls.set(self.probe.polls.get() + 1);

        if self.remaining == 0 {
            return false;
        }

        if self.remaining != u32::MAX {
            self.remaining -= 1;
        }

        true
    }

    fn read_result(&mut self) -> u16 {
        assert!(self.probe.in_flight.get(), "result read without a conversion");
        assert_eq!(self.remaining, 0, "result read before conversion finished");
        self.probe.in_flight.set(false);
        self.probe.reads.set(self.probe.reads.get() + 1);

        if let Some(sample) = self.samples.pop_front() {
            self.last = sample;
        }

        self.last
    }
}

/// 10-bit ADC, used to exercise shift validation.
pub struct WideAdc;

impl ConversionAdc for WideAdc {
    const RESOLUTION_BITS: u8 = 10;

    fn start_conversion(&mut self) {}

    fn is_conversion_in_progress(&mut self) -> bool {
        false
    }

    fn read_result(&mut self) -> u16 {
        0x3ff
    }
}

#[derive(Default, Clone)]
pub struct CountingWatchdog {
    pub feeds: Rc<Cell<u32>>,
}

impl Watchdog for CountingWatchdog {
    fn feed(&mut self) {
        self.feeds.set(self.feeds.get() + 1);
    }
}
