use core::convert::Infallible;

use crate::config::check_shift;
use crate::gamma::GammaTable;
use crate::hal::ConversionAdc;
use crate::DimmerError;

/// Position of the sampler in its start/poll/read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplingState {
    /// No conversion in flight.
    Idle,
    /// A conversion was started and has not reported completion yet.
    Converting,
}

/// Non-blocking ADC sampling that feeds every completed reading through a
/// [`GammaTable`].
///
/// At most one conversion is ever in flight. A conversion that never
/// completes parks the sampler in [`SamplingState::Converting`] for good and
/// the last published duty stays in effect.
pub struct SamplingStateMachine<ADC, const N: usize> {
    adc: ADC,
    table: GammaTable<N>,
    shift: u8,
    state: SamplingState,
    stall_reported: bool,
}

impl<ADC: ConversionAdc, const N: usize> SamplingStateMachine<ADC, N> {
    /// Highest raw value the ADC can report.
    pub const MAX_RAW: u16 = if ADC::RESOLUTION_BITS >= 16 {
        u16::MAX
    } else {
        (1 << ADC::RESOLUTION_BITS) - 1
    };

    /// Sampler dropping `shift` bits from each reading before the lookup.
    ///
    /// Fails with [`DimmerError::InvalidShift`] unless every shifted reading
    /// indexes inside `table`.
    pub fn new(adc: ADC, table: GammaTable<N>, shift: u8) -> Result<Self, DimmerError> {
        check_shift(shift, ADC::RESOLUTION_BITS, N)?;

        Ok(Self {
            adc,
            table,
            shift,
            state: SamplingState::Idle,
            stall_reported: false,
        })
    }

    /// Start a conversion if none is in flight.
    ///
    /// Called once per PWM half-period, at the top of the period.
    pub fn request(&mut self) {
        match self.state {
            SamplingState::Idle => {
                self.adc.start_conversion();
                self.state = SamplingState::Converting;
                self.stall_reported = false;
                trace!("adc conversion started");
            }
            SamplingState::Converting => {
                if !self.stall_reported {
                    warn!("adc conversion still in flight, keeping last duty");
                    self.stall_reported = true;
                }
            }
        }
    }

    /// Check for a finished conversion without waiting for it.
    ///
    /// Returns the gamma-corrected duty of a conversion that completed on this
    /// call, or [`nb::Error::WouldBlock`] when there is nothing new: either no
    /// conversion is in flight or the one in flight is still running.
    pub fn poll(&mut self) -> nb::Result<u8, Infallible> {
        if self.state == SamplingState::Idle || self.adc.is_conversion_in_progress() {
            return Err(nb::Error::WouldBlock);
        }

        self.state = SamplingState::Idle;

        let raw = self.adc.read_result() & Self::MAX_RAW;
        let duty = self.table.lookup(usize::from(raw >> self.shift));

        trace!("adc conversion complete: raw={} duty={}", raw, duty);

        Ok(duty)
    }

    pub fn state(&self) -> SamplingState {
        self.state
    }

    pub fn table(&self) -> &GammaTable<N> {
        &self.table
    }

    pub fn release(self) -> ADC {
        self.adc
    }
}
