use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::config::{DimmerBuilder, DimmerConfig, DimmerStepsBuildState};
use crate::driver::{Phase, PwmPhaseDriver};
use crate::gamma::GammaTable;
use crate::hal::{ConversionAdc, Watchdog};
use crate::sampler::{SamplingState, SamplingStateMachine};
use crate::DimmerError;

/// The cooperative control loop.
///
/// Owns the sampler, the PWM driver, the watchdog and the single duty value
/// they share. Everything runs on the caller's thread; nothing in a tick
/// waits on hardware.
pub struct Dimmer<ADC, A, B, W, const N: usize> {
    sampler: SamplingStateMachine<ADC, N>,
    driver: PwmPhaseDriver<A, B>,
    watchdog: W,
    duty: u8,
}

/// Peripherals handed back by [`Dimmer::release`].
pub struct DimmerParts<ADC, A, B, W> {
    pub adc: ADC,
    pub out_a: A,
    pub out_b: B,
    pub watchdog: W,
}

impl Dimmer<(), (), (), (), 0> {
    /// Start building a dimmer, see [`DimmerConfig::builder`].
    pub fn builder() -> DimmerBuilder<DimmerStepsBuildState> {
        DimmerConfig::builder()
    }
}

impl<ADC, A, B, W, const N: usize> Dimmer<ADC, A, B, W, N>
where
    ADC: ConversionAdc,
    A: OutputPin,
    B: OutputPin,
    W: Watchdog,
{
    pub fn with_config(
        config: DimmerConfig,
        table: GammaTable<N>,
        adc: ADC,
        out_a: A,
        out_b: B,
        watchdog: W,
    ) -> Result<Self, DimmerError> {
        let sampler = SamplingStateMachine::new(adc, table, config.shift())?;
        let driver = PwmPhaseDriver::new(out_a, out_b, config.steps())?;

        info!(
            "dimmer configured: steps={} shift={} initial_duty={}",
            config.steps(),
            config.shift(),
            config.initial_duty()
        );

        Ok(Self {
            sampler,
            driver,
            watchdog,
            duty: config.initial_duty(),
        })
    }

    /// One pass of the loop.
    ///
    /// At the top of a half-period the watchdog is fed and a conversion is
    /// requested. A finished conversion replaces the duty value, then the
    /// counter advances and both outputs are refreshed.
    pub fn tick(&mut self) -> Result<(), DimmerError> {
        if self.driver.at_period_start() {
            self.watchdog.feed();
            self.sampler.request();
        }

        match self.sampler.poll() {
            Ok(duty) => self.duty = duty,
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(never)) => match never {},
        }

        self.driver.advance();
        self.driver.apply(self.duty)
    }

    /// Tick forever. Only returns if an output pin reports an error.
    pub fn run(mut self) -> Result<Infallible, DimmerError> {
        loop {
            self.tick()?;
        }
    }

    /// Duty applied on the most recent tick.
    pub fn duty(&self) -> u8 {
        self.duty
    }

    pub fn counter(&self) -> u16 {
        self.driver.counter()
    }

    pub fn phase(&self) -> Phase {
        self.driver.phase()
    }

    pub fn sampling_state(&self) -> SamplingState {
        self.sampler.state()
    }

    pub fn table(&self) -> &GammaTable<N> {
        self.sampler.table()
    }

    /// Pull both outputs low and hand back the peripherals.
    ///
    /// The peripherals are returned even when pulling an output low fails;
    /// the second element reports that failure.
    pub fn release(self) -> (DimmerParts<ADC, A, B, W>, Result<(), DimmerError>) {
        let Self {
            sampler,
            mut driver,
            watchdog,
            ..
        } = self;

        let shutdown = driver.shutdown();
        let (out_a, out_b) = driver.release();

        let parts = DimmerParts {
            adc: sampler.release(),
            out_a,
            out_b,
            watchdog,
        };

        (parts, shutdown)
    }
}
