use core::marker::PhantomData;

use embedded_hal::digital::OutputPin;
use fugit::{HertzU32, NanosDurationU32};

use crate::dimmer::Dimmer;
use crate::gamma::GammaTable;
use crate::hal::{ConversionAdc, Watchdog};
use crate::{DimmerError, MAX_DUTY_CYCLE, MIN_DUTY_CYCLE};

/// Build-time parameters of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DimmerConfig {
    steps: u16,
    shift: u8,
    initial_duty: u8,
}

impl DimmerConfig {
    /// 100 ticks per half-period, 8-bit reading down to a 128-entry table,
    /// 90% until the first sample lands.
    pub const DEFAULT: Self = Self {
        steps: 100,
        shift: 1,
        initial_duty: 90,
    };

    /// Validate a configuration.
    ///
    /// Being `const`, this can be forced to run at compile time:
    ///
    /// ```
    /// use phase_dimmer::DimmerConfig;
    ///
    /// const CONFIG: DimmerConfig = match DimmerConfig::new(64, 2, 90) {
    ///     Ok(config) => config,
    ///     Err(_) => panic!("invalid dimmer configuration"),
    /// };
    /// ```
    ///
    /// Whether `shift` suits a particular ADC and table is only known once
    /// those are supplied, see [`DimmerConfig::check_shift`].
    pub const fn new(steps: u16, shift: u8, initial_duty: u8) -> Result<Self, DimmerError> {
        if steps == 0 {
            return Err(DimmerError::InvalidSteps);
        }

        if shift >= 16 {
            return Err(DimmerError::InvalidShift);
        }

        if initial_duty < MIN_DUTY_CYCLE || initial_duty > MAX_DUTY_CYCLE {
            return Err(DimmerError::InvalidDutyCycle);
        }

        Ok(Self {
            steps,
            shift,
            initial_duty,
        })
    }

    /// Check that every reading of a `resolution_bits` ADC, shifted right by
    /// `shift`, indexes inside a table of `table_len` entries.
    pub const fn check_shift(&self, resolution_bits: u8, table_len: usize) -> Result<(), DimmerError> {
        check_shift(self.shift, resolution_bits, table_len)
    }

    pub const fn steps(&self) -> u16 {
        self.steps
    }

    pub const fn shift(&self) -> u8 {
        self.shift
    }

    pub const fn initial_duty(&self) -> u8 {
        self.initial_duty
    }

    /// Output frequency for a loop whose every pass takes `tick`.
    ///
    /// One full period is two half-periods of `steps` ticks each.
    pub fn output_frequency(&self, tick: NanosDurationU32) -> HertzU32 {
        let period_ns = 2 * u64::from(self.steps) * u64::from(tick.ticks());

        if period_ns == 0 {
            return HertzU32::from_raw(0);
        }

        HertzU32::from_raw((1_000_000_000 / period_ns) as u32)
    }
}

pub(crate) const fn check_shift(
    shift: u8,
    resolution_bits: u8,
    table_len: usize,
) -> Result<(), DimmerError> {
    if shift >= 16 || shift > resolution_bits || resolution_bits > 16 {
        return Err(DimmerError::InvalidShift);
    }

    let max_raw = if resolution_bits == 16 {
        u16::MAX
    } else {
        (1 << resolution_bits) - 1
    };

    if (max_raw >> shift) as usize >= table_len {
        return Err(DimmerError::InvalidShift);
    }

    Ok(())
}

impl DimmerConfig {
    /// Start building a configuration, and from it a [`Dimmer`].
    ///
    /// ```
    /// # use phase_dimmer::{DimmerConfig, DimmerError};
    /// # fn check() -> Result<(), DimmerError> {
    /// let config = DimmerConfig::builder().steps(100)?.shift(1).initial_duty(90)?.config()?;
    /// assert_eq!(config, DimmerConfig::DEFAULT);
    /// # Ok(())
    /// # }
    /// # check().unwrap();
    /// ```
    pub fn builder() -> DimmerBuilder<DimmerStepsBuildState> {
        DimmerBuilder::new()
    }
}

impl Default for DimmerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub struct DimmerStepsBuildState {}
pub struct DimmerShiftBuildState {}
pub struct DimmerDutyCycleBuildState {}
pub struct DimmerFinalizedBuildState {}

/// Step-by-step construction of a [`Dimmer`].
pub struct DimmerBuilder<T> {
    steps: u16,
    shift: u8,
    initial_duty: u8,
    _phantom: PhantomData<T>,
}

impl DimmerBuilder<DimmerStepsBuildState> {
    pub(crate) fn new() -> Self {
        Self {
            steps: 0,
            shift: 0,
            initial_duty: 0,
            _phantom: PhantomData,
        }
    }

    /// Half-period length in loop ticks.
    pub fn steps(self, steps: u16) -> Result<DimmerBuilder<DimmerShiftBuildState>, DimmerError> {
        if steps == 0 {
            return Err(DimmerError::InvalidSteps);
        }

        Ok(DimmerBuilder {
            steps,
            shift: self.shift,
            initial_duty: self.initial_duty,
            _phantom: PhantomData,
        })
    }
}

impl DimmerBuilder<DimmerShiftBuildState> {
    /// Bits dropped from each raw reading to reach table resolution.
    pub fn shift(self, shift: u8) -> DimmerBuilder<DimmerDutyCycleBuildState> {
        DimmerBuilder {
            steps: self.steps,
            shift,
            initial_duty: self.initial_duty,
            _phantom: PhantomData,
        }
    }
}

impl DimmerBuilder<DimmerDutyCycleBuildState> {
    /// Duty applied until the first conversion completes.
    pub fn initial_duty(
        self,
        initial_duty: u8,
    ) -> Result<DimmerBuilder<DimmerFinalizedBuildState>, DimmerError> {
        if !(MIN_DUTY_CYCLE..=MAX_DUTY_CYCLE).contains(&initial_duty) {
            return Err(DimmerError::InvalidDutyCycle);
        }

        Ok(DimmerBuilder {
            steps: self.steps,
            shift: self.shift,
            initial_duty,
            _phantom: PhantomData,
        })
    }
}

impl DimmerBuilder<DimmerFinalizedBuildState> {
    pub fn config(&self) -> Result<DimmerConfig, DimmerError> {
        DimmerConfig::new(self.steps, self.shift, self.initial_duty)
    }

    pub fn build<ADC, A, B, W, const N: usize>(
        self,
        table: GammaTable<N>,
        adc: ADC,
        out_a: A,
        out_b: B,
        watchdog: W,
    ) -> Result<Dimmer<ADC, A, B, W, N>, DimmerError>
    where
        ADC: ConversionAdc,
        A: OutputPin,
        B: OutputPin,
        W: Watchdog,
    {
        let config = self.config()?;

        Dimmer::with_config(config, table, adc, out_a, out_b, watchdog)
    }
}
