#![no_std]
//! Two-phase software PWM dimmer for interrupt-free microcontrollers.
//!
//! A single cooperative loop alternates two outputs in half-periods of
//! `steps` ticks, samples a control input through a non-blocking ADC once per
//! half-period and maps each reading through a gamma table onto the duty
//! cycle.

// This must go FIRST so that all the other modules see its macros.
mod fmt;

mod config;
mod dimmer;
mod driver;
mod gamma;
mod hal;
mod sampler;

pub use config::{
    DimmerBuilder, DimmerConfig, DimmerDutyCycleBuildState, DimmerFinalizedBuildState,
    DimmerShiftBuildState, DimmerStepsBuildState,
};
pub use dimmer::{Dimmer, DimmerParts};
pub use driver::{Phase, PwmPhaseDriver};
pub use gamma::{DEFAULT_GAMMA, GammaTable};
pub use hal::{ConversionAdc, NoWatchdog, Watchdog};
pub use sampler::{SamplingState, SamplingStateMachine};

/// Lowest duty cycle ever applied; the selected output is never fully dark.
pub const MIN_DUTY_CYCLE: u8 = 1;

/// Highest duty cycle.
pub const MAX_DUTY_CYCLE: u8 = 100;

/// Errors that can occur while configuring or running the dimmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DimmerError {
    /// The half-period length is zero
    InvalidSteps,
    /// Shifted ADC readings can index past the end of the gamma table
    InvalidShift,
    /// The duty cycle value is outside `1..=100`
    InvalidDutyCycle,
    /// The gamma exponent is not a finite positive number
    InvalidGamma,
    /// A supplied gamma table is out of range, decreasing or does not end at 100
    InvalidTable,
    /// Writing to an output pin failed
    Output(embedded_hal::digital::ErrorKind),
}
