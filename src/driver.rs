use embedded_hal::digital::{Error as _, OutputPin, PinState};

use crate::DimmerError;

/// Which of the two outputs owns the current half-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    A,
    B,
}

impl Phase {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Phase::A => Phase::B,
            Phase::B => Phase::A,
        }
    }
}

/// Software PWM over two mutually exclusive outputs.
///
/// Each half-period lasts `steps` ticks and belongs to one output; the other
/// is held low. Within its half-period the selected output is high while the
/// counter is below the duty value (trailing-edge modulation).
pub struct PwmPhaseDriver<A, B> {
    out_a: A,
    out_b: B,
    steps: u16,
    counter: u16,
    phase: Phase,
}

impl<A: OutputPin, B: OutputPin> PwmPhaseDriver<A, B> {
    /// Driver with half-periods of `steps` ticks, starting in phase A.
    pub fn new(out_a: A, out_b: B, steps: u16) -> Result<Self, DimmerError> {
        if steps == 0 {
            return Err(DimmerError::InvalidSteps);
        }

        Ok(Self {
            out_a,
            out_b,
            steps,
            counter: 0,
            phase: Phase::A,
        })
    }

    /// `true` on the first tick of a half-period, before [`advance`](Self::advance).
    #[inline]
    pub fn at_period_start(&self) -> bool {
        self.counter == 0
    }

    /// Move the counter one tick forward, wrapping and flipping the phase at
    /// the end of a half-period.
    pub fn advance(&mut self) {
        self.counter += 1;

        if self.counter >= self.steps {
            self.counter = 0;
            self.phase = self.phase.toggle();
            trace!("half-period complete, phase b active: {}", self.phase == Phase::B);
        }
    }

    /// Drive both outputs for the current tick.
    ///
    /// The non-selected output is forced low before the selected one is
    /// written, so the two are never high at the same time. If forcing it low
    /// fails, the selected output is left untouched.
    pub fn apply(&mut self, duty: u8) -> Result<(), DimmerError> {
        let active = PinState::from(self.counter < u16::from(duty));

        match self.phase {
            Phase::A => {
                self.out_b.set_low().map_err(|e| DimmerError::Output(e.kind()))?;
                self.out_a.set_state(active).map_err(|e| DimmerError::Output(e.kind()))
            }
            Phase::B => {
                self.out_a.set_low().map_err(|e| DimmerError::Output(e.kind()))?;
                self.out_b.set_state(active).map_err(|e| DimmerError::Output(e.kind()))
            }
        }
    }

    /// Pull both outputs low.
    pub fn shutdown(&mut self) -> Result<(), DimmerError> {
        self.out_a.set_low().map_err(|e| DimmerError::Output(e.kind()))?;
        self.out_b.set_low().map_err(|e| DimmerError::Output(e.kind()))
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn release(self) -> (A, B) {
        (self.out_a, self.out_b)
    }
}
