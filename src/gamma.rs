//! Perceptual brightness correction.
//!
//! The eye responds to light intensity roughly logarithmically, so a linear
//! turn of the control knob is mapped through `duty = 100 * x^gamma` to feel
//! linear to an observer.

use crate::{DimmerError, MAX_DUTY_CYCLE, MIN_DUTY_CYCLE};

/// Exponent used by [`GammaTable::perceptual`].
pub const DEFAULT_GAMMA: f64 = 2.2;

/// Immutable lookup from a linear sample index to a duty cycle in
/// `[MIN_DUTY_CYCLE, MAX_DUTY_CYCLE]`.
///
/// Entries are non-decreasing, the first is at least 1 and the last is
/// exactly 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTable<const N: usize> {
    entries: [u8; N],
}

impl<const N: usize> GammaTable<N> {
    const MIN_LEN: () = assert!(N >= 2, "gamma table needs at least two entries");

    /// Table for the standard 2.2 display gamma.
    pub fn perceptual() -> Self {
        Self::fill(DEFAULT_GAMMA)
    }

    /// Build the table from `round_half_up(100 * (i / (N - 1))^gamma)`,
    /// clamped to `[1, 100]`.
    pub fn generate(gamma: f64) -> Result<Self, DimmerError> {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(DimmerError::InvalidGamma);
        }

        Ok(Self::fill(gamma))
    }

    // `gamma` must be finite and positive
    fn fill(gamma: f64) -> Self {
        let () = Self::MIN_LEN;

        let last = (N - 1) as f64;
        // dividing last keeps exact halves exact, e.g. 100 * 29 / 200
        let scale = libm::pow(last, gamma);
        let entries = core::array::from_fn(|i| {
            let curve = if scale.is_finite() {
                f64::from(MAX_DUTY_CYCLE) * libm::pow(i as f64, gamma) / scale
            } else {
                f64::from(MAX_DUTY_CYCLE) * libm::pow(i as f64 / last, gamma)
            };
            let duty = libm::floor(curve + 0.5);

            // float-to-int `as` saturates, the clamp keeps the floor of 1
            (duty as u8).clamp(MIN_DUTY_CYCLE, MAX_DUTY_CYCLE)
        });

        debug!("gamma table generated: {} entries", N);

        Self { entries }
    }

    /// Wrap a precomputed table after checking its invariants.
    pub fn from_entries(entries: [u8; N]) -> Result<Self, DimmerError> {
        let () = Self::MIN_LEN;

        let in_range = entries
            .iter()
            .all(|duty| (MIN_DUTY_CYCLE..=MAX_DUTY_CYCLE).contains(duty));
        let monotonic = entries.windows(2).all(|pair| pair[0] <= pair[1]);

        if !in_range || !monotonic || entries[N - 1] != MAX_DUTY_CYCLE {
            return Err(DimmerError::InvalidTable);
        }

        Ok(Self { entries })
    }

    /// Duty cycle for a sample already shifted down to table resolution.
    ///
    /// # Panics
    ///
    /// If `index >= N`. The builder rejects any ADC/shift combination that
    /// could produce such an index.
    #[inline]
    pub fn lookup(&self, index: usize) -> u8 {
        self.entries[index]
    }

    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        N
    }

    pub fn entries(&self) -> &[u8; N] {
        &self.entries
    }
}
