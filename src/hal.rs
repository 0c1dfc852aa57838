//! Platform capabilities the control loop consumes.
//!
//! Output lines are plain [`embedded_hal::digital::OutputPin`]s. The ADC and
//! watchdog have no `embedded-hal` 1.0 counterpart with the required
//! start/poll/read split, so they are described here.

/// A single-channel ADC that converts in the background.
///
/// None of the methods may block: the control loop calls them from inside a
/// fixed-duration tick.
pub trait ConversionAdc {
    /// Number of significant bits in a value returned by [`read_result`](Self::read_result).
    const RESOLUTION_BITS: u8;

    /// Kick off a conversion and return immediately.
    fn start_conversion(&mut self);

    /// `true` while the conversion started last is still running.
    fn is_conversion_in_progress(&mut self) -> bool;

    /// Raw result of the last conversion.
    ///
    /// Only meaningful once [`is_conversion_in_progress`](Self::is_conversion_in_progress)
    /// has reported `false` after a start.
    fn read_result(&mut self) -> u16;
}

/// External supervisory timer.
pub trait Watchdog {
    /// Restart the watchdog countdown.
    fn feed(&mut self);
}

/// Watchdog stand-in for platforms where the supervisory timer is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    #[inline(always)]
    fn feed(&mut self) {}
}

impl<T: ConversionAdc + ?Sized> ConversionAdc for &mut T {
    const RESOLUTION_BITS: u8 = T::RESOLUTION_BITS;

    fn start_conversion(&mut self) {
        T::start_conversion(self)
    }

    fn is_conversion_in_progress(&mut self) -> bool {
        T::is_conversion_in_progress(self)
    }

    fn read_result(&mut self) -> u16 {
        T::read_result(self)
    }
}

impl<T: Watchdog + ?Sized> Watchdog for &mut T {
    fn feed(&mut self) {
        T::feed(self)
    }
}
