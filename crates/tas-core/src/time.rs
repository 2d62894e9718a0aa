//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter with a fixed
//! resolution of one nanosecond.  Gate control lists, guard bands and
//! transmission durations are all expressed in ticks, so schedule
//! arithmetic is exact (no floating-point drift) and comparisons are O(1).
//!
//! Transmission durations are derived from a [`Bitrate`] and rounded *up*
//! to the next whole tick: a frame is never reported as finishing earlier
//! than it physically would.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Ticks per simulated second (1 tick = 1 ns).
pub const TICKS_PER_SECOND: u64 = 1_000_000_000;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation time in nanoseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }

    /// Ticks remaining from `self` until `later`, or 0 if `later` has passed.
    #[inline]
    pub fn until(self, later: Tick) -> u64 {
        later.0.saturating_sub(self.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── Bitrate ───────────────────────────────────────────────────────────────────

/// A link data rate in bits per second.  Always non-zero once constructed
/// through [`Bitrate::new`] or parsing.
///
/// With the `serde` feature it (de)serializes as its display string, e.g.
/// `"1Gbps"`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Bitrate(u64);

impl Bitrate {
    pub fn new(bits_per_second: u64) -> CoreResult<Self> {
        if bits_per_second == 0 {
            return Err(CoreError::ZeroBitrate);
        }
        Ok(Bitrate(bits_per_second))
    }

    /// Shorthand for `n` Gb/s.  `n` must be non-zero.
    pub const fn gbps(n: u64) -> Self {
        Bitrate(n * 1_000_000_000)
    }

    /// Shorthand for `n` Mb/s.  `n` must be non-zero.
    pub const fn mbps(n: u64) -> Self {
        Bitrate(n * 1_000_000)
    }

    #[inline]
    pub fn bits_per_second(self) -> u64 {
        self.0
    }

    /// Ticks needed to serialize `bits` at this rate, rounded up.
    pub fn transmission_ticks(self, bits: u64) -> u64 {
        let num = bits as u128 * TICKS_PER_SECOND as u128;
        num.div_ceil(self.0 as u128) as u64
    }

    /// Ticks needed to serialize `bytes` at this rate, rounded up.
    #[inline]
    pub fn transmission_ticks_for_bytes(self, bytes: u64) -> u64 {
        self.transmission_ticks(bytes * 8)
    }

    /// Whole bytes fully serialized after `ticks` at this rate.
    pub fn bytes_in(self, ticks: u64) -> u64 {
        let bits = ticks as u128 * self.0 as u128 / TICKS_PER_SECOND as u128;
        (bits / 8) as u64
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            n if n % 1_000_000_000 == 0 => write!(f, "{}Gbps", n / 1_000_000_000),
            n if n % 1_000_000 == 0 => write!(f, "{}Mbps", n / 1_000_000),
            n if n % 1_000 == 0 => write!(f, "{}kbps", n / 1_000),
            n => write!(f, "{n}bps"),
        }
    }
}

impl FromStr for Bitrate {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let s = s.trim();
        let (digits, scale) = [("Gbps", 1_000_000_000), ("Mbps", 1_000_000), ("kbps", 1_000), ("bps", 1)]
            .into_iter()
            .find_map(|(suffix, scale)| s.strip_suffix(suffix).map(|d| (d.trim(), scale)))
            .ok_or_else(|| CoreError::InvalidBitrate(s.to_owned()))?;
        let n: u64 = digits
            .parse()
            .map_err(|_| CoreError::InvalidBitrate(s.to_owned()))?;
        let bps = n
            .checked_mul(scale)
            .ok_or_else(|| CoreError::InvalidBitrate(s.to_owned()))?;
        Bitrate::new(bps)
    }
}

impl TryFrom<String> for Bitrate {
    type Error = CoreError;

    fn try_from(s: String) -> CoreResult<Self> {
        s.parse()
    }
}

impl From<Bitrate> for String {
    fn from(rate: Bitrate) -> String {
        rate.to_string()
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The current simulation time, advanced by the event kernel as it
/// dispatches timers.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward to `tick`.
    ///
    /// # Panics
    /// Panics in debug mode if `tick` lies in the past.
    #[inline]
    pub fn advance_to(&mut self, tick: Tick) {
        debug_assert!(tick >= self.current_tick, "clock cannot run backwards");
        self.current_tick = tick;
    }

    /// Elapsed simulated microseconds since tick 0.  Useful for logging.
    #[inline]
    pub fn elapsed_micros(&self) -> u64 {
        self.current_tick.0 / 1_000
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} us)", self.current_tick, self.elapsed_micros())
    }
}
