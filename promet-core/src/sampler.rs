//! Exemplar sampling strategies.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use promet_model::{Exemplar, ExemplarBuilder};

/// Decides whether a fresh observation replaces the currently held
/// exemplar.
///
/// A sampler is consulted synchronously on the observe path inside a
/// compare-and-swap loop, so implementations must be pure: no I/O, bounded
/// time, and safe to call from any thread.  Returning `None` keeps the
/// previous exemplar.
pub trait ExemplarSampler: Send + Sync {
    /// Returns the replacement exemplar for an observation of `value`, or
    /// `None` to keep `previous`.
    fn sample(&self, value: f64, previous: Option<&Exemplar>) -> Option<Exemplar>;
}

/// Epoch-millisecond clock used by [`AgeReplaceSampler`].
pub type MillisClock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// The wall clock, in milliseconds since the Unix epoch.
pub fn system_millis() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis() as i64)
}

/// The default sampling policy: replace the held exemplar once it is older
/// than a minimum age or absent, otherwise keep it.
pub struct AgeReplaceSampler {
    min_age_millis: i64,
    clock: MillisClock,
}

impl AgeReplaceSampler {
    /// Default minimum age between exemplar replacements.
    pub const DEFAULT_MIN_AGE: Duration = Duration::from_secs(7);

    /// Creates a sampler replacing exemplars older than `min_age`.
    pub fn new(min_age: Duration) -> Self {
        Self::with_clock(min_age, Arc::new(system_millis))
    }

    /// Creates a sampler reading time from `clock` instead of the system
    /// clock.
    pub fn with_clock(min_age: Duration, clock: MillisClock) -> Self {
        AgeReplaceSampler { min_age_millis: min_age.as_millis() as i64, clock }
    }
}

impl Default for AgeReplaceSampler {
    fn default() -> Self {
        AgeReplaceSampler::new(Self::DEFAULT_MIN_AGE)
    }
}

impl ExemplarSampler for AgeReplaceSampler {
    fn sample(&self, value: f64, previous: Option<&Exemplar>) -> Option<Exemplar> {
        let now = (self.clock)();
        let stale = match previous {
            None => true,
            Some(previous) => previous
                .timestamp_millis()
                .map_or(true, |held| now.saturating_sub(held) >= self.min_age_millis),
        };
        if !stale {
            return None;
        }
        // An empty label set cannot fail the exemplar length budget.
        ExemplarBuilder { value, timestamp_millis: Some(now), ..Default::default() }.build().ok()
    }
}
