//! `task_jitter`: the +/-10% random perturbation of simulated task
//! duration named in the configuration surface (§6).
//!
//! The engine never sleeps on a task's behalf -- task bodies are an
//! external collaborator (§1) -- so this is a small helper task bodies
//! can call themselves, not something the dispatch loop consults. The
//! integer-percentage jitter math mirrors the platform's own
//! exponential-backoff jitter.

use std::time::Duration;

/// Perturbs `base` by up to +/-10%, or returns `base` unchanged when
/// `enabled` is `false`.
#[must_use]
pub fn jittered_duration(base: Duration, enabled: bool) -> Duration {
    if !enabled {
        return base;
    }
    jittered_duration_with(base, &mut fastrand::Rng::new())
}

/// Same as [`jittered_duration`] but takes an explicit RNG, so callers
/// (and tests) can make the perturbation reproducible.
#[must_use]
pub fn jittered_duration_with(base: Duration, rng: &mut fastrand::Rng) -> Duration {
    const JITTER_PERCENT: u32 = 10;

    // random in [0, 2*JITTER_PERCENT): below JITTER_PERCENT shrinks,
    // at or above it grows, same two-sided split as the backoff decider.
    let random = rng.u32(0..JITTER_PERCENT * 2);
    if random < JITTER_PERCENT {
        let delta = base.saturating_mul(random) / 100;
        base.saturating_sub(delta)
    } else {
        let delta = base.saturating_mul(random - JITTER_PERCENT) / 100;
        base.saturating_add(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_identity() {
        let base = Duration::from_millis(100);
        assert_eq!(jittered_duration(base, false), base);
    }

    #[test]
    fn enabled_stays_within_ten_percent() {
        let base = Duration::from_millis(1000);
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..1000 {
            let d = jittered_duration_with(base, &mut rng);
            assert!(d >= Duration::from_millis(900));
            assert!(d <= Duration::from_millis(1100));
        }
    }
}
