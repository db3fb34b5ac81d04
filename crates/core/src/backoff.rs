//! Exponential backoff with jitter for retry loops.
//!
//! Shared by the search provider adapters and the generation retry path.
//! The sleep for attempt `n` (zero-based) is `min(2^n seconds + jitter, cap)`
//! where jitter is a uniform fraction of a second.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Compute the sleep duration before retry attempt `attempt` (zero-based).
pub fn backoff_delay(attempt: u32, cap: Duration) -> Duration {
    let base = 2u64.saturating_pow(attempt);
    let raw = Duration::from_secs(base) + Duration::from_secs_f64(jitter_fraction());
    raw.min(cap)
}

/// Generate a jitter fraction in `[0.0, 1.0)` using a simple LCG.
///
/// This only needs to break synchronization between concurrent retriers,
/// not be cryptographically random, so no external crate is pulled in.
fn jitter_fraction() -> f64 {
    static SEED: AtomicU64 = AtomicU64::new(0);

    // Mix in current time on first use.
    if SEED.load(Ordering::Relaxed) == 0 {
        let init = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0x9E37_79B9, |d| d.as_nanos() as u64 | 1);
        SEED.compare_exchange(0, init, Ordering::Relaxed, Ordering::Relaxed)
            .ok();
    }

    // LCG step: x' = a*x + c (mod 2^64)
    let a: u64 = 6_364_136_223_846_793_005;
    let c: u64 = 1_442_695_040_888_963_407;
    let old = SEED
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
            Some(x.wrapping_mul(a).wrapping_add(c))
        })
        .unwrap_or(42);

    (old >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let cap = Duration::from_secs(10);
        let d0 = backoff_delay(0, cap);
        let d2 = backoff_delay(2, cap);
        let d6 = backoff_delay(6, cap);

        assert!(d0 >= Duration::from_secs(1));
        assert!(d0 < Duration::from_secs(2));
        assert!(d2 >= Duration::from_secs(4));
        assert!(d2 < Duration::from_secs(5));
        assert_eq!(d6, cap);
    }

    #[test]
    fn test_jitter_varies() {
        let values: Vec<f64> = (0..20).map(|_| jitter_fraction()).collect();
        let first = values[0];
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
        assert!(values.iter().any(|v| (v - first).abs() > 1e-6));
    }
}
