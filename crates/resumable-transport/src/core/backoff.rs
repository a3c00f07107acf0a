use std::time::Duration;

/// Upper bound for a single pause between resume attempts.
pub const MAX_RESUME_DELAY: Duration = Duration::from_secs(30);

/// Delay before a resume attempt, doubling with each consecutive failure.
///
/// The delay formula is: `min(base * 2^failures, MAX_RESUME_DELAY)`, where
/// `failures` counts the resume attempts made since bytes last arrived
/// (0 = first resume after a healthy stretch).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use resumable_transport::resume_delay;
///
/// let base = Duration::from_millis(100);
/// assert_eq!(resume_delay(0, base), Duration::from_millis(100));
/// assert_eq!(resume_delay(1, base), Duration::from_millis(200));
/// assert_eq!(resume_delay(2, base), Duration::from_millis(400));
///
/// // A zero base disables backoff altogether.
/// assert_eq!(resume_delay(7, Duration::ZERO), Duration::ZERO);
/// ```
pub fn resume_delay(failures: u32, base: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(failures);
    base.saturating_mul(multiplier).min(MAX_RESUME_DELAY)
}
