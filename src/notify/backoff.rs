use rand::Rng;
use std::time::Duration;

/// Exponential backoff with ±30% jitter: `base * 2^attempt`.
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    // 2^6 times the base is plenty for a webhook
    let capped_attempt = attempt.min(6);

    let base_ms = base.as_millis().min(u128::from(u32::MAX)) as u64;
    let delay_ms = base_ms.saturating_mul(2_u64.pow(capped_attempt));

    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    Duration::from_millis((delay_ms as f64 * jitter_factor).round() as u64)
}
