// Retry policy for secret store writes

use std::time::Duration;

/// Exponential backoff with jitter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(20),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Attempts actually made; a write is always tried at least once
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before the next attempt, after `attempt` attempts have failed
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let initial_ms = self.initial_delay.as_millis() as f64;
        let base_delay = initial_ms * self.multiplier.powi(attempt as i32 - 1);
        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let jitter_range = capped_delay * self.jitter;
        let jitter = (rand::random::<f64>() - 0.5) * 2.0 * jitter_range;
        let final_delay = (capped_delay + jitter).max(0.0) as u64;

        Duration::from_millis(final_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_and_is_capped() {
        let config = RetryConfig {
            jitter: 0.0,
            ..Default::default()
        };
        assert_eq!(config.calculate_delay(0), Duration::ZERO);
        assert_eq!(config.calculate_delay(1), Duration::from_millis(500));
        assert_eq!(config.calculate_delay(2), Duration::from_millis(1000));
        assert_eq!(config.calculate_delay(3), Duration::from_millis(2000));
        assert_eq!(config.calculate_delay(10), Duration::from_secs(20));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let delay = config.calculate_delay(1).as_millis();
            assert!((450..=550).contains(&delay), "{}", delay);
        }
    }

    #[test]
    fn test_zero_initial_delay() {
        let config = RetryConfig::default().with_initial_delay(Duration::ZERO);
        assert_eq!(config.calculate_delay(3), Duration::ZERO);
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryConfig::default().with_max_attempts(0).attempts(), 1);
        assert_eq!(RetryConfig::default().attempts(), 5);
    }
}
