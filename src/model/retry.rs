//! Bounded retry with exponential backoff for generation requests.

use std::time::{Duration, Instant};

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::{debug, warn};

use crate::config::GenerationParams;
use crate::error::ModelError;
use crate::model::client::TextGenerator;

/// Backoff shape: base 1s, cap 30s, jitter from the backoff crate defaults.
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Raw model output plus the metadata the controller reports.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub text: String,
    pub latency: Duration,
    pub attempts: u32,
}

/// The backoff policy, separate from the call site so the delay schedule is
/// testable without real network waits.
///
/// `jitter` is the crate's randomization factor; pass 0.0 for a
/// deterministic schedule in tests.
pub fn backoff_policy(jitter: f64) -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        // current_interval defaults to 500ms independently of initial_interval
        current_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None, // attempts are bounded by count, not wall time
        randomization_factor: jitter,
        multiplier: 2.0,
        ..Default::default()
    }
}

/// Call the generator, retrying transient failures up to `max_attempts`.
///
/// Permanent classifications (auth, malformed request, unparseable response)
/// return immediately without retry. The elapsed time is bounded by
/// `max_attempts` per-attempt timeouts plus the backoff sleeps.
pub async fn generate_with_retry(
    generator: &dyn TextGenerator,
    prompt: &str,
    params: &GenerationParams,
    max_attempts: u32,
) -> Result<ModelResponse, ModelError> {
    let mut backoff = backoff_policy(0.3);

    // A zero cap would skip the loop entirely; always make at least one call
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_attempts {
        attempts += 1;
        let start = Instant::now();

        match generator.generate(prompt, params).await {
            Ok(text) => {
                debug!(attempts, latency_ms = start.elapsed().as_millis() as u64, "generation succeeded");
                return Ok(ModelResponse {
                    text,
                    latency: start.elapsed(),
                    attempts,
                });
            }
            Err(e) if !e.is_transient() => {
                warn!(attempt = attempts, error = %e, "permanent failure, not retrying");
                return Err(e);
            }
            Err(e) => {
                warn!(attempt = attempts, error = %e, "transient failure");
                last_error = Some(e);

                if attempts < max_attempts
                    && let Some(wait) = backoff.next_backoff()
                {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    Err(ModelError::RetriesExhausted {
        attempts,
        source: Box::new(last_error.expect("last_error is set after a failed attempt")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Generator that pops scripted outcomes in order.
    struct Scripted {
        outcomes: Mutex<Vec<Result<String, ModelError>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<String, ModelError>>) -> Self {
            let mut outcomes = outcomes;
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| panic!("scripted generator called too many times"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let generator = Scripted::new(vec![Ok("feat: add x".into())]);
        let response =
            generate_with_retry(&generator, "p", &GenerationParams::default(), 3)
                .await
                .unwrap();
        assert_eq!(response.text, "feat: add x");
        assert_eq!(response.attempts, 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_twice_then_success() {
        let generator = Scripted::new(vec![
            Err(ModelError::RateLimited),
            Err(ModelError::RateLimited),
            Ok("fix: handle retry".into()),
        ]);
        let response =
            generate_with_retry(&generator, "p", &GenerationParams::default(), 3)
                .await
                .unwrap();
        assert_eq!(response.text, "fix: handle retry");
        assert_eq!(response.attempts, 3);
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_cap_is_respected() {
        let generator = Scripted::new(vec![
            Err(ModelError::RateLimited),
            Err(ModelError::Timeout(30)),
            Err(ModelError::RateLimited),
        ]);
        let err = generate_with_retry(&generator, "p", &GenerationParams::default(), 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::RetriesExhausted { attempts: 3, .. }
        ));
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_error_is_not_retried() {
        let generator = Scripted::new(vec![Err(ModelError::AuthFailed { status: 401 })]);
        let err = generate_with_retry(&generator, "p", &GenerationParams::default(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::AuthFailed { status: 401 }));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_request_is_not_retried() {
        let generator = Scripted::new(vec![Err(ModelError::InvalidRequest("bad".into()))]);
        let err = generate_with_retry(&generator, "p", &GenerationParams::default(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidRequest(_)));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempt_cap_still_calls_once() {
        let generator = Scripted::new(vec![Ok("feat: add x".into())]);
        let response =
            generate_with_retry(&generator, "p", &GenerationParams::default(), 0)
                .await
                .unwrap();
        assert_eq!(response.attempts, 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempt_cap_surfaces_a_failure() {
        let generator = Scripted::new(vec![Err(ModelError::RateLimited)]);
        let err = generate_with_retry(&generator, "p", &GenerationParams::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::RetriesExhausted { attempts: 1, .. }
        ));
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn test_backoff_schedule_doubles_then_caps() {
        let mut policy = backoff_policy(0.0);
        assert_eq!(policy.next_backoff(), Some(Duration::from_secs(1)));
        assert_eq!(policy.next_backoff(), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_backoff(), Some(Duration::from_secs(4)));
        for _ in 0..10 {
            policy.next_backoff();
        }
        assert_eq!(policy.next_backoff(), Some(Duration::from_secs(30)));
    }
}
