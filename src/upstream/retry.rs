use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use super::{CaptionGenerator, Captioner};
use crate::error::MemeError;

/// Exponential backoff with jitter and a bounded number of attempts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    min_delay: Duration,
    max_delay: Duration,
    max_attempts: usize,
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` calls, sleeping between
    /// `min_delay` and `max_delay` in between.
    pub fn new(min_delay: Duration, max_delay: Duration, max_attempts: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Six attempts, 1s up to 5 minutes apart. Captioning models cold-start
    /// slowly.
    pub fn captioner() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(300), 6)
    }

    /// Six attempts, 1s up to a minute apart, which rides out rate limits.
    pub fn generator() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60), 6)
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts - 1)
            .with_jitter()
    }
}

/// Retries the wrapped collaborator, surfacing only the last failure.
#[derive(Clone, Debug)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    /// Wraps `inner` with `policy`.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

fn log_retry(service: &'static str) -> impl Fn(&MemeError, Duration) {
    move |err, delay| warn!("{service} failed, retrying in {delay:?}: {err}")
}

#[async_trait]
impl<T: Captioner> Captioner for Retrying<T> {
    async fn describe(&self, image: &[u8]) -> Result<String, MemeError> {
        (|| self.inner.describe(image))
            .retry(self.policy.backoff())
            .notify(log_retry("captioner"))
            .await
    }
}

#[async_trait]
impl<T: CaptionGenerator> CaptionGenerator for Retrying<T> {
    async fn generate(
        &self,
        description: &str,
        language: &str,
        theme: Option<&str>,
    ) -> Result<String, MemeError> {
        (|| self.inner.generate(description, language, theme))
            .retry(self.policy.backoff())
            .notify(log_retry("caption generator"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }

        fn attempt(&self) -> Result<String, MemeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(MemeError::Upstream(format!("attempt {call} failed")))
            } else {
                Ok("a cat on a sofa".to_string())
            }
        }
    }

    #[async_trait]
    impl Captioner for Flaky {
        async fn describe(&self, _image: &[u8]) -> Result<String, MemeError> {
            self.attempt()
        }
    }

    #[async_trait]
    impl CaptionGenerator for Flaky {
        async fn generate(
            &self,
            _description: &str,
            _language: &str,
            _theme: Option<&str>,
        ) -> Result<String, MemeError> {
            self.attempt()
        }
    }

    fn quick(attempts: usize) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(5), attempts)
    }

    #[tokio::test]
    async fn recovers_from_transient_failures() {
        let captioner = Retrying::new(Flaky::new(2), quick(6));
        let description = captioner.describe(b"jpeg").await.expect("third call works");
        assert_eq!(description, "a cat on a sofa");
        assert_eq!(captioner.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_bound() {
        let generator = Retrying::new(Flaky::new(10), quick(3));
        let result = generator.generate("a cat", "English", None).await;
        assert!(matches!(result, Err(MemeError::Upstream(msg)) if msg == "attempt 2 failed"));
        assert_eq!(generator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn success_needs_a_single_call() {
        let generator = Retrying::new(Flaky::new(0), quick(6));
        generator.generate("a cat", "English", Some("mondays")).await.expect("works");
        assert_eq!(generator.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(Duration::ZERO, Duration::ZERO, 0).max_attempts, 1);
    }
}
