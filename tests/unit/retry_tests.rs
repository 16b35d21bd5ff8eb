/*!
 * Tests for the retry controller and request throttle
 */

use std::time::Duration;
use tokio::time::Instant;

use subtrans::errors::ErrorKind;
use subtrans::providers::Provider;
use subtrans::providers::mock::MockProvider;
use subtrans::translation::retry::{with_retry, RetryPolicy};
use subtrans::translation::throttle::RequestThrottle;

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

#[tokio::test]
async fn test_with_retry_withAuthError_shouldCallOnce() {
    let provider = MockProvider::failing(ErrorKind::Auth);
    let result = with_retry(&fast_policy(), "mock", || provider.translate("hi", None, "ko")).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Auth);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_with_retry_withQuotaError_shouldCallOnce() {
    let provider = MockProvider::failing(ErrorKind::QuotaExceeded);
    let result = with_retry(&fast_policy(), "mock", || provider.translate("hi", None, "ko")).await;

    assert!(result.is_err());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_with_retry_withTwoServerErrors_shouldSucceedOnThirdCall() {
    let provider = MockProvider::fail_first(2, ErrorKind::Server);
    let result = with_retry(&fast_policy(), "mock", || provider.translate("hi", None, "ko")).await;

    assert_eq!(result.unwrap(), "[mock:ko] hi");
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_with_retry_withPersistentTimeout_shouldStopAtMaxAttempts() {
    let provider = MockProvider::failing(ErrorKind::Timeout);
    let result = with_retry(&fast_policy(), "mock", || provider.translate("hi", None, "ko")).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Timeout);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_with_retry_withUnknownError_shouldRetry() {
    let provider = MockProvider::fail_first(1, ErrorKind::Unknown);
    let result = with_retry(&fast_policy(), "mock", || provider.translate("hi", None, "ko")).await;

    assert!(result.is_ok());
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_with_retry_withNoRetryPolicy_shouldCallOnce() {
    let provider = MockProvider::failing(ErrorKind::Network);
    let result = with_retry(&RetryPolicy::no_retry(), "mock", || provider.translate("hi", None, "ko")).await;

    assert!(result.is_err());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_with_retry_backoff_shouldWaitTwoThenFourSeconds() {
    let provider = MockProvider::failing(ErrorKind::Server);
    let policy = RetryPolicy::new(3, Duration::from_millis(1000));

    let start = Instant::now();
    let _ = with_retry(&policy, "mock", || provider.translate("hi", None, "ko")).await;
    let elapsed = start.elapsed();

    assert_eq!(provider.call_count(), 3);
    assert!(elapsed >= Duration::from_secs(6), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(7), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_throttle_wait_shouldSpaceConsecutiveCalls() {
    let throttle = RequestThrottle::new(Duration::from_millis(100));

    let start = Instant::now();
    throttle.wait().await;
    assert!(start.elapsed() < Duration::from_millis(100));

    throttle.wait().await;
    throttle.wait().await;
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_throttle_clone_shouldShareLastRequest() {
    let throttle = RequestThrottle::new(Duration::from_millis(250));
    let other = throttle.clone();

    let start = Instant::now();
    throttle.wait().await;
    other.wait().await;
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_throttle_withZeroInterval_shouldNotWait() {
    let throttle = RequestThrottle::new(Duration::ZERO);
    let start = std::time::Instant::now();
    for _ in 0..10 {
        throttle.wait().await;
    }
    assert!(start.elapsed() < Duration::from_secs(1));
}
