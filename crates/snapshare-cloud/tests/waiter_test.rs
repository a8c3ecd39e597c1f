mod common;

use common::{Call, MockProvider};
use snapshare_cloud::{PollPolicy, SnapshotError, SnapshotProvider, wait_until_available};
use std::time::Duration;

/// available になるまで describe を繰り返す
#[tokio::test(start_paused = true)]
async fn test_wait_until_available() {
    let provider = MockProvider {
        polls_before_available: 3,
        ..MockProvider::new()
    };
    provider.create_snapshot("db", "db-snap").await.unwrap();

    let started = tokio::time::Instant::now();
    let info = wait_until_available(
        &provider,
        "db-snap",
        &PollPolicy::fixed(Duration::from_secs(5), 10),
    )
    .await
    .unwrap();

    assert!(info.is_available());
    assert_eq!(provider.describe_count(), 4);
    assert!(started.elapsed() >= Duration::from_secs(15));
}

/// describe のエラーは再試行せず、そのまま返す
#[tokio::test(start_paused = true)]
async fn test_describe_error_stops_polling() {
    let provider = MockProvider::new();

    let started = tokio::time::Instant::now();
    let err = wait_until_available(&provider, "mydb-to-be-copied", &PollPolicy::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SnapshotError::SnapshotNotFound("mydb-to-be-copied".to_string())
    );
    assert!(!err.is_timeout());
    assert_eq!(
        provider.calls(),
        vec![Call::Describe("mydb-to-be-copied".to_string())]
    );
    assert_eq!(started.elapsed(), Duration::ZERO);
}

/// 上限まで available にならなければタイムアウト
#[tokio::test(start_paused = true)]
async fn test_exhausted_attempts_time_out() {
    let provider = MockProvider {
        polls_before_available: 100,
        ..MockProvider::new()
    };
    provider.create_snapshot("db", "db-snap").await.unwrap();

    let err = wait_until_available(
        &provider,
        "db-snap",
        &PollPolicy::fixed(Duration::from_secs(1), 4),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        SnapshotError::Timeout {
            snapshot_id: "db-snap".to_string(),
            attempts: 4,
        }
    );
    assert_eq!(provider.describe_count(), 4);
}

/// バックオフ時は待機時間が伸びる
#[tokio::test(start_paused = true)]
async fn test_backoff_delays() {
    let provider = MockProvider {
        polls_before_available: 3,
        ..MockProvider::new()
    };
    provider.create_snapshot("db", "db-snap").await.unwrap();
    let policy = PollPolicy::fixed(Duration::from_secs(1), 10).with_backoff(2.0, Duration::from_secs(60));

    let started = tokio::time::Instant::now();
    wait_until_available(&provider, "db-snap", &policy).await.unwrap();

    // 1 + 2 + 4
    assert!(started.elapsed() >= Duration::from_secs(7));
    assert!(started.elapsed() < Duration::from_secs(8));
}
