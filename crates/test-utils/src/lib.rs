//! Fixtures shared by the integration tests: a temp-dir site layout, a
//! notifier that records, a scripted executor and tracing setup.

pub mod builders;
pub mod fake_executor;
pub mod notifier;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

pub use builders::{Site, SiteBuilder};
pub use fake_executor::FakeExecutor;
pub use notifier::RecordingNotifier;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Route logs through the test harness's capture (shown for failing tests
/// only). `RUST_LOG` picks the level; `info` otherwise.
pub fn init_tracing() {
    TRACING.call_once(|| {
        fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_test_writer()
            .init();
    });
}

/// Await `f`, panicking if it takes longer than ten seconds.
pub async fn with_timeout<F: Future>(f: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(out) => out,
        Err(_) => panic!("test timed out after {TEST_TIMEOUT:?}"),
    }
}
