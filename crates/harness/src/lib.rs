pub mod clock;
pub mod database;
pub mod store;

pub use clock::ManualClock;
pub use database::TestDatabase;
pub use store::TestStore;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Route engine events to the test output. Filter with `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schedule_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
