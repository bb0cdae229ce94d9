use std::sync::OnceLock;

use rstest::fixture;
use todo_contract::{CaseResult, Harness};
use tracing_subscriber::EnvFilter;

static HARNESS: OnceLock<Harness> = OnceLock::new();

/// One harness per test binary, built on first use.
#[fixture]
pub fn harness() -> &'static Harness {
    HARNESS.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Harness::from_env().unwrap_or_else(|err| panic!("failed to set up harness: {err}"))
    })
}

pub fn check(result: CaseResult) {
    if let Err(failure) = result {
        panic!("{failure}");
    }
}
