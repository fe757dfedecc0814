//! Shared integration-test fixtures

use std::sync::Arc;

use drover::protocol::mock::MockDriver;
use drover::{ActionController, Config, SessionKey};

/// One worker with a bound mock driver and a throwaway artifact directory
pub struct Harness {
    pub driver: Arc<MockDriver>,
    pub controller: ActionController,
    _artifacts: tempfile::TempDir,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drover=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn test_config(artifact_dir: &std::path::Path) -> Config {
    Config {
        wait_timeout_ms: 500,
        poll_interval_ms: 20,
        artifact_dir: artifact_dir.to_string_lossy().into_owned(),
        ..Config::default()
    }
}

pub fn harness(key: &str) -> Harness {
    init_tracing();
    let artifacts = tempfile::tempdir().expect("tempdir");
    let config = test_config(artifacts.path());
    let driver = Arc::new(MockDriver::new());
    let controller = ActionController::standalone(SessionKey::from(key), &config);
    controller
        .bind_session(driver.clone())
        .expect("bind session");
    Harness {
        driver,
        controller,
        _artifacts: artifacts,
    }
}
