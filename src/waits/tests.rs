//! Wait strategy tests

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::Error;
use crate::locator::Locator;
use crate::protocol::mock::{MockDriver, MockElement};
use crate::session::{SessionKey, SessionRegistry};
use crate::waits::{PollingWait, WaitCondition, WaitFor, WaitRegistry};

fn session_with(driver: Arc<MockDriver>) -> (SessionRegistry, SessionKey) {
    let registry = SessionRegistry::new();
    let key = SessionKey::from("worker-1");
    registry.bind(key.clone(), driver, "polling").unwrap();
    (registry, key)
}

fn fast_wait() -> PollingWait {
    PollingWait::new(Duration::from_millis(500), Duration::from_millis(20))
}

#[tokio::test]
async fn presence_resolves_immediately_available_element() {
    let driver = Arc::new(MockDriver::new());
    let handle = driver.add_element(MockElement::new("#submit"));
    let (registry, key) = session_with(driver);
    let session = registry.get(&key).unwrap();

    let resolved = fast_wait()
        .resolve(&session, &Locator::css("#submit"), WaitCondition::Presence)
        .await
        .unwrap();

    assert_eq!(resolved, handle);
    assert_eq!(session.current_element(), Some(handle));
}

#[tokio::test]
async fn clickable_waits_through_polls() {
    // Element enabled only after two enabled checks: the third poll wins
    let driver = Arc::new(MockDriver::new());
    driver.add_element(MockElement::new("#submit").enabled_after(2));
    let (registry, key) = session_with(driver);
    let session = registry.get(&key).unwrap();

    let wait = PollingWait::new(Duration::from_secs(5), Duration::from_millis(20));
    let resolved = wait
        .resolve(&session, &Locator::css("#submit"), WaitCondition::Clickable)
        .await;

    assert!(resolved.is_ok());
}

#[tokio::test]
async fn timeout_is_never_early_and_carries_context() {
    let driver = Arc::new(MockDriver::new());
    driver.add_element(MockElement::new("#submit").disabled());
    let (registry, key) = session_with(driver);
    let session = registry.get(&key).unwrap();

    let wait = PollingWait::new(Duration::from_millis(500), Duration::from_millis(100));
    let start = Instant::now();
    let error = wait
        .resolve(&session, &Locator::css("#submit"), WaitCondition::Clickable)
        .await
        .unwrap_err();

    assert!(start.elapsed() >= Duration::from_millis(500));
    match error {
        Error::WaitTimeout {
            locator,
            condition,
            elapsed,
        } => {
            assert_eq!(locator, "Css=#submit");
            assert_eq!(condition, WaitCondition::Clickable);
            assert!(elapsed >= Duration::from_millis(500));
        }
        other => panic!("expected WaitTimeout, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_element_polls_are_swallowed_until_it_appears() {
    let driver = Arc::new(MockDriver::new());
    driver.add_element(MockElement::new("#late").appears_after(2));
    let (registry, key) = session_with(driver.clone());
    let session = registry.get(&key).unwrap();

    let resolved = fast_wait()
        .resolve(&session, &Locator::css("#late"), WaitCondition::Presence)
        .await;

    assert!(resolved.is_ok());
    assert!(driver.calls("find_element") >= 3);
}

#[tokio::test]
async fn hidden_element_fails_visibility_but_passes_presence() {
    let driver = Arc::new(MockDriver::new());
    driver.add_element(MockElement::new("#ghost").hidden());
    let (registry, key) = session_with(driver);
    let session = registry.get(&key).unwrap();

    let wait = PollingWait::new(Duration::from_millis(100), Duration::from_millis(20));
    assert!(wait
        .resolve(&session, &Locator::css("#ghost"), WaitCondition::Presence)
        .await
        .is_ok());
    assert!(matches!(
        wait.resolve(&session, &Locator::css("#ghost"), WaitCondition::Visibility)
            .await
            .unwrap_err(),
        Error::WaitTimeout { .. }
    ));
}

#[tokio::test]
async fn zero_sized_element_is_not_visible() {
    let driver = Arc::new(MockDriver::new());
    driver.add_element(MockElement::new("#collapsed").sized(0, 0));
    let (registry, key) = session_with(driver);
    let session = registry.get(&key).unwrap();

    let wait = PollingWait::new(Duration::from_millis(100), Duration::from_millis(20));
    assert!(matches!(
        wait.resolve(&session, &Locator::css("#collapsed"), WaitCondition::Visibility)
            .await
            .unwrap_err(),
        Error::WaitTimeout { .. }
    ));
}

#[tokio::test]
async fn fatal_poll_error_propagates_immediately() {
    let driver = Arc::new(MockDriver::new());
    driver.add_element(MockElement::new("#submit"));
    driver.fail_once("find_element", Error::invalid_selector("~~bogus"));
    let (registry, key) = session_with(driver.clone());
    let session = registry.get(&key).unwrap();

    let error = fast_wait()
        .resolve(&session, &Locator::css("#submit"), WaitCondition::Presence)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::InvalidSelector(_)));
    assert_eq!(driver.calls("find_element"), 1);
}

#[tokio::test]
async fn alert_wait_resolves_late_dialog() {
    let driver = Arc::new(MockDriver::new());
    driver.set_alert("Proceed?", 2);
    let (registry, key) = session_with(driver);
    let session = registry.get(&key).unwrap();

    let text = fast_wait().wait_for_alert(&session).await.unwrap();
    assert_eq!(text, "Proceed?");
}

#[tokio::test]
async fn alert_wait_times_out_without_dialog() {
    let driver = Arc::new(MockDriver::new());
    let (registry, key) = session_with(driver);
    let session = registry.get(&key).unwrap();

    let wait = PollingWait::new(Duration::from_millis(100), Duration::from_millis(20));
    assert!(matches!(
        wait.wait_for_alert(&session).await.unwrap_err(),
        Error::WaitTimeout {
            condition: WaitCondition::Alert,
            ..
        }
    ));
}

#[test]
fn registry_serves_builtin_and_rejects_unknown() {
    let registry = WaitRegistry::new(&Config::default());
    assert!(registry.get("polling").is_ok());
    assert!(matches!(
        registry.get("lifecycle").unwrap_err(),
        Error::Configuration(_)
    ));
}
