//! Mock driver behavior tests

use crate::error::Error;
use crate::locator::Locator;
use crate::protocol::mock::{MockDriver, MockElement};
use crate::protocol::traits::DriverClient;
use crate::protocol::types::{Cookie, LogType};

#[tokio::test]
async fn element_appears_after_polls() {
    let driver = MockDriver::new();
    driver.add_element(MockElement::new("#submit").appears_after(2));

    let locator = Locator::css("#submit");
    assert!(driver.find_element(&locator).await.is_err());
    assert!(driver.find_element(&locator).await.is_err());
    assert!(driver.find_element(&locator).await.is_ok());
    assert_eq!(driver.calls("find_element"), 3);
}

#[tokio::test]
async fn primed_failure_fires_once() {
    let driver = MockDriver::new();
    let handle = driver.add_element(MockElement::new("#submit"));
    driver.fail_once("click", Error::stale_element("el-1"));

    assert!(matches!(
        driver.click(&handle).await.unwrap_err(),
        Error::StaleElement(_)
    ));
    assert!(driver.click(&handle).await.is_ok());
    assert_eq!(driver.calls("click"), 2);
}

#[tokio::test]
async fn quit_poisons_every_call() {
    let driver = MockDriver::new();
    let handle = driver.add_element(MockElement::new("#submit"));

    driver.quit().await.unwrap();
    assert!(matches!(
        driver.click(&handle).await.unwrap_err(),
        Error::DriverGone(_)
    ));
    assert!(matches!(
        driver.navigate("https://example.org").await.unwrap_err(),
        Error::DriverGone(_)
    ));
}

#[tokio::test]
async fn close_window_returns_remaining_handles() {
    let driver = MockDriver::new();
    driver.open_window("w-2");

    let remaining = driver.close_window().await.unwrap();
    assert_eq!(remaining, vec!["w-2".to_string()]);
    assert!(!driver.is_quit());
}

#[tokio::test]
async fn closing_last_window_ends_the_session() {
    let driver = MockDriver::new();
    let remaining = driver.close_window().await.unwrap();
    assert!(remaining.is_empty());
    assert!(driver.is_quit());
}

#[tokio::test]
async fn cookie_jar_roundtrip() {
    let driver = MockDriver::new();
    driver.add_cookie(Cookie::new("sid", "abc")).await.unwrap();
    driver.add_cookie(Cookie::new("lang", "en")).await.unwrap();

    assert_eq!(driver.cookies().await.unwrap().len(), 2);
    assert_eq!(
        driver.cookie_named("sid").await.unwrap().unwrap().value,
        "abc"
    );

    driver.delete_cookie("sid").await.unwrap();
    assert!(driver.cookie_named("sid").await.unwrap().is_none());

    driver.delete_all_cookies().await.unwrap();
    assert!(driver.cookies().await.unwrap().is_empty());
    // Idempotent on an already-empty jar
    driver.delete_all_cookies().await.unwrap();
    assert!(driver.cookies().await.unwrap().is_empty());
}

#[tokio::test]
async fn child_elements_are_scoped_to_parent() {
    let driver = MockDriver::new();
    let table = driver.add_element(MockElement::new("#orders").tag("table"));
    driver.add_child("#orders", MockElement::new("tbody tr").tag("tr"));
    driver.add_child("#orders", MockElement::new("tbody tr").tag("tr"));

    let rows = driver
        .find_child_elements(&table, &Locator::css("tbody tr"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    // Not visible at the top level
    assert!(driver
        .find_elements(&Locator::css("tbody tr"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn alert_lifecycle() {
    let driver = MockDriver::new();
    assert!(matches!(
        driver.alert_text().await.unwrap_err(),
        Error::NoAlertOpen(_)
    ));

    driver.set_alert("Are you sure?", 0);
    assert_eq!(driver.alert_text().await.unwrap(), "Are you sure?");
    driver.accept_alert().await.unwrap();
    assert_eq!(driver.alert_outcomes(), vec!["accepted"]);

    // Accepting consumed the dialog
    assert!(driver.accept_alert().await.is_err());
}

#[tokio::test]
async fn screenshot_is_decodable_png() {
    let driver = MockDriver::new();
    driver.set_screenshot_size(120, 80);

    let bytes = driver.screenshot().await.unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!(img.width(), 120);
    assert_eq!(img.height(), 80);
}

#[tokio::test]
async fn logs_by_channel() {
    let driver = MockDriver::new();
    driver.push_log(LogType::Browser, "WARNING", "mixed content");
    driver.push_log(LogType::Driver, "INFO", "session started");

    let browser = driver.logs(LogType::Browser).await.unwrap();
    assert_eq!(browser.len(), 1);
    assert_eq!(browser[0].message, "mixed content");
    assert!(driver.logs(LogType::Performance).await.unwrap().is_empty());
}
