//! Controller pipeline tests

use std::sync::Arc;

use crate::config::Config;
use crate::controller::{ActionController, CloseSession};
use crate::error::Error;
use crate::locator::Locator;
use crate::protocol::mock::{MockDriver, MockElement};
use crate::protocol::traits::DriverClient;
use crate::protocol::types::Cookie;
use crate::session::SessionKey;

struct Fixture {
    driver: Arc<MockDriver>,
    controller: ActionController,
    _artifacts: tempfile::TempDir,
}

fn fast_config(artifact_dir: &std::path::Path) -> Config {
    Config {
        wait_timeout_ms: 500,
        poll_interval_ms: 20,
        artifact_dir: artifact_dir.to_string_lossy().into_owned(),
        ..Config::default()
    }
}

/// Controller with a bound mock driver and retry_attempts = 1
fn fixture() -> Fixture {
    let artifacts = tempfile::tempdir().unwrap();
    let config = fast_config(artifacts.path());
    let driver = Arc::new(MockDriver::new());
    let controller = ActionController::standalone(SessionKey::from("worker-1"), &config);
    controller.bind_session(driver.clone()).unwrap();
    Fixture {
        driver,
        controller,
        _artifacts: artifacts,
    }
}

#[tokio::test]
async fn action_before_bind_fails_no_active_session() {
    let artifacts = tempfile::tempdir().unwrap();
    let controller =
        ActionController::standalone(SessionKey::from("worker-1"), &fast_config(artifacts.path()));

    let error = controller.click(&Locator::css("#submit")).await.unwrap_err();
    assert!(matches!(error, Error::NoActiveSession(_)));
}

#[tokio::test]
async fn click_retries_transient_failure_exactly_once() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#submit"));
    f.driver
        .fail_once("click", Error::stale_element("el-1"));

    f.controller.click(&Locator::css("#submit")).await.unwrap();
    assert_eq!(f.driver.calls("click"), 2);
}

#[tokio::test]
async fn fatal_failure_is_not_retried() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#submit"));
    f.driver
        .fail_once("find_element", Error::invalid_selector("~~bogus"));

    let error = f.controller.click(&Locator::css("#submit")).await.unwrap_err();
    assert!(matches!(error, Error::InvalidSelector(_)));
    assert_eq!(f.driver.calls("find_element"), 1);
    assert_eq!(f.driver.calls("click"), 0);
}

#[tokio::test]
async fn retry_rewaits_for_the_element() {
    // A stale click re-runs the whole pipeline, wait included
    let f = fixture();
    f.driver.add_element(MockElement::new("#submit"));
    f.driver.fail_once("click", Error::stale_element("el-1"));

    f.controller.click(&Locator::css("#submit")).await.unwrap();
    assert!(f.driver.calls("find_element") >= 2);
}

#[tokio::test]
async fn passthrough_reads_absorb_one_transient_failure() {
    let f = fixture();
    f.controller.navigate("https://example.test/a").await.unwrap();
    f.controller.navigate("https://example.test/b").await.unwrap();

    f.driver.fail_once("back", Error::stale_element("nav"));
    f.controller.back().await.unwrap();
    assert_eq!(f.driver.calls("back"), 2);
    assert_eq!(
        f.controller.current_url().await.unwrap(),
        "https://example.test/a"
    );

    f.driver.fail_once("page_source", Error::stale_element("doc"));
    assert!(!f.controller.page_source().await.unwrap().is_empty());
    assert_eq!(f.driver.calls("page_source"), 2);
}

#[tokio::test]
async fn cookie_and_window_reads_are_retried() {
    let f = fixture();

    f.driver.fail_once("cookies", Error::stale_element("jar"));
    assert!(f.controller.cookies().await.unwrap().is_empty());
    assert_eq!(f.driver.calls("cookies"), 2);

    f.driver
        .fail_once("window_handles", Error::stale_element("w-1"));
    assert_eq!(f.controller.open_window_count().await.unwrap(), 1);
    assert_eq!(f.driver.calls("window_handles"), 2);

    f.driver
        .fail_once("maximize_window", Error::not_interactable("w-1"));
    f.controller.maximize_window().await.unwrap();
    assert_eq!(f.driver.calls("maximize_window"), 2);
}

#[tokio::test]
async fn quit_is_retried_before_the_session_is_unbound() {
    let f = fixture();
    f.driver.fail_once("quit", Error::stale_element("w-1"));

    f.controller.quit(CloseSession::Quit).await.unwrap();
    assert_eq!(f.driver.calls("quit"), 2);
    assert!(f.driver.is_quit());
    assert!(matches!(
        f.controller.page_source().await.unwrap_err(),
        Error::NoActiveSession(_)
    ));
}

#[tokio::test]
async fn type_text_clears_the_field_first() {
    let f = fixture();
    let field = f.driver.add_element(MockElement::new("#user").tag("input"));
    f.driver.send_keys(&field, "stale-draft").await.unwrap();

    f.controller
        .type_text(&Locator::css("#user"), "drover")
        .await
        .unwrap();

    assert_eq!(f.driver.typed_into(&field).unwrap(), "drover");
}

#[tokio::test]
async fn quit_then_any_action_fails_no_active_session() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#submit"));

    f.controller.quit(CloseSession::Quit).await.unwrap();
    assert!(f.driver.is_quit());

    let error = f.controller.click(&Locator::css("#submit")).await.unwrap_err();
    assert!(matches!(error, Error::NoActiveSession(_)));
}

#[tokio::test]
async fn closing_one_of_two_windows_keeps_the_session() {
    let f = fixture();
    f.driver.open_window("w-2");

    f.controller.quit(CloseSession::Close).await.unwrap();
    assert_eq!(f.controller.open_window_count().await.unwrap(), 1);

    f.controller.switch_to_latest_window().await.unwrap();
    f.controller.quit(CloseSession::Close).await.unwrap();

    // Last window closed, session ended
    assert!(matches!(
        f.controller.page_source().await.unwrap_err(),
        Error::NoActiveSession(_)
    ));
}

#[tokio::test]
async fn predicates_map_timeout_to_false() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#ghost").hidden());

    assert!(f
        .controller
        .is_element_present(&Locator::css("#ghost"))
        .await
        .unwrap());
    assert!(!f
        .controller
        .is_element_visible(&Locator::css("#ghost"))
        .await
        .unwrap());
    assert!(f
        .controller
        .is_element_not_clickable(&Locator::css("#ghost"))
        .await
        .unwrap());
    assert!(!f
        .controller
        .is_element_present(&Locator::css("#absent"))
        .await
        .unwrap());
}

#[tokio::test]
async fn readonly_field_is_not_editable() {
    let f = fixture();
    f.driver
        .add_element(MockElement::new("#locked").attr("readonly", "true"));
    f.driver.add_element(MockElement::new("#open"));

    assert!(f
        .controller
        .is_field_not_editable(&Locator::css("#locked"))
        .await
        .unwrap());
    assert!(f
        .controller
        .is_field_editable(&Locator::css("#open"))
        .await
        .unwrap());
}

#[tokio::test]
async fn text_presence_reads_page_source() {
    let f = fixture();
    f.driver.set_page_source("<html><body>Welcome, drover</body></html>");

    assert!(f.controller.is_text_present("Welcome").await.unwrap());
    assert!(!f.controller.is_text_present("Goodbye").await.unwrap());
}

#[tokio::test]
async fn select_by_value_clicks_the_matching_option() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#lang").tag("select"));
    f.driver
        .add_child("#lang", MockElement::new("option[value=\"en\"]").tag("option"));

    f.controller
        .select_by_value(&Locator::css("#lang"), "en")
        .await
        .unwrap();
    assert_eq!(f.driver.calls("click"), 1);

    // Already selected after the click state is mocked as unselected, so a
    // missing option is the interesting failure here
    let error = f
        .controller
        .select_by_value(&Locator::css("#lang"), "xx")
        .await
        .unwrap_err();
    assert!(matches!(error, Error::ElementNotFound(_)));
}

#[tokio::test]
async fn all_options_text_is_a_pure_read() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#lang").tag("select"));
    f.driver
        .add_child("#lang", MockElement::new("option").tag("option").text("English"));
    f.driver
        .add_child("#lang", MockElement::new("option").tag("option").text("Deutsch").selected());

    let texts = f
        .controller
        .all_options_text(&Locator::css("#lang"))
        .await
        .unwrap();
    assert_eq!(texts, vec!["English", "Deutsch"]);
    assert_eq!(f.driver.calls("click"), 0);

    let selected = f
        .controller
        .first_selected_option_text(&Locator::css("#lang"))
        .await
        .unwrap();
    assert_eq!(selected, "Deutsch");
}

#[tokio::test]
async fn table_shape_counts_body_rows_and_first_row_cells() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#grid").tag("table"));
    for _ in 0..3 {
        f.driver.add_child("#grid", MockElement::new("tbody tr").tag("tr"));
    }
    for _ in 0..4 {
        f.driver
            .add_child("#grid", MockElement::new("tbody tr:nth-child(1) td").tag("td"));
    }

    assert_eq!(f.controller.table_rows(&Locator::css("#grid")).await.unwrap(), 3);
    assert_eq!(
        f.controller.table_columns(&Locator::css("#grid")).await.unwrap(),
        4
    );
}

#[tokio::test]
async fn delete_all_cookies_is_idempotent() {
    let f = fixture();
    f.controller
        .add_cookie(Cookie::new("sid", "abc"))
        .await
        .unwrap();

    f.controller.delete_all_cookies().await.unwrap();
    assert!(f.controller.cookies().await.unwrap().is_empty());

    // Empty jar: still succeeds
    f.controller.delete_all_cookies().await.unwrap();
}

#[tokio::test]
async fn alert_is_accepted_after_it_appears() {
    let f = fixture();
    f.driver.set_alert("Proceed?", 2);

    f.controller.accept_alert().await.unwrap();
    assert_eq!(f.driver.alert_outcomes(), vec!["accepted"]);
}

#[tokio::test]
async fn element_screenshot_is_cropped_to_element_size() {
    let f = fixture();
    f.driver.set_screenshot_size(200, 150);
    f.driver
        .add_element(MockElement::new("#hero").at(10, 20).sized(30, 40));

    let path = f
        .controller
        .screenshot_element(&Locator::css("#hero"))
        .await
        .unwrap();

    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (30, 40));
}

#[tokio::test]
async fn element_past_the_capture_edge_fails_instead_of_clipping() {
    let f = fixture();
    f.driver.set_screenshot_size(64, 64);
    f.driver
        .add_element(MockElement::new("#hero").at(50, 50).sized(30, 30));

    let error = f
        .controller
        .screenshot_element(&Locator::css("#hero"))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Image(_)));
}

#[tokio::test]
async fn element_at_negative_location_fails_instead_of_shifting_the_crop() {
    let f = fixture();
    f.driver.set_screenshot_size(64, 64);
    f.driver
        .add_element(MockElement::new("#offstage").at(-5, 10).sized(20, 20));

    let error = f
        .controller
        .screenshot_element(&Locator::css("#offstage"))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Image(_)));
}

#[tokio::test]
async fn take_screenshot_persists_a_png() {
    let f = fixture();
    let path = f.controller.take_screenshot().await.unwrap();

    assert_eq!(path.extension().unwrap(), "png");
    assert!(image::open(&path).is_ok());
}

#[tokio::test]
async fn navigation_history_round_trip() {
    let f = fixture();
    f.controller.navigate("https://example.test/a").await.unwrap();
    f.controller.navigate("https://example.test/b").await.unwrap();
    assert_eq!(
        f.controller.current_url().await.unwrap(),
        "https://example.test/b"
    );

    f.controller.back().await.unwrap();
    assert_eq!(
        f.controller.current_url().await.unwrap(),
        "https://example.test/a"
    );
}

#[tokio::test]
async fn window_geometry_updates_preserve_the_other_axis() {
    let f = fixture();
    f.controller.set_window_position(120, 40).await.unwrap();
    f.controller.set_window_size(800, 600).await.unwrap();

    let position = f.controller.window_position().await.unwrap();
    let size = f.controller.window_size().await.unwrap();
    assert_eq!((position.x, position.y), (120, 40));
    assert_eq!((size.width, size.height), (800, 600));
}

#[tokio::test]
async fn change_style_passes_the_element_as_script_argument() {
    let f = fixture();
    f.driver.add_element(MockElement::new("#banner"));

    f.controller
        .change_style(&Locator::css("#banner"), "background-color", "red")
        .await
        .unwrap();

    let scripts = f.driver.executed_scripts();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].0.contains("style"));
    assert_eq!(scripts[0].1[1], serde_json::json!("background-color"));
    assert_eq!(scripts[0].1[2], serde_json::json!("red"));
}

#[tokio::test]
async fn upload_file_sends_the_absolute_path_as_keys() {
    let f = fixture();
    let input = f.driver.add_element(MockElement::new("#attachment").tag("input"));

    f.controller
        .upload_file(
            &Locator::css("#attachment"),
            std::path::Path::new("/tmp/report.pdf"),
        )
        .await
        .unwrap();

    assert_eq!(f.driver.typed_into(&input).unwrap(), "/tmp/report.pdf");
}
