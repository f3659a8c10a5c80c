// Browser-side checks, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use tab_tracker::config::{TrackerConfig, TransportConfig};
use tab_tracker::report::{ActivityReport, BrowserClock, timestamp};
use tab_tracker::reporter::HttpCollector;
use tab_tracker::url_filter::UrlFilter;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_browser_clock_matches_date() {
    let expected = (js_sys::Date::now() / 1000.0).round() as i64;
    let ts = timestamp(&BrowserClock);
    assert!((ts - expected).abs() <= 1);
}

#[wasm_bindgen_test]
fn test_config_from_undefined() {
    let config = TrackerConfig::from_js(JsValue::UNDEFINED).unwrap();
    assert_eq!(config, TrackerConfig::default());
}

#[wasm_bindgen_test]
fn test_config_from_object() {
    let value = js_sys::JSON::parse(
        r#"{"transport":{"kind":"native_messaging","application":"whatsong"},"filter":"youtube"}"#,
    )
    .unwrap();

    let config = TrackerConfig::from_js(value).unwrap();

    assert_eq!(
        config.transport,
        TransportConfig::NativeMessaging {
            application: "whatsong".to_string()
        }
    );
    assert_eq!(config.filter, UrlFilter::Youtube);
}

#[wasm_bindgen_test]
fn test_config_rejects_bad_port() {
    let value =
        js_sys::JSON::parse(r#"{"transport":{"kind":"http","port":"not-a-port"}}"#).unwrap();
    assert!(TrackerConfig::from_js(value).is_err());
}

#[wasm_bindgen_test]
fn test_http_request_is_json_post() {
    let report = ActivityReport::new("https://x.test/a".to_string(), None, 1000);

    let request = HttpCollector::new(58810).request(&report).unwrap();

    assert_eq!(request.method(), "POST");
    assert_eq!(request.url(), "http://localhost:58810/youtube");
    assert_eq!(
        request.headers().get("Content-Type").unwrap(),
        Some("application/json".to_string())
    );
}
