/// Delivery of activity reports to the external collector
use std::future::Future;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::browser;
use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::report::{ActivityReport, Item, NativeMessage};
use crate::tracker::ReportSink;

/// Outbound channel to the collector.
///
/// `send` resolves to the collector's acknowledgment rendered as text.
pub trait Transport {
    fn name(&self) -> &'static str;

    fn send(&self, report: &ActivityReport) -> impl Future<Output = Result<String>>;
}

/// Send one report, logging the outcome. Failures are not propagated.
pub async fn deliver<T: Transport>(transport: &T, report: &ActivityReport) {
    log::info!(
        "{} {} {}",
        report.ts,
        report.url,
        report.title.as_deref().unwrap_or_default()
    );

    match transport.send(report).await {
        Ok(ack) => log::debug!("{}: {}", transport.name(), ack),
        Err(err @ Error::Status { .. }) => log::warn!("{}: {}", transport.name(), err),
        Err(err) => log::error!("{}: report for {} lost: {}", transport.name(), report.url, err),
    }
}

/// Fire-and-forget sink: each submitted report is delivered on its own task
pub struct Reporter<T> {
    transport: Rc<T>,
}

impl<T: Transport + 'static> Reporter<T> {
    pub fn new(transport: T) -> Reporter<T> {
        Reporter {
            transport: Rc::new(transport),
        }
    }
}

impl<T: Transport + 'static> ReportSink for Reporter<T> {
    fn submit(&self, report: ActivityReport) {
        let transport = Rc::clone(&self.transport);
        spawn_local(async move {
            deliver(transport.as_ref(), &report).await;
        });
    }
}

/// Variant A: `runtime.sendNativeMessage` to a native host
#[derive(Debug, Clone)]
pub struct NativeMessaging {
    application: String,
}

impl NativeMessaging {
    pub fn new(application: impl Into<String>) -> NativeMessaging {
        NativeMessaging {
            application: application.into(),
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }
}

impl Transport for NativeMessaging {
    fn name(&self) -> &'static str {
        "native-messaging"
    }

    async fn send(&self, report: &ActivityReport) -> Result<String> {
        let message = serde_wasm_bindgen::to_value(&NativeMessage::from(report))?;
        let ack = browser::send_native_message(&self.application, message).await?;
        Ok(describe(&ack))
    }
}

/// Variant B: JSON POST to the local collector
#[derive(Debug, Clone)]
pub struct HttpCollector {
    port: u16,
}

impl HttpCollector {
    pub fn new(port: u16) -> HttpCollector {
        HttpCollector { port }
    }

    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}/youtube", self.port)
    }

    pub fn body(report: &ActivityReport) -> Result<String> {
        Ok(serde_json::to_string(&Item::from(report))?)
    }

    /// The `POST` request carrying `report`, ready for `fetch`
    pub fn request(&self, report: &ActivityReport) -> Result<Request> {
        let body = Self::body(report)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_body(&JsValue::from_str(&body));

        let request =
            Request::new_with_str_and_init(&self.endpoint(), &init).map_err(Error::js)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(Error::js)?;
        Ok(request)
    }
}

impl Transport for HttpCollector {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, report: &ActivityReport) -> Result<String> {
        let request = self.request(report)?;
        let value = JsFuture::from(fetch(&request)?).await.map_err(Error::js)?;
        let response: Response = value.dyn_into().map_err(Error::js)?;

        let status = response.status();
        if !response.ok() {
            return Err(Error::Status { status });
        }

        let text = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|text| text.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };
        Ok(format!("{} {}", status, text).trim_end().to_string())
    }
}

/// The transport chosen in configuration
#[derive(Debug, Clone)]
pub enum Collector {
    Native(NativeMessaging),
    Http(HttpCollector),
}

impl From<&TransportConfig> for Collector {
    fn from(config: &TransportConfig) -> Self {
        match config {
            TransportConfig::NativeMessaging { application } => {
                Collector::Native(NativeMessaging::new(application.clone()))
            }
            TransportConfig::Http { port } => Collector::Http(HttpCollector::new(*port)),
        }
    }
}

impl Transport for Collector {
    fn name(&self) -> &'static str {
        match self {
            Collector::Native(transport) => transport.name(),
            Collector::Http(transport) => transport.name(),
        }
    }

    async fn send(&self, report: &ActivityReport) -> Result<String> {
        match self {
            Collector::Native(transport) => transport.send(report).await,
            Collector::Http(transport) => transport.send(report).await,
        }
    }
}

// Background pages have a window; MV3 service workers only a worker scope.
fn fetch(request: &Request) -> Result<js_sys::Promise> {
    let global = js_sys::global();
    if let Some(window) = global.dyn_ref::<web_sys::Window>() {
        return Ok(window.fetch_with_request(request));
    }
    if let Some(worker) = global.dyn_ref::<web_sys::WorkerGlobalScope>() {
        return Ok(worker.fetch_with_request(request));
    }
    Err(Error::NoGlobalScope)
}

fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|json| json.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use log::{Level, Log, Metadata, Record};
    use std::cell::RefCell;
    use std::sync::Once;

    /// Collects log records per test thread
    struct CaptureLogger;

    thread_local! {
        static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    static CAPTURE: CaptureLogger = CaptureLogger;
    static INIT: Once = Once::new();

    impl Log for CaptureLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            let entry = (record.level(), record.args().to_string());
            RECORDS.with(|records| records.borrow_mut().push(entry));
        }

        fn flush(&self) {}
    }

    fn capture_logs() {
        INIT.call_once(|| {
            log::set_logger(&CAPTURE).expect("no other logger in tests");
            log::set_max_level(log::LevelFilter::Trace);
        });
        RECORDS.with(|records| records.borrow_mut().clear());
    }

    fn logged(level: Level) -> Vec<String> {
        RECORDS.with(|records| {
            records
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, message)| message.clone())
                .collect()
        })
    }

    struct FakeTransport {
        fail: bool,
        sent: RefCell<Vec<ActivityReport>>,
    }

    impl FakeTransport {
        fn new(fail: bool) -> FakeTransport {
            FakeTransport {
                fail,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for FakeTransport {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn send(&self, report: &ActivityReport) -> Result<String> {
            self.sent.borrow_mut().push(report.clone());
            if self.fail {
                Err(Error::Js("connection refused".to_string()))
            } else {
                Ok("okay".to_string())
            }
        }
    }

    struct StatusTransport(u16);

    impl Transport for StatusTransport {
        fn name(&self) -> &'static str {
            "status"
        }

        async fn send(&self, _: &ActivityReport) -> Result<String> {
            Err(Error::Status { status: self.0 })
        }
    }

    fn report() -> ActivityReport {
        ActivityReport::new("https://x.test/a".to_string(), Some("A".to_string()), 1000)
    }

    #[test]
    fn test_deliver_sends_once() {
        capture_logs();
        let transport = FakeTransport::new(false);

        block_on(deliver(&transport, &report()));

        assert_eq!(*transport.sent.borrow(), vec![report()]);
        assert_eq!(logged(Level::Info), vec!["1000 https://x.test/a A"]);
        assert_eq!(logged(Level::Debug), vec!["fake: okay"]);
        assert!(logged(Level::Error).is_empty());
    }

    #[test]
    fn test_deliver_swallows_failure() {
        capture_logs();
        let transport = FakeTransport::new(true);

        // Completes without panicking or returning an error
        block_on(deliver(&transport, &report()));

        assert_eq!(transport.sent.borrow().len(), 1);
        assert_eq!(
            logged(Level::Error),
            vec!["fake: report for https://x.test/a lost: browser error: connection refused"]
        );
    }

    #[test]
    fn test_deliver_logs_bad_status_as_warning() {
        capture_logs();
        let transport = StatusTransport(503);

        block_on(deliver(&transport, &report()));

        assert_eq!(logged(Level::Warn), vec!["status: collector answered with status 503"]);
        assert!(logged(Level::Error).is_empty());
    }

    #[test]
    fn test_http_endpoint() {
        assert_eq!(HttpCollector::new(58810).endpoint(), "http://localhost:58810/youtube");
        assert_eq!(HttpCollector::new(9000).endpoint(), "http://localhost:9000/youtube");
    }

    #[test]
    fn test_http_body() {
        let report = ActivityReport::new("https://x.test/a".to_string(), None, 1000);

        assert_eq!(
            HttpCollector::body(&report).unwrap(),
            r#"{"kind":{"youtube":"https://x.test/a"},"ts":1000,"version":1}"#
        );
    }

    #[test]
    fn test_collector_from_config() {
        let http = Collector::from(&TransportConfig::default());
        assert!(
            matches!(&http, Collector::Http(c) if c.endpoint() == "http://localhost:58810/youtube")
        );
        assert_eq!(http.name(), "http");

        let native = Collector::from(&TransportConfig::NativeMessaging {
            application: "whatsong".to_string(),
        });
        assert!(matches!(&native, Collector::Native(c) if c.application() == "whatsong"));
        assert_eq!(native.name(), "native-messaging");
    }
}
