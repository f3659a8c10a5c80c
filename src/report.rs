/// Activity reports and the wire payloads built from them
use serde::{Deserialize, Serialize};

/// Envelope version understood by the HTTP collector
pub const CURRENT_API_VERSION: u32 = 1;

/// Source of wall-clock time, in milliseconds since the epoch
pub trait Clock {
    fn now_millis(&self) -> f64;
}

/// Reads `Date.now()` from the JS host
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_millis(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Seconds since the epoch, rounded to the nearest second
pub fn timestamp(clock: &impl Clock) -> i64 {
    (clock.now_millis() / 1000.0).round() as i64
}

/// One URL change of the tracked tab
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityReport {
    pub url: String,
    pub title: Option<String>,
    pub ts: i64,
}

impl ActivityReport {
    pub fn new(url: String, title: Option<String>, ts: i64) -> ActivityReport {
        ActivityReport { url, title, ts }
    }
}

/// Message handed to the native-messaging host
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NativeMessage {
    pub ts: i64,
    pub url: String,
    pub title: String,
}

impl From<&ActivityReport> for NativeMessage {
    fn from(report: &ActivityReport) -> Self {
        NativeMessage {
            ts: report.ts,
            url: report.url.clone(),
            title: report.title.clone().unwrap_or_default(),
        }
    }
}

/// Envelope posted to the HTTP collector
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub ts: i64,
    pub version: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Youtube(String),
}

impl From<&ActivityReport> for Item {
    fn from(report: &ActivityReport) -> Self {
        Item {
            kind: ItemKind::Youtube(report.url.clone()),
            ts: report.ts,
            version: CURRENT_API_VERSION,
        }
    }
}
