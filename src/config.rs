/// Tracker configuration, supplied by the extension glue at startup
use serde::Deserialize;
use std::str::FromStr;
use wasm_bindgen::JsValue;

use crate::error::{Error, Result};
use crate::url_filter::UrlFilter;

pub const DEFAULT_PORT: u16 = 58810;
pub const DEFAULT_APPLICATION: &str = "whatsong";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub transport: TransportConfig,
    pub filter: UrlFilter,
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            transport: TransportConfig::default(),
            filter: UrlFilter::default(),
            log_level: default_log_level(),
        }
    }
}

/// Where reports are delivered
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// `runtime.sendNativeMessage` to a registered native host
    NativeMessaging {
        #[serde(default = "default_application")]
        application: String,
    },
    /// JSON POST to `http://localhost:<port>/youtube`
    Http {
        #[serde(default = "default_port")]
        port: u16,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Http {
            port: DEFAULT_PORT,
        }
    }
}

impl TrackerConfig {
    /// Decode the object passed from JS; `undefined` and `null` give defaults
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(TrackerConfig::default());
        }
        serde_wasm_bindgen::from_value(value).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn level(&self) -> Result<log::Level> {
        log::Level::from_str(&self.log_level)
            .map_err(|_| Error::Config(format!("unknown log level `{}`", self.log_level)))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_application() -> String {
    DEFAULT_APPLICATION.to_string()
}
