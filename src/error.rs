/// Error types for the tab tracker

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum Error {
    #[error("json serialize error: {0}")]
    Json(#[from] serde_json::Error),

    /// Converting between Rust values and `JsValue` failed
    #[error("js value conversion error: {0}")]
    Encode(String),

    /// A browser API call threw or a promise rejected
    #[error("browser error: {0}")]
    Js(String),

    #[error("collector answered with status {status}")]
    Status { status: u16 },

    #[error("no window or worker scope to fetch from")]
    NoGlobalScope,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("tracker was already started")]
    AlreadyStarted,
}

impl Error {
    pub(crate) fn js(value: JsValue) -> Self {
        Error::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(error: serde_wasm_bindgen::Error) -> Self {
        Error::Encode(error.to_string())
    }
}

impl From<Error> for JsValue {
    fn from(error: Error) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
