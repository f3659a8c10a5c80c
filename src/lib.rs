/// Tab Tracker - reports URL changes of one tracked tab to a local collector
/// Built with Rust + WASM

mod browser;
pub mod config;
pub mod error;
pub mod report;
pub mod reporter;
pub mod tab_data;
pub mod tracker;
pub mod url_filter;

use std::cell::Cell;

use wasm_bindgen::prelude::*;

use crate::config::TrackerConfig;
use crate::error::Error;
use crate::report::BrowserClock;
use crate::reporter::{Collector, Reporter};
use crate::tracker::Tracker;

pub use browser::BrowserHost;

thread_local! {
    static STARTED: Cell<bool> = const { Cell::new(false) };
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

/// Build the tracker and attach it to the toolbar button.
///
/// `config` is a plain object (see `TrackerConfig`) or `undefined`.
#[wasm_bindgen]
pub fn start_tracker(config: JsValue) -> Result<(), JsValue> {
    if STARTED.with(Cell::get) {
        return Err(Error::AlreadyStarted.into());
    }

    let config = TrackerConfig::from_js(config)?;
    let level = config.level()?;
    STARTED.with(|started| started.set(true));
    wasm_logger::init(wasm_logger::Config::new(level));

    let collector = Collector::from(&config.transport);
    log::info!("reporting to {} collector", collector_label(&collector));

    let tracker = Tracker::with_filter(
        BrowserHost::new(),
        Reporter::new(collector),
        BrowserClock,
        config.filter,
    );
    browser::on_toggle_signal(move |tab_id| tracker.on_toggle(tab_id));
    Ok(())
}

fn collector_label(collector: &Collector) -> String {
    match collector {
        Collector::Native(native) => format!("native host `{}`", native.application()),
        Collector::Http(http) => http.endpoint(),
    }
}
