/// Bridge to the extension APIs exposed by `background.js`
use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::prelude::*;

use crate::error::{Error, Result};
use crate::tab_data::{ChangeInfo, Indicator, NavigationEvent, TabId, TabInfo};
use crate::tracker::{NavigationHandler, TabHost};

#[wasm_bindgen(module = "/background.js")]
extern "C" {
    fn addUpdateListener(tab_id: TabId, listener: &js_sys::Function);

    fn removeUpdateListener(tab_id: TabId);

    fn setIcon(tab_id: TabId, path: &str);

    fn onActionClicked(listener: &js_sys::Function);

    #[wasm_bindgen(catch)]
    async fn sendNativeMessage(
        application: &str,
        message: JsValue,
    ) -> std::result::Result<JsValue, JsValue>;
}

type UpdateListener = Closure<dyn Fn(JsValue, JsValue, JsValue)>;

/// `TabHost` backed by `tabs.onUpdated` and `browserAction.setIcon`.
///
/// Listener closures are kept here while subscribed so they stay alive on
/// the JS side; unsubscribing removes the listener before dropping them.
#[derive(Default)]
pub struct BrowserHost {
    listeners: RefCell<HashMap<TabId, UpdateListener>>,
}

impl BrowserHost {
    pub fn new() -> BrowserHost {
        BrowserHost::default()
    }
}

impl TabHost for BrowserHost {
    fn subscribe(&self, tab_id: TabId, handler: NavigationHandler) {
        let listener = Closure::wrap(Box::new(move |id: JsValue, change: JsValue, tab: JsValue| {
            match decode_update(tab_id, id, change, tab) {
                Ok(event) => handler(event),
                Err(e) => log::warn!("ignoring tab update: {}", e),
            }
        }) as Box<dyn Fn(JsValue, JsValue, JsValue)>);

        addUpdateListener(tab_id, listener.as_ref().unchecked_ref());
        self.listeners.borrow_mut().insert(tab_id, listener);
    }

    fn unsubscribe(&self, tab_id: TabId) {
        removeUpdateListener(tab_id);
        self.listeners.borrow_mut().remove(&tab_id);
    }

    fn set_indicator(&self, tab_id: TabId, indicator: Indicator) {
        setIcon(tab_id, indicator.icon_path());
    }
}

fn decode_update(
    subscribed: TabId,
    id: JsValue,
    change: JsValue,
    tab: JsValue,
) -> Result<NavigationEvent> {
    let tab_id = id.as_f64().map(|id| id as TabId).unwrap_or(subscribed);
    let change: ChangeInfo = serde_wasm_bindgen::from_value(change)?;
    let tab: Option<TabInfo> = if tab.is_undefined() || tab.is_null() {
        None
    } else {
        Some(serde_wasm_bindgen::from_value(tab)?)
    };
    Ok(NavigationEvent::from_update(tab_id, change, tab))
}

/// Route toolbar button clicks to `on_toggle`. The listener lives for the
/// rest of the process.
pub fn on_toggle_signal(on_toggle: impl Fn(TabId) + 'static) {
    let listener = Closure::wrap(Box::new(move |tab: JsValue| {
        match serde_wasm_bindgen::from_value::<TabInfo>(tab) {
            Ok(TabInfo { id: Some(id), .. }) => on_toggle(id),
            Ok(_) => log::warn!("toggle on a tab without an id"),
            Err(e) => log::warn!("cannot read clicked tab: {:?}", e),
        }
    }) as Box<dyn Fn(JsValue)>);

    onActionClicked(listener.as_ref().unchecked_ref());
    listener.forget();
}

pub(crate) async fn send_native_message(application: &str, message: JsValue) -> Result<JsValue> {
    sendNativeMessage(application, message).await.map_err(Error::js)
}
