/// Data structures passed between the browser and the tracker
use serde::Deserialize;

/// Browser tab identifier
pub type TabId = i32;

/// Per-tab toolbar indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Idle,
    Active,
}

impl Indicator {
    pub fn icon_path(self) -> &'static str {
        match self {
            Indicator::Idle => "icons/icon.svg",
            Indicator::Active => "icons/icon-active.svg",
        }
    }
}

/// A navigation change reported for one tab.
///
/// `url` is only set when the URL itself changed; title-only or
/// loading-status updates arrive with `url: None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEvent {
    pub tab_id: TabId,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl NavigationEvent {
    pub fn new(tab_id: TabId, url: Option<String>, title: Option<String>) -> NavigationEvent {
        NavigationEvent { tab_id, url, title }
    }

    /// Build an event from the `changeInfo` and `tab` arguments of a
    /// `tabs.onUpdated` callback.
    pub fn from_update(tab_id: TabId, change: ChangeInfo, tab: Option<TabInfo>) -> NavigationEvent {
        let title = tab.and_then(|tab| tab.title).or(change.title);
        NavigationEvent {
            tab_id,
            url: change.url,
            title,
        }
    }
}

/// The subset of `tabs.onUpdated` change info the tracker reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The subset of `tabs.Tab` the tracker reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TabInfo {
    #[serde(default)]
    pub id: Option<TabId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}
