/// Tracks at most one tab and forwards its URL changes as reports
use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::report::{ActivityReport, BrowserClock, Clock, timestamp};
use crate::tab_data::{Indicator, NavigationEvent, TabId};
use crate::url_filter::UrlFilter;

/// Callback the host invokes for navigation changes of a subscribed tab
pub type NavigationHandler = Rc<dyn Fn(NavigationEvent)>;

/// Browser capabilities the tracker drives
pub trait TabHost {
    /// Deliver navigation changes of `tab_id` (and only that tab) to `handler`
    fn subscribe(&self, tab_id: TabId, handler: NavigationHandler);
    fn unsubscribe(&self, tab_id: TabId);
    fn set_indicator(&self, tab_id: TabId, indicator: Indicator);
}

/// Accepts reports without waiting for their delivery
pub trait ReportSink {
    fn submit(&self, report: ActivityReport);
}

/// Tracking state: `None` is idle, `Some(tab)` is tracking that tab.
///
/// Only `on_toggle` moves between states. Dispatch is single-threaded, so
/// a `Cell` is all the synchronisation needed.
pub struct Tracker<H, S, C = BrowserClock> {
    active: Cell<Option<TabId>>,
    host: H,
    sink: S,
    clock: C,
    filter: UrlFilter,
}

impl<H, S, C> Tracker<H, S, C>
where
    H: TabHost + 'static,
    S: ReportSink + 'static,
    C: Clock + 'static,
{
    pub fn new(host: H, sink: S, clock: C) -> Rc<Self> {
        Self::with_filter(host, sink, clock, UrlFilter::All)
    }

    pub fn with_filter(host: H, sink: S, clock: C, filter: UrlFilter) -> Rc<Self> {
        Rc::new(Tracker {
            active: Cell::new(None),
            host,
            sink,
            clock,
            filter,
        })
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active.get()
    }

    /// Toggle tracking of `tab_id`, switching away from any other tracked tab
    pub fn on_toggle(self: &Rc<Self>, tab_id: TabId) {
        match self.active.get() {
            Some(active) if active == tab_id => {
                self.stop(active);
            }
            Some(other) => {
                self.stop(other);
                self.start(tab_id);
            }
            None => self.start(tab_id),
        }
    }

    pub fn on_navigation(&self, event: NavigationEvent) {
        if self.active.get() != Some(event.tab_id) {
            log::trace!("dropping navigation for untracked tab {}", event.tab_id);
            return;
        }

        self.host.set_indicator(event.tab_id, Indicator::Active);

        let Some(url) = event.url.filter(|url| !url.is_empty()) else {
            return;
        };

        if !self.filter.accepts(&url) {
            log::debug!("filtered: {}", url);
            return;
        }

        let report = ActivityReport::new(url, event.title, timestamp(&self.clock));
        self.sink.submit(report);
    }

    fn start(self: &Rc<Self>, tab_id: TabId) {
        log::info!("setting active: {}", tab_id);
        self.active.set(Some(tab_id));
        self.host.set_indicator(tab_id, Indicator::Active);

        let tracker: Weak<Self> = Rc::downgrade(self);
        let handler: NavigationHandler = Rc::new(move |event| {
            if let Some(tracker) = tracker.upgrade() {
                tracker.on_navigation(event);
            }
        });
        self.host.subscribe(tab_id, handler);
    }

    fn stop(&self, tab_id: TabId) {
        log::info!("setting inactive: {}", tab_id);
        self.active.set(None);
        self.host.set_indicator(tab_id, Indicator::Idle);
        self.host.unsubscribe(tab_id);
    }
}
