//! Settings Aggregator: one consistent view over the four Domain Stores.

use std::sync::Arc;

use folio_events::{Event, EventBus};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::DomainKind;
use crate::layout::LayoutConfig;
use crate::responsive::ResponsiveConfig;
use crate::store::{
    ChangeKind, ChangeNotice, ListenerId, ListenerSet, SettingsListener, StoreHandle, StoreReader,
};
use crate::theme::ThemeConfig;
use crate::typography::TypographyConfig;

/// The four Domain Stores, owned together.
#[derive(Debug, Clone, Default)]
pub struct AppearanceStores {
    /// Layout store.
    pub layout: StoreHandle<LayoutConfig>,
    /// Theme store.
    pub theme: StoreHandle<ThemeConfig>,
    /// Responsive store.
    pub responsive: StoreHandle<ResponsiveConfig>,
    /// Typography store.
    pub typography: StoreHandle<TypographyConfig>,
}

impl AppearanceStores {
    /// Four uninitialized stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Snapshot of all four domains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Layout domain.
    pub layout: LayoutConfig,
    /// Theme domain.
    pub theme: ThemeConfig,
    /// Responsive domain.
    pub responsive: ResponsiveConfig,
    /// Typography domain.
    pub typography: TypographyConfig,
}

impl EffectiveConfig {
    /// One domain's slice.
    #[must_use]
    pub fn slice(&self, domain: DomainKind) -> DomainConfig {
        match domain {
            DomainKind::Layout => DomainConfig::Layout(self.layout.clone()),
            DomainKind::Theme => DomainConfig::Theme(self.theme),
            DomainKind::Responsive => DomainConfig::Responsive(self.responsive),
            DomainKind::Typography => DomainConfig::Typography(self.typography.clone()),
        }
    }
}

/// Any one domain's configuration; serializes as the bare domain document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainConfig {
    /// Layout document.
    Layout(LayoutConfig),
    /// Theme document.
    Theme(ThemeConfig),
    /// Responsive document.
    Responsive(ResponsiveConfig),
    /// Typography document.
    Typography(TypographyConfig),
}

impl DomainConfig {
    /// Domain this configuration belongs to.
    #[must_use]
    pub const fn kind(&self) -> DomainKind {
        match self {
            Self::Layout(_) => DomainKind::Layout,
            Self::Theme(_) => DomainKind::Theme,
            Self::Responsive(_) => DomainKind::Responsive,
            Self::Typography(_) => DomainKind::Typography,
        }
    }
}

/// Forwards store notices to aggregator subscribers and the optional bus.
struct NotificationHub {
    subscribers: ListenerSet,
    events: Option<EventBus>,
}

impl SettingsListener for NotificationHub {
    fn on_change(&self, notice: &ChangeNotice) {
        trace!(domain = %notice.domain, revision = notice.revision, "forwarding change notice");
        if let Some(bus) = &self.events {
            bus.publish(event_for(notice));
        }
        self.subscribers.notify(notice);
    }
}

fn event_for(notice: &ChangeNotice) -> Event {
    let domain = notice.domain.as_str().to_string();
    let revision = notice.revision;
    match notice.kind {
        ChangeKind::Loaded => Event::DomainLoaded { domain, revision },
        ChangeKind::Updated => Event::DomainUpdated { domain, revision },
        ChangeKind::Reset => Event::DomainReset { domain, revision },
        ChangeKind::Saved => Event::DomainSaved { domain, revision },
    }
}

/// Read-only composition of the Domain Stores.
///
/// `effective` reads every store on each call; nothing is cached.
pub struct SettingsAggregator {
    layout: StoreReader<LayoutConfig>,
    theme: StoreReader<ThemeConfig>,
    responsive: StoreReader<ResponsiveConfig>,
    typography: StoreReader<TypographyConfig>,
    hub: Arc<NotificationHub>,
    attachments: [ListenerId; 4],
}

impl SettingsAggregator {
    /// Observe `stores` without publishing events.
    #[must_use]
    pub fn attach(stores: &AppearanceStores) -> Self {
        Self::build(stores, None)
    }

    /// Observe `stores` and publish every notice on `events`.
    #[must_use]
    pub fn attach_with_events(stores: &AppearanceStores, events: EventBus) -> Self {
        Self::build(stores, Some(events))
    }

    fn build(stores: &AppearanceStores, events: Option<EventBus>) -> Self {
        let hub = Arc::new(NotificationHub {
            subscribers: ListenerSet::default(),
            events,
        });
        let listener = || Arc::clone(&hub) as Arc<dyn SettingsListener>;
        let attachments = [
            stores.layout.subscribe(listener()),
            stores.theme.subscribe(listener()),
            stores.responsive.subscribe(listener()),
            stores.typography.subscribe(listener()),
        ];
        Self {
            layout: stores.layout.reader(),
            theme: stores.theme.reader(),
            responsive: stores.responsive.reader(),
            typography: stores.typography.reader(),
            hub,
            attachments,
        }
    }

    /// Compose the current state of every domain.
    #[must_use]
    pub fn effective(&self) -> EffectiveConfig {
        EffectiveConfig {
            layout: self.layout.get(),
            theme: self.theme.get(),
            responsive: self.responsive.get(),
            typography: self.typography.get(),
        }
    }

    /// Be told about every change in any domain.
    pub fn subscribe(&self, listener: Arc<dyn SettingsListener>) -> ListenerId {
        self.hub.subscribers.subscribe(listener)
    }

    /// Drop a subscriber; `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.hub.subscribers.unsubscribe(id)
    }
}

impl Drop for SettingsAggregator {
    fn drop(&mut self) {
        let [layout, theme, responsive, typography] = self.attachments;
        self.layout.unsubscribe(layout);
        self.theme.unsubscribe(theme);
        self.responsive.unsubscribe(responsive);
        self.typography.unsubscribe(typography);
    }
}
