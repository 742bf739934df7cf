//! Orchestration of stores, aggregator, renderer and gateway.

use std::sync::Arc;

use folio_events::EventBus;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::aggregator::{AppearanceStores, DomainConfig, EffectiveConfig, SettingsAggregator};
use crate::choice::Choice;
use crate::domain::{DomainKind, SettingsDomain};
use crate::error::{AppearanceError, PersistError, PersistResult, ValidationResult};
use crate::gateway::{PersistenceGateway, StoredConfig};
use crate::preview::{self, PreviewDescription};
use crate::store::{DomainStatus, StoreHandle};
use crate::theme::{SelectedPreset, ThemeConfig};
use crate::typography::{FontPair, TypographyConfig};

/// A single edit that `commit` applies and then persists.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Merge a partial document into one domain.
    Patch {
        /// Target domain.
        domain: DomainKind,
        /// Partial document in the domain's wire shape.
        patch: Value,
    },
    /// Restore one domain's defaults.
    Reset(DomainKind),
    /// Select a theme preset.
    Preset(SelectedPreset),
    /// Apply a curated font pair.
    FontPair(FontPair),
}

impl Edit {
    /// Domain the edit targets.
    #[must_use]
    pub const fn domain(&self) -> DomainKind {
        match self {
            Self::Patch { domain, .. } | Self::Reset(domain) => *domain,
            Self::Preset(_) => DomainKind::Theme,
            Self::FontPair(_) => DomainKind::Typography,
        }
    }
}

/// Outcome of [`AppearanceService::save_dirty`].
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Documents the gateway confirmed, in domain order.
    pub saved: Vec<StoredConfig>,
    /// Domains whose save failed, with the cause.
    pub failed: Vec<(DomainKind, PersistError)>,
}

impl SaveReport {
    /// Whether every attempted save succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The appearance core wired to one persistence backend.
pub struct AppearanceService {
    stores: AppearanceStores,
    aggregator: SettingsAggregator,
    gateway: Arc<dyn PersistenceGateway>,
}

impl AppearanceService {
    /// Fresh, uninitialized stores backed by `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        let stores = AppearanceStores::new();
        let aggregator = SettingsAggregator::attach(&stores);
        Self {
            stores,
            aggregator,
            gateway,
        }
    }

    /// Like [`Self::new`], also publishing every change on `events`.
    #[must_use]
    pub fn with_event_bus(gateway: Arc<dyn PersistenceGateway>, events: EventBus) -> Self {
        let stores = AppearanceStores::new();
        let aggregator = SettingsAggregator::attach_with_events(&stores, events);
        Self {
            stores,
            aggregator,
            gateway,
        }
    }

    /// The four stores.
    #[must_use]
    pub const fn stores(&self) -> &AppearanceStores {
        &self.stores
    }

    /// Aggregated view over the stores.
    #[must_use]
    pub const fn aggregator(&self) -> &SettingsAggregator {
        &self.aggregator
    }

    /// Current configuration of one domain.
    #[must_use]
    pub fn get(&self, domain: DomainKind) -> DomainConfig {
        match domain {
            DomainKind::Layout => DomainConfig::Layout(self.stores.layout.get()),
            DomainKind::Theme => DomainConfig::Theme(self.stores.theme.get()),
            DomainKind::Responsive => DomainConfig::Responsive(self.stores.responsive.get()),
            DomainKind::Typography => DomainConfig::Typography(self.stores.typography.get()),
        }
    }

    /// Lifecycle status of one domain.
    #[must_use]
    pub fn status(&self, domain: DomainKind) -> DomainStatus {
        match domain {
            DomainKind::Layout => self.stores.layout.status(),
            DomainKind::Theme => self.stores.theme.status(),
            DomainKind::Responsive => self.stores.responsive.status(),
            DomainKind::Typography => self.stores.typography.status(),
        }
    }

    /// Merge a partial configuration into one domain.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the rejected field; nothing changes.
    pub fn update(&self, domain: DomainKind, patch: &Value) -> ValidationResult<DomainConfig> {
        Ok(match domain {
            DomainKind::Layout => DomainConfig::Layout(self.stores.layout.update(patch)?),
            DomainKind::Theme => DomainConfig::Theme(self.stores.theme.update(patch)?),
            DomainKind::Responsive => {
                DomainConfig::Responsive(self.stores.responsive.update(patch)?)
            }
            DomainKind::Typography => {
                DomainConfig::Typography(self.stores.typography.update(patch)?)
            }
        })
    }

    /// Restore one domain's defaults.
    pub fn reset(&self, domain: DomainKind) -> DomainConfig {
        match domain {
            DomainKind::Layout => DomainConfig::Layout(self.stores.layout.reset()),
            DomainKind::Theme => DomainConfig::Theme(self.stores.theme.reset()),
            DomainKind::Responsive => DomainConfig::Responsive(self.stores.responsive.reset()),
            DomainKind::Typography => DomainConfig::Typography(self.stores.typography.reset()),
        }
    }

    /// Select a theme preset in memory.
    pub fn apply_preset(&self, preset: SelectedPreset) -> ThemeConfig {
        self.stores.theme.apply_preset(preset)
    }

    /// Apply a curated font pair in memory.
    pub fn apply_font_pair(&self, pair: FontPair) -> TypographyConfig {
        self.stores.typography.apply_font_pair(pair)
    }

    /// Snapshot of every domain.
    #[must_use]
    pub fn effective(&self) -> EffectiveConfig {
        self.aggregator.effective()
    }

    /// Render the current effective configuration.
    #[must_use]
    pub fn preview(&self) -> PreviewDescription {
        preview::render(&self.aggregator.effective())
    }

    /// Load one domain; a missing or unreadable document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns the gateway's `PersistError` for I/O and backend failures; the
    /// store is left as it was.
    #[instrument(name = "appearance.load", skip(self))]
    pub async fn load(&self, domain: DomainKind) -> PersistResult<DomainConfig> {
        Ok(match domain {
            DomainKind::Layout => DomainConfig::Layout(self.load_store(&self.stores.layout).await?),
            DomainKind::Theme => DomainConfig::Theme(self.load_store(&self.stores.theme).await?),
            DomainKind::Responsive => {
                DomainConfig::Responsive(self.load_store(&self.stores.responsive).await?)
            }
            DomainKind::Typography => {
                DomainConfig::Typography(self.load_store(&self.stores.typography).await?)
            }
        })
    }

    /// Load every domain, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first `PersistError` encountered.
    pub async fn load_all(&self) -> PersistResult<()> {
        for domain in DomainKind::ALL.iter().copied() {
            self.load(domain).await?;
        }
        Ok(())
    }

    /// Persist one domain's current state.
    ///
    /// The store becomes `Saved` only if it was not mutated while the gateway
    /// call was in flight.
    ///
    /// # Errors
    ///
    /// Returns the gateway's `PersistError`; in-memory state is untouched and
    /// the domain keeps its unsaved status.
    #[instrument(name = "appearance.save", skip(self))]
    pub async fn save(&self, domain: DomainKind) -> PersistResult<StoredConfig> {
        match domain {
            DomainKind::Layout => self.save_store(&self.stores.layout).await,
            DomainKind::Theme => self.save_store(&self.stores.theme).await,
            DomainKind::Responsive => self.save_store(&self.stores.responsive).await,
            DomainKind::Typography => self.save_store(&self.stores.typography).await,
        }
    }

    /// Attempt a save for every domain with unsaved edits.
    pub async fn save_dirty(&self) -> SaveReport {
        let mut report = SaveReport::default();
        for domain in DomainKind::ALL.iter().copied() {
            if !self.status(domain).is_dirty() {
                continue;
            }
            match self.save(domain).await {
                Ok(stored) => report.saved.push(stored),
                Err(err) => report.failed.push((domain, err)),
            }
        }
        report
    }

    /// Apply `edit` and persist the affected domain.
    ///
    /// # Errors
    ///
    /// Returns `AppearanceError::Validation` when the edit is rejected (nothing
    /// changes) or `AppearanceError::Persist` when the edit was applied but
    /// could not be stored.
    pub async fn commit(&self, edit: Edit) -> Result<StoredConfig, AppearanceError> {
        let domain = edit.domain();
        match edit {
            Edit::Patch { patch, .. } => {
                self.update(domain, &patch)?;
            }
            Edit::Reset(_) => {
                self.reset(domain);
            }
            Edit::Preset(preset) => {
                self.apply_preset(preset);
            }
            Edit::FontPair(pair) => {
                self.apply_font_pair(pair);
            }
        }
        Ok(self.save(domain).await?)
    }

    async fn load_store<D: SettingsDomain>(&self, handle: &StoreHandle<D>) -> PersistResult<D> {
        let config = match self.gateway.load(D::KIND).await {
            Ok(Some(stored)) => {
                debug!(revision = stored.revision, "stored document found");
                D::from_stored(&stored.config)
            }
            Ok(None) => {
                debug!("no stored document; using defaults");
                D::default()
            }
            Err(err @ PersistError::Malformed { .. }) => {
                warn!(error = %err, "stored document unreadable; using defaults until next save");
                D::default()
            }
            Err(err) => return Err(err),
        };
        let config = handle.load(config);
        info!("settings loaded");
        Ok(config)
    }

    async fn save_store<D: SettingsDomain>(
        &self,
        handle: &StoreHandle<D>,
    ) -> PersistResult<StoredConfig> {
        let (config, revision) = handle.snapshot();
        let document = serde_json::to_value(&config).map_err(|source| PersistError::Encode {
            domain: D::KIND,
            source,
        })?;
        let stored = self
            .gateway
            .save(D::KIND, document)
            .await
            .inspect_err(|err| warn!(error = %err, "save failed; changes remain unsaved"))?;

        if handle.mark_saved(revision, D::from_stored(&stored.config)) {
            info!(revision = stored.revision, "settings saved");
        } else {
            debug!("settings changed while saving; keeping unsaved status");
        }
        Ok(stored)
    }
}
