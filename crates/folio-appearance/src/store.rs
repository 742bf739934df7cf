//! Domain Stores: the single owner of each settings domain.
//!
//! [`DomainStore`] is the plain state machine. [`StoreHandle`] wraps it for
//! shared use, serialising mutate-then-notify per store so listeners observe
//! changes in the order they were applied. [`StoreReader`] is the read-only
//! view handed to the aggregator.

use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{DomainKind, SettingsDomain};
use crate::error::ValidationResult;
use crate::theme::{SelectedPreset, ThemeConfig};
use crate::typography::{FontPair, TypographyConfig};

/// Lifecycle position of one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    /// Nothing loaded yet; reads return defaults.
    Uninitialized,
    /// Matches what was loaded (or the defaults after a reset).
    Loaded,
    /// Holds changes the gateway has not confirmed.
    Edited,
    /// Matches what the gateway last confirmed.
    Saved,
}

impl DomainStatus {
    /// Whether the in-memory state has unsaved edits.
    #[must_use]
    pub const fn is_dirty(self) -> bool {
        matches!(self, Self::Edited)
    }

    /// Lowercase status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loaded => "loaded",
            Self::Edited => "edited",
            Self::Saved => "saved",
        }
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of transition produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// State replaced from persistence.
    Loaded,
    /// A patch or edit changed the state.
    Updated,
    /// State restored to defaults.
    Reset,
    /// The gateway confirmed a save.
    Saved,
}

/// Notification emitted after every successful store transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// Domain that changed.
    pub domain: DomainKind,
    /// Store revision after the transition.
    pub revision: u64,
    /// Transition that produced the notice.
    pub kind: ChangeKind,
}

/// Synchronous observer of store transitions.
///
/// Listeners run after the state lock is released and may read any store.
/// They must not mutate the store that notified them.
pub trait SettingsListener: Send + Sync {
    /// Called once per transition, in transition order.
    fn on_change(&self, notice: &ChangeNotice);
}

impl<F> SettingsListener for F
where
    F: Fn(&ChangeNotice) + Send + Sync,
{
    fn on_change(&self, notice: &ChangeNotice) {
        self(notice);
    }
}

/// Token returned by `subscribe`, used to detach a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Single-owner state machine for one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainStore<D> {
    current: D,
    status: DomainStatus,
    revision: u64,
}

impl<D: SettingsDomain> Default for DomainStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: SettingsDomain> DomainStore<D> {
    /// Uninitialized store reading as the domain defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: D::default(),
            status: DomainStatus::Uninitialized,
            revision: 0,
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn get(&self) -> &D {
        &self.current
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> DomainStatus {
        self.status
    }

    /// Count of successful transitions so far.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Merge a patch. Returns `None` when the patch changed nothing.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError`; the store is left untouched.
    pub fn update(&mut self, patch: &Value) -> ValidationResult<Option<ChangeNotice>> {
        let mut working = self.current.clone();
        working.apply_patch(patch)?;
        Ok(self.replace(working))
    }

    /// Apply an edit that cannot produce an invalid configuration.
    pub(crate) fn modify<F>(&mut self, edit: F) -> Option<ChangeNotice>
    where
        F: FnOnce(&mut D),
    {
        let mut working = self.current.clone();
        edit(&mut working);
        self.replace(working)
    }

    /// Restore defaults. Always succeeds and always notifies.
    pub fn reset(&mut self) -> ChangeNotice {
        self.current = D::default();
        self.transition(DomainStatus::Loaded, ChangeKind::Reset)
    }

    /// Adopt a freshly loaded configuration. Callers pass validated configs.
    pub(crate) fn load(&mut self, config: D) -> ChangeNotice {
        self.current = config;
        self.transition(DomainStatus::Loaded, ChangeKind::Loaded)
    }

    /// Record a confirmed save of the state captured at `revision`.
    ///
    /// A canonical shape that differs from memory counts as a new revision.
    /// Returns `None` when the store moved on while the save was in flight.
    pub(crate) fn mark_saved(&mut self, revision: u64, canonical: D) -> Option<ChangeNotice> {
        if revision != self.revision {
            return None;
        }
        if canonical == self.current {
            self.status = DomainStatus::Saved;
            return Some(self.notice(ChangeKind::Saved));
        }
        self.current = canonical;
        Some(self.transition(DomainStatus::Saved, ChangeKind::Saved))
    }

    fn replace(&mut self, working: D) -> Option<ChangeNotice> {
        if working == self.current {
            return None;
        }
        self.current = working;
        Some(self.transition(DomainStatus::Edited, ChangeKind::Updated))
    }

    fn transition(&mut self, status: DomainStatus, kind: ChangeKind) -> ChangeNotice {
        self.status = status;
        self.revision += 1;
        self.notice(kind)
    }

    const fn notice(&self, kind: ChangeKind) -> ChangeNotice {
        ChangeNotice {
            domain: D::KIND,
            revision: self.revision,
            kind,
        }
    }
}

/// Ordered listener registry shared by stores and the aggregator.
#[derive(Default)]
pub(crate) struct ListenerSet {
    entries: RwLock<Vec<(ListenerId, Arc<dyn SettingsListener>)>>,
    next: AtomicU64,
}

impl ListenerSet {
    pub(crate) fn subscribe(&self, listener: Arc<dyn SettingsListener>) -> ListenerId {
        let id = ListenerId(self.next.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(candidate, _)| *candidate != id);
        entries.len() != before
    }

    /// Invoke every listener without holding the registry lock.
    pub(crate) fn notify(&self, notice: &ChangeNotice) {
        let listeners: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener.on_change(notice);
        }
    }
}

struct Shared<D> {
    state: RwLock<DomainStore<D>>,
    sequencer: Mutex<()>,
    listeners: ListenerSet,
}

impl<D> Shared<D> {
    fn read_state(&self) -> RwLockReadGuard<'_, DomainStore<D>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, DomainStore<D>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn sequence(&self) -> MutexGuard<'_, ()> {
        self.sequencer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared, owning handle to a Domain Store.
pub struct StoreHandle<D> {
    shared: Arc<Shared<D>>,
}

impl<D> Clone for StoreHandle<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D: SettingsDomain> Default for StoreHandle<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: SettingsDomain> fmt::Debug for StoreHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.read_state();
        f.debug_struct("StoreHandle")
            .field("domain", &D::KIND)
            .field("status", &state.status())
            .field("revision", &state.revision())
            .finish_non_exhaustive()
    }
}

impl<D: SettingsDomain> StoreHandle<D> {
    /// Uninitialized store with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(DomainStore::new()),
                sequencer: Mutex::new(()),
                listeners: ListenerSet::default(),
            }),
        }
    }

    /// Current configuration; defaults until something is loaded.
    #[must_use]
    pub fn get(&self) -> D {
        self.shared.read_state().get().clone()
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> DomainStatus {
        self.shared.read_state().status()
    }

    /// Count of successful transitions so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.shared.read_state().revision()
    }

    /// Configuration and the revision it belongs to, read atomically.
    #[must_use]
    pub fn snapshot(&self) -> (D, u64) {
        let state = self.shared.read_state();
        (state.get().clone(), state.revision())
    }

    /// Merge a partial configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the rejected field; nothing changes.
    pub fn update(&self, patch: &Value) -> ValidationResult<D> {
        self.transact(|store| store.update(patch))
            .inspect_err(|err| debug!(domain = %D::KIND, error = %err, "patch rejected"))
    }

    /// Restore the documented defaults.
    pub fn reset(&self) -> D {
        let config = self.commit(|store| Some(store.reset()));
        info!(domain = %D::KIND, "settings reset to defaults");
        config
    }

    /// Replace the state with a configuration read from persistence.
    pub(crate) fn load(&self, config: D) -> D {
        self.commit(|store| Some(store.load(config)))
    }

    /// Mark the state captured at `revision` as durably stored.
    ///
    /// Returns `false` if the store was mutated after the snapshot.
    pub(crate) fn mark_saved(&self, revision: u64, canonical: D) -> bool {
        let _turn = self.shared.sequence();
        let notice = self.shared.write_state().mark_saved(revision, canonical);
        notice.is_some_and(|notice| {
            self.shared.listeners.notify(&notice);
            true
        })
    }

    /// Attach a listener; it sees every later transition in order.
    pub fn subscribe(&self, listener: Arc<dyn SettingsListener>) -> ListenerId {
        self.shared.listeners.subscribe(listener)
    }

    /// Detach a listener. Returns whether it was attached.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.shared.listeners.unsubscribe(id)
    }

    /// Read-only view sharing this store.
    #[must_use]
    pub fn reader(&self) -> StoreReader<D> {
        StoreReader {
            shared: Arc::clone(&self.shared),
        }
    }

    fn transact<E, F>(&self, op: F) -> Result<D, E>
    where
        F: FnOnce(&mut DomainStore<D>) -> Result<Option<ChangeNotice>, E>,
    {
        let _turn = self.shared.sequence();
        let (config, notice) = {
            let mut state = self.shared.write_state();
            let notice = op(&mut *state)?;
            (state.get().clone(), notice)
        };
        if let Some(notice) = notice {
            debug!(domain = %D::KIND, revision = notice.revision, kind = ?notice.kind, "settings changed");
            self.shared.listeners.notify(&notice);
        }
        Ok(config)
    }

    fn commit<F>(&self, op: F) -> D
    where
        F: FnOnce(&mut DomainStore<D>) -> Option<ChangeNotice>,
    {
        let Ok(config) = self.transact::<Infallible, _>(|store| Ok(op(store)));
        config
    }
}

impl StoreHandle<ThemeConfig> {
    /// Select a preset, overwriting every color from its table.
    pub fn apply_preset(&self, preset: SelectedPreset) -> ThemeConfig {
        let config = self.commit(|store| store.modify(|theme| theme.select(preset)));
        info!(preset = %preset, "theme preset applied");
        config
    }
}

impl StoreHandle<TypographyConfig> {
    /// Set heading and body fonts from a curated pair in one transition.
    pub fn apply_font_pair(&self, pair: FontPair) -> TypographyConfig {
        let config = self.commit(|store| store.modify(|typography| typography.use_pair(pair)));
        info!(pair = %pair, "font pair applied");
        config
    }
}

/// Read-only view of a Domain Store.
pub struct StoreReader<D> {
    shared: Arc<Shared<D>>,
}

impl<D> Clone for StoreReader<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D: SettingsDomain> StoreReader<D> {
    /// Current configuration.
    #[must_use]
    pub fn get(&self) -> D {
        self.shared.read_state().get().clone()
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> DomainStatus {
        self.shared.read_state().status()
    }

    /// Attach a listener to the underlying store.
    pub fn subscribe(&self, listener: Arc<dyn SettingsListener>) -> ListenerId {
        self.shared.listeners.subscribe(listener)
    }

    /// Detach a listener. Returns whether it was attached.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.shared.listeners.unsubscribe(id)
    }
}
