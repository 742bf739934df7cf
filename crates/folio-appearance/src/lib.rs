#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Appearance configuration for a portfolio site.
//!
//! Layout: `choice.rs` (option-set machinery), `domain.rs` (the
//! `SettingsDomain` abstraction), `layout.rs`/`theme.rs`/`responsive.rs`/
//! `typography.rs` (the four domains), `store.rs` (Domain Stores and change
//! notices), `aggregator.rs` (effective configuration), `preview.rs` (pure
//! renderer), `gateway.rs` (persistence contract and adapters), `service.rs`
//! (load/save orchestration).

#[macro_use]
pub mod choice;

pub mod aggregator;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod layout;
pub mod preview;
pub mod responsive;
pub mod service;
pub mod store;
pub mod theme;
pub mod typography;
mod validate;

pub use aggregator::{AppearanceStores, DomainConfig, EffectiveConfig, SettingsAggregator};
pub use choice::Choice;
pub use domain::{DomainKind, SettingsDomain};
pub use error::{
    AppearanceError, PersistError, PersistResult, ValidationError, ValidationResult,
};
pub use gateway::{FileGateway, MemoryGateway, PersistenceGateway, StoredConfig};
pub use layout::LayoutConfig;
pub use preview::{PreviewDescription, heading_size, render};
pub use responsive::ResponsiveConfig;
pub use service::{AppearanceService, Edit, SaveReport};
pub use store::{
    ChangeKind, ChangeNotice, DomainStatus, DomainStore, ListenerId, SettingsListener,
    StoreHandle, StoreReader,
};
pub use theme::{DarkModePolicy, HexColor, Palette, SelectedPreset, ThemeConfig};
pub use typography::{FontFamily, FontPair, TypographyConfig};
