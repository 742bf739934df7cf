use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use folio_appearance::layout::MaxWidth;
use folio_appearance::typography::HeadingScale;
use folio_appearance::{
    AppearanceService, DomainKind, DomainStatus, EffectiveConfig, FileGateway, MemoryGateway,
    PersistError, PersistResult, PersistenceGateway, SelectedPreset, StoredConfig, ThemeConfig,
    heading_size,
};
use serde_json::{Value, json};

/// Delegates to a memory gateway but fails saves while `failing` is set, and
/// always for the `refused` domain.
#[derive(Default)]
struct FlakyGateway {
    inner: MemoryGateway,
    failing: AtomicBool,
    refused: Mutex<Option<DomainKind>>,
}

impl FlakyGateway {
    fn refuse(&self, domain: DomainKind) {
        *self.refused.lock().unwrap_or_else(PoisonError::into_inner) = Some(domain);
    }

    fn rejects(&self, domain: DomainKind) -> bool {
        self.failing.load(Ordering::SeqCst)
            || *self.refused.lock().unwrap_or_else(PoisonError::into_inner) == Some(domain)
    }
}

#[async_trait]
impl PersistenceGateway for FlakyGateway {
    async fn save(&self, domain: DomainKind, config: Value) -> PersistResult<StoredConfig> {
        if self.rejects(domain) {
            return Err(PersistError::Unavailable {
                message: "backend offline".to_string(),
            });
        }
        self.inner.save(domain, config).await
    }

    async fn load(&self, domain: DomainKind) -> PersistResult<Option<StoredConfig>> {
        self.inner.load(domain).await
    }
}

#[tokio::test]
async fn layout_edit_changes_only_the_layout_slice() -> anyhow::Result<()> {
    let service = AppearanceService::new(Arc::new(MemoryGateway::new()));
    service.load_all().await?;

    service.update(DomainKind::Layout, &json!({ "container": { "maxWidth": "1536" } }))?;
    let effective = service.effective();

    assert_eq!(effective.layout.container.max_width, MaxWidth::W1536);
    assert_eq!(effective.theme, ThemeConfig::default());
    let rendered = serde_json::to_value(&effective)?;
    assert_eq!(rendered["layout"]["container"]["maxWidth"], "1536");
    Ok(())
}

#[tokio::test]
async fn relaxed_scale_renders_documented_heading_size() -> anyhow::Result<()> {
    let service = AppearanceService::new(Arc::new(MemoryGateway::new()));
    service.update(
        DomainKind::Typography,
        &json!({ "headingScale": "relaxed", "baseFontSize": 16 }),
    )?;

    let preview = service.preview();
    let level_one = preview.typography.headings[0].size_px;
    assert!((level_one - 35.152).abs() < 1e-9);
    assert!((heading_size(16, HeadingScale::Relaxed, 1) - level_one).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn preset_then_reset_restores_theme_defaults() -> anyhow::Result<()> {
    let service = AppearanceService::new(Arc::new(MemoryGateway::new()));
    let dark = service.apply_preset(SelectedPreset::DarkMode);
    assert_eq!(Some(dark.colors), SelectedPreset::DarkMode.palette());

    service.reset(DomainKind::Theme);
    assert_eq!(service.effective().theme, ThemeConfig::default());
    assert_eq!(service.status(DomainKind::Theme), DomainStatus::Loaded);
    Ok(())
}

#[tokio::test]
async fn invalid_updates_leave_state_untouched() -> anyhow::Result<()> {
    let service = AppearanceService::new(Arc::new(MemoryGateway::new()));
    let before = service.effective();

    let err = service
        .update(DomainKind::Layout, &json!({ "container": { "maxWidth": "999" } }))
        .unwrap_err();
    assert_eq!(err.field(), Some("container.maxWidth"));
    let err = service
        .update(DomainKind::Typography, &json!({ "baseFontSize": 50 }))
        .unwrap_err();
    assert_eq!(err.field(), Some("baseFontSize"));

    assert_eq!(service.effective(), before);
    Ok(())
}

#[tokio::test]
async fn repeated_update_is_idempotent() -> anyhow::Result<()> {
    let service = AppearanceService::new(Arc::new(MemoryGateway::new()));
    let patch = json!({ "navigationStyle": "minimal" });
    let first = service.update(DomainKind::Responsive, &patch)?;
    let revision = service.stores().responsive.revision();
    let second = service.update(DomainKind::Responsive, &patch)?;
    assert_eq!(first, second);
    assert_eq!(service.stores().responsive.revision(), revision);
    Ok(())
}

#[tokio::test]
async fn saved_domains_round_trip_through_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let writer = AppearanceService::new(Arc::new(FileGateway::new(dir.path())));
    writer.load_all().await?;
    writer.apply_preset(SelectedPreset::Forest);
    writer.update(
        DomainKind::Responsive,
        &json!({ "breakpoints": { "desktop": "1440px" }, "layoutStyle": "masonry" }),
    )?;
    let report = writer.save_dirty().await;
    assert!(report.is_success());
    assert_eq!(report.saved.len(), 2);

    let reader = AppearanceService::new(Arc::new(FileGateway::new(dir.path())));
    reader.load_all().await?;
    assert_eq!(reader.effective(), writer.effective());
    assert_ne!(reader.effective(), EffectiveConfig::default());
    Ok(())
}

#[tokio::test]
async fn failed_save_keeps_edits_unsaved() -> anyhow::Result<()> {
    let gateway = Arc::new(FlakyGateway::default());
    let service = AppearanceService::new(gateway.clone());
    service.load_all().await?;
    service.update(DomainKind::Theme, &json!({ "colors": { "accent": "#10B981" } }))?;
    let edited = service.effective().theme;

    gateway.failing.store(true, Ordering::SeqCst);
    let err = service.save(DomainKind::Theme).await.unwrap_err();
    assert!(matches!(err, PersistError::Unavailable { .. }));
    assert_eq!(service.status(DomainKind::Theme), DomainStatus::Edited);
    assert_eq!(service.effective().theme, edited);
    assert_eq!(edited.selected_preset, SelectedPreset::Custom);

    gateway.failing.store(false, Ordering::SeqCst);
    let stored = service.save(DomainKind::Theme).await?;
    assert_eq!(stored.config["colors"]["accent"], "#10b981");
    assert_eq!(service.status(DomainKind::Theme), DomainStatus::Saved);
    Ok(())
}

#[tokio::test]
async fn stale_stored_documents_load_leniently() -> anyhow::Result<()> {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .save(
            DomainKind::Typography,
            json!({ "baseFontSize": 44, "headingFont": "Lato", "kerning": "tight" }),
        )
        .await?;
    let service = AppearanceService::new(gateway);
    service.load(DomainKind::Typography).await?;

    let typography = service.effective().typography;
    assert_eq!(typography.base_font_size, 16);
    assert_eq!(typography.heading_font.as_str(), "Lato");
    assert_eq!(service.status(DomainKind::Typography), DomainStatus::Loaded);
    Ok(())
}

#[tokio::test]
async fn save_dirty_reports_each_failed_domain() -> anyhow::Result<()> {
    let gateway = Arc::new(FlakyGateway::default());
    let service = AppearanceService::new(gateway.clone());
    service.load_all().await?;

    service.update(DomainKind::Layout, &json!({ "grid": { "columnGap": "32" } }))?;
    service.apply_preset(SelectedPreset::Forest);
    service.update(DomainKind::Typography, &json!({ "baseFontSize": 18 }))?;
    gateway.refuse(DomainKind::Theme);

    let report = service.save_dirty().await;
    assert!(!report.is_success());
    let failed: Vec<_> = report.failed.iter().map(|(domain, _)| *domain).collect();
    assert_eq!(failed, [DomainKind::Theme]);
    assert!(matches!(report.failed[0].1, PersistError::Unavailable { .. }));
    let saved: Vec<_> = report.saved.iter().map(|stored| stored.domain).collect();
    assert_eq!(saved, [DomainKind::Layout, DomainKind::Typography]);

    assert_eq!(service.status(DomainKind::Theme), DomainStatus::Edited);
    assert_eq!(service.stores().theme.get().selected_preset, SelectedPreset::Forest);
    assert_eq!(service.status(DomainKind::Layout), DomainStatus::Saved);
    assert_eq!(service.status(DomainKind::Typography), DomainStatus::Saved);
    assert_eq!(service.status(DomainKind::Responsive), DomainStatus::Loaded);
    assert!(gateway.load(DomainKind::Theme).await?.is_none());
    Ok(())
}
