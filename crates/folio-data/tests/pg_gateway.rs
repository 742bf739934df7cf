use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use folio_appearance::{AppearanceService, DomainKind, PersistenceGateway, SelectedPreset};
use folio_data::PgGateway;
use folio_data::settings;
use folio_test_support::postgres;
use serde_json::json;
use tokio::time::sleep;
use uuid::Uuid;

async fn connect(url: &str, portfolio_id: Uuid) -> Result<PgGateway> {
    // The image logs readiness once before its init restart, so retry briefly.
    let mut attempts = 0;
    loop {
        match PgGateway::connect(url, portfolio_id).await {
            Ok(gateway) => return Ok(gateway),
            Err(err) => {
                attempts += 1;
                if attempts >= 10 {
                    return Err(err).context("failed to connect to postgres");
                }
                sleep(Duration::from_millis(250)).await;
            }
        }
    }
}

async fn with_gateway<F, Fut>(name: &str, test: F) -> Result<()>
where
    F: FnOnce(PgGateway, String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let Some(database) = postgres::start().await? else {
        eprintln!("skipping {name}: docker unavailable");
        return Ok(());
    };
    let gateway = connect(database.url(), Uuid::new_v4()).await?;
    test(gateway, database.url().to_string()).await
}

#[tokio::test]
async fn missing_domain_loads_as_none() -> Result<()> {
    with_gateway("missing_domain_loads_as_none", |gateway, _| async move {
        assert!(gateway.load(DomainKind::Layout).await?.is_none());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn identical_saves_keep_revision() -> Result<()> {
    with_gateway("identical_saves_keep_revision", |gateway, _| async move {
        let config = json!({ "container": { "maxWidth": "1536" } });
        let first = gateway.save(DomainKind::Layout, config.clone()).await?;
        let again = gateway.save(DomainKind::Layout, config).await?;
        assert_eq!(first.revision, 1);
        assert_eq!(again.revision, 1);
        assert_eq!(again.stored_at, first.stored_at);

        let changed = gateway
            .save(DomainKind::Layout, json!({ "container": { "maxWidth": "1920" } }))
            .await?;
        assert_eq!(changed.revision, 2);

        let loaded = gateway
            .load(DomainKind::Layout)
            .await?
            .context("layout row")?;
        assert_eq!(loaded.config["container"]["maxWidth"], "1920");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn portfolios_are_isolated() -> Result<()> {
    with_gateway("portfolios_are_isolated", |gateway, url| async move {
        gateway
            .save(DomainKind::Theme, json!({ "selectedPreset": "ocean" }))
            .await?;
        let other = PgGateway::connect(&url, Uuid::new_v4()).await?;
        assert!(other.load(DomainKind::Theme).await?.is_none());

        let removed = settings::delete_settings(gateway.pool(), gateway.portfolio_id()).await?;
        assert_eq!(removed, 1);
        assert!(gateway.load(DomainKind::Theme).await?.is_none());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn service_round_trips_through_postgres() -> Result<()> {
    with_gateway("service_round_trips_through_postgres", |gateway, _| async move {
        let gateway = Arc::new(gateway);
        let writer = AppearanceService::new(gateway.clone());
        writer.load_all().await?;
        writer.apply_preset(SelectedPreset::Sunset);
        writer.update(DomainKind::Typography, &json!({ "baseFontSize": 18 }))?;
        assert!(writer.save_dirty().await.is_success());

        let reader = AppearanceService::new(gateway);
        reader.load_all().await?;
        assert_eq!(reader.effective(), writer.effective());
        Ok(())
    })
    .await
}
