//! Backend selection, error types and the context shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::anyhow;
use folio_appearance::{
    AppearanceError, AppearanceService, FileGateway, PersistError, PersistenceGateway,
    ValidationError,
};
use folio_data::PgGateway;
use tracing::debug;

use crate::cli::{BackendArgs, OutputFormat};

/// Error type used by CLI handlers; maps onto process exit codes.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<PersistError> for CliError {
    fn from(err: PersistError) -> Self {
        Self::failure(err)
    }
}

impl From<AppearanceError> for CliError {
    fn from(err: AppearanceError) -> Self {
        match err {
            AppearanceError::Validation(err) => err.into(),
            AppearanceError::Persist(err) => {
                Self::failure(anyhow::Error::new(err).context("change applied but not saved"))
            }
        }
    }
}

/// Choose the persistence backend from the global flags.
pub(crate) async fn connect_gateway(
    backend: &BackendArgs,
) -> CliResult<Arc<dyn PersistenceGateway>> {
    if let Some(url) = &backend.database_url {
        let portfolio_id = backend.portfolio_id.ok_or_else(|| {
            CliError::validation(
                "portfolio id is required with a database (pass --portfolio-id or set FOLIO_PORTFOLIO_ID)",
            )
        })?;
        debug!(%portfolio_id, "using postgres backend");
        let gateway = PgGateway::connect(url, portfolio_id)
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to connect to database: {err}")))?;
        return Ok(Arc::new(gateway));
    }

    debug!(root = %backend.store_dir.display(), "using file backend");
    Ok(Arc::new(FileGateway::new(&backend.store_dir)))
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) service: AppearanceService,
    pub(crate) format: OutputFormat,
}

impl AppContext {
    /// Build the service and load every domain from `gateway`.
    pub(crate) async fn load(
        gateway: Arc<dyn PersistenceGateway>,
        format: OutputFormat,
    ) -> CliResult<Self> {
        let service = AppearanceService::new(gateway);
        service
            .load_all()
            .await
            .map_err(|err| CliError::failure(anyhow::Error::new(err).context("failed to load settings")))?;
        Ok(Self { service, format })
    }
}
