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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! PostgreSQL persistence for appearance settings.
//!
//! Layout: `settings.rs` (migrations and row-level queries), `gateway.rs`
//! (`PgGateway`, the Persistence Gateway adapter), `error.rs`.

pub mod error;
pub mod gateway;
pub mod settings;

pub use error::{DataError, Result as DataResult};
pub use gateway::PgGateway;
