//! The settings-domain abstraction shared by layout, theme, responsive and typography.

use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ValidationResult;
use crate::validate::flatten_patch;

option_set! {
    /// One independently editable configuration namespace.
    ///
    /// The token doubles as the Persistence Gateway key.
    pub enum DomainKind {
        Layout => "layout",
        Theme => "theme",
        Responsive => "responsive",
        Typography => "typography",
    }
}

/// Behaviour every settings domain provides to its store.
pub trait SettingsDomain:
    Clone + Debug + Default + PartialEq + Serialize + Send + Sync + 'static
{
    /// Namespace this domain occupies.
    const KIND: DomainKind;

    /// Apply one flattened field to `self`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the path is unknown or the value lies
    /// outside the field's declared set or range.
    fn apply_field(&mut self, field: &str, value: &Value) -> ValidationResult<()>;

    /// Cross-field invariants checked after a patch has been applied.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the field that breaks the invariant.
    fn check(&self) -> ValidationResult<()> {
        Ok(())
    }

    /// Apply a whole patch to `self`. Callers pass a working copy and discard
    /// it on error.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    fn apply_patch(&mut self, patch: &Value) -> ValidationResult<()> {
        for (field, value) in flatten_patch(Self::KIND, patch)? {
            self.apply_field(&field, value)?;
        }
        self.check()
    }

    /// Build a domain from a complete or partial document, strictly.
    ///
    /// Fields absent from `document` keep their defaults. This is the only
    /// path by which serde produces a domain record.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError`, exactly as `apply_patch` would.
    fn from_document(document: &Value) -> ValidationResult<Self> {
        let mut config = Self::default();
        config.apply_patch(document)?;
        Ok(config)
    }

    /// Rebuild a domain from a stored document, tolerating stale content.
    ///
    /// A fully valid document is applied as a patch onto the defaults. Otherwise
    /// each valid field is kept and every invalid or unknown field falls back
    /// to its default; if the salvaged result still breaks a cross-field
    /// invariant the domain defaults are used.
    fn from_stored(stored: &Value) -> Self {
        if let Ok(strict) = Self::from_document(stored) {
            return strict;
        }

        let mut salvaged = Self::default();
        let fields = match flatten_patch(Self::KIND, stored) {
            Ok(fields) => fields,
            Err(err) => {
                warn!(domain = %Self::KIND, error = %err, "stored document unusable; using defaults");
                return salvaged;
            }
        };
        for (field, value) in fields {
            let mut candidate = salvaged.clone();
            match candidate.apply_field(&field, value) {
                Ok(()) => salvaged = candidate,
                Err(err) => {
                    warn!(domain = %Self::KIND, error = %err, "dropping stored field");
                }
            }
        }
        if let Err(err) = salvaged.check() {
            warn!(domain = %Self::KIND, error = %err, "stored document inconsistent; using defaults");
            return Self::default();
        }
        salvaged
    }
}
