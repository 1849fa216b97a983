//! # Tenant Identity
//!
//! Parsing of the opaque tenant token carried by every request.
//!
//! ```text
//! request ──► token: Option<&str>
//!                │
//!                ├── None / blank ──► CoreError::MissingTenant
//!                ├── not a UUID   ──► CoreError::Validation(InvalidFormat)
//!                └── UUID         ──► TenantId  (existence checked by tally-db)
//! ```
//!
//! A `TenantId` proves only that the token is well formed. Whether the tenant
//! exists, and whether it owns a given row, is decided by the storage layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Well-formed tenant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Parses the tenant token from a request.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{CoreError, TenantId};
    ///
    /// assert!(matches!(TenantId::from_token(None), Err(CoreError::MissingTenant)));
    /// assert!(matches!(TenantId::from_token(Some("  ")), Err(CoreError::MissingTenant)));
    ///
    /// let id = TenantId::from_token(Some("550e8400-e29b-41d4-a716-446655440000")).unwrap();
    /// assert_eq!(id.as_str(), "550e8400-e29b-41d4-a716-446655440000");
    /// ```
    pub fn from_token(token: Option<&str>) -> CoreResult<Self> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(CoreError::MissingTenant),
        };

        let parsed = uuid::Uuid::parse_str(token).map_err(|_| ValidationError::InvalidFormat {
            field: "tenant id".to_string(),
            reason: "must be a valid UUID".to_string(),
        })?;

        Ok(TenantId(parsed.hyphenated().to_string()))
    }

    /// Generates a fresh identifier for a tenant being registered.
    pub fn generate() -> Self {
        TenantId(uuid::Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives a URL slug from a display name.
///
/// Lower-cases, turns spaces into `-`, and drops every character that is not
/// an ASCII letter, digit, `_` or `-`.
///
/// ## Example
/// ```rust
/// use tally_core::tenant::slugify;
///
/// assert_eq!(slugify("Casa de Carnes"), "casa-de-carnes");
/// assert_eq!(slugify("Açougue Bom Corte!"), "aougue-bom-corte");
/// ```
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_rejects_malformed() {
        let err = TenantId::from_token(Some("tenant-1")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_from_token_normalizes_case() {
        let id = TenantId::from_token(Some("550E8400-E29B-41D4-A716-446655440000")).unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_generate_is_parseable() {
        let id = TenantId::generate();
        assert_eq!(TenantId::from_token(Some(id.as_str())).unwrap(), id);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("MeatMaster Demo"), "meatmaster-demo");
        assert_eq!(slugify("  Trimmed  "), "trimmed");
        assert_eq!(slugify("ççç"), "");
    }
}
