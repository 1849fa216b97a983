//! # Tenant Context
//!
//! Turns the caller's opaque tenant token into a confirmed tenant.
//!
//! ```text
//! token ──► parse_token ──► TenantId ──► TenantResolver::confirm ──► TenantContext
//!  │         (no storage)                  (tenants table only)
//!  ├── absent / blank ─► MISSING_TENANT
//!  └── not a UUID, or names no tenant ─► UNKNOWN_TENANT
//! ```
//!
//! Confirmation only proves the tenant exists. Ownership of every product,
//! customer and user referenced later is re-checked by the repositories.

use tally_core::{CoreError, Tenant, TenantId};
use tally_db::{Database, TenantRepository};
use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// A tenant confirmed to exist for the duration of one call.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub id: TenantId,
    pub tenant: Tenant,
}

/// Parses a token without touching storage.
pub fn parse_token(token: Option<&str>) -> ApiResult<TenantId> {
    TenantId::from_token(token).map_err(|err| match err {
        CoreError::MissingTenant => {
            warn!("Request rejected: no tenant token");
            ApiError::from(err)
        }
        other => {
            warn!(error = %other, "Request rejected: malformed tenant token");
            ApiError::unknown_tenant()
        }
    })
}

#[derive(Debug, Clone)]
pub struct TenantResolver {
    tenants: TenantRepository,
}

impl TenantResolver {
    pub fn new(db: &Database) -> Self {
        TenantResolver {
            tenants: db.tenants(),
        }
    }

    /// Parses and confirms `token` in one step.
    pub async fn resolve(&self, token: Option<&str>) -> ApiResult<TenantContext> {
        let id = parse_token(token)?;
        self.confirm(id).await
    }

    /// Confirms an already parsed id names a tenant.
    pub async fn confirm(&self, id: TenantId) -> ApiResult<TenantContext> {
        match self.tenants.get(&id).await? {
            Some(tenant) => Ok(TenantContext { id, tenant }),
            None => {
                warn!(tenant_id = %id, "Request rejected: unknown tenant");
                Err(ApiError::unknown_tenant())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tally_db::DbConfig;

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token(None).unwrap_err().code, ErrorCode::MissingTenant);
        assert_eq!(parse_token(Some("  ")).unwrap_err().code, ErrorCode::MissingTenant);
        assert_eq!(
            parse_token(Some("casa-de-carnes")).unwrap_err().code,
            ErrorCode::UnknownTenant
        );
        assert!(parse_token(Some("6F9619FF-8B86-4D11-B42D-00C04FC964FF")).is_ok());
    }

    #[tokio::test]
    async fn test_resolve() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let registration = db
            .tenants()
            .register("Casa de Carnes", "Ana Souza")
            .await
            .unwrap();
        let resolver = TenantResolver::new(&db);

        let ctx = resolver
            .resolve(Some(&registration.tenant.id))
            .await
            .unwrap();
        assert_eq!(ctx.tenant.slug, "casa-de-carnes");
        assert_eq!(ctx.id.as_str(), registration.tenant.id);

        let err = resolver
            .resolve(Some("00000000-0000-4000-8000-000000000000"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTenant);
    }
}
