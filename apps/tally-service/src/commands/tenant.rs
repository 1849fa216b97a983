//! # Tenant Commands
//!
//! Signup, tenant users, storefront settings, and the public storefront
//! read. Signup and the storefront are the only commands that run without a
//! tenant token.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::state::App;
use tally_core::{Category, ProductListing, Tenant, TenantId, TenantSettings, User, UserRole};
use tally_db::SettingsInput;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    /// Business name; the public slug is derived from it.
    pub name: String,
    pub admin_name: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub tenant: Tenant,
    pub admin: User,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub role: UserRole,
}

/// Storefront contact details. Every field is replaced on save; omitted or
/// blank fields are cleared.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl From<SettingsRequest> for SettingsInput {
    fn from(r: SettingsRequest) -> Self {
        SettingsInput {
            address: r.address,
            phone: r.phone,
            whatsapp: r.whatsapp,
            instagram: r.instagram,
            facebook: r.facebook,
            opening_hours: r.opening_hours,
            logo_url: r.logo_url,
        }
    }
}

/// What an anonymous visitor sees of a shop.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PublicStore {
    pub tenant: Tenant,
    pub settings: TenantSettings,
    pub categories: Vec<Category>,
    pub products: Vec<ProductListing>,
}

/// Creates a tenant and its admin user.
pub async fn register(app: &App, request: RegisterRequest) -> ApiResult<RegisterResponse> {
    debug!(name = %request.name, "register command");

    let registration = app
        .db()
        .tenants()
        .register(&request.name, &request.admin_name)
        .await?;

    info!(tenant_id = %registration.tenant.id, "Signup complete");
    Ok(RegisterResponse {
        tenant: registration.tenant,
        admin: registration.admin,
    })
}

pub async fn list_users(app: &App, token: Option<&str>) -> ApiResult<Vec<User>> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().tenants().list_users(&ctx.id).await?)
}

pub async fn create_user(
    app: &App,
    token: Option<&str>,
    request: CreateUserRequest,
) -> ApiResult<User> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app
        .db()
        .tenants()
        .create_user(&ctx.id, &request.username, &request.name, request.role)
        .await?)
}

/// Current settings; all-empty when the tenant never saved any.
pub async fn get_settings(app: &App, token: Option<&str>) -> ApiResult<TenantSettings> {
    let ctx = app.resolver().resolve(token).await?;
    load_settings(app, &ctx.id).await
}

pub async fn save_settings(
    app: &App,
    token: Option<&str>,
    request: SettingsRequest,
) -> ApiResult<TenantSettings> {
    let ctx = app.resolver().resolve(token).await?;
    debug!(tenant_id = %ctx.id, "save_settings command");
    Ok(app
        .db()
        .tenants()
        .upsert_settings(&ctx.id, request.into())
        .await?)
}

async fn load_settings(app: &App, tenant: &TenantId) -> ApiResult<TenantSettings> {
    Ok(app
        .db()
        .tenants()
        .get_settings(tenant)
        .await?
        .unwrap_or_else(|| TenantSettings::empty(tenant.as_str())))
}

/// Storefront by slug: tenant, settings, categories and products.
pub async fn public_store(app: &App, slug: &str) -> ApiResult<PublicStore> {
    let tenant = app
        .db()
        .tenants()
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Store", slug))?;

    let ctx = app.resolver().resolve(Some(&tenant.id)).await?;
    let catalog = app.db().catalog();

    Ok(PublicStore {
        settings: load_settings(app, &ctx.id).await?,
        categories: catalog.list_categories(&ctx.id).await?,
        products: catalog.list_products(&ctx.id).await?,
        tenant: ctx.tenant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{fixture, product};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_register_and_duplicate() {
        let fx = fixture().await;

        let response = register(
            &fx.app,
            RegisterRequest {
                name: "Empório do Sul".to_string(),
                admin_name: "Carla Dias".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.tenant.slug, "emprio-do-sul");
        assert_eq!(response.admin.role, UserRole::Admin);

        let err = register(
            &fx.app,
            RegisterRequest {
                name: "Casa de Carnes".to_string(),
                admin_name: "Outra".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_public_store_shows_only_its_products() {
        let fx = fixture().await;
        product(&fx, "Picanha Premium", 8990, None, 50.0).await;
        register(
            &fx.app,
            RegisterRequest {
                name: "Outro Açougue".to_string(),
                admin_name: "Bruno Lima".to_string(),
            },
        )
        .await
        .unwrap();

        let store = public_store(&fx.app, "casa-de-carnes").await.unwrap();
        assert_eq!(store.products.len(), 1);

        let other = public_store(&fx.app, "outro-aougue").await.unwrap();
        assert!(other.products.is_empty());

        let err = public_store(&fx.app, "nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_users() {
        let fx = fixture().await;
        let token = Some(fx.token.as_str());
        create_user(
            &fx.app,
            token,
            CreateUserRequest {
                username: "caixa1".to_string(),
                name: "Carla".to_string(),
                role: UserRole::Cashier,
            },
        )
        .await
        .unwrap();

        assert_eq!(list_users(&fx.app, token).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_settings_round_trip_and_storefront() {
        let fx = fixture().await;
        let token = Some(fx.token.as_str());

        let empty = get_settings(&fx.app, token).await.unwrap();
        assert_eq!(empty, TenantSettings::empty(fx.token.as_str()));

        let request: SettingsRequest = serde_json::from_value(serde_json::json!({
            "address": "Rua das Flores, 120",
            "whatsapp": "5551999990000",
            "openingHours": "Seg-Sáb 8h-19h",
        }))
        .unwrap();
        save_settings(&fx.app, token, request).await.unwrap();

        let settings = get_settings(&fx.app, token).await.unwrap();
        assert_eq!(settings.whatsapp.as_deref(), Some("5551999990000"));

        let store = public_store(&fx.app, "casa-de-carnes").await.unwrap();
        assert_eq!(store.settings, settings);
    }

    #[tokio::test]
    async fn test_settings_require_tenant_and_known_fields() {
        let fx = fixture().await;

        let err = save_settings(&fx.app, None, SettingsRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingTenant);

        let err = crate::commands::parse_request::<SettingsRequest>(r#"{"twitter":"@x"}"#)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let other = register(
            &fx.app,
            RegisterRequest {
                name: "Outro Açougue".to_string(),
                admin_name: "Bruno Lima".to_string(),
            },
        )
        .await
        .unwrap();
        let store = public_store(&fx.app, &other.tenant.slug).await.unwrap();
        assert_eq!(store.settings, TenantSettings::empty(other.tenant.id.as_str()));
    }
}
