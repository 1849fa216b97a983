//! # Tenant Repository
//!
//! Tenants, their users, storefront settings, and signup.
//!
//! ## Signup
//! ```text
//! register("Casa de Carnes", "Ana Souza")
//!      │
//!      ├── validate name, derive slug "casa-de-carnes"
//!      ├── slug taken? ──► UniqueViolation
//!      │
//!      ▼  one UnitOfWork
//!  INSERT tenants   ─┐
//!  INSERT users      ├── both or neither
//!  (admin, "admin") ─┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use crate::unit_of_work::UnitOfWork;
use tally_core::tenant::slugify;
use tally_core::validation::{validate_name, validate_tenant_name};
use tally_core::{Tenant, TenantId, TenantSettings, User, UserRole, ValidationError};

/// Longest value accepted for any settings field.
const MAX_SETTING_CHARS: usize = 500;

const SETTINGS_COLUMNS: &str = r#"
    tenant_id, address, phone, whatsapp, instagram, facebook,
    opening_hours, logo_url, updated_at
"#;

/// Result of a successful signup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub tenant: Tenant,
    pub admin: User,
}

/// Editable storefront settings. Blank values are stored as NULL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub opening_hours: Option<String>,
    pub logo_url: Option<String>,
}

/// Repository for tenant and user operations.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: SqlitePool,
}

impl TenantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TenantRepository { pool }
    }

    /// Looks up a tenant by id. `None` means the token names no tenant.
    pub async fn get(&self, tenant: &TenantId) -> DbResult<Option<Tenant>> {
        debug!(tenant_id = %tenant, "Resolving tenant");

        let row = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, created_at
            FROM tenants
            WHERE id = ?1
            "#,
        )
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Looks up a tenant by its public slug (storefront).
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Tenant>> {
        debug!(slug = %slug, "Resolving tenant by slug");

        let row = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, created_at
            FROM tenants
            WHERE slug = ?1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Creates a tenant and its admin user atomically.
    pub async fn register(&self, name: &str, admin_name: &str) -> DbResult<Registration> {
        validate_tenant_name(name)?;
        validate_name("admin name", admin_name)?;

        let slug = slugify(name);
        if slug.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "tenant name".to_string(),
                reason: "must contain ASCII letters or digits".to_string(),
            }
            .into());
        }

        if self.get_by_slug(&slug).await?.is_some() {
            return Err(DbError::duplicate("slug", slug));
        }

        let now = Utc::now();
        let tenant = Tenant {
            id: TenantId::generate().to_string(),
            name: name.trim().to_string(),
            slug,
            created_at: now,
        };
        let admin = User {
            id: new_id(),
            tenant_id: tenant.id.clone(),
            username: "admin".to_string(),
            name: admin_name.trim().to_string(),
            role: UserRole::Admin,
            created_at: now,
        };

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, slug, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.created_at)
        .execute(uow.conn())
        .await?;

        insert_user(uow.conn(), &admin).await?;

        uow.commit().await?;

        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant registered");
        Ok(Registration { tenant, admin })
    }

    /// Adds a user to a tenant.
    pub async fn create_user(
        &self,
        tenant: &TenantId,
        username: &str,
        name: &str,
        role: UserRole,
    ) -> DbResult<User> {
        validate_name("username", username)?;
        validate_name("name", name)?;

        let user = User {
            id: new_id(),
            tenant_id: tenant.to_string(),
            username: username.trim().to_string(),
            name: name.trim().to_string(),
            role,
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        insert_user(&mut conn, &user).await?;

        debug!(tenant_id = %tenant, user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, tenant: &TenantId, user_id: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, tenant, user_id).await
    }

    pub async fn list_users(&self, tenant: &TenantId) -> DbResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, tenant_id, username, name, role, created_at
            FROM users
            WHERE tenant_id = ?1
            ORDER BY name
            "#,
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Settings
// =============================================================================

impl TenantRepository {
    /// Stored settings, or `None` if the tenant never saved any.
    pub async fn get_settings(&self, tenant: &TenantId) -> DbResult<Option<TenantSettings>> {
        let sql = format!("SELECT {SETTINGS_COLUMNS} FROM tenant_settings WHERE tenant_id = ?1");

        let row = sqlx::query_as::<_, TenantSettings>(&sql)
            .bind(tenant.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Replaces every settings field of the tenant, creating the row on
    /// first save.
    pub async fn upsert_settings(
        &self,
        tenant: &TenantId,
        input: SettingsInput,
    ) -> DbResult<TenantSettings> {
        let sql = format!(
            r#"
            INSERT INTO tenant_settings (
                tenant_id, address, phone, whatsapp, instagram, facebook,
                opening_hours, logo_url, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (tenant_id) DO UPDATE SET
                address = excluded.address,
                phone = excluded.phone,
                whatsapp = excluded.whatsapp,
                instagram = excluded.instagram,
                facebook = excluded.facebook,
                opening_hours = excluded.opening_hours,
                logo_url = excluded.logo_url,
                updated_at = excluded.updated_at
            RETURNING {SETTINGS_COLUMNS}
            "#
        );

        let settings = sqlx::query_as::<_, TenantSettings>(&sql)
            .bind(tenant.as_str())
            .bind(setting("address", input.address)?)
            .bind(setting("phone", input.phone)?)
            .bind(setting("whatsapp", input.whatsapp)?)
            .bind(setting("instagram", input.instagram)?)
            .bind(setting("facebook", input.facebook)?)
            .bind(setting("opening hours", input.opening_hours)?)
            .bind(setting("logo url", input.logo_url)?)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        info!(tenant_id = %tenant, "Settings saved");
        Ok(settings)
    }
}

fn setting(field: &str, value: Option<String>) -> DbResult<Option<String>> {
    let value = match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return Ok(None),
    };

    if value.chars().count() > MAX_SETTING_CHARS {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_SETTING_CHARS,
        }
        .into());
    }

    Ok(Some(value))
}

/// Reads a user only if it belongs to `tenant`.
pub(crate) async fn fetch_user(
    conn: &mut SqliteConnection,
    tenant: &TenantId,
    user_id: &str,
) -> DbResult<Option<User>> {
    let row = sqlx::query_as::<_, User>(
        r#"
        SELECT id, tenant_id, username, name, role, created_at
        FROM users
        WHERE id = ?1 AND tenant_id = ?2
        "#,
    )
    .bind(user_id)
    .bind(tenant.as_str())
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

async fn insert_user(conn: &mut SqliteConnection, user: &User) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, tenant_id, username, name, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&user.id)
    .bind(&user.tenant_id)
    .bind(&user.username)
    .bind(&user.name)
    .bind(user.role)
    .bind(user.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{second_shop, shop};
    use tally_core::CoreError;

    #[tokio::test]
    async fn test_register_creates_tenant_and_admin() {
        let shop = shop().await;

        let tenant = shop.db.tenants().get(&shop.tenant).await.unwrap().unwrap();
        assert_eq!(tenant.slug, "casa-de-carnes");
        assert_eq!(shop.admin.role, UserRole::Admin);
        assert_eq!(shop.admin.tenant_id, tenant.id);

        let users = shop.db.tenants().list_users(&shop.tenant).await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let shop = shop().await;
        let err = shop
            .db
            .tenants()
            .register("casa de carnes", "Outra Pessoa")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_invalid_name_rejected_before_storage() {
        let shop = shop().await;
        let err = shop.db.tenants().register("ab", "Admin").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = shop.db.tenants().register("ççç", "Admin").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_by_slug_and_unknown_id() {
        let shop = shop().await;
        let found = shop
            .db
            .tenants()
            .get_by_slug("casa-de-carnes")
            .await
            .unwrap();
        assert!(found.is_some());

        let unknown = TenantId::from_token(Some("00000000-0000-4000-8000-000000000000")).unwrap();
        assert!(shop.db.tenants().get(&unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_are_tenant_scoped() {
        let shop = shop().await;
        let (other, other_admin) = second_shop(&shop.db).await;

        let cashier = shop
            .db
            .tenants()
            .create_user(&shop.tenant, "caixa1", "Carla", UserRole::Cashier)
            .await
            .unwrap();

        assert!(shop
            .db
            .tenants()
            .get_user(&shop.tenant, &cashier.id)
            .await
            .unwrap()
            .is_some());
        assert!(shop
            .db
            .tenants()
            .get_user(&other, &cashier.id)
            .await
            .unwrap()
            .is_none());
        assert!(shop
            .db
            .tenants()
            .get_user(&shop.tenant, &other_admin.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_within_tenant() {
        let shop = shop().await;
        let err = shop
            .db
            .tenants()
            .create_user(&shop.tenant, "admin", "Someone", UserRole::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_settings_upsert_and_read_back() {
        let shop = shop().await;
        let tenants = shop.db.tenants();
        assert!(tenants.get_settings(&shop.tenant).await.unwrap().is_none());

        let saved = tenants
            .upsert_settings(
                &shop.tenant,
                SettingsInput {
                    address: Some("Rua das Flores, 120".to_string()),
                    whatsapp: Some(" 5551999990000 ".to_string()),
                    opening_hours: Some("Seg-Sáb 8h-19h".to_string()),
                    ..SettingsInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.whatsapp.as_deref(), Some("5551999990000"));
        assert!(saved.updated_at.is_some());

        let replaced = tenants
            .upsert_settings(
                &shop.tenant,
                SettingsInput {
                    address: Some("  ".to_string()),
                    instagram: Some("@casadecarnes".to_string()),
                    ..SettingsInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(replaced.address, None);
        assert_eq!(replaced.opening_hours, None);

        let stored = tenants.get_settings(&shop.tenant).await.unwrap().unwrap();
        assert_eq!(stored, replaced);
        assert_eq!(stored.instagram.as_deref(), Some("@casadecarnes"));
    }

    #[tokio::test]
    async fn test_settings_are_tenant_scoped_and_bounded() {
        let shop = shop().await;
        let (other, _) = second_shop(&shop.db).await;
        let tenants = shop.db.tenants();

        tenants
            .upsert_settings(
                &shop.tenant,
                SettingsInput {
                    phone: Some("51 3333-0000".to_string()),
                    ..SettingsInput::default()
                },
            )
            .await
            .unwrap();
        assert!(tenants.get_settings(&other).await.unwrap().is_none());

        let err = tenants
            .upsert_settings(
                &other,
                SettingsInput {
                    logo_url: Some("x".repeat(MAX_SETTING_CHARS + 1)),
                    ..SettingsInput::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::TooLong { .. }))
        ));
        assert!(tenants.get_settings(&other).await.unwrap().is_none());
    }
}
