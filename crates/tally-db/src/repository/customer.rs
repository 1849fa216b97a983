//! # Customer Repository
//!
//! Tenant-scoped customers and their lifetime spend.

use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::new_id;
use tally_core::validation::validate_name;
use tally_core::{CoreError, Customer, CustomerSummary, TenantId};

/// Editable customer fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists customers with total spent and last purchase, by name.
    pub async fn list_with_spend(&self, tenant: &TenantId) -> DbResult<Vec<CustomerSummary>> {
        debug!(tenant_id = %tenant, "Listing customers");

        let rows = sqlx::query_as::<_, CustomerSummary>(
            r#"
            SELECT
                c.id, c.tenant_id, c.name, c.email, c.phone, c.address, c.created_at,
                COALESCE(SUM(s.total_amount_cents), 0) AS total_spent_cents,
                MAX(s.created_at) AS last_visit
            FROM customers c
            LEFT JOIN sales s ON s.customer_id = c.id AND s.tenant_id = c.tenant_id
            WHERE c.tenant_id = ?1
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get(&self, tenant: &TenantId, customer_id: &str) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        fetch_customer(&mut conn, tenant, customer_id).await
    }

    pub async fn create(&self, tenant: &TenantId, input: CustomerInput) -> DbResult<Customer> {
        validate_name("name", &input.name)?;

        let customer = Customer {
            id: new_id(),
            tenant_id: tenant.to_string(),
            name: input.name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            address: input.address,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO customers (id, tenant_id, name, email, phone, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.tenant_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        debug!(tenant_id = %tenant, customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update(
        &self,
        tenant: &TenantId,
        customer_id: &str,
        input: CustomerInput,
    ) -> DbResult<Customer> {
        validate_name("name", &input.name)?;

        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            UPDATE customers SET name = ?3, email = ?4, phone = ?5, address = ?6
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(customer_id)
        .bind(tenant.as_str())
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        fetch_customer(&mut conn, tenant, customer_id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()).into())
    }
}

/// Reads a customer only if it belongs to `tenant`.
pub(crate) async fn fetch_customer(
    conn: &mut SqliteConnection,
    tenant: &TenantId,
    customer_id: &str,
) -> DbResult<Option<Customer>> {
    let row = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, tenant_id, name, email, phone, address, created_at
        FROM customers
        WHERE id = ?1 AND tenant_id = ?2
        "#,
    )
    .bind(customer_id)
    .bind(tenant.as_str())
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{line, product, second_shop, shop};
    use tally_core::{Basket, BasketLimits, DeliveryMode, Money, PaymentMethod};

    fn input(name: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            ..CustomerInput::default()
        }
    }

    #[tokio::test]
    async fn test_list_with_spend() {
        let shop = shop().await;
        let customers = shop.db.customers();
        let joao = customers.create(&shop.tenant, input("João Silva")).await.unwrap();
        customers.create(&shop.tenant, input("Maria Oliveira")).await.unwrap();
        let picanha = product(&shop, "Picanha Premium", 8990, None, 50).await;

        for units in [1, 2] {
            let basket = Basket::new(
                vec![line(&picanha, units)],
                PaymentMethod::Pix,
                DeliveryMode::Pickup,
                Money::zero(),
                Some(joao.id.clone()),
                BasketLimits::default(),
            )
            .unwrap();
            shop.db
                .sales()
                .record_sale(&shop.tenant, &shop.admin.id, &basket)
                .await
                .unwrap();
        }

        let listed = customers.list_with_spend(&shop.tenant).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].customer.name, "João Silva");
        assert_eq!(listed[0].total_spent_cents, 8990 * 3);
        assert!(listed[0].last_visit.is_some());
        assert_eq!(listed[1].total_spent_cents, 0);
        assert!(listed[1].last_visit.is_none());
    }

    #[tokio::test]
    async fn test_update_is_tenant_scoped() {
        let shop = shop().await;
        let (other, _) = second_shop(&shop.db).await;
        let customer = shop
            .db
            .customers()
            .create(&shop.tenant, input("Maria Oliveira"))
            .await
            .unwrap();

        let updated = shop
            .db
            .customers()
            .update(
                &shop.tenant,
                &customer.id,
                CustomerInput {
                    phone: Some("(51) 99999-0000".to_string()),
                    ..input("Maria Oliveira")
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("(51) 99999-0000"));

        let err = shop
            .db
            .customers()
            .update(&other, &customer.id, input("Hijack"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CustomerNotFound(_))));
        assert!(shop
            .db
            .customers()
            .get(&other, &customer.id)
            .await
            .unwrap()
            .is_none());
    }
}
