//! # Customer Commands

use serde::Deserialize;
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::state::App;
use tally_core::{Customer, CustomerSummary};
use tally_db::CustomerInput;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<CustomerRequest> for CustomerInput {
    fn from(r: CustomerRequest) -> Self {
        CustomerInput {
            name: r.name,
            email: r.email,
            phone: r.phone,
            address: r.address,
        }
    }
}

/// Customers with total spent and last visit.
pub async fn list_customers(app: &App, token: Option<&str>) -> ApiResult<Vec<CustomerSummary>> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().customers().list_with_spend(&ctx.id).await?)
}

pub async fn get_customer(
    app: &App,
    token: Option<&str>,
    customer_id: &str,
) -> ApiResult<Customer> {
    let ctx = app.resolver().resolve(token).await?;
    app.db()
        .customers()
        .get(&ctx.id, customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", customer_id))
}

pub async fn create_customer(
    app: &App,
    token: Option<&str>,
    request: CustomerRequest,
) -> ApiResult<Customer> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app.db().customers().create(&ctx.id, request.into()).await?)
}

pub async fn update_customer(
    app: &App,
    token: Option<&str>,
    customer_id: &str,
    request: CustomerRequest,
) -> ApiResult<Customer> {
    let ctx = app.resolver().resolve(token).await?;
    Ok(app
        .db()
        .customers()
        .update(&ctx.id, customer_id, request.into())
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{create_sale, CreateSaleRequest};
    use crate::commands::test_support::{fixture, product};
    use crate::error::ErrorCode;

    fn named(name: &str) -> CustomerRequest {
        CustomerRequest {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_spend_follows_sales() {
        let fx = fixture().await;
        let token = Some(fx.token.as_str());
        let joao = create_customer(&fx.app, token, named("João Silva")).await.unwrap();
        let picanha = product(&fx, "Picanha Premium", 8990, None, 50.0).await;

        let request: CreateSaleRequest = serde_json::from_value(serde_json::json!({
            "actorId": fx.admin_id,
            "items": [{ "productId": picanha.id, "quantity": 1 }],
            "paymentMethod": "card",
            "customerId": joao.id,
        }))
        .unwrap();
        create_sale(&fx.app, token, request).await.unwrap();

        let listed = list_customers(&fx.app, token).await.unwrap();
        assert_eq!(listed[0].total_spent_cents, 8990);
    }

    #[tokio::test]
    async fn test_update_and_missing() {
        let fx = fixture().await;
        let token = Some(fx.token.as_str());
        let maria = create_customer(&fx.app, token, named("Maria")).await.unwrap();

        let updated = update_customer(&fx.app, token, &maria.id, named("Maria Oliveira"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Maria Oliveira");

        let err = get_customer(&fx.app, token, "99999999-9999-4999-8999-999999999999")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = create_customer(&fx.app, token, named(" ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
