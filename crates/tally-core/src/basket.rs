//! # Basket & Pricing
//!
//! The pure half of the sale transaction engine: a validated basket goes in,
//! priced lines and totals come out. Reading products and writing the sale
//! happen in `tally-db`; nothing here touches storage.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Basket::new(lines, payment, delivery, fee, customer, limits)          │
//! │       │  empty? ──► EmptyBasket                                        │
//! │       │  bad quantity / id / fee ──► Validation                         │
//! │       ▼                                                                 │
//! │  Basket (validated, immutable)                                          │
//! │       │                                                                 │
//! │       │  products read inside the sale transaction                      │
//! │       ▼                                                                 │
//! │  StockPolicy::check(basket, products) ──► InsufficientStock?           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Basket::price(products)                                                │
//! │       │  unit price = promotional ?? regular  (snapshot)               │
//! │       │  line subtotal = unit price × quantity (half up)               │
//! │       │  fee = delivery ? supplied fee : 0                              │
//! │       ▼                                                                 │
//! │  PricedBasket { lines, subtotal, delivery_fee, total }                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! `total = Σ line.subtotal + delivery_fee`, with `delivery_fee = 0` for
//! pickup regardless of what the caller supplied.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, MAX_MONEY_CENTS};
use crate::quantity::Quantity;
use crate::types::{DeliveryMode, PaymentMethod, Product};
use crate::validation::{
    validate_basket_size, validate_delivery_fee, validate_quantity, validate_uuid,
};
use crate::{MAX_BASKET_LINES, MAX_LINE_UNITS};

// =============================================================================
// Limits
// =============================================================================

/// Deployment-tunable bounds applied when a basket is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketLimits {
    pub max_lines: usize,
    pub max_line_quantity: Quantity,
}

impl Default for BasketLimits {
    fn default() -> Self {
        Self {
            max_lines: MAX_BASKET_LINES,
            max_line_quantity: Quantity::from_units(MAX_LINE_UNITS),
        }
    }
}

// =============================================================================
// Basket
// =============================================================================

/// One requested line: which product, how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketLine {
    pub product_id: String,
    pub quantity: Quantity,
}

/// A basket that passed every check that needs no storage access.
///
/// Fields are private; the only way to get one is [`Basket::new`].
#[derive(Debug, Clone)]
pub struct Basket {
    lines: Vec<BasketLine>,
    payment_method: PaymentMethod,
    delivery_mode: DeliveryMode,
    delivery_fee: Money,
    customer_id: Option<String>,
}

impl Basket {
    /// Validates and builds a basket.
    ///
    /// ## Errors
    /// - `EmptyBasket` when `lines` is empty
    /// - `Validation` for too many lines, a non-positive or oversized
    ///   quantity, a malformed product/customer id, or a negative fee
    ///
    /// The supplied fee is validated even for pickup; pricing then ignores it.
    pub fn new(
        lines: Vec<BasketLine>,
        payment_method: PaymentMethod,
        delivery_mode: DeliveryMode,
        delivery_fee: Money,
        customer_id: Option<String>,
        limits: BasketLimits,
    ) -> CoreResult<Self> {
        if lines.is_empty() {
            return Err(CoreError::EmptyBasket);
        }

        validate_basket_size(lines.len(), limits.max_lines)?;

        for line in &lines {
            validate_uuid("product id", &line.product_id)?;
            validate_quantity(line.quantity, limits.max_line_quantity)?;
        }

        validate_delivery_fee(delivery_fee.cents())?;

        let customer_id = match customer_id {
            Some(id) if !id.trim().is_empty() => {
                validate_uuid("customer id", &id)?;
                Some(id)
            }
            _ => None,
        };

        Ok(Self {
            lines,
            payment_method,
            delivery_mode,
            delivery_fee,
            customer_id,
        })
    }

    pub fn lines(&self) -> &[BasketLine] {
        &self.lines
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    /// The fee that will actually be charged.
    pub fn effective_delivery_fee(&self) -> Money {
        match self.delivery_mode {
            DeliveryMode::Delivery => self.delivery_fee,
            DeliveryMode::Pickup => Money::zero(),
        }
    }

    /// Distinct product ids in first-seen order.
    pub fn product_ids(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for line in &self.lines {
            if !seen.contains(&line.product_id.as_str()) {
                seen.push(line.product_id.as_str());
            }
        }
        seen
    }

    /// Total requested quantity per product. A product may appear on
    /// several lines; stock checks must see the sum.
    pub fn quantities_by_product(&self) -> BTreeMap<&str, Quantity> {
        let mut totals = BTreeMap::new();
        for line in &self.lines {
            *totals
                .entry(line.product_id.as_str())
                .or_insert_with(Quantity::zero) += line.quantity;
        }
        totals
    }

    /// Prices every line against the given products.
    ///
    /// `products` must hold the tenant's current rows for the basket; a line
    /// whose product is absent yields `ProductNotFound`.
    ///
    /// ## Example
    /// ```text
    /// Picanha 89.90 × 2        = 179.80
    /// Costela 34.90 (promo) × 3 = 104.70
    ///                  subtotal = 284.50
    /// pickup                fee =   0.00
    ///                     total = 284.50
    /// ```
    pub fn price(&self, products: &[Product]) -> CoreResult<PricedBasket> {
        let mut lines = Vec::with_capacity(self.lines.len());

        for line in &self.lines {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            let unit_price = product.effective_price();
            lines.push(PricedLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price,
                subtotal: bounded("line subtotal", unit_price.checked_times(line.quantity))?,
            });
        }

        let subtotal = bounded(
            "subtotal",
            lines
                .iter()
                .try_fold(Money::zero(), |acc, l| acc.checked_add(l.subtotal)),
        )?;
        let delivery_fee = self.effective_delivery_fee();
        let total = bounded("total", subtotal.checked_add(delivery_fee))?;

        Ok(PricedBasket {
            lines,
            subtotal,
            delivery_fee,
            total,
        })
    }
}

/// An amount that overflowed or passed [`MAX_MONEY_CENTS`] is a validation
/// failure, never a wrapped total.
fn bounded(field: &str, amount: Option<Money>) -> CoreResult<Money> {
    match amount {
        Some(m) if m.cents() <= MAX_MONEY_CENTS => Ok(m),
        _ => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_CENTS,
        }
        .into()),
    }
}

// =============================================================================
// Priced Output
// =============================================================================

/// A line with its price frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedBasket {
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

// =============================================================================
// Stock Policy
// =============================================================================

/// What a sale does when it would take stock below zero.
///
/// `AllowNegative` keeps selling and lets stock go negative, which is how
/// shops that receive goods after selling them operate. `RejectNegative`
/// fails the sale before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    #[default]
    AllowNegative,
    RejectNegative,
}

impl StockPolicy {
    /// Checks the whole basket against current stock.
    pub fn check(&self, basket: &Basket, products: &[Product]) -> CoreResult<()> {
        if *self == StockPolicy::AllowNegative {
            return Ok(());
        }

        for (product_id, requested) in basket.quantities_by_product() {
            let product = products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

            if requested.milli() > product.stock_milli {
                return Err(CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock_milli,
                    requested: requested.milli(),
                });
            }
        }

        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::AllowNegative => "allow_negative",
            StockPolicy::RejectNegative => "reject_negative",
        }
    }
}

impl fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow_negative" => Ok(StockPolicy::AllowNegative),
            "reject_negative" => Ok(StockPolicy::RejectNegative),
            _ => Err(ValidationError::NotAllowed {
                field: "stock policy".to_string(),
                allowed: vec!["allow_negative".to_string(), "reject_negative".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
