//! # tally-core: Pure Business Logic for Tally
//!
//! Everything a sale needs to be *computed* lives here; everything a sale
//! needs to be *stored* lives in `tally-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │         Request layer (POS UI, back office, storefront)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ tenant token + typed request          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  tally-service (commands)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  money   │ │  basket  │ │  tenant  │          │   │
//! │  │   │ Product  │ │  Money   │ │  Basket  │ │ TenantId │          │   │
//! │  │   │  Sale    │ │ Quantity │ │ Pricing  │ │  slugify │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          tally-db (SQLite, sale engine, inventory ledger)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, InventoryLogEntry, etc.)
//! - [`money`] - Money type with integer cents
//! - [`quantity`] - Quantity type with integer thousandths (grams for kg items)
//! - [`basket`] - Basket validation, snapshot pricing, stock policy
//! - [`tenant`] - Tenant token parsing and slug generation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Money, Quantity};
//!
//! let price = Money::from_cents(8990); // 89.90 per kg
//! let weight = Quantity::from_milli(1_500); // 1.5 kg
//!
//! assert_eq!(price.times(weight).cents(), 13485);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod basket;
pub mod error;
pub mod money;
pub mod quantity;
pub mod tenant;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use basket::{Basket, BasketLimits, BasketLine, PricedBasket, PricedLine, StockPolicy};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, MAX_MONEY_CENTS};
pub use quantity::Quantity;
pub use tenant::TenantId;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in a single basket.
///
/// ## Business Reason
/// Prevents runaway baskets and keeps one sale transaction short.
pub const MAX_BASKET_LINES: usize = 100;

/// Maximum quantity of a single basket line, in whole units.
///
/// Catches typing 1000 instead of 10 at the register. Overridable per
/// deployment through [`BasketLimits`].
pub const MAX_LINE_UNITS: i64 = 999;

/// Default minimum stock threshold for new products, in whole units.
pub const DEFAULT_MIN_STOCK_UNITS: i64 = 5;
