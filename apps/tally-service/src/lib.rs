//! # tally-service: Request Layer for Tally
//!
//! The narrow request/response contract the back-office UI, the cashier
//! CLI and the public storefront call into.
//!
//! ## Call Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Command Call                                  │
//! │                                                                         │
//! │  1. Caller passes &App, the tenant token, and a typed request          │
//! │                                                                         │
//! │  2. Tenant Context ──────────────────────────────────────────────────► │
//! │     • token parsed (MISSING_TENANT / UNKNOWN_TENANT)                    │
//! │     • tenant confirmed before any other table is read                   │
//! │                                                                         │
//! │  3. Request validation ──────────────────────────────────────────────► │
//! │     • DTOs deny unknown fields                                          │
//! │     • basket limits from ServiceConfig                                  │
//! │                                                                         │
//! │  4. Repository call (tally-db) ──────────────────────────────────────► │
//! │     • one UnitOfWork for writes                                         │
//! │                                                                         │
//! │  5. Typed response, or ApiError { code, message }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup
//! ```rust,ignore
//! tally_service::init_tracing();
//! let config = ServiceConfig::from_env()?;
//! let app = App::connect(config).await?;
//! let receipt = commands::sale::create_sale(&app, Some(token), request).await?;
//! ```

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::{ConfigError, ServiceConfig};
pub use context::{TenantContext, TenantResolver};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::App;

/// Installs the global tracing subscriber.
///
/// Default filter is `info,tally=debug,sqlx=warn`; `RUST_LOG` overrides it.
/// Calling it twice keeps the first subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
