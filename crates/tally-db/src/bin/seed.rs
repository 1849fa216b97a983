//! # Demo Tenant Seeder
//!
//! Populates the database with a demo butcher shop for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Seeded Data
//! - Tenant "Casa de Carnes" with admin "Administrador"
//! - Categories: Carne Bovina, Carne Suína, Acessórios, Kits
//! - Weight-based cuts (one on promotion), charcoal by the piece, a kit
//! - Two customers

use std::env;
use tracing_subscriber::EnvFilter;

use tally_core::{TenantId, Unit};
use tally_db::{CustomerInput, Database, DbConfig, NewProduct, SettingsInput};

const DEMO_TENANT: &str = "Casa de Carnes";
const DEMO_ADMIN: &str = "Administrador";

/// (name, category, price, promo, unit, stock in units, is_kit)
const PRODUCTS: &[(&str, &str, i64, Option<i64>, Unit, i64, bool)] = &[
    ("Picanha Premium", "Carne Bovina", 8990, None, Unit::Kg, 50, false),
    ("Costela Gaúcha", "Carne Bovina", 3990, Some(3490), Unit::Kg, 40, false),
    ("Linguiça Toscana", "Carne Suína", 2490, None, Unit::Kg, 30, false),
    ("Carvão 5kg", "Acessórios", 1500, None, Unit::Un, 25, false),
    ("Kit Churrasco Família", "Kits", 19990, Some(17990), Unit::Un, 10, true),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("João Silva", "(51) 99876-5432"),
    ("Maria Oliveira", "(51) 99123-4567"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally Demo Seeder");
    println!("====================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if let Some(existing) = db.tenants().get_by_slug("casa-de-carnes").await? {
        println!("⚠ Demo tenant already exists ({})", existing.id);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let registration = db.tenants().register(DEMO_TENANT, DEMO_ADMIN).await?;
    let tenant = TenantId::from_token(Some(&registration.tenant.id))?;
    println!("✓ Registered tenant {} ({})", registration.tenant.name, tenant);

    let catalog = db.catalog();
    let mut categories = Vec::new();
    for (_, category, ..) in PRODUCTS {
        if categories.iter().any(|(name, _)| name == category) {
            continue;
        }
        let created = catalog.create_category(&tenant, category).await?;
        categories.push((*category, created.id));
    }
    println!("✓ Created {} categories", categories.len());

    for (name, category, price_cents, promo, unit, stock_units, is_kit) in PRODUCTS {
        let category_id = categories
            .iter()
            .find(|(n, _)| n == category)
            .map(|(_, id)| id.clone());

        catalog
            .create_product(
                &tenant,
                NewProduct {
                    name: name.to_string(),
                    price_cents: *price_cents,
                    promotional_price_cents: *promo,
                    unit: *unit,
                    stock_milli: stock_units * 1000,
                    category_id,
                    is_kit: *is_kit,
                    ..NewProduct::default()
                },
            )
            .await?;
    }
    println!("✓ Created {} products", catalog.count_products(&tenant).await?);

    for (name, phone) in CUSTOMERS {
        db.customers()
            .create(
                &tenant,
                CustomerInput {
                    name: name.to_string(),
                    phone: Some(phone.to_string()),
                    ..CustomerInput::default()
                },
            )
            .await?;
    }
    println!("✓ Created {} customers", CUSTOMERS.len());

    db.tenants()
        .upsert_settings(
            &tenant,
            SettingsInput {
                address: Some("Av. Ipiranga, 1500 - Porto Alegre".to_string()),
                whatsapp: Some("5551991234567".to_string()),
                instagram: Some("@casadecarnes".to_string()),
                opening_hours: Some("Seg-Sáb 8h-19h".to_string()),
                ..SettingsInput::default()
            },
        )
        .await?;
    println!("✓ Saved storefront settings");

    println!();
    println!("Tenant token: {}", tenant);
    println!("Admin user:   {}", registration.admin.id);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
