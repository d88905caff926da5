//! # Seed Data Generator
//!
//! Populates the database with the default platforms and, optionally, demo
//! sales for development.
//!
//! ## Usage
//! ```bash
//! # Default platforms only
//! cargo run -p margin-db --bin seed
//!
//! # Default platforms plus 200 demo sales
//! cargo run -p margin-db --bin seed -- --sales 200
//!
//! # Specify database path
//! cargo run -p margin-db --bin seed -- --db ./data/margin.db
//! ```
//!
//! ## Generated Sales
//! Demo sales cycle through the seeded platforms, origin channels and
//! statuses. Figures are computed by the same reconciler the API uses, so the
//! stored profit and margin are always consistent.

use chrono::{Duration, Utc};
use margin_core::{NewSale, Patch, SaleChanges, SaleReconciler, SaleStatus};
use margin_db::{Database, DbConfig};
use std::env;
use uuid::Uuid;

/// Origin channels for demo sales.
const ORIGINS: &[&str] = &[
    "Instagram DM",
    "Feira de artesanato",
    "Indicação",
    "Loja Shopee",
    "Anúncio Mercado Livre",
    "WhatsApp",
];

/// Item descriptions for demo sales.
const ITEMS: &[&str] = &[
    "Dragão articulado",
    "Vaso geométrico",
    "Suporte de headset",
    "Miniatura RPG",
    "Luminária lua",
    "Chaveiro personalizado",
    "Organizador de mesa",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 0;
    let mut db_path = String::from("./margin.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Margin Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of demo sales to generate (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./margin.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Margin Ledger Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Demo sales: {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let inserted = db.platforms().seed_defaults_if_empty().await?;
    if inserted == 0 {
        println!("⚠ Platforms already present, defaults not inserted");
    } else {
        println!("✓ Inserted {} default platforms", inserted);
    }

    if sales == 0 {
        println!();
        println!("✓ Seed complete!");
        return Ok(());
    }

    let existing = db.sales().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} sales", existing);
        println!("  Skipping demo sales to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let platforms = db.platforms().list().await?;
    if platforms.is_empty() {
        println!("⚠ No platforms available, cannot generate sales");
        return Ok(());
    }

    println!();
    println!("Generating sales...");

    let platform_repo = db.platforms();
    let sale_repo = db.sales();
    let reconciler = SaleReconciler::new();
    let start = std::time::Instant::now();
    let now = Utc::now();
    let mut generated = 0;

    for seed in 0..sales {
        let platform = &platforms[seed % platforms.len()];
        let amount = 2500 + ((seed * 1733) % 30000) as i64;
        let input = NewSale {
            description: Some(ITEMS[seed % ITEMS.len()].to_string()),
            amount_received_cents: Some(amount),
            printing_cost_cents: Some(amount * (15 + (seed % 20) as i64) / 100),
            shipping_cost_cents: Some(if seed % 3 == 0 { 0 } else { 1200 + (seed % 9) as i64 * 100 }),
            platform_id: Some(platform.id.clone()),
            origin_channel: Some(ORIGINS[seed % ORIGINS.len()].to_string()),
        };

        // Spread over the last ~90 days, oldest first.
        let created_at = now - Duration::hours(((sales - seed) * 13) as i64 % (24 * 90));

        let mut sale = match reconciler
            .create(input, &platform_repo, Uuid::new_v4().to_string(), created_at)
            .await
        {
            Ok(sale) => sale,
            Err(e) => {
                eprintln!("Failed to build sale {}: {}", seed, e);
                continue;
            }
        };

        let status = SaleStatus::ALL[seed % SaleStatus::ALL.len()];
        if status != SaleStatus::InProduction {
            let changes = SaleChanges {
                status: Patch::Set(status),
                ..Default::default()
            };
            reconciler
                .reconcile(&sale, &changes, &platform_repo)
                .await?
                .apply_to(&mut sale);
        }

        if let Err(e) = sale_repo.insert(&sale).await {
            eprintln!("Failed to insert {}: {}", sale.id, e);
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} sales...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} sales in {:?}", generated, elapsed);

    let summary = sale_repo.summary(&Default::default()).await?;
    println!(
        "  Received: {}  Net profit: {}  Avg margin: {}",
        margin_core::Money::from_cents(summary.total_received_cents),
        margin_core::Money::from_cents(summary.total_net_profit_cents),
        margin_core::Percent::from_bps(summary.average_margin_bps),
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
