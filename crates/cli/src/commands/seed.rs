//! Seed an empty database with the starter catalog.
//!
//! Seeding is skipped when any category or product already exists, so it is
//! safe to run on every deploy.

use serde_json::json;
use tracing::info;

use routeclouds_api::db::CatalogRepository;
use routeclouds_api::models::catalog::{NewCategory, NewProduct};
use routeclouds_core::{CategoryId, Money};

use super::{CommandError, connect};

struct SeedProduct {
    name: &'static str,
    brand: &'static str,
    category: usize,
    price_cents: u32,
    description: &'static str,
    stock: i32,
    featured: bool,
}

const CATEGORIES: [(&str, &str); 4] = [
    ("Cloud Infrastructure", "cloud-infrastructure"),
    ("Networking Equipment", "networking-equipment"),
    ("Security Solutions", "security-solutions"),
    ("DevOps Tools", "devops-tools"),
];

const PRODUCTS: [SeedProduct; 4] = [
    SeedProduct {
        name: "AWS EC2 Instance",
        brand: "Amazon",
        category: 0,
        price_cents: 9_999,
        description: "Scalable cloud computing instance",
        stock: 100,
        featured: true,
    },
    SeedProduct {
        name: "Cisco Router",
        brand: "Cisco",
        category: 1,
        price_cents: 29_999,
        description: "Enterprise-grade networking router",
        stock: 50,
        featured: false,
    },
    SeedProduct {
        name: "Firewall Appliance",
        brand: "Fortinet",
        category: 2,
        price_cents: 59_999,
        description: "Next-generation firewall solution",
        stock: 25,
        featured: true,
    },
    SeedProduct {
        name: "Jenkins CI/CD Platform",
        brand: "Jenkins",
        category: 3,
        price_cents: 0,
        description: "Open-source automation server",
        stock: 999,
        featured: false,
    },
];

/// Insert the starter categories and products into an empty catalog.
///
/// # Errors
///
/// Returns an error if the database URL is missing or an insert fails.
pub async fn catalog() -> Result<(), CommandError> {
    let pool = connect().await?;
    let catalog = CatalogRepository::new(&pool);

    let (categories, products) = catalog.counts().await?;
    if categories > 0 || products > 0 {
        info!(categories, products, "Catalog already populated, skipping seed");
        return Ok(());
    }

    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(CATEGORIES.len());
    for (name, slug) in CATEGORIES {
        let category = catalog
            .create_category(&NewCategory {
                name,
                slug,
                parent_id: None,
            })
            .await?;
        info!(category_id = %category.id, slug, "Seeded category");
        category_ids.push(category.id);
    }

    let specifications = json!({});
    for seed in &PRODUCTS {
        let product = catalog
            .create_product(&NewProduct {
                name: seed.name,
                brand: Some(seed.brand),
                category_id: category_ids.get(seed.category).copied(),
                price: Money::from_cents(seed.price_cents),
                description: Some(seed.description),
                specifications: &specifications,
                images: &[],
                stock: seed.stock,
                featured: seed.featured,
            })
            .await?;
        info!(product_id = %product.id, name = seed.name, price = %product.price, "Seeded product");
    }

    info!(
        categories = CATEGORIES.len(),
        products = PRODUCTS.len(),
        "Seeding complete!"
    );
    Ok(())
}
