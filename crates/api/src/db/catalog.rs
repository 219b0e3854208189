//! Catalog repository: categories and products.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;

use routeclouds_core::{CategoryId, Money, ProductId};

use super::RepositoryError;
use crate::models::catalog::{Category, NewCategory, NewProduct, Product, ProductUpdate};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
    parent_id: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            parent_id: row.parent_id.map(CategoryId::new),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    brand: Option<String>,
    category_id: Option<i32>,
    category_name: Option<String>,
    price: Money,
    description: Option<String>,
    specifications: Json<serde_json::Value>,
    images: Vec<String>,
    stock: i32,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            brand: row.brand,
            category_id: row.category_id.map(CategoryId::new),
            category_name: row.category_name,
            price: row.price,
            description: row.description,
            specifications: row.specifications.0,
            images: row.images,
            stock: row.stock,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Price, stock and name of one product, for cart checks.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductStock {
    pub name: String,
    pub price: Money,
    pub stock: i32,
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken and
    /// `RepositoryError::NotFound` if `parent_id` does not exist.
    pub async fn create_category(
        &self,
        new: &NewCategory<'_>,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO shop.categories (name, slug, parent_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, parent_id, created_at
            ",
        )
        .bind(new.name)
        .bind(new.slug)
        .bind(new.parent_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category slug already exists"))?;

        Ok(row.into())
    }

    /// Number of categories and products, used by seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<(i64, i64), RepositoryError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r"
            SELECT (SELECT COUNT(*) FROM shop.categories),
                   (SELECT COUNT(*) FROM shop.products)
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `category_id` does not exist.
    pub async fn create_product(&self, new: &NewProduct<'_>) -> Result<Product, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO shop.products
                (name, brand, category_id, price, description, specifications, images, stock, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(new.name)
        .bind(new.brand)
        .bind(new.category_id)
        .bind(new.price)
        .bind(new.description)
        .bind(Json(new.specifications))
        .bind(new.images)
        .bind(new.stock)
        .bind(new.featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "product already exists"))?;

        self.get_product(ProductId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a product with its category name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.brand, p.category_id, c.name AS category_name,
                   p.price, p.description, p.specifications, p.images, p.stock,
                   p.featured, p.created_at, p.updated_at
            FROM shop.products p
            LEFT JOIN shop.categories c ON c.id = p.category_id
            WHERE p.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Reprice and/or restock a product.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE shop.products
            SET price = COALESCE($2, price),
                stock = COALESCE($3, stock),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(update.price)
        .bind(update.stock)
        .execute(self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_product(id).await
    }
}

/// Current name, price and stock of a product, with the product row locked
/// until the transaction ends.
///
/// Cart writes take this lock so concurrent adds for the same product see
/// each other's quantities.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_stock(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<ProductStock>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductStock>(
        "SELECT name, price, stock FROM shop.products WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}
