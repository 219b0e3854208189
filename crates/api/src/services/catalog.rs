//! Catalog administration and product lookup.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use routeclouds_core::{CategoryId, Money, MoneyError, ProductId};

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::catalog::{Category, NewCategory, NewProduct, Product, ProductUpdate};

/// Column width of `categories.slug`.
const MAX_SLUG_LENGTH: usize = 100;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Missing or invalid input.
    #[error("{0}")]
    Validation(String),

    /// Invalid price.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] MoneyError),

    /// Category slug already in use.
    #[error("category slug already exists")]
    DuplicateSlug,

    /// Referenced category does not exist.
    #[error("category not found")]
    CategoryNotFound,

    /// Product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A category to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub parent_id: Option<CategoryId>,
}

/// A product to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
}

/// A price and/or stock change.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

/// Catalog service scoped to a connection pool.
pub struct CatalogService<'a> {
    catalog: CatalogRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            catalog: CatalogRepository::new(pool),
        }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a missing name or bad slug,
    /// `CatalogError::DuplicateSlug`, or `CatalogError::CategoryNotFound` for
    /// an unknown parent.
    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, CatalogError> {
        let name = required(draft.name.as_deref(), "name")?;
        let slug = required(draft.slug.as_deref(), "slug")?;
        validate_slug(slug)?;

        let category = self
            .catalog
            .create_category(&NewCategory {
                name,
                slug,
                parent_id: draft.parent_id,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CatalogError::DuplicateSlug,
                RepositoryError::NotFound => CatalogError::CategoryNotFound,
                other => CatalogError::Repository(other),
            })?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a missing name or price or a
    /// negative stock, `CatalogError::InvalidPrice`, or
    /// `CatalogError::CategoryNotFound` for an unknown category.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let name = required(draft.name.as_deref(), "name")?;
        let price = draft
            .price
            .ok_or_else(|| CatalogError::Validation("price is required".to_string()))?;
        let price = Money::new(price)?;
        let stock = draft.stock.unwrap_or(0);
        validate_stock(stock)?;

        let specifications = draft
            .specifications
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        if !specifications.is_object() {
            return Err(CatalogError::Validation(
                "specifications must be an object".to_string(),
            ));
        }
        let images = draft.images.unwrap_or_default();

        let product = self
            .catalog
            .create_product(&NewProduct {
                name,
                brand: draft.brand.as_deref().map(str::trim).filter(|b| !b.is_empty()),
                category_id: draft.category_id,
                price,
                description: draft.description.as_deref(),
                specifications: &specifications,
                images: &images,
                stock,
                featured: draft.featured.unwrap_or(false),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::CategoryNotFound,
                other => CatalogError::Repository(other),
            })?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if it does not exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.catalog
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    /// Reprice and/or restock a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for an empty patch or negative
    /// stock, `CatalogError::InvalidPrice`, or
    /// `CatalogError::ProductNotFound`.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        let update = ProductUpdate {
            price: patch.price.map(Money::new).transpose()?,
            stock: patch.stock,
        };
        if update.is_empty() {
            return Err(CatalogError::Validation(
                "nothing to update: provide price and/or stock".to_string(),
            ));
        }
        if let Some(stock) = update.stock {
            validate_stock(stock)?;
        }

        let product = self
            .catalog
            .update_product(id, update)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        tracing::info!(
            product_id = %product.id,
            price = %product.price,
            stock = product.stock,
            "Product updated"
        );
        Ok(product)
    }
}

fn required<'s>(value: Option<&'s str>, field: &str) -> Result<&'s str, CatalogError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CatalogError::Validation(format!("{field} is required")))
}

fn validate_stock(stock: i32) -> Result<(), CatalogError> {
    if stock < 0 {
        return Err(CatalogError::Validation(
            "stock cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Slugs are lowercase ASCII letters, digits and single inner hyphens.
fn validate_slug(slug: &str) -> Result<(), CatalogError> {
    let well_formed = slug.len() <= MAX_SLUG_LENGTH
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(CatalogError::Validation(
            "slug must be lowercase letters, digits and hyphens".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(validate_slug("cloud-infrastructure").is_ok());
        assert!(validate_slug("devops-tools-2").is_ok());
        assert!(validate_slug("Cloud").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("with space").is_err());
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required(Some("  Router "), "name").unwrap(), "Router");
        assert!(matches!(
            required(Some("  "), "name"),
            Err(CatalogError::Validation(msg)) if msg == "name is required"
        ));
        assert!(required(None, "slug").is_err());
    }

    #[test]
    fn test_negative_stock_rejected() {
        assert!(validate_stock(-1).is_err());
        assert!(validate_stock(0).is_ok());
    }

    #[test]
    fn test_draft_deserializes_camel_case() {
        let draft: ProductDraft = serde_json::from_value(serde_json::json!({
            "name": "Cisco Router",
            "categoryId": 2,
            "price": "299.99",
            "stock": 50
        }))
        .unwrap();
        assert_eq!(draft.category_id, Some(CategoryId::new(2)));
        assert_eq!(draft.price.unwrap().to_string(), "299.99");
    }
}
