//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Shirts
//!   - name: Trousers
//!     sizeType: waist
//! products:
//!   - name: Oxford Shirt
//!     category: shirts
//!     price: "39.99"
//!     sizes: [S, M, L, XL]
//!     stockQuantity: 25
//!   - name: Chinos
//!     category: trousers
//!     price: "49.00"
//!     sizes: ["30", "32", "34"]
//! ```
//!
//! Categories are matched on slug and updated in place. Products get fresh
//! `PROD-NNNN` ids; a product whose name already exists is skipped, so the
//! same file can be loaded twice. Everything runs in one transaction.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use clothesline_admin::db::{CategoryRepository, ProductRepository, RepositoryError};
use clothesline_core::catalog::slugify;
use clothesline_core::{CatalogError, CategoryDraft, CategoryId, ProductDraft};

use super::{ConnectError, connect};

/// Parsed seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategoryDraft>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A product entry, referring to its category by slug or name.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub product: ProductDraft,
}

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Cannot read {0}: {1}")]
    Read(String, std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid entry `{0}`: {1}")]
    Invalid(String, CatalogError),

    #[error("Product `{0}` refers to unknown category `{1}`")]
    UnknownCategory(String, String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogSeed {
    /// Parse and normalize a seed document.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` for malformed YAML and `SeedError::Invalid`
    /// for entries that fail catalog validation.
    pub fn parse(yaml: &str) -> Result<Self, SeedError> {
        let raw: Self = serde_yaml::from_str(yaml)?;

        let categories = raw
            .categories
            .into_iter()
            .map(|c| {
                let label = c.name.clone();
                c.normalized().map_err(|e| SeedError::Invalid(label, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let products = raw
            .products
            .into_iter()
            .map(|p| {
                let label = p.product.name.clone();
                let product = p
                    .product
                    .normalized()
                    .map_err(|e| SeedError::Invalid(label, e))?;
                Ok(SeedProduct {
                    category: p.category.map(|c| slugify(&c)).filter(|c| !c.is_empty()),
                    product,
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        Ok(Self {
            categories,
            products,
        })
    }
}

/// Load a seed file into the database.
///
/// # Errors
///
/// Returns `SeedError` if the file cannot be read or parsed, a product names
/// an unknown category, or a database operation fails. Nothing is written
/// on error.
pub async fn catalog(path: &Path) -> Result<(), SeedError> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeedError::Read(path.display().to_string(), e))?;
    let seed = CatalogSeed::parse(&yaml)?;
    tracing::info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let pool = connect("ADMIN_DATABASE_URL").await?;
    let mut tx = pool.begin().await?;

    let mut category_ids: HashMap<String, CategoryId> = HashMap::new();
    for draft in &seed.categories {
        let category = CategoryRepository::upsert_with(&mut tx, draft).await?;
        tracing::info!(slug = %category.slug, id = %category.id, "Category upserted");
        category_ids.insert(category.slug, category.id);
    }

    let (mut created, mut skipped) = (0_usize, 0_usize);
    for entry in seed.products {
        let mut draft = entry.product;

        if let Some(slug) = entry.category {
            let id = match category_ids.get(&slug) {
                Some(id) => *id,
                None => {
                    let category = CategoryRepository::get_by_slug_with(&mut tx, &slug)
                        .await?
                        .ok_or_else(|| SeedError::UnknownCategory(draft.name.clone(), slug.clone()))?;
                    category_ids.insert(slug, category.id);
                    category.id
                }
            };
            draft.category_id = Some(id);
        }

        if ProductRepository::find_by_name_with(&mut tx, &draft.name)
            .await?
            .is_some()
        {
            tracing::info!(name = %draft.name, "Product exists, skipping");
            skipped += 1;
            continue;
        }

        let product = ProductRepository::create_with(&mut tx, &draft).await?;
        tracing::info!(id = %product.id, name = %product.name, "Product created");
        created += 1;
    }

    tx.commit().await?;
    tracing::info!(created, skipped, "Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clothesline_core::{Price, SizeType};

    use super::*;

    const SAMPLE: &str = r#"
categories:
  - name: Formal Shirts
  - name: Trousers
    sizeType: waist
products:
  - name: " Oxford Shirt "
    category: Formal Shirts
    price: "39.99"
    sizes: [S, M, M, ""]
    stockQuantity: 25
  - name: Chinos
    category: trousers
    price: "49.00"
    sizes: ["30", "32"]
"#;

    #[test]
    fn test_parse_normalizes_entries() {
        let seed = CatalogSeed::parse(SAMPLE).unwrap();

        assert_eq!(seed.categories.len(), 2);
        assert_eq!(seed.categories[0].slug(), "formal-shirts");
        assert_eq!(seed.categories[1].size_type, SizeType::Waist);

        let shirt = &seed.products[0];
        assert_eq!(shirt.category.as_deref(), Some("formal-shirts"));
        assert_eq!(shirt.product.name, "Oxford Shirt");
        assert_eq!(shirt.product.sizes, vec!["S", "M"]);
        assert_eq!(shirt.product.price, Price::from_cents(3999));
        assert_eq!(shirt.product.stock_quantity, 25);
        assert!(shirt.product.size_type.is_none());
    }

    #[test]
    fn test_parse_rejects_blank_product_name() {
        let yaml = "products:\n  - name: \"  \"\n    price: \"1.00\"\n";
        assert!(matches!(
            CatalogSeed::parse(yaml),
            Err(SeedError::Invalid(_, CatalogError::Missing("name")))
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_top_level_key() {
        assert!(matches!(
            CatalogSeed::parse("colours: []\n"),
            Err(SeedError::Yaml(_))
        ));
    }
}
