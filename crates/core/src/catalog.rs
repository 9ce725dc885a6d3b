//! Catalog records shared by the storefront and the back office.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CategoryId, OrderItem, Price, ProductId, SizeType};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    /// Sizes this product is sold in, in display order.
    pub sizes: Vec<String>,
    pub size_type: SizeType,
    pub image_url: Option<String>,
    /// Informational only; checkout does not reserve stock.
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is sold in `size`.
    ///
    /// A product without a size list accepts any size.
    #[must_use]
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.is_empty() || self.sizes.iter().any(|s| s == size)
    }

    /// Freeze this product's current name, price and image into an order item.
    #[must_use]
    pub fn snapshot(&self, size: &str, size_type: SizeType, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            size: size.to_owned(),
            size_type,
            quantity,
        }
    }
}

/// A product category such as "Shirts" or "Trousers".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    /// Default size type for new products in this category.
    pub size_type: SizeType,
    pub created_at: DateTime<Utc>,
}

/// Errors raised while validating catalog edits.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A required field was blank.
    #[error("{0} is required")]
    Missing(&'static str),

    /// Stock cannot go below zero.
    #[error("stock quantity cannot be negative")]
    NegativeStock,

    /// The name or slug had nothing usable in a URL.
    #[error("slug must contain at least one letter or digit")]
    EmptySlug,
}

/// Product fields supplied by the back office or a seed file.
///
/// `size_type` may be left out, in which case the category's size type is
/// used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub size_type: Option<SizeType>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
}

impl ProductDraft {
    /// Trim text fields, drop blank and repeated sizes and check the rest.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Missing` for a blank name and
    /// `CatalogError::NegativeStock` for negative stock.
    pub fn normalized(self) -> Result<Self, CatalogError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(CatalogError::Missing("name"));
        }
        if self.stock_quantity < 0 {
            return Err(CatalogError::NegativeStock);
        }

        let mut sizes: Vec<String> = Vec::with_capacity(self.sizes.len());
        for size in self.sizes {
            let size = size.trim();
            if !size.is_empty() && !sizes.iter().any(|s| s == size) {
                sizes.push(size.to_owned());
            }
        }

        Ok(Self {
            name,
            description: self.description.trim().to_owned(),
            sizes,
            image_url: self
                .image_url
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty()),
            ..self
        })
    }
}

/// Category fields supplied by the back office or a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    /// Derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub size_type: SizeType,
}

impl CategoryDraft {
    /// Trim the name and settle the slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Missing` for a blank name and
    /// `CatalogError::EmptySlug` if no slug can be derived.
    pub fn normalized(self) -> Result<Self, CatalogError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(CatalogError::Missing("name"));
        }
        let slug = slugify(self.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(CatalogError::EmptySlug);
        }
        Ok(Self {
            name,
            slug: Some(slug),
            size_type: self.size_type,
        })
    }

    /// The slug after [`Self::normalized`].
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }
}

/// Turn a category name into a URL slug.
///
/// Lowercases ASCII letters and digits and collapses everything else into
/// single hyphens.
///
/// ```
/// use clothesline_core::catalog::slugify;
///
/// assert_eq!(slugify("  Formal Shirts & Ties "), "formal-shirts-ties");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(sizes: &[&str]) -> Product {
        Product {
            id: ProductId::from_sequence(7).unwrap(),
            name: "Linen Shirt".to_owned(),
            description: String::new(),
            price: Price::from_cents(3499),
            category_id: None,
            sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
            size_type: SizeType::Standard,
            image_url: Some("/uploads/linen.jpg".to_owned()),
            stock_quantity: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_offers_size() {
        let p = product(&["S", "M"]);
        assert!(p.offers_size("M"));
        assert!(!p.offers_size("XL"));
        assert!(product(&[]).offers_size("anything"));
    }

    #[test]
    fn test_snapshot_copies_current_fields() {
        let mut p = product(&["M"]);
        let item = p.snapshot("M", SizeType::Standard, 2);
        p.price = Price::from_cents(9999);
        p.name = "Renamed".to_owned();

        assert_eq!(item.name, "Linen Shirt");
        assert_eq!(item.price, Price::from_cents(3499));
        assert_eq!(item.image_url.as_deref(), Some("/uploads/linen.jpg"));
        assert_eq!(item.line_total(), Price::from_cents(6998));
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "  Oxford Shirt ".to_owned(),
            description: String::new(),
            price: Price::from_cents(4500),
            category_id: None,
            sizes: vec![" S".to_owned(), "M".to_owned(), String::new(), "S".to_owned()],
            size_type: None,
            image_url: Some("   ".to_owned()),
            stock_quantity: 10,
        }
    }

    #[test]
    fn test_product_draft_normalized() {
        let d = draft().normalized().unwrap();
        assert_eq!(d.name, "Oxford Shirt");
        assert_eq!(d.sizes, vec!["S", "M"]);
        assert!(d.image_url.is_none());
    }

    #[test]
    fn test_product_draft_rejects_blank_name_and_negative_stock() {
        let mut d = draft();
        d.name = " ".to_owned();
        assert_eq!(d.normalized(), Err(CatalogError::Missing("name")));

        let mut d = draft();
        d.stock_quantity = -1;
        assert_eq!(d.normalized(), Err(CatalogError::NegativeStock));
    }

    #[test]
    fn test_product_draft_json_defaults() {
        let d: ProductDraft =
            serde_json::from_str(r#"{"name":"Chinos","price":"39.90","sizeType":"waist"}"#).unwrap();
        assert_eq!(d.size_type, Some(SizeType::Waist));
        assert!(d.sizes.is_empty());
        assert_eq!(d.stock_quantity, 0);
    }

    #[test]
    fn test_category_draft_slug() {
        let c = CategoryDraft {
            name: " Formal Trousers ".to_owned(),
            slug: None,
            size_type: SizeType::Waist,
        }
        .normalized()
        .unwrap();
        assert_eq!(c.slug(), "formal-trousers");

        let bad = CategoryDraft {
            name: "???".to_owned(),
            slug: None,
            size_type: SizeType::Standard,
        };
        assert_eq!(bad.normalized(), Err(CatalogError::EmptySlug));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("T-Shirts"), "t-shirts");
        assert_eq!(slugify("Jeans (Slim)"), "jeans-slim");
        assert_eq!(slugify("!!!"), "");
    }
}
