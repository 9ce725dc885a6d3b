//! Product catalog routes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use clothesline_core::{Product, ProductId};

use crate::db::ProductRepository;
use crate::db::products::ProductFilter;
use crate::error::{AppError, Result};
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

/// Query string for the product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    /// Category slug.
    pub category: Option<String>,
    /// Case-insensitive name search.
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ProductListQuery {
    /// Clamp paging and drop blank filters.
    fn into_filter(self) -> (ProductFilter, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let non_blank = |s: Option<String>| {
            s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
        };

        let filter = ProductFilter {
            category: non_blank(self.category),
            search: non_blank(self.q),
            limit: per_page,
            offset: (page - 1).saturating_mul(per_page),
        };
        (filter, page, per_page)
    }
}

/// One page of products.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// GET /api/products
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Json<ProductListResponse>> {
    let (filter, page, per_page) = query.into_filter();
    let (products, total) = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(ProductListResponse {
        products,
        page,
        per_page,
        total,
    }))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Product>> {
    let not_found = || AppError::NotFound(format!("Product {id} not found"));
    let id = ProductId::parse(&id).map_err(|_| not_found())?;

    ProductRepository::new(state.pool())
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults() {
        let (filter, page, per_page) = ProductListQuery::default().into_filter();
        assert_eq!((page, per_page), (1, DEFAULT_PER_PAGE));
        assert_eq!(filter.offset, 0);
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_paging_clamped() {
        let query = ProductListQuery {
            page: Some(3),
            per_page: Some(1000),
            q: Some("  ".to_string()),
            ..Default::default()
        };
        let (filter, page, per_page) = query.into_filter();
        assert_eq!((page, per_page), (3, MAX_PER_PAGE));
        assert_eq!(filter.offset, 200);
        assert!(filter.search.is_none());
    }
}
