//! Product route handlers.
//!
//! Read-only catalog pages backed by the coalesced commerce cache. Prices
//! are formatted here, at the edge; everything upstream stays in cents.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use meadowlark_core::{CurrencyCode, Price, ProductId, VariantId};

use crate::commerce::{Product, ProductFilters, ProductVariant};
use crate::error::Result;
use crate::state::AppState;

/// A product as shown in listing pages.
#[derive(Debug, Serialize)]
pub struct ProductSummaryView {
    pub id: ProductId,
    pub title: String,
    pub handle: Option<String>,
    pub subtitle: Option<String>,
    pub thumbnail: Option<String>,
    /// Formatted price of the cheapest variant, e.g. `"$29.99"`.
    pub price: Option<String>,
    pub vendor_name: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: Option<i64>,
}

/// A page of product summaries.
#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub products: Vec<ProductSummaryView>,
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
}

/// A purchasable variant as shown on the detail page.
#[derive(Debug, Serialize)]
pub struct VariantView {
    pub id: VariantId,
    pub title: Option<String>,
    pub sku: Option<String>,
    pub in_stock: bool,
    pub price: Option<String>,
}

/// Full product detail.
#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub title: String,
    pub handle: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub variants: Vec<VariantView>,
    pub vendor_name: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: Option<i64>,
}

/// Format a variant's USD price for display.
fn variant_price(variant: &ProductVariant) -> Option<String> {
    variant
        .price_in("usd")
        .map(|p| Price::from_cents(p.amount, CurrencyCode::Usd).display())
}

/// The lowest USD variant price on a product, formatted.
fn from_price(product: &Product) -> Option<String> {
    product
        .variants
        .iter()
        .filter_map(|v| v.price_in("usd").map(|p| p.amount))
        .min()
        .map(|cents| Price::from_cents(cents, CurrencyCode::Usd).display())
}

impl From<&Product> for ProductSummaryView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            handle: product.handle.clone(),
            subtitle: product.subtitle.clone(),
            thumbnail: product.thumbnail.clone(),
            price: from_price(product),
            vendor_name: product.vendor_name.clone(),
            average_rating: product.average_rating,
            review_count: product.review_count,
        }
    }
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            handle: product.handle.clone(),
            subtitle: product.subtitle.clone(),
            description: product.description.clone(),
            thumbnail: product.thumbnail.clone(),
            images: product.images.iter().map(|i| i.url.clone()).collect(),
            variants: product
                .variants
                .iter()
                .map(|v| VariantView {
                    id: v.id.clone(),
                    title: v.title.clone(),
                    sku: v.sku.clone(),
                    in_stock: v.inventory_quantity.is_none_or(|q| q > 0),
                    price: variant_price(v),
                })
                .collect(),
            vendor_name: product.vendor_name.clone(),
            average_rating: product.average_rating,
            review_count: product.review_count,
        }
    }
}

/// Product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<ProductListView>> {
    let list = state.commerce().list_products(&filters).await?;

    Ok(Json(ProductListView {
        products: list.products.iter().map(ProductSummaryView::from).collect(),
        count: list.count,
        limit: list.limit,
        offset: list.offset,
    }))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<ProductDetailView>> {
    let product = state.commerce().get_product(&handle).await?;
    Ok(Json(ProductDetailView::from(&product)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_with_prices(cents: &[i64]) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": "prod_1",
            "title": "Test Probiotic A",
            "variants": cents
                .iter()
                .enumerate()
                .map(|(i, amount)| serde_json::json!({
                    "id": format!("variant_{i}"),
                    "prices": [{ "amount": amount, "currency_code": "usd" }],
                }))
                .collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[test]
    fn test_summary_formats_cheapest_price() {
        let product = product_with_prices(&[9999, 2999]);
        let view = ProductSummaryView::from(&product);
        assert_eq!(view.price.as_deref(), Some("$29.99"));
    }

    #[test]
    fn test_summary_without_prices() {
        let product = product_with_prices(&[]);
        let view = ProductSummaryView::from(&product);
        assert!(view.price.is_none());
    }

    #[test]
    fn test_detail_stock_flag() {
        let mut product = product_with_prices(&[2999]);
        product.variants[0].inventory_quantity = Some(0);
        let view = ProductDetailView::from(&product);
        assert!(!view.variants[0].in_stock);

        product.variants[0].inventory_quantity = None;
        let view = ProductDetailView::from(&product);
        // Untracked inventory counts as purchasable.
        assert!(view.variants[0].in_stock);
    }
}
