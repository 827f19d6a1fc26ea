use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use hnfzf_core::EnrichedProduct;
use serde::Serialize;
use sqlx::PgPool;

use crate::middleware::RequestId;

use super::flags::FlagItem;
use super::{map_scraper_error, validate_key, ApiError, AppState};

/// One search result as the frontend consumes it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductItem {
    #[serde(flatten)]
    product: EnrichedProduct,
    has_flags: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    flags: Vec<FlagItem>,
}

/// GET /api/product/{code}: live search plus flag join.
///
/// Responds with a bare JSON array in listing order rather than the usual
/// envelope; the search UI reads the list directly.
pub(super) async fn get_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<Vec<ProductItem>>, ApiError> {
    let code = validate_key(&req_id.0, "product code", &code)?;

    let products = state
        .ingestor
        .ingest(code)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;

    let flags = load_active_flags(&state.pool, &products).await;
    Ok(Json(attach_flags(products, &flags)))
}

/// Active flags for every non-empty SKU in `products`, grouped by SKU.
///
/// A failed lookup is logged and treated as "no flags"; search results are
/// still served.
async fn load_active_flags(
    pool: &PgPool,
    products: &[EnrichedProduct],
) -> HashMap<String, Vec<FlagItem>> {
    let skus: Vec<String> = products
        .iter()
        .map(EnrichedProduct::sku)
        .filter(|sku| !sku.is_empty())
        .map(ToOwned::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = match hnfzf_db::list_active_flags_for_skus(pool, &skus).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(
                error = %e,
                skus = skus.len(),
                "flag lookup failed, serving products without flags"
            );
            return HashMap::new();
        }
    };

    let mut by_sku: HashMap<String, Vec<FlagItem>> = HashMap::new();
    for row in rows {
        by_sku
            .entry(row.sku.clone())
            .or_default()
            .push(FlagItem::from(row));
    }
    by_sku
}

fn attach_flags(
    products: Vec<EnrichedProduct>,
    flags: &HashMap<String, Vec<FlagItem>>,
) -> Vec<ProductItem> {
    products
        .into_iter()
        .map(|product| {
            // Duplicate SKUs on one page each carry the same flags.
            let flags = flags.get(product.sku()).cloned().unwrap_or_default();
            ProductItem {
                has_flags: !flags.is_empty(),
                flags,
                product,
            }
        })
        .collect()
}
