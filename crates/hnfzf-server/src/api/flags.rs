//! Flag and flag-type handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, validate_key, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FlagItem {
    pub id: i64,
    pub sku: String,
    pub flag_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<hnfzf_db::FlagRow> for FlagItem {
    fn from(row: hnfzf_db::FlagRow) -> Self {
        Self {
            id: row.id,
            sku: row.sku,
            flag_type: row.flag_type,
            flag_value: row.flag_value,
            additional_data: row.additional_data,
            expiry_date: row.expiry_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FlagTypeItem {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpsertFlagRequest {
    pub flag_value: Option<String>,
    pub additional_data: Option<Value>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateFlagTypeRequest {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/flags/{sku}: every flag on a SKU, expired ones included.
pub(super) async fn list_flags(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(sku): Path<String>,
) -> Result<Json<ApiResponse<Vec<FlagItem>>>, ApiError> {
    let rid = &req_id.0;
    let sku = validate_key(rid, "sku", &sku)?;

    let rows = hnfzf_db::list_flags_for_sku(&state.pool, sku)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(FlagItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/flags/{sku}/{flag_type}: create or replace one flag.
pub(super) async fn upsert_flag(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((sku, flag_type)): Path<(String, String)>,
    Json(body): Json<UpsertFlagRequest>,
) -> Result<Json<ApiResponse<FlagItem>>, ApiError> {
    let rid = &req_id.0;
    let sku = validate_key(rid, "sku", &sku)?;
    let flag_type = validate_key(rid, "flag type", &flag_type)?;
    if body
        .additional_data
        .as_ref()
        .is_some_and(|data| !data.is_object())
    {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "additionalData must be a JSON object",
        ));
    }

    let row = hnfzf_db::upsert_flag(
        &state.pool,
        &hnfzf_db::NewFlag {
            sku,
            flag_type,
            flag_value: body.flag_value.as_deref(),
            additional_data: body.additional_data.as_ref(),
            expiry_date: body.expiry_date,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(sku, flag_type, "flag upserted");
    Ok(Json(ApiResponse {
        data: FlagItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/flags/{sku}/{flag_type}
pub(super) async fn delete_flag(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((sku, flag_type)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let rid = &req_id.0;
    let sku = validate_key(rid, "sku", &sku)?;
    let flag_type = validate_key(rid, "flag type", &flag_type)?;

    let removed = hnfzf_db::delete_flag(&state.pool, sku, flag_type)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    if removed {
        tracing::info!(sku, flag_type, "flag deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new(
            rid,
            "not_found",
            format!("flag '{flag_type}' not set on '{sku}'"),
        ))
    }
}

/// GET /api/flag-types
pub(super) async fn list_flag_types(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<FlagTypeItem>>>, ApiError> {
    let rows = hnfzf_db::list_flag_types(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| FlagTypeItem {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/flag-types: register a flag type name.
pub(super) async fn create_flag_type(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateFlagTypeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FlagTypeItem>>), ApiError> {
    let rid = &req_id.0;
    let name = validate_key(rid, "flag type", &body.name)?;

    let row = hnfzf_db::create_flag_type(&state.pool, name)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: FlagTypeItem {
                id: row.id,
                name: row.name,
                created_at: row.created_at,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
