//! Shoe catalog handlers: card list with search, detail view, and the admin
//! create/edit/delete form endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trailblazer_core::{
    filter_shoes, normalize_product_data,
    resolve::{self, MetricView, SpecSummary},
    FormError, ProductData, ShoeForm, ShoePatch, ShoeRecord,
};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, parse_shoe_id, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct ShoeCard {
    id: Uuid,
    name: String,
    brand: String,
    model_name: String,
    nickname: Option<String>,
    summary: Option<String>,
    image: String,
    specs: SpecSummary,
    release_date: String,
    created_at: DateTime<Utc>,
}

impl ShoeCard {
    fn from_record(shoe: &ShoeRecord) -> Self {
        let data = ProductData::from_raw(shoe.product_data.as_ref());
        Self {
            id: shoe.id,
            name: shoe.name.clone(),
            brand: resolve::resolve_brand(shoe, &data)
                .unwrap_or(resolve::MISSING)
                .to_string(),
            model_name: resolve::resolve_model_name(shoe, &data)
                .unwrap_or(resolve::MISSING)
                .to_string(),
            nickname: resolve::nickname(&data).map(ToString::to_string),
            summary: resolve::resolve_summary(shoe, &data).map(ToString::to_string),
            image: resolve::resolve_image_or_placeholder(shoe, &data).to_string(),
            specs: resolve::resolve_specs(shoe, &data),
            release_date: resolve::resolve_release_date(&data),
            created_at: shoe.created_at,
        }
    }
}

/// Display values already resolved across the row, the document, and the
/// placeholders.
#[derive(Debug, Serialize)]
pub(super) struct ResolvedFields {
    brand: Option<String>,
    model_name: Option<String>,
    nickname: Option<String>,
    slogan: Option<String>,
    summary: Option<String>,
    introduction: Option<String>,
    image: String,
    video: Option<String>,
    specs: SpecSummary,
    release_date: String,
    performance: Vec<MetricView>,
}

#[derive(Debug, Serialize)]
pub(super) struct ShoeDetail {
    shoe: ShoeRecord,
    product_data: Map<String, Value>,
    sections: ProductData,
    resolved: ResolvedFields,
    structured_data: Value,
}

impl ShoeDetail {
    fn from_record(shoe: ShoeRecord) -> Self {
        let product_data = normalize_product_data(shoe.product_data.as_ref());
        let sections = ProductData::from_map(&product_data);
        let owned = |s: Option<&str>| s.map(ToString::to_string);

        let resolved = ResolvedFields {
            brand: owned(resolve::resolve_brand(&shoe, &sections)),
            model_name: owned(resolve::resolve_model_name(&shoe, &sections)),
            nickname: owned(resolve::nickname(&sections)),
            slogan: owned(resolve::slogan(&sections)),
            summary: owned(resolve::resolve_summary(&shoe, &sections)),
            introduction: owned(resolve::resolve_introduction(&shoe, &sections)),
            image: resolve::resolve_image_or_placeholder(&shoe, &sections).to_string(),
            video: owned(resolve::resolve_video(&shoe, &sections)),
            specs: resolve::resolve_specs(&shoe, &sections),
            release_date: resolve::resolve_release_date(&sections),
            performance: resolve::performance_metrics(&sections),
        };
        let structured_data = resolve::structured_data(&shoe, &sections);

        Self {
            shoe,
            product_data,
            sections,
            resolved,
            structured_data,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedShoe {
    id: Uuid,
    deleted: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct ShoeQuery {
    pub q: Option<String>,
}

fn form_error(request_id: String, error: &FormError) -> ApiError {
    tracing::debug!(field = error.field(), error = %error, "rejected admin form");
    ApiError::invalid_field(request_id, error.field(), error.to_string())
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/shoes?q=: shoe cards, newest first, filtered by `q`.
pub(super) async fn list_shoes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ShoeQuery>,
) -> Json<ApiResponse<Vec<ShoeCard>>> {
    let shoes = state.catalog.list_shoes().await;
    let data = filter_shoes(query.q.as_deref().unwrap_or_default(), &shoes)
        .into_iter()
        .map(ShoeCard::from_record)
        .collect();

    Json(ApiResponse::new(data, req_id.0))
}

/// GET /api/v1/shoes/{id}
pub(super) async fn get_shoe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ShoeDetail>>, ApiError> {
    let id = parse_shoe_id(&req_id.0, &id)?;
    let shoe = state
        .catalog
        .get_shoe(id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(ShoeDetail::from_record(shoe), req_id.0)))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/shoes/{id}/form: the edit form pre-filled from the record.
pub(super) async fn get_shoe_form(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ShoeForm>>, ApiError> {
    let id = parse_shoe_id(&req_id.0, &id)?;
    let shoe = state
        .catalog
        .get_shoe(id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(ShoeForm::from_record(&shoe), req_id.0)))
}

/// POST /api/v1/shoes: create a shoe from the admin form.
pub(super) async fn create_shoe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(form): Json<ShoeForm>,
) -> Result<(StatusCode, Json<ApiResponse<ShoeRecord>>), ApiError> {
    let rid = req_id.0;
    let shoe = form.into_submission().map_err(|e| form_error(rid.clone(), &e))?;

    let created = state
        .catalog
        .create_shoe(shoe)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(created, rid))))
}

/// PUT /api/v1/shoes/{id}: update from a partial admin form. Keys missing
/// from the body keep their stored values.
pub(super) async fn update_shoe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<ApiResponse<ShoeRecord>>, ApiError> {
    let rid = req_id.0;
    let id = parse_shoe_id(&rid, &id)?;
    let current = state
        .catalog
        .get_shoe(id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let form = overlay_form(&current, fields).map_err(|e| {
        ApiError::new(rid.clone(), "validation_error", format!("invalid form: {e}"))
    })?;
    let patch = ShoePatch::from(
        form.into_submission()
            .map_err(|e| form_error(rid.clone(), &e))?,
    );

    let updated = state
        .catalog
        .update_shoe(id, patch)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(updated, rid)))
}

/// The stored record's edit form with the supplied keys laid over it.
fn overlay_form(
    current: &ShoeRecord,
    fields: Map<String, Value>,
) -> serde_json::Result<ShoeForm> {
    let mut form = serde_json::to_value(ShoeForm::from_record(current))?;
    if let Value::Object(base) = &mut form {
        base.extend(fields);
    }
    serde_json::from_value(form)
}

/// DELETE /api/v1/shoes/{id}
pub(super) async fn delete_shoe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedShoe>>, ApiError> {
    let rid = req_id.0;
    let id = parse_shoe_id(&rid, &id)?;

    state
        .catalog
        .delete_shoe(id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(DeletedShoe { id, deleted: true }, rid)))
}
