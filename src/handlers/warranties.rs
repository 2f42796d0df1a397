use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    entities::warranty,
    errors::ServiceError,
    queries::{warranty_queries, PageRequest},
    services::exports::SpreadsheetPayload,
    services::warranties::ActivateWarrantyRequest,
    ApiResponse, AppState, PaginatedResponse,
};

// Explicit fields rather than a flattened filter; serde_urlencoded cannot
// drive flattened non-string primitives.
#[derive(Debug, Deserialize)]
pub struct WarrantyListQuery {
    pub vin: Option<String>,
    pub customer_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl WarrantyListQuery {
    fn filter(&self) -> warranty_queries::WarrantyFilter {
        warranty_queries::WarrantyFilter {
            vin: self.vin.clone(),
            customer_id: self.customer_id,
            company_id: self.company_id,
            from_date: self.from_date,
            to_date: self.to_date,
        }
    }

    fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(crate::queries::DEFAULT_PAGE_SIZE),
        }
    }
}

pub fn warranties_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(activate_warranty).get(list_warranties))
        .route("/export", get(export_warranties))
        .route("/:id", get(get_warranty).delete(annul_warranty))
        .route("/vin/:vin", get(get_warranty_by_vin))
}

/// POST /api/v1/warranties — activate the warranty for a vehicle.
async fn activate_warranty(
    State(state): State<AppState>,
    Json(request): Json<ActivateWarrantyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let model = state.services.warranties.activate(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model))))
}

/// GET /api/v1/warranties — filtered, paginated listing.
async fn list_warranties(
    State(state): State<AppState>,
    Query(query): Query<WarrantyListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<warranty::Model>>>, ServiceError> {
    let page =
        warranty_queries::list_warranties(&state.db, &query.filter(), query.page_request()).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_page(
        page,
    ))))
}

/// GET /api/v1/warranties/export — spreadsheet of the full filtered set.
async fn export_warranties(
    State(state): State<AppState>,
    Query(query): Query<WarrantyListQuery>,
) -> Result<Json<ApiResponse<SpreadsheetPayload>>, ServiceError> {
    let payload = state
        .services
        .exports
        .export_warranties(&query.filter())
        .await?;
    Ok(Json(ApiResponse::success(payload)))
}

async fn get_warranty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<warranty::Model>>, ServiceError> {
    let model = state
        .services
        .warranties
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Garantía {id} no encontrada")))?;
    Ok(Json(ApiResponse::success(model)))
}

async fn get_warranty_by_vin(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<ApiResponse<warranty::Model>>, ServiceError> {
    let model = state
        .services
        .warranties
        .get_by_vin(&vin)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("El vehículo {vin} no tiene garantía activa"))
        })?;
    Ok(Json(ApiResponse::success(model)))
}

/// DELETE /api/v1/warranties/{id} — annul. The row is removed permanently.
async fn annul_warranty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.warranties.annul(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
