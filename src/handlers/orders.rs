use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chrono::{DateTime, Utc};

use crate::{
    errors::ServiceError,
    models::{InternalStatus, OrderStatus, OrderType},
    queries::{order_queries, PageRequest},
    services::exports::SpreadsheetPayload,
    services::orders::{
        OrderResponse, SubmitKind, SubmitOrderOutcome, SubmitOrderRequest,
        UpdateInternalStatusRequest,
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Full order submission body: the lifecycle payload plus the caller
/// identity resolved by the out-of-scope auth layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitOrderBody {
    #[serde(flatten)]
    pub request: SubmitOrderRequest,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: OrderStatus,
    pub observation: Option<String>,
}

// Query structs mirror the filter fields instead of flattening them;
// serde_urlencoded cannot drive flattened non-string primitives.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub order_number: Option<i64>,
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub internal_status: Option<InternalStatus>,
    pub vin: Option<String>,
    pub customer_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub draft: Option<bool>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl OrderListQuery {
    fn filter(&self) -> order_queries::OrderFilter {
        order_queries::OrderFilter {
            order_number: self.order_number,
            order_type: self.order_type,
            status: self.status,
            internal_status: self.internal_status,
            vin: self.vin.clone(),
            customer_id: self.customer_id,
            company_id: self.company_id,
            draft: self.draft,
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

pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_order).get(list_orders))
        .route("/export", get(export_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_order_status))
        .route("/:id/internal-status", put(update_internal_status))
}

/// POST /api/v1/orders — create, draft-save, or resubmit an order.
async fn submit_order(
    State(state): State<AppState>,
    Json(body): Json<SubmitOrderBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome: SubmitOrderOutcome = state
        .services
        .orders
        .submit_order(body.request, body.company_id, body.user_id)
        .await?;

    let status = if outcome.kind == SubmitKind::Created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let message = outcome.message.clone();
    let mut response = ApiResponse::success(outcome);
    response.message = Some(message);
    Ok((status, Json(response)))
}

/// GET /api/v1/orders — filtered, paginated listing.
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<crate::entities::order::Model>>>, ServiceError> {
    let page =
        order_queries::list_orders(&state.db, &query.filter(), query.page_request()).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_page(
        page,
    ))))
}

/// GET /api/v1/orders/export — spreadsheet of the full filtered set.
async fn export_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<SpreadsheetPayload>>, ServiceError> {
    let payload = state.services.exports.export_orders(&query.filter()).await?;
    Ok(Json(ApiResponse::success(payload)))
}

/// GET /api/v1/orders/{id} — fully hydrated order.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// PUT /api/v1/orders/{id}/status — reviewer decision on a pending order.
async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state
        .services
        .orders
        .update_order_status(id, body.status, body.observation)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// PUT /api/v1/orders/{id}/internal-status — back-office recovery axis.
async fn update_internal_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInternalStatusRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state
        .services
        .orders
        .update_internal_status(id, body)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
