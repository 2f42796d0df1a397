use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    entities::{order::Entity as Order, order_photo},
    errors::ServiceError,
    services::attachments::PhotoSlots,
    ApiResponse, AppState,
};
use sea_orm::EntityTrait;

pub fn attachments_routes() -> Router<AppState> {
    Router::new().route(
        "/orders/:order_id",
        get(list_order_photos).put(associate_photos),
    )
}

/// GET /api/v1/attachments/orders/{order_id} — all stored slot/URL pairs.
async fn list_order_photos(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<order_photo::Model>>>, ServiceError> {
    let photos = state.services.attachments.list_for_order(order_id).await?;
    Ok(Json(ApiResponse::success(photos)))
}

/// PUT /api/v1/attachments/orders/{order_id} — replace the supplied slot
/// groups for an existing order. Omitted groups are left untouched.
async fn associate_photos(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(slots): Json<PhotoSlots>,
) -> Result<Json<ApiResponse<Vec<order_photo::Model>>>, ServiceError> {
    Order::find_by_id(order_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Orden {order_id} no encontrada")))?;

    state
        .services
        .attachments
        .associate_photos(&*state.db, order_id, &slots)
        .await?;

    let photos = state.services.attachments.list_for_order(order_id).await?;
    Ok(Json(ApiResponse::success(photos)))
}
