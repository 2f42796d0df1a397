use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    entities::vehicle,
    errors::ServiceError,
    services::vehicles::RegisterVehicleRequest,
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub struct SetBlockedBody {
    pub blocked: bool,
}

pub fn vehicles_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_vehicle))
        .route("/:vin", get(get_vehicle))
        .route("/:vin/blocked", put(set_blocked))
}

/// POST /api/v1/vehicles — register a vehicle by VIN.
async fn register_vehicle(
    State(state): State<AppState>,
    Json(request): Json<RegisterVehicleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let model = state.services.vehicles.register(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model))))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<ApiResponse<vehicle::Model>>, ServiceError> {
    let model = state
        .services
        .vehicles
        .get(&vin)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Vehículo con VIN {vin} no encontrado")))?;
    Ok(Json(ApiResponse::success(model)))
}

/// PUT /api/v1/vehicles/{vin}/blocked — toggle the display/filter flag.
async fn set_blocked(
    State(state): State<AppState>,
    Path(vin): Path<String>,
    Json(body): Json<SetBlockedBody>,
) -> Result<Json<ApiResponse<vehicle::Model>>, ServiceError> {
    let model = state
        .services
        .vehicles
        .set_blocked(&vin, body.blocked)
        .await?;
    Ok(Json(ApiResponse::success(model)))
}
