use crate::{
    db::DbPool,
    entities::vehicle::{self, Entity as Vehicle},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterVehicleRequest {
    #[validate(length(equal = 17, message = "El VIN debe tener 17 caracteres"))]
    pub vin: String,
    pub model: Option<String>,
    pub certificate_number: Option<String>,
    pub import_date: Option<DateTime<Utc>>,
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub blocked: bool,
    pub company_id: Uuid,
}

/// VIN-keyed vehicle registration and lookup.
#[derive(Clone)]
pub struct VehicleService {
    db_pool: Arc<DbPool>,
}

impl VehicleService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(vin = %request.vin))]
    pub async fn register(
        &self,
        request: RegisterVehicleRequest,
    ) -> Result<vehicle::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        if Vehicle::find_by_id(request.vin.clone())
            .one(db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "El vehículo {} ya está registrado",
                request.vin
            )));
        }

        let model = vehicle::ActiveModel {
            vin: Set(request.vin.clone()),
            model: Set(request.model),
            certificate_number: Set(request.certificate_number),
            import_date: Set(request.import_date),
            sale_date: Set(request.sale_date),
            blocked: Set(request.blocked),
            company_id: Set(request.company_id),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(vin = %model.vin, "vehicle registered");
        Ok(model)
    }

    pub async fn get(&self, vin: &str) -> Result<Option<vehicle::Model>, ServiceError> {
        Ok(Vehicle::find_by_id(vin.to_string()).one(&*self.db_pool).await?)
    }

    /// Toggles the display/filter `blocked` flag.
    #[instrument(skip(self), fields(vin = %vin))]
    pub async fn set_blocked(&self, vin: &str, blocked: bool) -> Result<vehicle::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = Vehicle::find_by_id(vin.to_string())
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vehículo con VIN {vin} no encontrado"))
            })?;

        let mut active: vehicle::ActiveModel = existing.into();
        active.blocked = Set(blocked);
        Ok(active.update(db).await?)
    }
}
