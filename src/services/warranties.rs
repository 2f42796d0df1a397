use crate::{
    db::DbPool,
    entities::{
        vehicle::Entity as Vehicle,
        warranty::{self, Entity as Warranty},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ActivateWarrantyRequest {
    #[validate(length(equal = 17, message = "El VIN debe tener 17 caracteres"))]
    pub vin: String,
    pub customer_id: Uuid,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    /// Defaults to the server clock when omitted.
    pub activation_date: Option<DateTime<Utc>>,
}

/// Warranty activation and annulment. One warranty per vehicle; annulment
/// deletes the row permanently.
#[derive(Clone)]
pub struct WarrantyService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl WarrantyService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Activates the warranty for a vehicle.
    #[instrument(skip(self, request), fields(vin = %request.vin))]
    pub async fn activate(
        &self,
        request: ActivateWarrantyRequest,
    ) -> Result<warranty::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        Vehicle::find_by_id(request.vin.clone())
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vehículo con VIN {} no encontrado", request.vin))
            })?;

        let existing = Warranty::find()
            .filter(warranty::Column::VehicleVin.eq(request.vin.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "El vehículo {} ya tiene una garantía activa",
                request.vin
            )));
        }

        let id = Uuid::new_v4();
        let model = warranty::ActiveModel {
            id: Set(id),
            vehicle_vin: Set(request.vin.clone()),
            activation_date: Set(request.activation_date.unwrap_or_else(Utc::now)),
            customer_id: Set(request.customer_id),
            company_id: Set(request.company_id),
            user_id: Set(request.user_id),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(warranty_id = %id, vin = %request.vin, "warranty activated");
        self.emit(Event::WarrantyActivated {
            warranty_id: id,
            vin: request.vin,
        })
        .await;

        Ok(model)
    }

    /// Annuls a warranty. The deletion is permanent; there is no
    /// soft-delete or recovery path.
    #[instrument(skip(self), fields(warranty_id = %warranty_id))]
    pub async fn annul(&self, warranty_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = Warranty::find_by_id(warranty_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Garantía {warranty_id} no encontrada"))
            })?;

        let vin = existing.vehicle_vin.clone();
        existing.delete(db).await?;

        info!(%warranty_id, %vin, "warranty annulled");
        self.emit(Event::WarrantyAnnulled { warranty_id, vin }).await;
        Ok(())
    }

    pub async fn get(&self, warranty_id: Uuid) -> Result<Option<warranty::Model>, ServiceError> {
        Ok(Warranty::find_by_id(warranty_id).one(&*self.db_pool).await?)
    }

    pub async fn get_by_vin(&self, vin: &str) -> Result<Option<warranty::Model>, ServiceError> {
        Ok(Warranty::find()
            .filter(warranty::Column::VehicleVin.eq(vin))
            .one(&*self.db_pool)
            .await?)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send warranty event");
            }
        }
    }
}
