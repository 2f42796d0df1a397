use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business-visible number shared by all drafts. Drafts never consume a
/// slot from the order-number counter.
pub const DRAFT_ORDER_NUMBER: i64 = 0;

/// Central order entity: pre-authorizations, claims, and services.
///
/// `status` and `internal_status` carry the wire strings of
/// [`crate::models::OrderStatus`] / [`crate::models::InternalStatus`]. The
/// conditional fields (`origin_claim_number`, recovery amounts,
/// `internal_status_observation`) are only meaningful under specific
/// internal statuses; the lifecycle service nulls whichever do not belong
/// when the internal status changes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_number: i64,
    pub order_type: String,
    pub status: String,
    pub draft: bool,
    pub internal_status: Option<String>,
    pub origin_claim_number: Option<String>,
    pub labor_recovery: Option<Decimal>,
    pub parts_recovery: Option<Decimal>,
    pub internal_status_observation: Option<String>,
    pub mileage: Option<i32>,
    pub diagnosis: Option<String>,
    pub observations: Option<String>,
    pub pre_authorization_id: Option<Uuid>,
    pub vehicle_vin: String,
    pub customer_id: Uuid,
    pub company_id: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_task::Entity")]
    OrderTasks,
    #[sea_orm(has_many = "super::order_photo::Entity")]
    OrderPhotos,
    #[sea_orm(has_many = "super::order_status_history::Entity")]
    StatusHistory,
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleVin",
        to = "super::vehicle::Column::Vin"
    )]
    Vehicle,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
}

impl Related<super::order_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderTasks.def()
    }
}

impl Related<super::order_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPhotos.def()
    }
}

impl Related<super::order_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(Some(now));
        Ok(active_model)
    }
}
