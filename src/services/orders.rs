use crate::{
    db::DbPool,
    entities::{
        customer, order,
        order::{Entity as OrderEntity, DRAFT_ORDER_NUMBER},
        order_counter::{self, ORDER_NUMBER_COUNTER},
        order_photo,
        order_status_history::{self, Entity as HistoryEntity},
        order_task::{self, Entity as TaskEntity},
        order_task_part::{self, Entity as TaskPartEntity},
        part, user,
        vehicle::{self, Entity as VehicleEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{InternalStatus, OrderStatus, OrderType},
    services::{attachments::AttachmentService, customers::CustomerService, parts::PartService},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Observation recorded on the history row appended when a creator
/// resubmits an OBSERVADO order.
pub const RESUBMIT_OBSERVATION: &str = "Orden modificada y reenviada";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPartInput {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    pub description: String,
    pub hours_count: Decimal,
    #[serde(default)]
    pub parts: Vec<TaskPartInput>,
}

/// Payload for creating, draft-saving, or resubmitting an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    pub order_type: OrderType,
    pub vin: String,
    pub customer_name: String,
    pub mileage: Option<i32>,
    pub diagnosis: Option<String>,
    pub observations: Option<String>,
    /// Optional link from a claim back to its pre-authorization.
    pub pre_authorization_id: Option<Uuid>,
    #[serde(default)]
    pub tasks: Vec<TaskInput>,
    #[serde(default)]
    pub photos: crate::services::attachments::PhotoSlots,
    #[serde(default)]
    pub draft: bool,
    pub existing_order_id: Option<Uuid>,
}

/// Conditional-field bundle for the back-office internal status axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInternalStatusRequest {
    pub internal_status: InternalStatus,
    pub origin_claim_number: Option<String>,
    pub labor_recovery: Option<Decimal>,
    pub parts_recovery: Option<Decimal>,
    pub internal_status_observation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitKind {
    Created,
    DraftSaved,
    DraftUpdated,
    DraftConverted,
    Resubmitted,
}

impl SubmitKind {
    pub fn message(self) -> &'static str {
        match self {
            SubmitKind::Created => "Orden creada correctamente",
            SubmitKind::DraftSaved => "Borrador guardado",
            SubmitKind::DraftUpdated => "Borrador actualizado",
            SubmitKind::DraftConverted => "Borrador enviado correctamente",
            SubmitKind::Resubmitted => "Orden modificada y reenviada",
        }
    }

    /// Non-draft outcomes notify; draft saves never do.
    pub fn notifies(self) -> bool {
        matches!(
            self,
            SubmitKind::Created | SubmitKind::DraftConverted | SubmitKind::Resubmitted
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderTaskPartResponse {
    pub id: Uuid,
    pub part_id: Uuid,
    pub code: Option<String>,
    pub quantity: i32,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderTaskResponse {
    pub id: Uuid,
    pub description: String,
    pub hours_count: Decimal,
    pub parts: Vec<OrderTaskPartResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderHistoryResponse {
    pub status: String,
    pub observation: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// Fully hydrated order: tasks, parts, customer, and vehicle eagerly
/// loaded.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
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
    pub vehicle: vehicle::Model,
    pub customer: customer::Model,
    pub tasks: Vec<OrderTaskResponse>,
    pub photos: Vec<order_photo::Model>,
    pub history: Vec<OrderHistoryResponse>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitOrderOutcome {
    pub kind: SubmitKind,
    pub message: String,
    pub order: OrderResponse,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// The order lifecycle engine.
///
/// All mutation of the order graph happens here, inside one transaction per
/// operation: order row, wholesale task/part replacement, photo
/// association, counter increment, and the append-only history row commit
/// or roll back together.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    customers: CustomerService,
    parts: PartService,
    attachments: AttachmentService,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        customers: CustomerService,
        parts: PartService,
        attachments: AttachmentService,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            customers,
            parts,
            attachments,
            event_sender,
        }
    }

    /// Creates or updates an order from a form payload.
    ///
    /// Draft payloads only need a VIN and a customer name; final payloads
    /// are fully validated, and claims additionally require every part
    /// code to exist (all missing codes are collected before failing).
    #[instrument(skip(self, request), fields(vin = %request.vin, order_type = %request.order_type, draft = request.draft))]
    pub async fn submit_order(
        &self,
        request: SubmitOrderRequest,
        company_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<SubmitOrderOutcome, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        // Classify against the stored row first: a resubmission is a final
        // submit no matter what the payload's draft flag says, and the
        // stored order type is immutable.
        let existing = match request.existing_order_id {
            Some(id) => Some(
                OrderEntity::find_by_id(id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Orden {id} no encontrada")))?,
            ),
            None => None,
        };
        let kind = match &existing {
            Some(existing) => classify_update(existing, &request, user_id)?,
            None if request.draft => SubmitKind::DraftSaved,
            None => SubmitKind::Created,
        };
        let order_type = match &existing {
            Some(existing) if existing.order_type != request.order_type.to_string() => {
                return Err(ServiceError::ValidationError(
                    "El tipo de orden no puede modificarse".to_string(),
                ));
            }
            Some(existing) => {
                OrderType::from_str(&existing.order_type).map_err(|_| ServiceError::InternalError)?
            }
            None => request.order_type,
        };

        let errors = validate_submit(&request, !kind.notifies());
        if !errors.is_empty() {
            return Err(ServiceError::ValidationFailed(errors));
        }

        VehicleEntity::find_by_id(request.vin.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vehículo con VIN {} no encontrado", request.vin))
            })?;

        // Claims must reference only known part codes; report every missing
        // one at once.
        if order_type == OrderType::Reclamo && kind.notifies() {
            let codes: Vec<String> = request
                .tasks
                .iter()
                .flat_map(|t| t.parts.iter().map(|p| p.code.clone()))
                .collect();
            let missing = self.parts.find_missing_codes(&txn, &codes).await?;
            if !missing.is_empty() {
                return Err(ServiceError::MissingParts(missing));
            }
        }

        if let Some(pre_auth_id) = request.pre_authorization_id {
            let pre_auth = OrderEntity::find_by_id(pre_auth_id).one(&txn).await?;
            match pre_auth {
                Some(o) if o.order_type == OrderType::PreAutorizacion.to_string() => {}
                _ => {
                    return Err(ServiceError::NotFound(format!(
                        "Pre-autorización {pre_auth_id} no encontrada"
                    )))
                }
            }
        }

        let customer = self
            .customers
            .find_or_create(&txn, &request.customer_name)
            .await?;

        let order_id = match existing {
            Some(existing) => {
                self.update_existing(&txn, existing, &request, customer.id, kind)
                    .await?
            }
            None => {
                self.create_new(&txn, &request, customer.id, company_id, user_id, kind)
                    .await?
            }
        };

        self.replace_tasks(&txn, order_id, &request, company_id)
            .await?;
        self.attachments
            .associate_photos(&txn, order_id, &request.photos)
            .await?;

        txn.commit().await?;

        let order = self.hydrate_order(order_id).await?;

        if kind.notifies() {
            let creator_name = self.creator_display_name(user_id).await;
            self.emit(Event::OrderSubmitted {
                order_id,
                order_number: order.order_number,
                vin: order.vehicle.vin.clone(),
                creator_name,
                order_type: order.order_type.clone(),
            })
            .await;
        }

        info!(order_id = %order_id, outcome = ?kind, "order submitted");
        Ok(SubmitOrderOutcome {
            kind,
            message: kind.message().to_string(),
            order,
        })
    }

    /// Reviewer decision on a pending order. The only path that moves an
    /// order out of PENDIENTE; anything else is already processed.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        observation: Option<String>,
    ) -> Result<OrderResponse, ServiceError> {
        if !new_status.is_review_outcome() {
            return Err(ServiceError::InvalidStatus(format!(
                "{new_status} no es un resultado de revisión válido"
            )));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let existing = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Orden {order_id} no encontrada")))?;

        if existing.status != OrderStatus::Pendiente.to_string() {
            return Err(ServiceError::AlreadyProcessed);
        }

        let old_status = existing.status.clone();
        let mut active: order::ActiveModel = existing.into();
        active.status = Set(new_status.to_string());
        active.update(&txn).await?;

        append_history(&txn, order_id, new_status, observation).await?;

        txn.commit().await?;

        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status,
            new_status: new_status.to_string(),
        })
        .await;

        self.hydrate_order(order_id).await
    }

    /// Writes the internal status together with its conditional-field
    /// bundle. Fields not valid for the target status are nulled here
    /// regardless of what the caller sent.
    #[instrument(skip(self, request), fields(order_id = %order_id, internal_status = %request.internal_status))]
    pub async fn update_internal_status(
        &self,
        order_id: Uuid,
        request: UpdateInternalStatusRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let existing = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Orden {order_id} no encontrada")))?;

        let order_type = OrderType::from_str(&existing.order_type)
            .map_err(|_| ServiceError::InternalError)?;
        if order_type == OrderType::Servicio {
            return Err(ServiceError::ValidationError(
                "El estado interno no aplica a órdenes de servicio".to_string(),
            ));
        }

        let target = request.internal_status;
        let mut active: order::ActiveModel = existing.into();
        active.internal_status = Set(Some(target.to_string()));
        active.origin_claim_number = Set(if target.allows_origin_claim_number() {
            request.origin_claim_number
        } else {
            None
        });
        active.labor_recovery = Set(if target.allows_recovery_amounts() {
            request.labor_recovery
        } else {
            None
        });
        active.parts_recovery = Set(if target.allows_recovery_amounts() {
            request.parts_recovery
        } else {
            None
        });
        active.internal_status_observation = Set(if target.allows_observation() {
            request.internal_status_observation
        } else {
            None
        });
        active.update(db).await?;

        self.emit(Event::InternalStatusChanged {
            order_id,
            new_internal_status: target.to_string(),
        })
        .await;

        self.hydrate_order(order_id).await
    }

    /// Fetches a fully hydrated order.
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        self.hydrate_order(order_id).await
    }

    // -- internals ---------------------------------------------------------

    async fn create_new<C: ConnectionTrait>(
        &self,
        txn: &C,
        request: &SubmitOrderRequest,
        customer_id: Uuid,
        company_id: Uuid,
        user_id: Option<Uuid>,
        kind: SubmitKind,
    ) -> Result<Uuid, ServiceError> {
        let order_id = Uuid::new_v4();
        let draft = kind == SubmitKind::DraftSaved;
        let (status, number) = if draft {
            (OrderStatus::Borrador, DRAFT_ORDER_NUMBER)
        } else {
            (OrderStatus::Pendiente, next_order_number(txn).await?)
        };

        order::ActiveModel {
            id: Set(order_id),
            order_number: Set(number),
            order_type: Set(request.order_type.to_string()),
            status: Set(status.to_string()),
            draft: Set(draft),
            internal_status: Set(None),
            origin_claim_number: Set(None),
            labor_recovery: Set(None),
            parts_recovery: Set(None),
            internal_status_observation: Set(None),
            mileage: Set(request.mileage),
            diagnosis: Set(request.diagnosis.clone()),
            observations: Set(request.observations.clone()),
            pre_authorization_id: Set(request.pre_authorization_id),
            vehicle_vin: Set(request.vin.clone()),
            customer_id: Set(customer_id),
            company_id: Set(company_id),
            created_by: Set(user_id),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        if !draft {
            append_history(txn, order_id, OrderStatus::Pendiente, None).await?;
        }

        Ok(order_id)
    }

    async fn update_existing<C: ConnectionTrait>(
        &self,
        txn: &C,
        existing: order::Model,
        request: &SubmitOrderRequest,
        customer_id: Uuid,
        kind: SubmitKind,
    ) -> Result<Uuid, ServiceError> {
        let existing_id = existing.id;
        let was_draft = existing.draft;
        let mut active: order::ActiveModel = existing.into();
        active.mileage = Set(request.mileage);
        active.diagnosis = Set(request.diagnosis.clone());
        active.observations = Set(request.observations.clone());
        active.pre_authorization_id = Set(request.pre_authorization_id);
        active.vehicle_vin = Set(request.vin.clone());
        active.customer_id = Set(customer_id);

        match kind {
            SubmitKind::DraftUpdated => {}
            SubmitKind::DraftConverted => {
                active.draft = Set(false);
                active.status = Set(OrderStatus::Pendiente.to_string());
                active.order_number = Set(next_order_number(txn).await?);
            }
            SubmitKind::Resubmitted => {
                active.status = Set(OrderStatus::Pendiente.to_string());
                active.internal_status_observation = Set(None);
            }
            _ => unreachable!("create outcomes handled elsewhere"),
        }
        active.update(txn).await?;

        match kind {
            SubmitKind::DraftConverted => {
                append_history(txn, existing_id, OrderStatus::Pendiente, None).await?;
            }
            SubmitKind::Resubmitted => {
                append_history(
                    txn,
                    existing_id,
                    OrderStatus::Pendiente,
                    Some(RESUBMIT_OBSERVATION.to_string()),
                )
                .await?;
            }
            _ => {}
        }

        if was_draft && kind == SubmitKind::DraftConverted {
            info!(order_id = %existing_id, "draft converted to final order");
        }

        Ok(existing_id)
    }

    /// Replace-not-merge: drop every prior task/part row and recreate the
    /// graph from the payload.
    async fn replace_tasks<C: ConnectionTrait>(
        &self,
        txn: &C,
        order_id: Uuid,
        request: &SubmitOrderRequest,
        company_id: Uuid,
    ) -> Result<(), ServiceError> {
        let prior_ids: Vec<Uuid> = TaskEntity::find()
            .filter(order_task::Column::OrderId.eq(order_id))
            .all(txn)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        if !prior_ids.is_empty() {
            TaskPartEntity::delete_many()
                .filter(order_task_part::Column::OrderTaskId.is_in(prior_ids.clone()))
                .exec(txn)
                .await?;
            TaskEntity::delete_many()
                .filter(order_task::Column::OrderId.eq(order_id))
                .exec(txn)
                .await?;
        }

        for task in &request.tasks {
            let task_id = Uuid::new_v4();
            order_task::ActiveModel {
                id: Set(task_id),
                order_id: Set(order_id),
                description: Set(task.description.clone()),
                hours_count: Set(task.hours_count),
                ..Default::default()
            }
            .insert(txn)
            .await?;

            for part_input in &task.parts {
                let part = self
                    .parts
                    .find_or_create(txn, &part_input.code, &part_input.description, company_id)
                    .await?;
                let snapshot = if part_input.description.is_empty() {
                    part.description.clone()
                } else {
                    part_input.description.clone()
                };
                order_task_part::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_task_id: Set(task_id),
                    part_id: Set(part.id),
                    quantity: Set(part_input.quantity),
                    // Snapshot at creation time; later catalog edits must
                    // not rewrite order history.
                    description: Set(snapshot),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
            }
        }
        Ok(())
    }

    async fn hydrate_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Orden {order_id} no encontrada")))?;

        let vehicle = VehicleEntity::find_by_id(order.vehicle_vin.clone())
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Vehículo con VIN {} no encontrado",
                    order.vehicle_vin
                ))
            })?;

        let customer = customer::Entity::find_by_id(order.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Cliente {} no encontrado", order.customer_id))
            })?;

        let task_models = TaskEntity::find()
            .filter(order_task::Column::OrderId.eq(order_id))
            .order_by_asc(order_task::Column::CreatedAt)
            .all(db)
            .await?;

        let mut tasks = Vec::with_capacity(task_models.len());
        for task in task_models {
            let part_rows = TaskPartEntity::find()
                .filter(order_task_part::Column::OrderTaskId.eq(task.id))
                .all(db)
                .await?;

            let part_ids: Vec<Uuid> = part_rows.iter().map(|p| p.part_id).collect();
            let catalog: BTreeMap<Uuid, String> = part::Entity::find()
                .filter(part::Column::Id.is_in(part_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.code))
                .collect();

            tasks.push(OrderTaskResponse {
                id: task.id,
                description: task.description,
                hours_count: task.hours_count,
                parts: part_rows
                    .into_iter()
                    .map(|p| OrderTaskPartResponse {
                        id: p.id,
                        part_id: p.part_id,
                        code: catalog.get(&p.part_id).cloned(),
                        quantity: p.quantity,
                        description: p.description,
                    })
                    .collect(),
            });
        }

        let photos = order_photo::Entity::find()
            .filter(order_photo::Column::OrderId.eq(order_id))
            .all(db)
            .await?;

        let history = HistoryEntity::find()
            .filter(order_status_history::Column::OrderId.eq(order_id))
            .order_by_asc(order_status_history::Column::ChangedAt)
            .all(db)
            .await?
            .into_iter()
            .map(|h| OrderHistoryResponse {
                status: h.status,
                observation: h.observation,
                changed_at: h.changed_at,
            })
            .collect();

        Ok(OrderResponse {
            id: order.id,
            order_number: order.order_number,
            order_type: order.order_type,
            status: order.status,
            draft: order.draft,
            internal_status: order.internal_status,
            origin_claim_number: order.origin_claim_number,
            labor_recovery: order.labor_recovery,
            parts_recovery: order.parts_recovery,
            internal_status_observation: order.internal_status_observation,
            mileage: order.mileage,
            diagnosis: order.diagnosis,
            observations: order.observations,
            pre_authorization_id: order.pre_authorization_id,
            vehicle,
            customer,
            tasks,
            photos,
            history,
            created_by: order.created_by,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }

    async fn creator_display_name(&self, user_id: Option<Uuid>) -> String {
        let Some(user_id) = user_id else {
            return String::new();
        };
        match user::Entity::find_by_id(user_id).one(&*self.db_pool).await {
            Ok(Some(u)) => u.display_name,
            _ => String::new(),
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send order event");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

/// Increments the shared counter row and reads the new value back, all
/// inside the caller's transaction. Row locking on the UPDATE serializes
/// concurrent submitters.
async fn next_order_number<C: ConnectionTrait>(conn: &C) -> Result<i64, ServiceError> {
    order_counter::Entity::update_many()
        .col_expr(
            order_counter::Column::Value,
            Expr::col(order_counter::Column::Value).add(1),
        )
        .filter(order_counter::Column::Name.eq(ORDER_NUMBER_COUNTER))
        .exec(conn)
        .await?;

    let row = order_counter::Entity::find_by_id(ORDER_NUMBER_COUNTER)
        .one(conn)
        .await?
        .ok_or(ServiceError::InternalError)?;
    Ok(row.value)
}

/// Appends one immutable history row carrying the given status.
async fn append_history<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    status: OrderStatus,
    observation: Option<String>,
) -> Result<(), ServiceError> {
    order_status_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        status: Set(status.to_string()),
        observation: Set(observation),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Classifies a submission against the stored row. Draft rows stay drafts
/// or convert; OBSERVADO orders may be corrected by their creator; anything
/// else is closed to modification.
fn classify_update(
    existing: &order::Model,
    request: &SubmitOrderRequest,
    user_id: Option<Uuid>,
) -> Result<SubmitKind, ServiceError> {
    if existing.draft {
        return Ok(if request.draft {
            SubmitKind::DraftUpdated
        } else {
            SubmitKind::DraftConverted
        });
    }
    if existing.status == OrderStatus::Observado.to_string() {
        // Only the original creator may correct and resubmit.
        if existing.created_by != user_id {
            return Err(ServiceError::Forbidden(
                "Solo el creador original puede modificar una orden observada".to_string(),
            ));
        }
        return Ok(SubmitKind::Resubmitted);
    }
    Err(ServiceError::Conflict(
        "La orden ya fue enviada y no admite modificaciones".to_string(),
    ))
}

/// Payload validation. `draft` relaxes the rules to VIN + customer name
/// only; it comes from the classified outcome, never from the payload's
/// own flag. Returns a field-path → message map; empty means valid.
fn validate_submit(request: &SubmitOrderRequest, draft: bool) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    if request.vin.trim().len() != 17 {
        errors.insert(
            "vin".to_string(),
            "El VIN debe tener 17 caracteres".to_string(),
        );
    }
    if request.customer_name.trim().is_empty() {
        errors.insert(
            "customer_name".to_string(),
            "El nombre del cliente es obligatorio".to_string(),
        );
    }

    if draft {
        return errors;
    }

    if request.mileage.is_none() {
        errors.insert(
            "mileage".to_string(),
            "El kilometraje es obligatorio".to_string(),
        );
    }
    if request
        .diagnosis
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .is_empty()
    {
        errors.insert(
            "diagnosis".to_string(),
            "El diagnóstico es obligatorio".to_string(),
        );
    }
    if request.tasks.is_empty() {
        errors.insert(
            "tasks".to_string(),
            "Se requiere al menos una tarea completa".to_string(),
        );
    }

    for (ti, task) in request.tasks.iter().enumerate() {
        if task.description.trim().is_empty() {
            errors.insert(
                format!("tasks.{ti}.description"),
                "La descripción de la tarea es obligatoria".to_string(),
            );
        }
        if task.hours_count <= Decimal::ZERO {
            errors.insert(
                format!("tasks.{ti}.hours_count"),
                "Las horas deben ser mayores a cero".to_string(),
            );
        }
        if task.parts.is_empty() {
            errors.insert(
                format!("tasks.{ti}.parts"),
                "La tarea requiere al menos un repuesto".to_string(),
            );
        }
        for (pi, p) in task.parts.iter().enumerate() {
            if p.code.trim().is_empty() {
                errors.insert(
                    format!("tasks.{ti}.parts.{pi}.code"),
                    "El código de repuesto es obligatorio".to_string(),
                );
            }
            if p.quantity < 1 {
                errors.insert(
                    format!("tasks.{ti}.parts.{pi}.quantity"),
                    "La cantidad debe ser al menos 1".to_string(),
                );
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_request(draft: bool) -> SubmitOrderRequest {
        SubmitOrderRequest {
            order_type: OrderType::Reclamo,
            vin: "VIN00000000000001".to_string(),
            customer_name: "Juan Perez".to_string(),
            mileage: Some(42_000),
            diagnosis: Some("Pérdida de aceite".to_string()),
            observations: None,
            pre_authorization_id: None,
            tasks: vec![TaskInput {
                description: "Cambio de junta".to_string(),
                hours_count: dec!(2.5),
                parts: vec![TaskPartInput {
                    code: "FIL001".to_string(),
                    description: "Filtro de aceite".to_string(),
                    quantity: 1,
                }],
            }],
            photos: Default::default(),
            draft,
            existing_order_id: None,
        }
    }

    #[test]
    fn draft_only_requires_vin_and_customer() {
        let mut req = base_request(true);
        req.mileage = None;
        req.diagnosis = None;
        req.tasks.clear();
        assert!(validate_submit(&req, true).is_empty());
    }

    #[test]
    fn draft_still_requires_vin_shape() {
        let mut req = base_request(true);
        req.vin = "SHORT".to_string();
        req.customer_name = "  ".to_string();
        let errors = validate_submit(&req, true);
        assert!(errors.contains_key("vin"));
        assert!(errors.contains_key("customer_name"));
    }

    #[test]
    fn final_submit_requires_complete_tasks() {
        let mut req = base_request(false);
        req.tasks[0].description = String::new();
        req.tasks[0].hours_count = Decimal::ZERO;
        req.tasks[0].parts[0].quantity = 0;
        let errors = validate_submit(&req, false);
        assert!(errors.contains_key("tasks.0.description"));
        assert!(errors.contains_key("tasks.0.hours_count"));
        assert!(errors.contains_key("tasks.0.parts.0.quantity"));
    }

    #[test]
    fn final_submit_requires_at_least_one_task() {
        let mut req = base_request(false);
        req.tasks.clear();
        let errors = validate_submit(&req, false);
        assert!(errors.contains_key("tasks"));
    }

    #[test]
    fn valid_final_payload_produces_no_errors() {
        assert!(validate_submit(&base_request(false), false).is_empty());
    }

    #[test]
    fn the_payload_draft_flag_cannot_relax_final_validation() {
        // A payload claiming to be a draft still fails the final rules when
        // the classified outcome is non-draft.
        let mut req = base_request(true);
        req.mileage = None;
        req.tasks[0].hours_count = Decimal::ZERO;
        let errors = validate_submit(&req, false);
        assert!(errors.contains_key("mileage"));
        assert!(errors.contains_key("tasks.0.hours_count"));
    }

    #[test]
    fn submit_kind_messages_and_notification_policy() {
        assert!(SubmitKind::Created.notifies());
        assert!(SubmitKind::DraftConverted.notifies());
        assert!(SubmitKind::Resubmitted.notifies());
        assert!(!SubmitKind::DraftSaved.notifies());
        assert!(!SubmitKind::DraftUpdated.notifies());
        assert_eq!(SubmitKind::DraftSaved.message(), "Borrador guardado");
    }
}
