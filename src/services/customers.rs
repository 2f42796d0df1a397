use crate::{
    db::DbPool,
    entities::customer::{self, Entity as Customer, CONTACT_PLACEHOLDER},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, QueryFilter,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Idempotent customer resolution from the free-text name typed on an
/// order form.
///
/// One normalization rule for every call site: trim, split on the first
/// whitespace into first/last name, compare case-insensitively on both.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Finds a customer by normalized name or creates one with placeholder
    /// contact fields. Runs on the supplied connection so the lifecycle
    /// engine can call it inside its transaction.
    #[instrument(skip(self, conn))]
    pub async fn find_or_create<C: ConnectionTrait>(
        &self,
        conn: &C,
        name: &str,
    ) -> Result<customer::Model, ServiceError> {
        let (first, last) = split_name(name);
        if first.is_empty() {
            return Err(ServiceError::ValidationError(
                "El nombre del cliente es obligatorio".to_string(),
            ));
        }

        let existing = Customer::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    Customer,
                    customer::Column::FirstName,
                ))))
                .eq(first.to_lowercase()),
            )
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    Customer,
                    customer::Column::LastName,
                ))))
                .eq(last.to_lowercase()),
            )
            .one(conn)
            .await?;

        if let Some(found) = existing {
            return Ok(found);
        }

        let id = Uuid::new_v4();
        let created = customer::ActiveModel {
            id: Set(id),
            first_name: Set(first),
            last_name: Set(last),
            email: Set(CONTACT_PLACEHOLDER.to_string()),
            phone: Set(CONTACT_PLACEHOLDER.to_string()),
            address: Set(CONTACT_PLACEHOLDER.to_string()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(customer_id = %id, "customer auto-created from order form");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<customer::Model>, ServiceError> {
        Ok(Customer::find_by_id(id).one(&*self.db_pool).await?)
    }
}

/// Splits a free-text name on the first whitespace into (first, last).
/// A single token yields an empty last name.
pub fn split_name(raw: &str) -> (String, String) {
    let trimmed = raw.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}
