use crate::{
    db::DbPool,
    entities::part::{self, Entity as Part},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Part catalog resolution: unique-code lookup with create-if-absent, and
/// the collect-all missing-code pass used by claim validation.
#[derive(Clone)]
pub struct PartService {
    db_pool: Arc<DbPool>,
}

impl PartService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Looks a part up by its unique code, creating it with the supplied
    /// description when absent.
    #[instrument(skip(self, conn, description))]
    pub async fn find_or_create<C: ConnectionTrait>(
        &self,
        conn: &C,
        code: &str,
        description: &str,
        company_id: Uuid,
    ) -> Result<part::Model, ServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::ValidationError(
                "El código de repuesto es obligatorio".to_string(),
            ));
        }

        if let Some(found) = Part::find()
            .filter(part::Column::Code.eq(code))
            .one(conn)
            .await?
        {
            return Ok(found);
        }

        let id = Uuid::new_v4();
        let created = part::ActiveModel {
            id: Set(id),
            code: Set(code.to_string()),
            description: Set(description.to_string()),
            company_id: Set(company_id),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(part_id = %id, code, "part created from order payload");
        Ok(created)
    }

    /// Returns every code from `codes` that does not exist in the catalog,
    /// in first-seen order. Used to report all missing claim parts at once
    /// instead of failing on the first.
    pub async fn find_missing_codes<C: ConnectionTrait>(
        &self,
        conn: &C,
        codes: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        let wanted: Vec<String> = codes.iter().map(|c| c.trim().to_string()).collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let found: HashSet<String> = Part::find()
            .filter(part::Column::Code.is_in(wanted.clone()))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| p.code)
            .collect();

        let mut seen = HashSet::new();
        Ok(wanted
            .into_iter()
            .filter(|c| !c.is_empty() && !found.contains(c) && seen.insert(c.clone()))
            .collect())
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<part::Model>, ServiceError> {
        Ok(Part::find()
            .filter(part::Column::Code.eq(code))
            .one(&*self.db_pool)
            .await?)
    }
}
