use super::{Page, PageRequest};
use crate::{
    db::DbPool,
    entities::warranty::{self, Entity as Warranty},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional-field filter for the warranty list view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarrantyFilter {
    /// Substring match on the VIN.
    pub vin: Option<String>,
    pub customer_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl WarrantyFilter {
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(vin) = &self.vin {
            cond = cond.add(warranty::Column::VehicleVin.contains(vin.as_str()));
        }
        if let Some(id) = self.customer_id {
            cond = cond.add(warranty::Column::CustomerId.eq(id));
        }
        if let Some(id) = self.company_id {
            cond = cond.add(warranty::Column::CompanyId.eq(id));
        }
        if let Some(from) = self.from_date {
            cond = cond.add(warranty::Column::ActivationDate.gte(from));
        }
        if let Some(to) = self.to_date {
            cond = cond.add(warranty::Column::ActivationDate.lte(to));
        }
        cond
    }
}

pub async fn list_warranties(
    db: &DbPool,
    filter: &WarrantyFilter,
    page: PageRequest,
) -> Result<Page<warranty::Model>, ServiceError> {
    let page = page.normalized();
    let txn = db.begin().await?;

    let total = Warranty::find()
        .filter(filter.condition())
        .count(&txn)
        .await?;

    let items = Warranty::find()
        .filter(filter.condition())
        .order_by_desc(warranty::Column::ActivationDate)
        .offset(page.offset())
        .limit(page.page_size)
        .all(&txn)
        .await?;

    txn.commit().await?;

    Ok(Page {
        items,
        total,
        page: page.page,
        page_size: page.page_size,
    })
}

pub async fn fetch_all_warranties(
    db: &DbPool,
    filter: &WarrantyFilter,
) -> Result<Vec<warranty::Model>, ServiceError> {
    Ok(Warranty::find()
        .filter(filter.condition())
        .order_by_desc(warranty::Column::ActivationDate)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_the_predicate() {
        assert!(WarrantyFilter::default().condition().is_empty());
        let filter = WarrantyFilter {
            vin: Some("VIN".into()),
            from_date: Some(Utc::now()),
            ..Default::default()
        };
        assert_eq!(filter.condition().len(), 2);
    }
}
