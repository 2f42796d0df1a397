use super::{Page, PageRequest};
use crate::{
    db::DbPool,
    entities::order::{self, Entity as Order},
    errors::ServiceError,
    models::{InternalStatus, OrderStatus, OrderType},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional-field filter for the order list view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub order_number: Option<i64>,
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub internal_status: Option<InternalStatus>,
    /// Substring match on the VIN.
    pub vin: Option<String>,
    pub customer_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub draft: Option<bool>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl OrderFilter {
    /// Builds the predicate from present fields only.
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(n) = self.order_number {
            cond = cond.add(order::Column::OrderNumber.eq(n));
        }
        if let Some(t) = self.order_type {
            cond = cond.add(order::Column::OrderType.eq(t.to_string()));
        }
        if let Some(s) = self.status {
            cond = cond.add(order::Column::Status.eq(s.to_string()));
        }
        if let Some(i) = self.internal_status {
            cond = cond.add(order::Column::InternalStatus.eq(i.to_string()));
        }
        if let Some(vin) = &self.vin {
            cond = cond.add(order::Column::VehicleVin.contains(vin.as_str()));
        }
        if let Some(id) = self.customer_id {
            cond = cond.add(order::Column::CustomerId.eq(id));
        }
        if let Some(id) = self.company_id {
            cond = cond.add(order::Column::CompanyId.eq(id));
        }
        if let Some(d) = self.draft {
            cond = cond.add(order::Column::Draft.eq(d));
        }
        if let Some(from) = self.from_date {
            cond = cond.add(order::Column::CreatedAt.gte(from));
        }
        if let Some(to) = self.to_date {
            cond = cond.add(order::Column::CreatedAt.lte(to));
        }
        cond
    }
}

/// Fetches one page plus a consistent total, both inside one transaction.
pub async fn list_orders(
    db: &DbPool,
    filter: &OrderFilter,
    page: PageRequest,
) -> Result<Page<order::Model>, ServiceError> {
    let page = page.normalized();
    let txn = db.begin().await?;

    let total = Order::find()
        .filter(filter.condition())
        .count(&txn)
        .await?;

    let items = Order::find()
        .filter(filter.condition())
        .order_by_desc(order::Column::CreatedAt)
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

/// Full filtered set, used by the spreadsheet export.
pub async fn fetch_all_orders(
    db: &DbPool,
    filter: &OrderFilter,
) -> Result<Vec<order::Model>, ServiceError> {
    Ok(Order::find()
        .filter(filter.condition())
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await?)
}
