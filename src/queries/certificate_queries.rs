use super::{Page, PageRequest};
use crate::{
    db::DbPool,
    entities::{
        vehicle::{self, Entity as Vehicle},
        warranty,
    },
    errors::ServiceError,
    models::WarrantyPresence,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Certificate listing filter over vehicles, with a derived
/// warranty-presence axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateFilter {
    /// Substring match on the VIN.
    pub vin: Option<String>,
    pub certificate_number: Option<String>,
    pub blocked: Option<bool>,
    pub company_id: Option<Uuid>,
    pub import_from: Option<DateTime<Utc>>,
    pub import_to: Option<DateTime<Utc>>,
    pub sale_from: Option<DateTime<Utc>>,
    pub sale_to: Option<DateTime<Utc>>,
    /// ACTIVA requires a warranty row; NO_ACTIVA requires its absence.
    pub garantia: Option<WarrantyPresence>,
    pub warranty_from: Option<DateTime<Utc>>,
    pub warranty_to: Option<DateTime<Utc>>,
}

impl CertificateFilter {
    /// A warranty-date bound can never be satisfied by "no warranty";
    /// NO_ACTIVA combined with either date bound is defined to produce an
    /// empty result set rather than an error.
    pub fn is_unsatisfiable(&self) -> bool {
        self.garantia == Some(WarrantyPresence::NoActiva)
            && (self.warranty_from.is_some() || self.warranty_to.is_some())
    }

    fn vehicle_condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(vin) = &self.vin {
            cond = cond.add(vehicle::Column::Vin.contains(vin.as_str()));
        }
        if let Some(cert) = &self.certificate_number {
            cond = cond.add(vehicle::Column::CertificateNumber.eq(cert.clone()));
        }
        if let Some(blocked) = self.blocked {
            cond = cond.add(vehicle::Column::Blocked.eq(blocked));
        }
        if let Some(id) = self.company_id {
            cond = cond.add(vehicle::Column::CompanyId.eq(id));
        }
        if let Some(from) = self.import_from {
            cond = cond.add(vehicle::Column::ImportDate.gte(from));
        }
        if let Some(to) = self.import_to {
            cond = cond.add(vehicle::Column::ImportDate.lte(to));
        }
        if let Some(from) = self.sale_from {
            cond = cond.add(vehicle::Column::SaleDate.gte(from));
        }
        if let Some(to) = self.sale_to {
            cond = cond.add(vehicle::Column::SaleDate.lte(to));
        }
        cond
    }

    fn warranty_condition(&self) -> Condition {
        let mut cond = Condition::all();
        match self.garantia {
            Some(WarrantyPresence::Activa) => {
                cond = cond.add(warranty::Column::Id.is_not_null());
            }
            Some(WarrantyPresence::NoActiva) => {
                cond = cond.add(warranty::Column::Id.is_null());
            }
            None => {}
        }
        if let Some(from) = self.warranty_from {
            cond = cond.add(warranty::Column::ActivationDate.gte(from));
        }
        if let Some(to) = self.warranty_to {
            cond = cond.add(warranty::Column::ActivationDate.lte(to));
        }
        cond
    }
}

/// A certificate row: the vehicle plus its warranty, when active.
#[derive(Debug, Serialize, Deserialize)]
pub struct CertificateRow {
    pub vehicle: vehicle::Model,
    pub warranty: Option<warranty::Model>,
}

pub async fn list_certificates(
    db: &DbPool,
    filter: &CertificateFilter,
    page: PageRequest,
) -> Result<Page<CertificateRow>, ServiceError> {
    let page = page.normalized();
    if filter.is_unsatisfiable() {
        return Ok(Page::empty(page));
    }

    let txn = db.begin().await?;

    let base = Vehicle::find()
        .find_also_related(warranty::Entity)
        .filter(filter.vehicle_condition())
        .filter(filter.warranty_condition());

    let total = base.clone().count(&txn).await?;

    let items = base
        .order_by_asc(vehicle::Column::Vin)
        .offset(page.offset())
        .limit(page.page_size)
        .all(&txn)
        .await?
        .into_iter()
        .map(|(vehicle, warranty)| CertificateRow { vehicle, warranty })
        .collect();

    txn.commit().await?;

    Ok(Page {
        items,
        total,
        page: page.page,
        page_size: page.page_size,
    })
}

pub async fn fetch_all_certificates(
    db: &DbPool,
    filter: &CertificateFilter,
) -> Result<Vec<CertificateRow>, ServiceError> {
    if filter.is_unsatisfiable() {
        return Ok(Vec::new());
    }

    Ok(Vehicle::find()
        .find_also_related(warranty::Entity)
        .filter(filter.vehicle_condition())
        .filter(filter.warranty_condition())
        .order_by_asc(vehicle::Column::Vin)
        .all(db)
        .await?
        .into_iter()
        .map(|(vehicle, warranty)| CertificateRow { vehicle, warranty })
        .collect())
}
