use crate::{
    db::DbPool,
    entities::{customer, vehicle},
    errors::ServiceError,
    queries::{
        certificate_queries::{self, CertificateFilter},
        order_queries::{self, OrderFilter},
        warranty_queries::{self, WarrantyFilter},
    },
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Spreadsheet binary handed to the client for download.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpreadsheetPayload {
    pub filename: String,
    /// Base64-encoded CSV bytes.
    pub content_base64: String,
    pub row_count: usize,
}

/// Re-runs a list filter without pagination, flattens the relational data
/// into tabular rows, and serializes them for download.
#[derive(Clone)]
pub struct ExportService {
    db_pool: Arc<DbPool>,
}

impl ExportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, filter))]
    pub async fn export_orders(
        &self,
        filter: &OrderFilter,
    ) -> Result<SpreadsheetPayload, ServiceError> {
        let db = &*self.db_pool;
        let orders = order_queries::fetch_all_orders(db, filter).await?;

        let customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();
        let customers: HashMap<Uuid, String> = customer::Entity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.display_name()))
            .collect();

        let vins: Vec<String> = orders.iter().map(|o| o.vehicle_vin.clone()).collect();
        let vehicles: HashMap<String, Option<String>> = vehicle::Entity::find()
            .filter(vehicle::Column::Vin.is_in(vins))
            .all(db)
            .await?
            .into_iter()
            .map(|v| (v.vin, v.model))
            .collect();

        let headers = [
            "Número",
            "Tipo",
            "Estado",
            "Estado interno",
            "VIN",
            "Modelo",
            "Cliente",
            "Kilometraje",
            "Diagnóstico",
            "Fecha",
        ];
        let rows: Vec<Vec<String>> = orders
            .iter()
            .map(|o| {
                vec![
                    display_order_number(o.order_number, o.draft),
                    o.order_type.clone(),
                    o.status.clone(),
                    o.internal_status.clone().unwrap_or_default(),
                    o.vehicle_vin.clone(),
                    vehicles
                        .get(&o.vehicle_vin)
                        .cloned()
                        .flatten()
                        .unwrap_or_default(),
                    customers.get(&o.customer_id).cloned().unwrap_or_default(),
                    o.mileage.map(|m| m.to_string()).unwrap_or_default(),
                    o.diagnosis.clone().unwrap_or_default(),
                    format_date(Some(o.created_at)),
                ]
            })
            .collect();

        self.to_payload("ordenes", &headers, rows)
    }

    #[instrument(skip(self, filter))]
    pub async fn export_warranties(
        &self,
        filter: &WarrantyFilter,
    ) -> Result<SpreadsheetPayload, ServiceError> {
        let db = &*self.db_pool;
        let warranties = warranty_queries::fetch_all_warranties(db, filter).await?;

        let customer_ids: Vec<Uuid> = warranties.iter().map(|w| w.customer_id).collect();
        let customers: HashMap<Uuid, String> = customer::Entity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.display_name()))
            .collect();

        let headers = ["VIN", "Cliente", "Fecha de activación"];
        let rows: Vec<Vec<String>> = warranties
            .iter()
            .map(|w| {
                vec![
                    w.vehicle_vin.clone(),
                    customers.get(&w.customer_id).cloned().unwrap_or_default(),
                    format_date(Some(w.activation_date)),
                ]
            })
            .collect();

        self.to_payload("garantias", &headers, rows)
    }

    #[instrument(skip(self, filter))]
    pub async fn export_certificates(
        &self,
        filter: &CertificateFilter,
    ) -> Result<SpreadsheetPayload, ServiceError> {
        let rows_src = certificate_queries::fetch_all_certificates(&self.db_pool, filter).await?;

        let headers = [
            "VIN",
            "Modelo",
            "Certificado",
            "Fecha de importación",
            "Fecha de venta",
            "Bloqueado",
            "Garantía",
            "Fecha de garantía",
        ];
        let rows: Vec<Vec<String>> = rows_src
            .iter()
            .map(|row| {
                vec![
                    row.vehicle.vin.clone(),
                    row.vehicle.model.clone().unwrap_or_default(),
                    row.vehicle.certificate_number.clone().unwrap_or_default(),
                    format_date(row.vehicle.import_date),
                    format_date(row.vehicle.sale_date),
                    if row.vehicle.blocked { "SI" } else { "NO" }.to_string(),
                    if row.warranty.is_some() {
                        "ACTIVA"
                    } else {
                        "NO_ACTIVA"
                    }
                    .to_string(),
                    format_date(row.warranty.as_ref().map(|w| w.activation_date)),
                ]
            })
            .collect();

        self.to_payload("certificados", &headers, rows)
    }

    fn to_payload(
        &self,
        prefix: &str,
        headers: &[&str],
        rows: Vec<Vec<String>>,
    ) -> Result<SpreadsheetPayload, ServiceError> {
        let row_count = rows.len();
        let bytes = write_csv(headers, rows)?;
        let payload = SpreadsheetPayload {
            filename: format!("{prefix}_{}.csv", Utc::now().format("%Y%m%d_%H%M%S")),
            content_base64: BASE64.encode(bytes),
            row_count,
        };
        info!(filename = %payload.filename, row_count, "export generated");
        Ok(payload)
    }
}

fn write_csv(headers: &[&str], rows: Vec<Vec<String>>) -> Result<Vec<u8>, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .map_err(|_| ServiceError::InternalError)?;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|_| ServiceError::InternalError)?;
    }
    writer
        .into_inner()
        .map_err(|_| ServiceError::InternalError)
}

fn display_order_number(number: i64, draft: bool) -> String {
    if draft {
        "BORRADOR".to_string()
    } else {
        number.to_string()
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_round_trip_preserves_cells_with_commas() {
        let bytes = write_csv(
            &["VIN", "Cliente"],
            vec![vec!["VIN00000000000001".into(), "Perez, Juan".into()]],
        )
        .unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "VIN00000000000001");
        assert_eq!(&record[1], "Perez, Juan");
    }

    #[test]
    fn drafts_show_a_placeholder_instead_of_a_number() {
        assert_eq!(display_order_number(0, true), "BORRADOR");
        assert_eq!(display_order_number(12, false), "12");
    }
}
