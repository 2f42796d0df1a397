use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::WarrantyPresence,
    queries::{
        certificate_queries::{self, CertificateRow},
        PageRequest,
    },
    services::exports::SpreadsheetPayload,
    ApiResponse, AppState, PaginatedResponse,
};

// Explicit fields rather than a flattened filter; serde_urlencoded cannot
// drive flattened non-string primitives.
#[derive(Debug, Deserialize)]
pub struct CertificateListQuery {
    pub vin: Option<String>,
    pub certificate_number: Option<String>,
    pub blocked: Option<bool>,
    pub company_id: Option<Uuid>,
    pub import_from: Option<DateTime<Utc>>,
    pub import_to: Option<DateTime<Utc>>,
    pub sale_from: Option<DateTime<Utc>>,
    pub sale_to: Option<DateTime<Utc>>,
    pub garantia: Option<WarrantyPresence>,
    pub warranty_from: Option<DateTime<Utc>>,
    pub warranty_to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl CertificateListQuery {
    fn filter(&self) -> certificate_queries::CertificateFilter {
        certificate_queries::CertificateFilter {
            vin: self.vin.clone(),
            certificate_number: self.certificate_number.clone(),
            blocked: self.blocked,
            company_id: self.company_id,
            import_from: self.import_from,
            import_to: self.import_to,
            sale_from: self.sale_from,
            sale_to: self.sale_to,
            garantia: self.garantia,
            warranty_from: self.warranty_from,
            warranty_to: self.warranty_to,
        }
    }

    fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(crate::queries::DEFAULT_PAGE_SIZE),
        }
    }
}

pub fn certificates_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_certificates))
        .route("/export", get(export_certificates))
}

/// GET /api/v1/certificates — vehicle certificate listing with the
/// derived warranty-presence column.
async fn list_certificates(
    State(state): State<AppState>,
    Query(query): Query<CertificateListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<CertificateRow>>>, ServiceError> {
    let page =
        certificate_queries::list_certificates(&state.db, &query.filter(), query.page_request())
            .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_page(
        page,
    ))))
}

/// GET /api/v1/certificates/export — spreadsheet of the full filtered set.
async fn export_certificates(
    State(state): State<AppState>,
    Query(query): Query<CertificateListQuery>,
) -> Result<Json<ApiResponse<SpreadsheetPayload>>, ServiceError> {
    let payload = state
        .services
        .exports
        .export_certificates(&query.filter())
        .await?;
    Ok(Json(ApiResponse::success(payload)))
}
