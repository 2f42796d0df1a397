//! Domain enums shared across entities, services, and handlers.
//!
//! Status values are stored as their wire strings (the Spanish business
//! vocabulary used by the dealership network) and parsed back through
//! `FromStr`, so the database never carries enum discriminants.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Classification of an order. Immutable once the order exists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum OrderType {
    #[strum(serialize = "PRE_AUTORIZACION")]
    #[serde(rename = "PRE_AUTORIZACION")]
    PreAutorizacion,
    #[strum(serialize = "RECLAMO")]
    #[serde(rename = "RECLAMO")]
    Reclamo,
    #[strum(serialize = "SERVICIO")]
    #[serde(rename = "SERVICIO")]
    Servicio,
}

/// Customer-facing lifecycle status of an order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum OrderStatus {
    #[strum(serialize = "BORRADOR")]
    #[serde(rename = "BORRADOR")]
    Borrador,
    #[strum(serialize = "PENDIENTE")]
    #[serde(rename = "PENDIENTE")]
    Pendiente,
    #[strum(serialize = "AUTORIZADO")]
    #[serde(rename = "AUTORIZADO")]
    Autorizado,
    #[strum(serialize = "RECHAZADO")]
    #[serde(rename = "RECHAZADO")]
    Rechazado,
    #[strum(serialize = "OBSERVADO")]
    #[serde(rename = "OBSERVADO")]
    Observado,
    #[strum(serialize = "COMPLETADO")]
    #[serde(rename = "COMPLETADO")]
    Completado,
}

impl OrderStatus {
    /// Statuses a reviewer may set from PENDIENTE.
    pub fn is_review_outcome(self) -> bool {
        matches!(
            self,
            OrderStatus::Autorizado | OrderStatus::Rechazado | OrderStatus::Observado
        )
    }
}

/// Back-office status axis tracking origin-manufacturer claim recovery.
/// Independent of [`OrderStatus`]; only meaningful for pre-authorizations
/// and claims.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum InternalStatus {
    #[strum(serialize = "PENDIENTE_RECLAMO")]
    #[serde(rename = "PENDIENTE_RECLAMO")]
    PendienteReclamo,
    #[strum(serialize = "RECLAMO_EN_ORIGEN")]
    #[serde(rename = "RECLAMO_EN_ORIGEN")]
    ReclamoEnOrigen,
    #[strum(serialize = "APROBADO_EN_ORIGEN")]
    #[serde(rename = "APROBADO_EN_ORIGEN")]
    AprobadoEnOrigen,
    #[strum(serialize = "RECHAZADO_EN_ORIGEN")]
    #[serde(rename = "RECHAZADO_EN_ORIGEN")]
    RechazadoEnOrigen,
    #[strum(serialize = "CARGADO")]
    #[serde(rename = "CARGADO")]
    Cargado,
    #[strum(serialize = "NO_RECLAMABLE")]
    #[serde(rename = "NO_RECLAMABLE")]
    NoReclamable,
}

impl InternalStatus {
    /// Whether `origin_claim_number` is meaningful under this status.
    pub fn allows_origin_claim_number(self) -> bool {
        matches!(self, InternalStatus::ReclamoEnOrigen)
    }

    /// Whether the labor/parts recovery amounts are meaningful under this
    /// status.
    pub fn allows_recovery_amounts(self) -> bool {
        matches!(
            self,
            InternalStatus::AprobadoEnOrigen | InternalStatus::Cargado
        )
    }

    /// Whether the internal-status observation is meaningful under this
    /// status.
    pub fn allows_observation(self) -> bool {
        matches!(
            self,
            InternalStatus::NoReclamable | InternalStatus::RechazadoEnOrigen
        )
    }
}

/// Derived warranty-presence filter used by the certificate listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum WarrantyPresence {
    #[strum(serialize = "ACTIVA")]
    #[serde(rename = "ACTIVA")]
    Activa,
    #[strum(serialize = "NO_ACTIVA")]
    #[serde(rename = "NO_ACTIVA")]
    NoActiva,
}

/// Logical attachment slots for an order.
///
/// The fixed slots are singletons per order; `additional`, `or`, and
/// `report_pdf` are numbered series (`additional_0`, `additional_1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSlot {
    LicensePlate,
    VinPlate,
    Odometer,
    CustomerSignature,
    Additional(u32),
    Or(u32),
    ReportPdf(u32),
}

impl PhotoSlot {
    /// Wire name stored in the `order_photos.slot` column.
    pub fn as_slot_name(&self) -> String {
        match self {
            PhotoSlot::LicensePlate => "license_plate".to_string(),
            PhotoSlot::VinPlate => "vin_plate".to_string(),
            PhotoSlot::Odometer => "odometer".to_string(),
            PhotoSlot::CustomerSignature => "customer_signature".to_string(),
            PhotoSlot::Additional(n) => format!("additional_{n}"),
            PhotoSlot::Or(n) => format!("or_{n}"),
            PhotoSlot::ReportPdf(n) => format!("report_pdf_{n}"),
        }
    }

    /// Slot-series prefix, used when replacing a whole group of rows.
    pub fn group_prefix(&self) -> &'static str {
        match self {
            PhotoSlot::LicensePlate => "license_plate",
            PhotoSlot::VinPlate => "vin_plate",
            PhotoSlot::Odometer => "odometer",
            PhotoSlot::CustomerSignature => "customer_signature",
            PhotoSlot::Additional(_) => "additional",
            PhotoSlot::Or(_) => "or",
            PhotoSlot::ReportPdf(_) => "report_pdf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_wire_strings() {
        for s in [
            OrderStatus::Borrador,
            OrderStatus::Pendiente,
            OrderStatus::Autorizado,
            OrderStatus::Rechazado,
            OrderStatus::Observado,
            OrderStatus::Completado,
        ] {
            assert_eq!(OrderStatus::from_str(&s.to_string()).unwrap(), s);
        }
        assert_eq!(OrderStatus::Pendiente.to_string(), "PENDIENTE");
    }

    #[test]
    fn review_outcomes_exclude_terminal_and_draft_states() {
        assert!(OrderStatus::Autorizado.is_review_outcome());
        assert!(OrderStatus::Observado.is_review_outcome());
        assert!(!OrderStatus::Pendiente.is_review_outcome());
        assert!(!OrderStatus::Borrador.is_review_outcome());
        assert!(!OrderStatus::Completado.is_review_outcome());
    }

    #[test]
    fn conditional_field_validity_per_internal_status() {
        assert!(InternalStatus::ReclamoEnOrigen.allows_origin_claim_number());
        assert!(!InternalStatus::Cargado.allows_origin_claim_number());
        assert!(InternalStatus::AprobadoEnOrigen.allows_recovery_amounts());
        assert!(InternalStatus::Cargado.allows_recovery_amounts());
        assert!(!InternalStatus::PendienteReclamo.allows_recovery_amounts());
        assert!(InternalStatus::NoReclamable.allows_observation());
        assert!(InternalStatus::RechazadoEnOrigen.allows_observation());
        assert!(!InternalStatus::AprobadoEnOrigen.allows_observation());
    }

    #[test]
    fn photo_slot_names_and_prefixes() {
        assert_eq!(PhotoSlot::LicensePlate.as_slot_name(), "license_plate");
        assert_eq!(PhotoSlot::Additional(2).as_slot_name(), "additional_2");
        assert_eq!(PhotoSlot::ReportPdf(0).as_slot_name(), "report_pdf_0");
        assert_eq!(PhotoSlot::Or(3).group_prefix(), "or");
    }
}
