mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;

use dealership_api::{
    errors::ServiceError,
    models::{InternalStatus, OrderType},
    services::orders::{
        SubmitOrderRequest, TaskInput, TaskPartInput, UpdateInternalStatusRequest,
    },
};

use common::TestApp;

const VIN: &str = "3VWFE21C04M000002";

fn submitted_claim(order_type: OrderType) -> SubmitOrderRequest {
    SubmitOrderRequest {
        order_type,
        vin: VIN.to_string(),
        customer_name: "Maria Lopez".to_string(),
        mileage: Some(18_500),
        diagnosis: Some("Ruido en tren delantero".to_string()),
        observations: None,
        pre_authorization_id: None,
        tasks: vec![TaskInput {
            description: "Cambio de bieletas".to_string(),
            hours_count: dec!(1.5),
            parts: vec![TaskPartInput {
                code: "SUS010".to_string(),
                description: "Bieleta delantera".to_string(),
                quantity: 2,
            }],
        }],
        photos: Default::default(),
        draft: false,
        existing_order_id: None,
    }
}

fn full_bundle(status: InternalStatus) -> UpdateInternalStatusRequest {
    UpdateInternalStatusRequest {
        internal_status: status,
        origin_claim_number: Some("ORG-4471".to_string()),
        labor_recovery: Some(dec!(120.50)),
        parts_recovery: Some(dec!(310.00)),
        internal_status_observation: Some("Seguimiento con fábrica".to_string()),
    }
}

#[tokio::test]
async fn reclamo_en_origen_keeps_only_the_claim_number() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("SUS010", "Bieleta delantera").await;

    let order = app
        .state
        .services
        .orders
        .submit_order(submitted_claim(OrderType::Reclamo), app.company_id, Some(app.user_id))
        .await
        .unwrap()
        .order;

    let updated = app
        .state
        .services
        .orders
        .update_internal_status(order.id, full_bundle(InternalStatus::ReclamoEnOrigen))
        .await
        .unwrap();

    assert_eq!(updated.internal_status.as_deref(), Some("RECLAMO_EN_ORIGEN"));
    assert_eq!(updated.origin_claim_number.as_deref(), Some("ORG-4471"));
    assert!(updated.labor_recovery.is_none());
    assert!(updated.parts_recovery.is_none());
    assert!(updated.internal_status_observation.is_none());
}

#[tokio::test]
async fn aprobado_en_origen_keeps_only_the_recovery_amounts() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("SUS010", "Bieleta delantera").await;

    let order = app
        .state
        .services
        .orders
        .submit_order(submitted_claim(OrderType::Reclamo), app.company_id, Some(app.user_id))
        .await
        .unwrap()
        .order;

    let updated = app
        .state
        .services
        .orders
        .update_internal_status(order.id, full_bundle(InternalStatus::AprobadoEnOrigen))
        .await
        .unwrap();

    assert!(updated.origin_claim_number.is_none());
    assert_eq!(updated.labor_recovery, Some(dec!(120.50)));
    assert_eq!(updated.parts_recovery, Some(dec!(310.00)));
    assert!(updated.internal_status_observation.is_none());
}

#[tokio::test]
async fn no_reclamable_keeps_only_the_observation() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("SUS010", "Bieleta delantera").await;

    let order = app
        .state
        .services
        .orders
        .submit_order(submitted_claim(OrderType::Reclamo), app.company_id, Some(app.user_id))
        .await
        .unwrap()
        .order;

    let updated = app
        .state
        .services
        .orders
        .update_internal_status(order.id, full_bundle(InternalStatus::NoReclamable))
        .await
        .unwrap();

    assert!(updated.origin_claim_number.is_none());
    assert!(updated.labor_recovery.is_none());
    assert!(updated.parts_recovery.is_none());
    assert_eq!(
        updated.internal_status_observation.as_deref(),
        Some("Seguimiento con fábrica")
    );
}

#[tokio::test]
async fn moving_between_statuses_clears_newly_invalid_fields() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("SUS010", "Bieleta delantera").await;

    let order = app
        .state
        .services
        .orders
        .submit_order(submitted_claim(OrderType::Reclamo), app.company_id, Some(app.user_id))
        .await
        .unwrap()
        .order;

    app.state
        .services
        .orders
        .update_internal_status(order.id, full_bundle(InternalStatus::Cargado))
        .await
        .unwrap();

    // PENDIENTE_RECLAMO allows no conditional fields at all; anything the
    // caller sends along is discarded.
    let updated = app
        .state
        .services
        .orders
        .update_internal_status(order.id, full_bundle(InternalStatus::PendienteReclamo))
        .await
        .unwrap();

    assert_eq!(updated.internal_status.as_deref(), Some("PENDIENTE_RECLAMO"));
    assert!(updated.origin_claim_number.is_none());
    assert!(updated.labor_recovery.is_none());
    assert!(updated.parts_recovery.is_none());
    assert!(updated.internal_status_observation.is_none());
}

#[tokio::test]
async fn service_orders_reject_the_internal_axis() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;

    let order = app
        .state
        .services
        .orders
        .submit_order(
            submitted_claim(OrderType::Servicio),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap()
        .order;

    let result = app
        .state
        .services
        .orders
        .update_internal_status(order.id, full_bundle(InternalStatus::PendienteReclamo))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn pre_authorizations_accept_the_internal_axis() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("SUS010", "Bieleta delantera").await;

    let order = app
        .state
        .services
        .orders
        .submit_order(
            submitted_claim(OrderType::PreAutorizacion),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap()
        .order;

    let updated = app
        .state
        .services
        .orders
        .update_internal_status(order.id, full_bundle(InternalStatus::RechazadoEnOrigen))
        .await
        .unwrap();
    assert_eq!(
        updated.internal_status.as_deref(),
        Some("RECHAZADO_EN_ORIGEN")
    );
    assert!(updated.internal_status_observation.is_some());
}
