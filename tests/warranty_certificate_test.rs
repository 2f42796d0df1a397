mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use dealership_api::{
    errors::ServiceError,
    models::WarrantyPresence,
    queries::{
        certificate_queries::{self, CertificateFilter},
        warranty_queries::{self, WarrantyFilter},
        PageRequest,
    },
    services::{vehicles::RegisterVehicleRequest, warranties::ActivateWarrantyRequest},
};

use common::TestApp;

const VIN_A: &str = "3VWFE21C04M000100";
const VIN_B: &str = "3VWFE21C04M000101";

fn activation(app: &TestApp, vin: &str) -> ActivateWarrantyRequest {
    ActivateWarrantyRequest {
        vin: vin.to_string(),
        customer_id: Uuid::new_v4(),
        company_id: app.company_id,
        user_id: Some(app.user_id),
        activation_date: None,
    }
}

#[tokio::test]
async fn vehicle_registration_rejects_duplicates_and_bad_vins() {
    let app = TestApp::new().await;

    let request = RegisterVehicleRequest {
        vin: VIN_A.to_string(),
        model: Some("Sedán 1.6".to_string()),
        certificate_number: Some("CERT-0100".to_string()),
        import_date: Some(Utc::now()),
        sale_date: None,
        blocked: false,
        company_id: app.company_id,
    };
    let registered = app.state.services.vehicles.register(request).await.unwrap();
    assert_eq!(registered.vin, VIN_A);

    let duplicate = RegisterVehicleRequest {
        vin: VIN_A.to_string(),
        model: None,
        certificate_number: None,
        import_date: None,
        sale_date: None,
        blocked: false,
        company_id: app.company_id,
    };
    let denied = app.state.services.vehicles.register(duplicate).await;
    assert_matches!(denied, Err(ServiceError::Conflict(_)));

    let short = RegisterVehicleRequest {
        vin: "SHORT".to_string(),
        model: None,
        certificate_number: None,
        import_date: None,
        sale_date: None,
        blocked: false,
        company_id: app.company_id,
    };
    let invalid = app.state.services.vehicles.register(short).await;
    assert_matches!(invalid, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn warranty_activation_is_unique_per_vehicle() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN_A).await;

    let first = app
        .state
        .services
        .warranties
        .activate(activation(&app, VIN_A))
        .await
        .unwrap();
    assert_eq!(first.vehicle_vin, VIN_A);

    let second = app
        .state
        .services
        .warranties
        .activate(activation(&app, VIN_A))
        .await;
    assert_matches!(second, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn warranty_activation_requires_a_registered_vehicle() {
    let app = TestApp::new().await;
    let result = app
        .state
        .services
        .warranties
        .activate(activation(&app, VIN_A))
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn annulment_deletes_the_warranty_and_frees_the_vehicle() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN_A).await;

    let warranty = app
        .state
        .services
        .warranties
        .activate(activation(&app, VIN_A))
        .await
        .unwrap();

    app.state.services.warranties.annul(warranty.id).await.unwrap();
    assert!(app
        .state
        .services
        .warranties
        .get_by_vin(VIN_A)
        .await
        .unwrap()
        .is_none());

    // Annulment is permanent; re-activation starts a fresh warranty.
    let again = app
        .state
        .services
        .warranties
        .activate(activation(&app, VIN_A))
        .await
        .unwrap();
    assert_ne!(again.id, warranty.id);

    let missing = app.state.services.warranties.annul(warranty.id).await;
    assert_matches!(missing, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn warranty_listing_filters_by_vin_substring_and_date() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN_A).await;
    app.seed_vehicle(VIN_B).await;

    app.state
        .services
        .warranties
        .activate(activation(&app, VIN_A))
        .await
        .unwrap();
    app.state
        .services
        .warranties
        .activate(activation(&app, VIN_B))
        .await
        .unwrap();

    let filter = WarrantyFilter {
        vin: Some("000101".to_string()),
        ..Default::default()
    };
    let page = warranty_queries::list_warranties(&app.state.db, &filter, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].vehicle_vin, VIN_B);

    let future = WarrantyFilter {
        from_date: Some(Utc::now() + Duration::days(1)),
        ..Default::default()
    };
    let empty = warranty_queries::list_warranties(&app.state.db, &future, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
}

#[tokio::test]
async fn certificate_listing_reports_warranty_presence() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN_A).await;
    app.seed_vehicle(VIN_B).await;

    app.state
        .services
        .warranties
        .activate(activation(&app, VIN_A))
        .await
        .unwrap();

    let all = certificate_queries::list_certificates(
        &app.state.db,
        &CertificateFilter::default(),
        PageRequest::default(),
    )
    .await
    .unwrap();
    assert_eq!(all.total, 2);

    let active = CertificateFilter {
        garantia: Some(WarrantyPresence::Activa),
        ..Default::default()
    };
    let page = certificate_queries::list_certificates(&app.state.db, &active, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].vehicle.vin, VIN_A);
    assert!(page.items[0].warranty.is_some());

    let inactive = CertificateFilter {
        garantia: Some(WarrantyPresence::NoActiva),
        ..Default::default()
    };
    let page =
        certificate_queries::list_certificates(&app.state.db, &inactive, PageRequest::default())
            .await
            .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].vehicle.vin, VIN_B);
    assert!(page.items[0].warranty.is_none());
}

#[tokio::test]
async fn no_activa_with_warranty_dates_is_an_empty_page_by_construction() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN_A).await;

    let filter = CertificateFilter {
        garantia: Some(WarrantyPresence::NoActiva),
        warranty_from: Some(Utc::now() - Duration::days(30)),
        ..Default::default()
    };
    let page = certificate_queries::list_certificates(&app.state.db, &filter, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn blocked_flag_filters_certificates() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN_A).await;
    app.seed_vehicle(VIN_B).await;

    app.state
        .services
        .vehicles
        .set_blocked(VIN_B, true)
        .await
        .unwrap();

    let blocked = CertificateFilter {
        blocked: Some(true),
        ..Default::default()
    };
    let page = certificate_queries::list_certificates(&app.state.db, &blocked, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].vehicle.vin, VIN_B);
}
