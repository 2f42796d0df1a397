mod common;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rust_decimal_macros::dec;
use uuid::Uuid;

use dealership_api::{
    models::{OrderStatus, OrderType},
    queries::{
        order_queries::{self, OrderFilter},
        warranty_queries::WarrantyFilter,
        PageRequest,
    },
    services::{
        orders::{SubmitOrderRequest, TaskInput, TaskPartInput},
        warranties::ActivateWarrantyRequest,
    },
};

use common::TestApp;

const VIN: &str = "3VWFE21C04M000200";

fn request_for(order_type: OrderType, draft: bool) -> SubmitOrderRequest {
    SubmitOrderRequest {
        order_type,
        vin: VIN.to_string(),
        customer_name: "Carlos Gomez".to_string(),
        mileage: Some(61_000),
        diagnosis: Some("Cambio preventivo de correa".to_string()),
        observations: None,
        pre_authorization_id: None,
        tasks: vec![TaskInput {
            description: "Correa de distribución".to_string(),
            hours_count: dec!(3.0),
            parts: vec![TaskPartInput {
                code: "COR020".to_string(),
                description: "Kit de distribución".to_string(),
                quantity: 1,
            }],
        }],
        photos: Default::default(),
        draft,
        existing_order_id: None,
    }
}

#[tokio::test]
async fn order_listing_paginates_with_a_consistent_total() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("COR020", "Kit de distribución").await;

    for _ in 0..5 {
        app.state
            .services
            .orders
            .submit_order(
                request_for(OrderType::Servicio, false),
                app.company_id,
                Some(app.user_id),
            )
            .await
            .unwrap();
    }

    let page = order_queries::list_orders(
        &app.state.db,
        &OrderFilter::default(),
        PageRequest { page: 2, page_size: 2 },
    )
    .await
    .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn order_listing_filters_combine() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("COR020", "Kit de distribución").await;

    app.state
        .services
        .orders
        .submit_order(
            request_for(OrderType::Servicio, false),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap();
    let claim = app
        .state
        .services
        .orders
        .submit_order(
            request_for(OrderType::Reclamo, false),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap();
    app.state
        .services
        .orders
        .submit_order(
            request_for(OrderType::Reclamo, true),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap();

    let filter = OrderFilter {
        order_type: Some(OrderType::Reclamo),
        draft: Some(false),
        ..Default::default()
    };
    let page = order_queries::list_orders(&app.state.db, &filter, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, claim.order.id);

    let by_number = OrderFilter {
        order_number: Some(claim.order.order_number),
        ..Default::default()
    };
    let page = order_queries::list_orders(&app.state.db, &by_number, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let wrong_company = OrderFilter {
        company_id: Some(Uuid::new_v4()),
        ..Default::default()
    };
    let page = order_queries::list_orders(&app.state.db, &wrong_company, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn pending_orders_filter_by_status() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("COR020", "Kit de distribución").await;

    let order = app
        .state
        .services
        .orders
        .submit_order(
            request_for(OrderType::Reclamo, false),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap();
    app.state
        .services
        .orders
        .update_order_status(order.order.id, OrderStatus::Autorizado, None)
        .await
        .unwrap();

    let pending = OrderFilter {
        status: Some(OrderStatus::Pendiente),
        ..Default::default()
    };
    let page = order_queries::list_orders(&app.state.db, &pending, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let authorized = OrderFilter {
        status: Some(OrderStatus::Autorizado),
        ..Default::default()
    };
    let page = order_queries::list_orders(&app.state.db, &authorized, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

fn decode_csv(content_base64: &str) -> Vec<Vec<String>> {
    let bytes = BASE64.decode(content_base64).expect("valid base64");
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn order_export_covers_the_whole_filtered_set() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;
    app.seed_part("COR020", "Kit de distribución").await;

    app.state
        .services
        .orders
        .submit_order(
            request_for(OrderType::Reclamo, false),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap();
    app.state
        .services
        .orders
        .submit_order(
            request_for(OrderType::Reclamo, true),
            app.company_id,
            Some(app.user_id),
        )
        .await
        .unwrap();

    let payload = app
        .state
        .services
        .exports
        .export_orders(&OrderFilter::default())
        .await
        .unwrap();

    assert!(payload.filename.starts_with("ordenes_"));
    assert!(payload.filename.ends_with(".csv"));
    assert_eq!(payload.row_count, 2);

    let rows = decode_csv(&payload.content_base64);
    assert_eq!(rows.len(), 2);
    // Drafts export a placeholder instead of the sentinel number.
    let numbers: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert!(numbers.contains(&"BORRADOR"));
    assert!(numbers.contains(&"1"));
    assert!(rows.iter().all(|r| r[4] == VIN));
    assert!(rows.iter().all(|r| r[6] == "Carlos Gomez"));
}

#[tokio::test]
async fn warranty_export_resolves_customer_names() {
    let app = TestApp::new().await;
    app.seed_vehicle(VIN).await;

    let customer = app
        .state
        .services
        .customers
        .find_or_create(&*app.state.db, "Lucia Fernandez")
        .await
        .unwrap();

    app.state
        .services
        .warranties
        .activate(ActivateWarrantyRequest {
            vin: VIN.to_string(),
            customer_id: customer.id,
            company_id: app.company_id,
            user_id: Some(app.user_id),
            activation_date: None,
        })
        .await
        .unwrap();

    let payload = app
        .state
        .services
        .exports
        .export_warranties(&WarrantyFilter::default())
        .await
        .unwrap();

    assert_eq!(payload.row_count, 1);
    let rows = decode_csv(&payload.content_base64);
    assert_eq!(rows[0][0], VIN);
    assert_eq!(rows[0][1], "Lucia Fernandez");
}
