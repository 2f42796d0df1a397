use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use dealership_api::{
    config::AppConfig,
    db,
    entities::{company, part, user, vehicle},
    events::{self, EventSender},
    notifications::TracingNotifier,
    services::AppServices,
    AppState,
};

/// Helper harness backed by a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub company_id: Uuid,
    pub user_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir");
        let db_path = db_dir.path().join("dealership_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::sync_schema(&pool)
            .await
            .expect("failed to synchronize schema in tests");

        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(
            event_rx,
            Arc::new(TracingNotifier),
            vec!["taller@example.com".to_string()],
        ));

        let services = AppServices::new(db_arc.clone(), Some(event_sender.clone()));
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender: Some(event_sender),
            services,
        };

        let router = Router::new()
            .nest("/api/v1", dealership_api::api_v1_routes())
            .with_state(state.clone());

        let mut app = Self {
            router,
            state,
            company_id: Uuid::nil(),
            user_id: Uuid::nil(),
            _event_task: event_task,
            _db_dir: db_dir,
        };
        app.company_id = app.seed_company("Concesionaria Norte").await;
        app.user_id = app.seed_user("ana@example.com", "Ana García").await;
        app
    }

    pub async fn seed_company(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        company::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            notification_email: Set(Some("garantias@example.com".to_string())),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed company");
        id
    }

    pub async fn seed_user(&self, email: &str, display_name: &str) -> Uuid {
        let id = Uuid::new_v4();
        user::ActiveModel {
            id: Set(id),
            email: Set(email.to_string()),
            display_name: Set(display_name.to_string()),
            company_id: Set(self.company_id),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed user");
        id
    }

    pub async fn seed_vehicle(&self, vin: &str) -> vehicle::Model {
        vehicle::ActiveModel {
            vin: Set(vin.to_string()),
            model: Set(Some("Modelo X".to_string())),
            certificate_number: Set(Some(format!("CERT-{}", &vin[vin.len() - 4..]))),
            import_date: Set(Some(Utc::now())),
            sale_date: Set(None),
            blocked: Set(false),
            company_id: Set(self.company_id),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed vehicle")
    }

    pub async fn seed_part(&self, code: &str, description: &str) -> part::Model {
        part::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            description: Set(description.to_string()),
            company_id: Set(self.company_id),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed part")
    }

    /// Sends a JSON request through the full router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("route request")
    }
}

/// Reads a JSON response body.
pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}
