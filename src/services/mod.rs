pub mod attachments;
pub mod customers;
pub mod exports;
pub mod orders;
pub mod parts;
pub mod vehicles;
pub mod warranties;

use crate::{db::DbPool, events::EventSender};
use std::sync::Arc;

/// Business-logic layer used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<orders::OrderService>,
    pub customers: customers::CustomerService,
    pub parts: parts::PartService,
    pub warranties: Arc<warranties::WarrantyService>,
    pub attachments: attachments::AttachmentService,
    pub vehicles: vehicles::VehicleService,
    pub exports: exports::ExportService,
}

impl AppServices {
    /// Wires every service against the shared pool and event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        let customers = customers::CustomerService::new(db_pool.clone());
        let parts = parts::PartService::new(db_pool.clone());
        let attachments = attachments::AttachmentService::new(db_pool.clone());

        let orders = Arc::new(orders::OrderService::new(
            db_pool.clone(),
            customers.clone(),
            parts.clone(),
            attachments.clone(),
            event_sender.clone(),
        ));
        let warranties = Arc::new(warranties::WarrantyService::new(
            db_pool.clone(),
            event_sender,
        ));
        let vehicles = vehicles::VehicleService::new(db_pool.clone());
        let exports = exports::ExportService::new(db_pool);

        Self {
            orders,
            customers,
            parts,
            warranties,
            attachments,
            vehicles,
            exports,
        }
    }
}
