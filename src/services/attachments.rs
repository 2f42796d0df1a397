use crate::{
    db::DbPool,
    entities::order_photo::{self, Entity as OrderPhoto},
    errors::ServiceError,
    models::PhotoSlot,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Already-uploaded attachment URLs, grouped by logical slot.
///
/// `None` means the caller did not touch that slot group and existing rows
/// are preserved; `Some` replaces the whole group (delete-then-recreate).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PhotoSlots {
    pub license_plate: Option<String>,
    pub vin_plate: Option<String>,
    pub odometer: Option<String>,
    pub customer_signature: Option<String>,
    pub additional: Option<Vec<String>>,
    pub or_media: Option<Vec<String>>,
    pub report_pdfs: Option<Vec<String>>,
}

impl PhotoSlots {
    pub fn is_empty(&self) -> bool {
        self.license_plate.is_none()
            && self.vin_plate.is_none()
            && self.odometer.is_none()
            && self.customer_signature.is_none()
            && self.additional.is_none()
            && self.or_media.is_none()
            && self.report_pdfs.is_none()
    }
}

/// Persists URL/slot pairs for an order. Object-store upload is the
/// caller's collaborator; only the resulting URLs arrive here.
#[derive(Clone)]
pub struct AttachmentService {
    db_pool: Arc<DbPool>,
}

impl AttachmentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Replaces the supplied slot groups for an order and leaves omitted
    /// groups untouched. Runs on the supplied connection so the lifecycle
    /// engine can include it in the submit transaction.
    #[instrument(skip(self, conn, slots), fields(order_id = %order_id))]
    pub async fn associate_photos<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
        slots: &PhotoSlots,
    ) -> Result<(), ServiceError> {
        self.replace_single(conn, order_id, PhotoSlot::LicensePlate, &slots.license_plate)
            .await?;
        self.replace_single(conn, order_id, PhotoSlot::VinPlate, &slots.vin_plate)
            .await?;
        self.replace_single(conn, order_id, PhotoSlot::Odometer, &slots.odometer)
            .await?;
        self.replace_single(
            conn,
            order_id,
            PhotoSlot::CustomerSignature,
            &slots.customer_signature,
        )
        .await?;

        if let Some(urls) = &slots.additional {
            self.replace_series(conn, order_id, "additional", urls, PhotoSlot::Additional)
                .await?;
        }
        if let Some(urls) = &slots.or_media {
            self.replace_series(conn, order_id, "or", urls, PhotoSlot::Or)
                .await?;
        }
        if let Some(urls) = &slots.report_pdfs {
            self.replace_series(conn, order_id, "report_pdf", urls, PhotoSlot::ReportPdf)
                .await?;
        }
        Ok(())
    }

    /// Lists all attachments for an order.
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_photo::Model>, ServiceError> {
        Ok(OrderPhoto::find()
            .filter(order_photo::Column::OrderId.eq(order_id))
            .all(&*self.db_pool)
            .await?)
    }

    async fn replace_single<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
        slot: PhotoSlot,
        url: &Option<String>,
    ) -> Result<(), ServiceError> {
        let Some(url) = url else { return Ok(()) };

        OrderPhoto::delete_many()
            .filter(order_photo::Column::OrderId.eq(order_id))
            .filter(order_photo::Column::Slot.eq(slot.as_slot_name()))
            .exec(conn)
            .await?;

        order_photo::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            slot: Set(slot.as_slot_name()),
            url: Set(url.clone()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    async fn replace_series<C: ConnectionTrait, F: Fn(u32) -> PhotoSlot>(
        &self,
        conn: &C,
        order_id: Uuid,
        prefix: &str,
        urls: &[String],
        make_slot: F,
    ) -> Result<(), ServiceError> {
        OrderPhoto::delete_many()
            .filter(order_photo::Column::OrderId.eq(order_id))
            .filter(order_photo::Column::Slot.like(format!("{prefix}_%")))
            .exec(conn)
            .await?;

        for (idx, url) in urls.iter().enumerate() {
            order_photo::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                slot: Set(make_slot(idx as u32).as_slot_name()),
                url: Set(url.clone()),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slots_detects_untouched_payload() {
        assert!(PhotoSlots::default().is_empty());
        let touched = PhotoSlots {
            odometer: Some("https://store/odo.jpg".into()),
            ..Default::default()
        };
        assert!(!touched.is_empty());
    }
}
