use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the counter row backing non-draft order numbers.
pub const ORDER_NUMBER_COUNTER: &str = "order_number";

/// Atomic sequence row. The lifecycle service increments `value` with an
/// UPDATE inside the submit transaction and reads it back; row locking
/// serializes concurrent submitters, so numbers are strictly increasing
/// (gap-tolerant on rollback).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
