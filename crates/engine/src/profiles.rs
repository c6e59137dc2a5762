//! Influencer profile entity: the balance aggregate.
//!
//! `available_balance` never goes negative and is only ever touched by the
//! reserve/credit operations in `ops::balances`; there is no raw setter.
//! `total_earnings` is a lifetime counter that only grows.

use sea_orm::entity::prelude::*;

use crate::Money;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "influencer_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub display_name: String,
    pub available_balance: i64,
    pub total_earnings: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Read-only balance view handed to callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    pub available: Money,
    pub total_earnings: Money,
}

impl From<&Model> for Balance {
    fn from(model: &Model) -> Self {
        Self {
            available: Money::new(model.available_balance),
            total_earnings: Money::new(model.total_earnings),
        }
    }
}
