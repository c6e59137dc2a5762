//! Balance aggregate operations.
//!
//! `available_balance` has exactly two mutators: `reserve_available`
//! (withdrawal request) and `credit_available` (compensation / earnings).
//! Both are conditional UPDATEs so the non-negativity invariant holds even
//! when two requests race: the losing UPDATE matches zero rows and the
//! caller's whole unit of work rolls back.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EarningsCmd, EngineError, Money, ResultEngine, Transaction, profiles, transactions,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Reserves `amount` from the user's available balance.
    ///
    /// The decrement only applies when `available_balance >= amount`; on a
    /// zero-row update the current balance is re-read inside the same
    /// transaction to build the error payload.
    pub(super) async fn reserve_available(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        amount: Money,
    ) -> ResultEngine<()> {
        let result = profiles::Entity::update_many()
            .col_expr(
                profiles::Column::AvailableBalance,
                Expr::col(profiles::Column::AvailableBalance).sub(amount.cents()),
            )
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::UserId.eq(user_id.to_string()))
            .filter(profiles::Column::AvailableBalance.gte(amount.cents()))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            let profile = self.require_profile(db, user_id).await?;
            return Err(EngineError::InsufficientBalance {
                available: Money::new(profile.available_balance),
                requested: amount,
            });
        }
        Ok(())
    }

    /// Credits `amount` back to the user's available balance.
    pub(super) async fn credit_available(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        amount: Money,
    ) -> ResultEngine<()> {
        let result = profiles::Entity::update_many()
            .col_expr(
                profiles::Column::AvailableBalance,
                Expr::col(profiles::Column::AvailableBalance).add(amount.cents()),
            )
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::UserId.eq(user_id.to_string()))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("profile".to_string()));
        }
        Ok(())
    }

    /// Creates an empty profile for a user.
    pub async fn create_profile(&self, user_id: &str, display_name: &str) -> ResultEngine<()> {
        let display_name = normalize_required_name(display_name, "display name")?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let existing = profiles::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::Validation(
                    "profile already exists".to_string(),
                ));
            }

            let now = Utc::now();
            profiles::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                display_name: ActiveValue::Set(display_name),
                available_balance: ActiveValue::Set(0),
                total_earnings: ActiveValue::Set(0),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Returns the balance view of a profile.
    pub async fn profile_of(&self, user_id: &str) -> ResultEngine<crate::Balance> {
        let model = profiles::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("profile".to_string()))?;
        Ok(crate::Balance::from(&model))
    }

    /// Records a completed campaign payment and credits both the available
    /// balance and the lifetime earnings counter.
    ///
    /// This is how money enters the payout subsystem.
    pub async fn credit_earnings(&self, cmd: EarningsCmd) -> ResultEngine<Transaction> {
        let description = normalize_optional_text(cmd.description.as_deref(), "description", 500)?;

        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, &cmd.user_id).await?;

            let tx = Transaction::earning(
                cmd.user_id.clone(),
                cmd.amount,
                description.clone(),
                Utc::now(),
            )?;
            transactions::ActiveModel::try_from(&tx)?.insert(&db_tx).await?;

            profiles::Entity::update_many()
                .col_expr(
                    profiles::Column::AvailableBalance,
                    Expr::col(profiles::Column::AvailableBalance).add(cmd.amount.cents()),
                )
                .col_expr(
                    profiles::Column::TotalEarnings,
                    Expr::col(profiles::Column::TotalEarnings).add(cmd.amount.cents()),
                )
                .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(profiles::Column::UserId.eq(cmd.user_id.clone()))
                .exec(&db_tx)
                .await?;

            Ok(tx)
        })
    }
}
