//! Withdrawal request operations.

use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    EngineError, Money, ResultEngine, Transaction, TransactionKind, WithdrawalCmd, transactions,
};

use super::{Engine, with_tx};

/// Minimum accepted withdrawal request.
pub const MIN_WITHDRAWAL: Money = Money::new(100);

const HISTORY_LIMIT: u64 = 50;

impl Engine {
    /// Creates a pending withdrawal and reserves its amount from the
    /// caller's available balance.
    ///
    /// Ledger insert and balance reservation run in one unit of work: when
    /// the reservation fails the insert rolls back with it, so a rejected
    /// request leaves no trace in the ledger.
    pub async fn request_withdrawal(&self, cmd: WithdrawalCmd) -> ResultEngine<Transaction> {
        if cmd.amount < MIN_WITHDRAWAL {
            return Err(EngineError::Validation(format!(
                "amount must be at least {MIN_WITHDRAWAL}"
            )));
        }
        cmd.details.ensure_matches(cmd.method)?;

        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, &cmd.user_id).await?;

            let tx = Transaction::withdrawal(
                cmd.user_id.clone(),
                cmd.amount,
                cmd.method,
                cmd.details.clone(),
                Utc::now(),
            )?;
            transactions::ActiveModel::try_from(&tx)?
                .insert(&db_tx)
                .await?;

            self.reserve_available(&db_tx, &cmd.user_id, cmd.amount)
                .await?;

            Ok(tx)
        })
    }

    /// Lists the caller's withdrawal requests, most recent first, capped at
    /// 50 rows.
    pub async fn list_withdrawals(&self, user_id: &str) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::Withdrawal.as_str()))
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(HISTORY_LIMIT)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }
}
