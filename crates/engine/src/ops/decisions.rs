//! Admin decision processing.
//!
//! Approving or rejecting a pending transaction and the compensating credit
//! for a rejected withdrawal are one unit of work: either the status
//! transition and the refund both land, or neither does.

use chrono::Utc;
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    DecisionAction, DecisionCmd, DecisionOutcome, EngineError, ResultEngine, Transaction,
    TransactionKind, TransactionStatus, transactions, users,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Stored as `failure_reason` when an admin rejects without giving one.
pub const DEFAULT_REJECT_REASON: &str = "Rejected by administrator";

/// Filters for the admin transaction listing.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    /// 1-based page number (default 1).
    pub page: Option<u64>,
    /// Rows per page, clamped to 1..=100 (default 50).
    pub limit: Option<u64>,
}

/// A ledger row enriched with its owner for admin display.
#[derive(Clone, Debug)]
pub struct TransactionRow {
    pub transaction: Transaction,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRow>,
    /// Global count of pending rows, independent of the filters.
    pub pending_count: u64,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Engine {
    /// Applies an admin decision to a pending transaction.
    ///
    /// The status transition is a conditional UPDATE with `status =
    /// 'pending'` in the predicate, so a terminal row can never transition
    /// again even when two admins decide concurrently: the loser matches
    /// zero rows and gets `AlreadyProcessed` with the current status.
    /// Rejecting a withdrawal credits the reserved amount back inside the
    /// same transaction.
    pub async fn process_decision(
        &self,
        cmd: DecisionCmd,
    ) -> ResultEngine<(Transaction, DecisionOutcome)> {
        let reason = normalize_optional_text(cmd.reason.as_deref(), "reason", 500)?;
        let notes = normalize_optional_text(cmd.notes.as_deref(), "notes", 1000)?;

        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, cmd.transaction_id).await?;
            let tx = Transaction::try_from(model)?;
            if tx.status != TransactionStatus::Pending {
                return Err(EngineError::AlreadyProcessed { status: tx.status });
            }

            let now = Utc::now();
            let new_status = match cmd.action {
                DecisionAction::Approve => TransactionStatus::Completed,
                DecisionAction::Reject => TransactionStatus::Failed,
            };

            let mut active = transactions::ActiveModel {
                status: ActiveValue::Set(new_status.as_str().to_string()),
                processed_by: ActiveValue::Set(Some(cmd.admin_id.clone())),
                processed_at: ActiveValue::Set(Some(now)),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            if let Some(notes) = &notes {
                active.admin_notes = ActiveValue::Set(Some(notes.clone()));
            }
            if cmd.action == DecisionAction::Reject {
                active.failure_reason = ActiveValue::Set(Some(
                    reason
                        .clone()
                        .unwrap_or_else(|| DEFAULT_REJECT_REASON.to_string()),
                ));
                active.failed_at = ActiveValue::Set(Some(now));
            }

            let result = transactions::Entity::update_many()
                .set(active)
                .filter(transactions::Column::Id.eq(cmd.transaction_id.to_string()))
                .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                // Lost a race with another decision on the same row.
                let current = self.require_transaction(&db_tx, cmd.transaction_id).await?;
                return Err(EngineError::AlreadyProcessed {
                    status: TransactionStatus::try_from(current.status.as_str())?,
                });
            }

            let outcome = match cmd.action {
                DecisionAction::Approve => DecisionOutcome::Completed,
                DecisionAction::Reject => {
                    let refunded = tx.kind == TransactionKind::Withdrawal;
                    if refunded {
                        self.credit_available(&db_tx, &tx.user_id, tx.amount).await?;
                    }
                    DecisionOutcome::Failed { refunded }
                }
            };

            let updated = self.require_transaction(&db_tx, cmd.transaction_id).await?;
            Ok((Transaction::try_from(updated)?, outcome))
        })
    }

    /// Lists ledger rows for admin review, newest first, enriched with the
    /// owning user.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> ResultEngine<TransactionPage> {
        let limit = filter.limit.unwrap_or(50).clamp(1, 100);
        let page = filter.page.unwrap_or(1).max(1);

        let mut query = transactions::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(transactions::Column::Status.eq(status.as_str()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }

        let total = query.clone().count(&self.database).await?;

        let rows: Vec<(transactions::Model, Option<users::Model>)> = query
            .order_by_desc(transactions::Column::CreatedAt)
            .offset((page - 1) * limit)
            .limit(limit)
            .find_also_related(users::Entity)
            .all(&self.database)
            .await?;

        let pending_count = transactions::Entity::find()
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .count(&self.database)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (tx_model, user_model) in rows {
            let transaction = Transaction::try_from(tx_model)?;
            out.push(TransactionRow {
                transaction,
                user_email: user_model.as_ref().map(|u| u.email.clone()),
                user_name: user_model.and_then(|u| u.full_name),
            });
        }

        Ok(TransactionPage {
            transactions: out,
            pending_count,
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        })
    }
}
