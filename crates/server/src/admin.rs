//! Admin transaction review API endpoints.

use api_types::admin::{
    AdminTransactionView, DecisionAction, DecisionRequest, DecisionResponse, DecisionView,
    Pagination, TransactionListQuery, TransactionListResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    ServerError, server::ServerState, user,
    withdrawals::{map_currency, map_kind, map_method, map_status},
};

fn map_details(details: engine::PaymentDetails) -> api_types::PaymentDetails {
    match details {
        engine::PaymentDetails::BankTransfer {
            account_number,
            account_name,
            bank_name,
            routing_number,
        } => api_types::PaymentDetails::BankTransfer {
            account_number,
            account_name,
            bank_name,
            routing_number,
        },
        engine::PaymentDetails::Paypal { email } => api_types::PaymentDetails::Paypal { email },
        engine::PaymentDetails::Stripe { account_id } => {
            api_types::PaymentDetails::Stripe { account_id }
        }
    }
}

/// Writes the notification and audit rows for a processed decision.
///
/// Runs after the decision has committed; failures are logged and never
/// surfaced to the caller.
async fn emit_decision_records(
    state: &ServerState,
    admin_id: &str,
    tx: &engine::Transaction,
    outcome: engine::DecisionOutcome,
) {
    let notification = match outcome {
        engine::DecisionOutcome::Completed => engine::NotificationCmd::new(
            tx.user_id.clone(),
            engine::NotificationKind::Success,
            "Withdrawal Approved",
            format!(
                "Your withdrawal of {} has been approved and processed.",
                tx.amount
            ),
        ),
        engine::DecisionOutcome::Failed { .. } => engine::NotificationCmd::new(
            tx.user_id.clone(),
            engine::NotificationKind::Warning,
            "Withdrawal Rejected",
            format!(
                "Your withdrawal of {} has been rejected. Reason: {}",
                tx.amount,
                tx.failure_reason
                    .as_deref()
                    .unwrap_or(engine::DEFAULT_REJECT_REASON)
            ),
        ),
    }
    .action("/influencer/earnings", "View Transactions");

    if let Err(err) = state.engine.emit_notification(notification).await {
        tracing::warn!("failed to emit decision notification: {err}");
    }

    let (action, after) = match outcome {
        engine::DecisionOutcome::Completed => (
            "transaction.approve",
            json!({
                "status": tx.status.as_str(),
                "processed_by": admin_id,
                "failure_reason": tx.failure_reason,
            }),
        ),
        engine::DecisionOutcome::Failed { refunded } => (
            "transaction.reject",
            json!({
                "status": tx.status.as_str(),
                "processed_by": admin_id,
                "failure_reason": tx.failure_reason,
                "refunded": refunded,
                "refund_amount": tx.amount.as_dollars(),
            }),
        ),
    };

    let audit = engine::AuditCmd::new(admin_id, action, "transaction", tx.id.to_string())
        .changes(json!({ "before": { "status": "pending" }, "after": after }));

    if let Err(err) = state.engine.record_audit(audit).await {
        tracing::warn!("failed to record decision audit: {err}");
    }
}

pub async fn decide(
    Extension(admin): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ServerError> {
    let id: Uuid = id
        .parse()
        .map_err(|_| ServerError::Generic("Invalid transaction ID".to_string()))?;

    let action = match payload.action {
        DecisionAction::Approve => engine::DecisionAction::Approve,
        DecisionAction::Reject => engine::DecisionAction::Reject,
    };

    let mut cmd = engine::DecisionCmd::new(id, admin.id.clone(), action);
    if let Some(reason) = payload.reason {
        cmd = cmd.reason(reason);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let (tx, outcome) = state.engine.process_decision(cmd).await?;

    emit_decision_records(&state, &admin.id, &tx, outcome).await;

    let message = match outcome {
        engine::DecisionOutcome::Completed => {
            tracing::info!("transaction {} approved by {}", tx.id, admin.id);
            "Transaction approved successfully"
        }
        engine::DecisionOutcome::Failed { refunded } => {
            tracing::info!(
                "transaction {} rejected by {} (refunded: {refunded})",
                tx.id,
                admin.id
            );
            "Transaction rejected successfully"
        }
    };

    Ok(Json(DecisionResponse {
        message: message.to_string(),
        transaction: DecisionView {
            id: tx.id,
            status: map_status(tx.status),
            amount: tx.amount.as_dollars(),
            kind: map_kind(tx.kind),
        },
    }))
}

pub async fn list(
    Extension(_admin): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = engine::TransactionFilter {
        status: query.status.map(|status| match status {
            api_types::TransactionStatus::Pending => engine::TransactionStatus::Pending,
            api_types::TransactionStatus::Completed => engine::TransactionStatus::Completed,
            api_types::TransactionStatus::Failed => engine::TransactionStatus::Failed,
        }),
        kind: query.kind.map(|kind| match kind {
            api_types::TransactionKind::Withdrawal => engine::TransactionKind::Withdrawal,
            api_types::TransactionKind::Payment => engine::TransactionKind::Payment,
            api_types::TransactionKind::Refund => engine::TransactionKind::Refund,
        }),
        page: query.page,
        limit: query.limit,
    };

    let page = state.engine.list_transactions(filter).await?;

    let transactions = page
        .transactions
        .into_iter()
        .map(|row| {
            let tx = row.transaction;
            AdminTransactionView {
                id: tx.id,
                user_id: tx.user_id,
                user_email: row.user_email,
                user_name: row.user_name,
                kind: map_kind(tx.kind),
                amount: tx.amount.as_dollars(),
                currency: map_currency(tx.currency),
                status: map_status(tx.status),
                payment_method: tx.payment_method.map(map_method),
                payment_details: tx.payment_details.map(map_details),
                description: tx.description,
                failure_reason: tx.failure_reason,
                admin_notes: tx.admin_notes,
                processed_by: tx.processed_by,
                processed_at: tx.processed_at,
                created_at: tx.created_at,
            }
        })
        .collect();

    Ok(Json(TransactionListResponse {
        transactions,
        pending_count: page.pending_count,
        pagination: Pagination {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        },
    }))
}
