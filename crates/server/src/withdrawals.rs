//! Influencer withdrawal and balance API endpoints.

use api_types::withdrawal::{
    BalanceView, WithdrawalCreated, WithdrawalHistory, WithdrawalNew, WithdrawalView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, user};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> api_types::TransactionKind {
    match kind {
        engine::TransactionKind::Withdrawal => api_types::TransactionKind::Withdrawal,
        engine::TransactionKind::Payment => api_types::TransactionKind::Payment,
        engine::TransactionKind::Refund => api_types::TransactionKind::Refund,
    }
}

pub(crate) fn map_status(status: engine::TransactionStatus) -> api_types::TransactionStatus {
    match status {
        engine::TransactionStatus::Pending => api_types::TransactionStatus::Pending,
        engine::TransactionStatus::Completed => api_types::TransactionStatus::Completed,
        engine::TransactionStatus::Failed => api_types::TransactionStatus::Failed,
    }
}

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Usd => api_types::Currency::Usd,
    }
}

pub(crate) fn map_method(method: engine::PaymentMethod) -> api_types::PaymentMethod {
    match method {
        engine::PaymentMethod::BankTransfer => api_types::PaymentMethod::BankTransfer,
        engine::PaymentMethod::Paypal => api_types::PaymentMethod::Paypal,
        engine::PaymentMethod::Stripe => api_types::PaymentMethod::Stripe,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<WithdrawalNew>,
) -> Result<(StatusCode, Json<WithdrawalCreated>), ServerError> {
    let amount = engine::Money::from_dollars(payload.amount)?;
    let method = match payload.payment_method {
        api_types::PaymentMethod::BankTransfer => engine::PaymentMethod::BankTransfer,
        api_types::PaymentMethod::Paypal => engine::PaymentMethod::Paypal,
        api_types::PaymentMethod::Stripe => engine::PaymentMethod::Stripe,
    };
    let details = match payload.payment_details {
        api_types::PaymentDetails::BankTransfer {
            account_number,
            account_name,
            bank_name,
            routing_number,
        } => engine::PaymentDetails::BankTransfer {
            account_number,
            account_name,
            bank_name,
            routing_number,
        },
        api_types::PaymentDetails::Paypal { email } => engine::PaymentDetails::Paypal { email },
        api_types::PaymentDetails::Stripe { account_id } => {
            engine::PaymentDetails::Stripe { account_id }
        }
    };

    let tx = state
        .engine
        .request_withdrawal(engine::WithdrawalCmd::new(
            user.id.clone(),
            amount,
            method,
            details,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(WithdrawalCreated {
            message: "Withdrawal request submitted successfully".to_string(),
            transaction_id: tx.id,
            amount: tx.amount.as_dollars(),
            status: map_status(tx.status),
        }),
    ))
}

pub async fn history(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<WithdrawalHistory>, ServerError> {
    let rows = state.engine.list_withdrawals(&user.id).await?;

    let transactions = rows
        .into_iter()
        .map(|tx| WithdrawalView {
            id: tx.id,
            kind: map_kind(tx.kind),
            amount: tx.amount.as_dollars(),
            currency: map_currency(tx.currency),
            status: map_status(tx.status),
            payment_method: tx.payment_method.map(map_method),
            description: tx.description,
            failure_reason: tx.failure_reason,
            created_at: tx.created_at,
            processed_at: tx.processed_at,
        })
        .collect();

    Ok(Json(WithdrawalHistory { transactions }))
}

pub async fn balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BalanceView>, ServerError> {
    let balance = state.engine.profile_of(&user.id).await?;

    Ok(Json(BalanceView {
        available_balance: balance.available.as_dollars(),
        total_earnings: balance.total_earnings.as_dollars(),
    }))
}
