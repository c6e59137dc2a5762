use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
}

/// Payment rails accepted for withdrawals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Paypal,
    Stripe,
}

impl PaymentMethod {
    /// Returns the canonical method string used by the engine/database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Paypal => "paypal",
            Self::Stripe => "stripe",
        }
    }
}

/// Destination account details for a withdrawal.
///
/// The variant is inferred from the field set and must match the declared
/// `payment_method`; the server rejects mismatches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentDetails {
    BankTransfer {
        account_number: String,
        account_name: String,
        bank_name: String,
        routing_number: String,
    },
    Paypal {
        email: String,
    },
    Stripe {
        account_id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Withdrawal,
    Payment,
    Refund,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Returns the canonical status string used by the engine/database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

pub mod withdrawal {
    use super::*;

    /// Request body for `POST /influencer/withdrawals`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalNew {
        /// Amount in dollars, at most two fractional digits.
        pub amount: f64,
        pub payment_method: PaymentMethod,
        pub payment_details: PaymentDetails,
    }

    /// Response body after a withdrawal request is accepted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalCreated {
        pub message: String,
        pub transaction_id: Uuid,
        /// Amount in dollars.
        pub amount: f64,
        pub status: TransactionStatus,
    }

    /// One row of the caller's withdrawal history.
    ///
    /// Payment details are intentionally absent: destination accounts are
    /// write-only through this API.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalView {
        pub id: Uuid,
        pub kind: TransactionKind,
        /// Amount in dollars.
        pub amount: f64,
        pub currency: Currency,
        pub status: TransactionStatus,
        pub payment_method: Option<PaymentMethod>,
        pub description: Option<String>,
        pub failure_reason: Option<String>,
        pub created_at: DateTime<Utc>,
        pub processed_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalHistory {
        pub transactions: Vec<WithdrawalView>,
    }

    /// Response body for `GET /influencer/balance`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        /// Spendable balance in dollars.
        pub available_balance: f64,
        /// Lifetime earnings in dollars.
        pub total_earnings: f64,
    }
}

pub mod admin {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DecisionAction {
        Approve,
        Reject,
    }

    /// Request body for `PUT /admin/transactions/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DecisionRequest {
        pub action: DecisionAction,
        /// Shown to the influencer when rejecting (max 500 chars).
        pub reason: Option<String>,
        /// Internal notes, never shown to the influencer (max 1000 chars).
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DecisionResponse {
        pub message: String,
        pub transaction: DecisionView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DecisionView {
        pub id: Uuid,
        pub status: TransactionStatus,
        /// Amount in dollars.
        pub amount: f64,
        pub kind: TransactionKind,
    }

    /// Query parameters for `GET /admin/transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub status: Option<TransactionStatus>,
        pub kind: Option<TransactionKind>,
        /// 1-based page number (default 1).
        pub page: Option<u64>,
        /// Rows per page, clamped server-side to 1..=100 (default 50).
        pub limit: Option<u64>,
    }

    /// A ledger row as shown to admins, enriched with its owner.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminTransactionView {
        pub id: Uuid,
        pub user_id: String,
        pub user_email: Option<String>,
        pub user_name: Option<String>,
        pub kind: TransactionKind,
        /// Amount in dollars.
        pub amount: f64,
        pub currency: Currency,
        pub status: TransactionStatus,
        pub payment_method: Option<PaymentMethod>,
        /// Destination account; admins need it to execute the payout.
        pub payment_details: Option<PaymentDetails>,
        pub description: Option<String>,
        pub failure_reason: Option<String>,
        pub admin_notes: Option<String>,
        pub processed_by: Option<String>,
        pub processed_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Pagination {
        pub page: u64,
        pub limit: u64,
        pub total: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<AdminTransactionView>,
        /// Count of pending rows across the whole ledger, ignoring filters.
        pub pending_count: u64,
        pub pagination: Pagination,
    }
}
