//! Ledger primitives.
//!
//! A `Transaction` is an immutable money event on an influencer account:
//! withdrawal requests, campaign payments, refunds. Rows are never deleted;
//! `completed` and `failed` are terminal states and a terminal row never
//! transitions again.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, PaymentDetails, PaymentMethod, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Withdrawal,
    Payment,
    Refund,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::Payment => "payment",
            Self::Refund => "refund",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "withdrawal" => Ok(Self::Withdrawal),
            "payment" => Ok(Self::Payment),
            "refund" => Ok(Self::Refund),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Terminal rows never transition again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl core::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::Validation(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: Money,
    pub currency: Currency,
    pub status: TransactionStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_details: Option<PaymentDetails>,
    pub description: Option<String>,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    fn new(
        user_id: String,
        kind: TransactionKind,
        status: TransactionStatus,
        amount: Money,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            amount,
            currency: Currency::Usd,
            status,
            payment_method: None,
            payment_details: None,
            description: None,
            processed_by: None,
            processed_at: None,
            failed_at: None,
            failure_reason: None,
            admin_notes: None,
            created_at,
            updated_at: created_at,
        })
    }

    /// A pending withdrawal request against the caller's available balance.
    pub fn withdrawal(
        user_id: String,
        amount: Money,
        method: PaymentMethod,
        details: PaymentDetails,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        details.ensure_matches(method)?;
        let mut tx = Self::new(
            user_id,
            TransactionKind::Withdrawal,
            TransactionStatus::Pending,
            amount,
            created_at,
        )?;
        tx.payment_method = Some(method);
        tx.payment_details = Some(details);
        tx.description = Some(format!("Withdrawal request - {}", method.as_str()));
        Ok(tx)
    }

    /// A completed campaign payment crediting the influencer.
    pub fn earning(
        user_id: String,
        amount: Money,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let mut tx = Self::new(
            user_id,
            TransactionKind::Payment,
            TransactionStatus::Completed,
            amount,
            created_at,
        )?;
        tx.description = description;
        Ok(tx)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub payment_details: Option<String>,
    pub description: Option<String>,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTimeUtc>,
    pub failed_at: Option<DateTimeUtc>,
    pub failure_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Transaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &Transaction) -> Result<Self, Self::Error> {
        let payment_details = tx
            .payment_details
            .as_ref()
            .map(PaymentDetails::to_db_json)
            .transpose()?;
        Ok(Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount.cents()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            payment_method: ActiveValue::Set(
                tx.payment_method.map(|m| m.as_str().to_string()),
            ),
            payment_details: ActiveValue::Set(payment_details),
            description: ActiveValue::Set(tx.description.clone()),
            processed_by: ActiveValue::Set(tx.processed_by.clone()),
            processed_at: ActiveValue::Set(tx.processed_at),
            failed_at: ActiveValue::Set(tx.failed_at),
            failure_reason: ActiveValue::Set(tx.failure_reason.clone()),
            admin_notes: ActiveValue::Set(tx.admin_notes.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        })
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction".to_string()))?,
            user_id: model.user_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount),
            currency: Currency::try_from(model.currency.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            payment_method: model
                .payment_method
                .as_deref()
                .map(PaymentMethod::try_from)
                .transpose()?,
            payment_details: model
                .payment_details
                .as_deref()
                .map(PaymentDetails::from_db_json)
                .transpose()?,
            description: model.description,
            processed_by: model.processed_by,
            processed_at: model.processed_at,
            failed_at: model.failed_at,
            failure_reason: model.failure_reason,
            admin_notes: model.admin_notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
