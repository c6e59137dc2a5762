//! Command structs for engine operations.
//!
//! These types group parameters for write operations (withdrawal requests,
//! admin decisions, earnings credits, sink rows), keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{Money, NotificationKind, PaymentDetails, PaymentMethod};

/// Request a withdrawal of `amount` from the caller's available balance.
#[derive(Clone, Debug)]
pub struct WithdrawalCmd {
    pub user_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub details: PaymentDetails,
}

impl WithdrawalCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        amount: Money,
        method: PaymentMethod,
        details: PaymentDetails,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            method,
            details,
        }
    }
}

/// What an admin decided about a pending transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Reject,
}

/// Result of processing a decision.
///
/// `refunded` reports whether a compensating credit ran; it is only ever
/// true when a withdrawal was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    Completed,
    Failed { refunded: bool },
}

/// Approve or reject a pending transaction.
#[derive(Clone, Debug)]
pub struct DecisionCmd {
    pub transaction_id: Uuid,
    pub admin_id: String,
    pub action: DecisionAction,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl DecisionCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid, admin_id: impl Into<String>, action: DecisionAction) -> Self {
        Self {
            transaction_id,
            admin_id: admin_id.into(),
            action,
            reason: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Credit a campaign payment to an influencer.
#[derive(Clone, Debug)]
pub struct EarningsCmd {
    pub user_id: String,
    pub amount: Money,
    pub description: Option<String>,
}

impl EarningsCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount: Money) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Persist a notification row for a user.
#[derive(Clone, Debug)]
pub struct NotificationCmd {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
}

impl NotificationCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            action_url: None,
            action_label: None,
        }
    }

    #[must_use]
    pub fn action(mut self, url: impl Into<String>, label: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self.action_label = Some(label.into());
        self
    }
}

/// Persist an audit log row.
#[derive(Clone, Debug)]
pub struct AuditCmd {
    pub user_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub changes: Option<serde_json::Value>,
    pub success: bool,
}

impl AuditCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            changes: None,
            success: true,
        }
    }

    #[must_use]
    pub fn changes(mut self, changes: serde_json::Value) -> Self {
        self.changes = Some(changes);
        self
    }

    #[must_use]
    pub fn success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }
}
