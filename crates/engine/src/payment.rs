//! Payout destination primitives.
//!
//! `PaymentDetails` is a tagged union aligned with `PaymentMethod`: a bank
//! transfer carries account coordinates, PayPal an email, Stripe a connected
//! account id. The engine stores details as JSON text on the ledger row and
//! treats the content as opaque beyond the method match; admin surfaces are
//! the only readers.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Paypal,
    Stripe,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Paypal => "paypal",
            Self::Stripe => "stripe",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bank_transfer" => Ok(Self::BankTransfer),
            "paypal" => Ok(Self::Paypal),
            "stripe" => Ok(Self::Stripe),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
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

impl PaymentDetails {
    /// The method this destination belongs to.
    #[must_use]
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::BankTransfer { .. } => PaymentMethod::BankTransfer,
            Self::Paypal { .. } => PaymentMethod::Paypal,
            Self::Stripe { .. } => PaymentMethod::Stripe,
        }
    }

    /// Rejects a details payload whose variant does not match the declared
    /// method.
    pub fn ensure_matches(&self, method: PaymentMethod) -> ResultEngine<()> {
        if self.method() != method {
            return Err(EngineError::Validation(format!(
                "payment details do not match method {}",
                method.as_str()
            )));
        }
        Ok(())
    }

    pub(crate) fn to_db_json(&self) -> ResultEngine<String> {
        serde_json::to_string(self)
            .map_err(|err| EngineError::Validation(format!("invalid payment details: {err}")))
    }

    pub(crate) fn from_db_json(raw: &str) -> ResultEngine<Self> {
        serde_json::from_str(raw)
            .map_err(|err| EngineError::Validation(format!("invalid payment details: {err}")))
    }
}
