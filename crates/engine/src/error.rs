//! The module contains the error the engine can throw.
//!
//! `InsufficientBalance` and `AlreadyProcessed` carry their payload in the
//! display message because that exact text is part of the API contract.

use sea_orm::DbErr;
use thiserror::Error;

use crate::{Money, TransactionStatus};

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    KeyNotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Insufficient balance. Available: {available}, Requested: {requested}")]
    InsufficientBalance { available: Money, requested: Money },
    #[error(
        "Transaction is already {status}. Only pending transactions can be approved or rejected."
    )]
    AlreadyProcessed { status: TransactionStatus },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (
                Self::InsufficientBalance {
                    available: a1,
                    requested: r1,
                },
                Self::InsufficientBalance {
                    available: a2,
                    requested: r2,
                },
            ) => a1 == a2 && r1 == r2,
            (Self::AlreadyProcessed { status: a }, Self::AlreadyProcessed { status: b }) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
