pub use commands::{
    AuditCmd, DecisionAction, DecisionCmd, DecisionOutcome, EarningsCmd, NotificationCmd,
    WithdrawalCmd,
};
pub use currency::Currency;
pub use error::EngineError;
pub use money::Money;
pub use notifications::NotificationKind;
pub use ops::{
    DEFAULT_REJECT_REASON, Engine, EngineBuilder, MIN_WITHDRAWAL, TransactionFilter,
    TransactionPage, TransactionRow,
};
pub use payment::{PaymentDetails, PaymentMethod};
pub use profiles::Balance;
pub use transactions::{Transaction, TransactionKind, TransactionStatus};
pub use users::UserRole;

mod audit;
mod commands;
mod currency;
mod error;
mod money;
mod notifications;
mod ops;
mod payment;
mod profiles;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
