use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::json;
use uuid::Uuid;

use engine::{
    AuditCmd, DecisionAction, DecisionCmd, DecisionOutcome, Engine, EngineError, Money,
    NotificationCmd, NotificationKind, PaymentDetails, PaymentMethod, TransactionStatus,
    WithdrawalCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db, path)
}

async fn seed_influencer(db: &DatabaseConnection, user_id: &str, balance_cents: i64) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, email, password, role, full_name, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            user_id.into(),
            format!("{user_id}@example.com").into(),
            "password".into(),
            "influencer".into(),
            "Creator".into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO influencer_profiles \
         (user_id, display_name, available_balance, total_earnings, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            user_id.into(),
            "Creator".into(),
            balance_cents.into(),
            balance_cents.into(),
            Utc::now().into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
}

fn bank_withdrawal(user_id: &str, cents: i64) -> WithdrawalCmd {
    WithdrawalCmd::new(
        user_id,
        Money::new(cents),
        PaymentMethod::BankTransfer,
        PaymentDetails::BankTransfer {
            account_number: "000123456789".to_string(),
            account_name: "Creator".to_string(),
            bank_name: "First National".to_string(),
            routing_number: "110000000".to_string(),
        },
    )
}

async fn tx_status(db: &DatabaseConnection, id: Uuid) -> String {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT status FROM transactions WHERE id = ?;",
            vec![id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "status").unwrap()
}

#[tokio::test]
async fn approve_completes_without_touching_balance() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    let pending = engine
        .request_withdrawal(bank_withdrawal("creator-1", 3_000))
        .await
        .unwrap();

    let (tx, outcome) = engine
        .process_decision(
            DecisionCmd::new(pending.id, "admin-1", DecisionAction::Approve)
                .notes("Verified bank account"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, DecisionOutcome::Completed);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.processed_by.as_deref(), Some("admin-1"));
    assert!(tx.processed_at.is_some());
    assert_eq!(tx.admin_notes.as_deref(), Some("Verified bank account"));
    assert!(tx.failure_reason.is_none());

    // The reservation already happened at request time; approval pays it out.
    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::new(7_000));
}

#[tokio::test]
async fn reject_refunds_reserved_amount_and_records_reason() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    let pending = engine
        .request_withdrawal(bank_withdrawal("creator-1", 3_000))
        .await
        .unwrap();
    let reserved = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(reserved.available, Money::new(7_000));

    let (tx, outcome) = engine
        .process_decision(
            DecisionCmd::new(pending.id, "admin-1", DecisionAction::Reject)
                .reason("bad bank details"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, DecisionOutcome::Failed { refunded: true });
    assert_eq!(tx.status, TransactionStatus::Failed);
    assert_eq!(tx.failure_reason.as_deref(), Some("bad bank details"));
    assert!(tx.failed_at.is_some());

    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::new(10_000));
}

#[tokio::test]
async fn reject_without_reason_uses_default() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    let pending = engine
        .request_withdrawal(bank_withdrawal("creator-1", 3_000))
        .await
        .unwrap();

    let (tx, _) = engine
        .process_decision(DecisionCmd::new(pending.id, "admin-1", DecisionAction::Reject))
        .await
        .unwrap();

    assert_eq!(
        tx.failure_reason.as_deref(),
        Some("Rejected by administrator")
    );
}

#[tokio::test]
async fn terminal_rows_never_transition_again() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    let pending = engine
        .request_withdrawal(bank_withdrawal("creator-1", 3_000))
        .await
        .unwrap();

    engine
        .process_decision(DecisionCmd::new(pending.id, "admin-1", DecisionAction::Reject))
        .await
        .unwrap();
    let refunded = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(refunded.available, Money::new(10_000));

    // A failed row cannot be approved afterwards, and a second reject must
    // not refund twice.
    let err = engine
        .process_decision(DecisionCmd::new(pending.id, "admin-2", DecisionAction::Approve))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::AlreadyProcessed {
            status: TransactionStatus::Failed,
        }
    );
    assert_eq!(
        err.to_string(),
        "Transaction is already failed. Only pending transactions can be approved or rejected."
    );

    let err = engine
        .process_decision(DecisionCmd::new(pending.id, "admin-2", DecisionAction::Reject))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::AlreadyProcessed {
            status: TransactionStatus::Failed,
        }
    );

    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::new(10_000));
    assert_eq!(tx_status(&db, pending.id).await, "failed");
}

#[tokio::test]
async fn decision_on_unknown_transaction_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .process_decision(DecisionCmd::new(
            Uuid::new_v4(),
            "admin-1",
            DecisionAction::Approve,
        ))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("transaction".to_string()));
}

#[tokio::test]
async fn overlong_reason_is_rejected_before_any_write() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    let pending = engine
        .request_withdrawal(bank_withdrawal("creator-1", 3_000))
        .await
        .unwrap();

    let err = engine
        .process_decision(
            DecisionCmd::new(pending.id, "admin-1", DecisionAction::Reject)
                .reason("x".repeat(501)),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation("reason must be at most 500 characters".to_string())
    );
    assert_eq!(tx_status(&db, pending.id).await, "pending");
}

#[tokio::test]
async fn rejecting_non_withdrawal_skips_refund() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    // A pending refund row entered the ledger outside the withdrawal flow;
    // rejecting it must not credit anything.
    let refund_id = Uuid::new_v4();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO transactions \
         (id, user_id, kind, amount, currency, status, created_at, updated_at) \
         VALUES (?, 'creator-1', 'refund', 500, 'USD', 'pending', ?, ?)",
        vec![
            refund_id.to_string().into(),
            Utc::now().into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();

    let (tx, outcome) = engine
        .process_decision(DecisionCmd::new(refund_id, "admin-1", DecisionAction::Reject))
        .await
        .unwrap();

    assert_eq!(outcome, DecisionOutcome::Failed { refunded: false });
    assert_eq!(tx.status, TransactionStatus::Failed);

    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::new(10_000));
}

#[tokio::test]
async fn concurrent_decisions_pick_exactly_one_winner() {
    let (engine, db, path) = engine_with_file_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    let pending = engine
        .request_withdrawal(bank_withdrawal("creator-1", 3_000))
        .await
        .unwrap();

    let (approve, reject) = tokio::join!(
        engine.process_decision(DecisionCmd::new(
            pending.id,
            "admin-1",
            DecisionAction::Approve,
        )),
        engine.process_decision(DecisionCmd::new(
            pending.id,
            "admin-2",
            DecisionAction::Reject,
        )),
    );

    let successes = [approve.is_ok(), reject.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1);

    let balance = engine.profile_of("creator-1").await.unwrap();
    if approve.is_ok() {
        assert_eq!(tx_status(&db, pending.id).await, "completed");
        assert_eq!(balance.available, Money::new(7_000));
    } else {
        assert_eq!(tx_status(&db, pending.id).await, "failed");
        assert_eq!(balance.available, Money::new(10_000));
    }

    drop(engine);
    drop(db);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn notification_and_audit_rows_persist() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 0).await;

    let notification_id = engine
        .emit_notification(
            NotificationCmd::new(
                "creator-1",
                NotificationKind::Success,
                "Withdrawal Approved",
                "Your withdrawal of $30.00 has been approved and processed.",
            )
            .action("/influencer/earnings", "View Transactions"),
        )
        .await
        .unwrap();

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT kind, title, read, action_url FROM notifications WHERE id = ?;",
            vec![notification_id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.try_get::<String>("", "kind").unwrap(), "success");
    assert_eq!(
        row.try_get::<String>("", "title").unwrap(),
        "Withdrawal Approved"
    );
    assert!(!row.try_get::<bool>("", "read").unwrap());
    assert_eq!(
        row.try_get::<String>("", "action_url").unwrap(),
        "/influencer/earnings"
    );

    let audit_id = engine
        .record_audit(
            AuditCmd::new("creator-1", "transaction.approve", "transaction", "tx-1")
                .changes(json!({"status": {"from": "pending", "to": "completed"}})),
        )
        .await
        .unwrap();

    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT action, success, changes FROM audit_logs WHERE id = ?;",
            vec![audit_id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        row.try_get::<String>("", "action").unwrap(),
        "transaction.approve"
    );
    assert!(row.try_get::<bool>("", "success").unwrap());
    let changes: String = row.try_get("", "changes").unwrap();
    assert!(changes.contains("completed"));
}
