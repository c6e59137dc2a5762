use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    EarningsCmd, Engine, EngineError, Money, PaymentDetails, PaymentMethod, TransactionKind,
    TransactionStatus, WithdrawalCmd,
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

fn bank_details() -> PaymentDetails {
    PaymentDetails::BankTransfer {
        account_number: "000123456789".to_string(),
        account_name: "Creator".to_string(),
        bank_name: "First National".to_string(),
        routing_number: "110000000".to_string(),
    }
}

fn bank_withdrawal(user_id: &str, cents: i64) -> WithdrawalCmd {
    WithdrawalCmd::new(
        user_id,
        Money::new(cents),
        PaymentMethod::BankTransfer,
        bank_details(),
    )
}

async fn withdrawal_rows(db: &DatabaseConnection, user_id: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS n FROM transactions WHERE user_id = ? AND kind = 'withdrawal';",
            vec![user_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn withdrawal_reserves_balance_and_stays_pending() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 5_000).await;

    let tx = engine
        .request_withdrawal(bank_withdrawal("creator-1", 5_000))
        .await
        .unwrap();

    assert_eq!(tx.kind, TransactionKind::Withdrawal);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.amount, Money::new(5_000));
    assert_eq!(tx.payment_method, Some(PaymentMethod::BankTransfer));
    assert_eq!(
        tx.description.as_deref(),
        Some("Withdrawal request - bank_transfer")
    );

    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::ZERO);
    assert_eq!(withdrawal_rows(&db, "creator-1").await, 1);
}

#[tokio::test]
async fn overdraw_reports_shortfall_and_leaves_no_ledger_row() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 5_000).await;

    // One cent over the available balance.
    let err = engine
        .request_withdrawal(bank_withdrawal("creator-1", 5_001))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InsufficientBalance {
            available: Money::new(5_000),
            requested: Money::new(5_001),
        }
    );
    assert_eq!(
        err.to_string(),
        "Insufficient balance. Available: $50.00, Requested: $50.01"
    );

    // The rejected request must not leave a trace: the ledger insert rolls
    // back together with the failed reservation.
    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::new(5_000));
    assert_eq!(withdrawal_rows(&db, "creator-1").await, 0);
}

#[tokio::test]
async fn withdrawal_below_minimum_is_rejected() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 5_000).await;

    let err = engine
        .request_withdrawal(bank_withdrawal("creator-1", 99))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation("amount must be at least $1.00".to_string())
    );
    assert_eq!(withdrawal_rows(&db, "creator-1").await, 0);
}

#[tokio::test]
async fn withdrawal_without_profile_is_not_found() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();
    // User exists but never got an influencer profile.
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, email, password, role, created_at) VALUES (?, ?, ?, ?, ?)",
        vec![
            "brand-1".into(),
            "brand@example.com".into(),
            "password".into(),
            "brand".into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();

    let err = engine
        .request_withdrawal(bank_withdrawal("brand-1", 1_000))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("profile".to_string()));
    assert_eq!(err.to_string(), "profile not found");
}

#[tokio::test]
async fn mismatched_payment_details_are_rejected() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 5_000).await;

    let err = engine
        .request_withdrawal(WithdrawalCmd::new(
            "creator-1",
            Money::new(1_000),
            PaymentMethod::Paypal,
            bank_details(),
        ))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation("payment details do not match method paypal".to_string())
    );
    assert_eq!(withdrawal_rows(&db, "creator-1").await, 0);
}

#[tokio::test]
async fn concurrent_withdrawals_cannot_overdraw() {
    let (engine, db, path) = engine_with_file_db().await;
    seed_influencer(&db, "creator-1", 10_000).await;

    // Two $80 requests against a $100 balance. Whichever writes first wins;
    // the other rolls back entirely, whether it trips the balance guard or
    // loses the write race.
    let (a, b) = tokio::join!(
        engine.request_withdrawal(bank_withdrawal("creator-1", 8_000)),
        engine.request_withdrawal(bank_withdrawal("creator-1", 8_000)),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);

    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::new(2_000));
    assert_eq!(withdrawal_rows(&db, "creator-1").await, 1);

    drop(engine);
    drop(db);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn earnings_credit_grows_balance_and_lifetime_total() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 0).await;

    let tx = engine
        .credit_earnings(
            EarningsCmd::new("creator-1", Money::new(15_000)).description("Campaign payout"),
        )
        .await
        .unwrap();

    assert_eq!(tx.kind, TransactionKind::Payment);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.description.as_deref(), Some("Campaign payout"));

    let balance = engine.profile_of("creator-1").await.unwrap();
    assert_eq!(balance.available, Money::new(15_000));
    assert_eq!(balance.total_earnings, Money::new(15_000));
}

#[tokio::test]
async fn history_lists_only_own_withdrawals_newest_first() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 0).await;
    seed_influencer(&db, "creator-2", 0).await;

    let backend = db.get_database_backend();
    let base = Utc::now();
    for i in 0..3 {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO transactions \
             (id, user_id, kind, amount, currency, status, created_at, updated_at) \
             VALUES (?, ?, 'withdrawal', ?, 'USD', 'pending', ?, ?)",
            vec![
                Uuid::new_v4().to_string().into(),
                "creator-1".into(),
                (1_000 + i).into(),
                (base - Duration::seconds(i)).into(),
                (base - Duration::seconds(i)).into(),
            ],
        ))
        .await
        .unwrap();
    }
    // Another user's withdrawal and an earning of our own: both invisible.
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO transactions \
         (id, user_id, kind, amount, currency, status, created_at, updated_at) \
         VALUES (?, 'creator-2', 'withdrawal', 500, 'USD', 'pending', ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            base.into(),
            base.into(),
        ],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO transactions \
         (id, user_id, kind, amount, currency, status, created_at, updated_at) \
         VALUES (?, 'creator-1', 'payment', 700, 'USD', 'completed', ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            base.into(),
            base.into(),
        ],
    ))
    .await
    .unwrap();

    let history = engine.list_withdrawals("creator-1").await.unwrap();

    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|tx| tx.user_id == "creator-1"));
    assert!(
        history
            .iter()
            .all(|tx| tx.kind == TransactionKind::Withdrawal)
    );
    // Newest first: amounts were staggered one second apart.
    assert_eq!(history[0].amount, Money::new(1_000));
    assert_eq!(history[2].amount, Money::new(1_002));
}

#[tokio::test]
async fn history_is_capped_at_fifty_rows() {
    let (engine, db) = engine_with_db().await;
    seed_influencer(&db, "creator-1", 0).await;

    let backend = db.get_database_backend();
    let base = Utc::now();
    for i in 0..55i64 {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO transactions \
             (id, user_id, kind, amount, currency, status, created_at, updated_at) \
             VALUES (?, 'creator-1', 'withdrawal', ?, 'USD', 'pending', ?, ?)",
            vec![
                Uuid::new_v4().to_string().into(),
                (100 + i).into(),
                (base - Duration::seconds(i)).into(),
                (base - Duration::seconds(i)).into(),
            ],
        ))
        .await
        .unwrap();
    }

    let history = engine.list_withdrawals("creator-1").await.unwrap();

    assert_eq!(history.len(), 50);
    assert_eq!(history[0].amount, Money::new(100));
}
