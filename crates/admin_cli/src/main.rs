use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    EarningsCmd, Engine, Money, TransactionFilter, TransactionKind, TransactionStatus, UserRole,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub email: String,
        pub password: String,
        pub role: String,
        pub full_name: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "payfluence_admin")]
#[command(about = "Admin utilities for Payfluence (bootstrap users, credit earnings)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./payfluence.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Earnings(Earnings),
    Withdrawals(Withdrawals),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    /// admin, brand, influencer, client or employee.
    #[arg(long)]
    role: String,
    #[arg(long)]
    full_name: Option<String>,
    /// Row id; generated when omitted.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug)]
struct Earnings {
    #[command(subcommand)]
    command: EarningsCommand,
}

#[derive(Subcommand, Debug)]
enum EarningsCommand {
    Credit(EarningsCreditArgs),
}

#[derive(Args, Debug)]
struct EarningsCreditArgs {
    #[arg(long)]
    user_id: String,
    /// Dollar amount, e.g. "250" or "99.50".
    #[arg(long)]
    amount: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct Withdrawals {
    #[command(subcommand)]
    command: WithdrawalsCommand,
}

#[derive(Subcommand, Debug)]
enum WithdrawalsCommand {
    /// List withdrawal requests still waiting for a decision.
    Pending,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let role = match UserRole::try_from(args.role.as_str()) {
                Ok(role) => role,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let password = prompt_password_twice()?;
            let id = args
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            if users::Entity::find_by_id(id.clone()).one(&db).await?.is_some() {
                eprintln!("user already exists: {id}");
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                id: Set(id.clone()),
                email: Set(args.email.clone()),
                password: Set(password),
                role: Set(role.as_str().to_string()),
                full_name: Set(args.full_name.clone()),
                created_at: Set(chrono::Utc::now()),
            };
            users::Entity::insert(user).exec(&db).await?;

            // Influencers need a profile row before they can earn or withdraw.
            if role == UserRole::Influencer {
                let display_name = args.full_name.unwrap_or_else(|| args.email.clone());
                let engine = Engine::builder().database(db.clone()).build().await?;
                engine.create_profile(&id, &display_name).await?;
            }

            println!("created user: {} ({id})", args.email);
        }
        Command::Earnings(Earnings {
            command: EarningsCommand::Credit(args),
        }) => {
            let amount = match args.amount.parse::<Money>() {
                Ok(amount) => amount,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let engine = Engine::builder().database(db.clone()).build().await?;
            let mut cmd = EarningsCmd::new(args.user_id.clone(), amount);
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            let tx = engine.credit_earnings(cmd).await?;

            println!("credited {} to {} ({})", tx.amount, args.user_id, tx.id);
        }
        Command::Withdrawals(Withdrawals {
            command: WithdrawalsCommand::Pending,
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let page = engine
                .list_transactions(TransactionFilter {
                    status: Some(TransactionStatus::Pending),
                    kind: Some(TransactionKind::Withdrawal),
                    ..TransactionFilter::default()
                })
                .await?;

            if page.transactions.is_empty() {
                println!("no pending withdrawals");
            } else {
                for row in &page.transactions {
                    let tx = &row.transaction;
                    println!(
                        "{}  {}  {}  {}  {}",
                        tx.id,
                        tx.created_at.format("%Y-%m-%d %H:%M"),
                        row.user_email.as_deref().unwrap_or("-"),
                        tx.amount,
                        tx.payment_method.map_or("-", |method| method.as_str()),
                    );
                }
                println!("{} pending withdrawal(s)", page.total);
            }
        }
    }

    Ok(())
}
