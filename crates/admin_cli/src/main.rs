use std::{error::Error, io::Write};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{CloseRegisterCmd, Currency, Engine, Money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "mostrador_admin")]
#[command(about = "Admin utilities for Mostrador (users, register day checks and closings)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./mostrador.db?mode=rwc"
    )]
    database_url: String,

    /// IANA timezone of the register.
    #[arg(long, env = "MOSTRADOR_TIMEZONE", default_value = "America/Argentina/Buenos_Aires")]
    timezone: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Register(Register),
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
    username: String,
}

#[derive(Args, Debug)]
struct Register {
    #[command(subcommand)]
    command: RegisterCommand,
}

#[derive(Subcommand, Debug)]
enum RegisterCommand {
    /// Print the balance of a business day.
    Balance(BalanceArgs),
    /// Close the register for a business day.
    Close(CloseArgs),
}

#[derive(Args, Debug)]
struct BalanceArgs {
    /// Business day (`YYYY-MM-DD`), today when omitted.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct CloseArgs {
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Cash physically counted, e.g. `1500,50`.
    #[arg(long, value_parser = parse_money)]
    counted: Money,
    /// Compare against a single bucket instead of the grand total.
    #[arg(long, value_parser = parse_currency)]
    currency: Option<Currency>,
    #[arg(long)]
    notes: Option<String>,
    /// Closing user. Must exist.
    #[arg(long)]
    user: String,
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse::<Money>().map_err(|err| err.to_string())
}

/// Disables raw mode when dropped, even if the prompt bails out early.
struct RawTerminal;

impl RawTerminal {
    fn enable() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Prints `text` on a fresh line of stderr.
fn say(text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut err = std::io::stderr();
    execute!(
        err,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(text)
    )?;
    err.flush()?;
    Ok(())
}

/// Reads a line without echoing it, printing `*` per character.
fn read_secret(label: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawTerminal::enable()?;
    say(label)?;

    let mut err = std::io::stderr();
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Enter => break,
            KeyCode::Char('c') if ctrl => {
                execute!(err, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Backspace => {
                if secret.pop().is_none() {
                    continue;
                }
                execute!(err, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char(ch) if !ctrl => {
                secret.push(ch);
                execute!(err, Print("*"))?;
            }
            _ => continue,
        }
        err.flush()?;
    }

    execute!(err, Print("\r\n"))?;
    err.flush()?;
    Ok(secret)
}

/// Asks for a new password and its confirmation, three attempts at most.
fn new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let password = read_secret("Password: ")?;
        if password.is_empty() {
            say("Password must not be empty.\r\n")?;
        } else if read_secret("Confirm password: ")? == password {
            return Ok(password);
        } else {
            say("Passwords do not match. Try again.\r\n")?;
        }
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

fn today(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let timezone: Tz = cli
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {}: {err}", cli.timezone))?;
    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = new_password()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Register(Register {
            command: RegisterCommand::Balance(args),
        }) => {
            let engine = Engine::builder()
                .database(db.clone())
                .timezone(timezone)
                .build()
                .await?;
            let date = args.date.unwrap_or_else(|| today(timezone));
            let balance = engine.balance_for_day(date).await?;

            println!("balance for {date} ({timezone})");
            for (currency, bucket) in balance.iter() {
                println!(
                    "{:<18} income {:>12} expense {:>12} receivable {:>12} payable {:>12} balance {:>12}",
                    currency.code(),
                    bucket.income.to_string(),
                    bucket.expense.to_string(),
                    bucket.receivable.to_string(),
                    bucket.payable.to_string(),
                    bucket.balance.to_string()
                );
            }
            println!("total {}", balance.total());
        }
        Command::Register(Register {
            command: RegisterCommand::Close(args),
        }) => {
            if users::Entity::find_by_id(args.user.clone())
                .one(&db)
                .await?
                .is_none()
            {
                eprintln!("user not found: {}", args.user);
                std::process::exit(1);
            }

            let engine = Engine::builder()
                .database(db.clone())
                .timezone(timezone)
                .build()
                .await?;
            let date = args.date.unwrap_or_else(|| today(timezone));
            let mut cmd = CloseRegisterCmd::new(date, args.user, args.counted, Utc::now());
            if let Some(currency) = args.currency {
                cmd = cmd.currency(currency);
            }
            if let Some(notes) = args.notes {
                cmd = cmd.notes(notes);
            }

            let closing = engine.close_register(cmd).await?;
            println!(
                "closed {date}: {} (counted {}, calculated {}, difference {})",
                closing.status.as_str(),
                closing.counted,
                closing.calculated,
                closing.difference
            );
            println!("closing id: {}", closing.id);
        }
    }

    Ok(())
}
