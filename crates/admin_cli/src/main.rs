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
use engine::{Engine, EngineError, NewUser};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

type AdminResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "spendsplit_admin")]
#[command(about = "Admin utilities for Spendsplit (accounts and their expenses)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./spendsplit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Expense(Expense),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account; the password is asked twice on the terminal.
    Create(UserCreateArgs),
    /// Print every account.
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Expense {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// Print the expenses of one account, newest first.
    List(ExpenseListArgs),
}

#[derive(Args, Debug)]
struct ExpenseListArgs {
    #[arg(long)]
    user_id: i32,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> AdminResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(message: &str) -> AdminResult<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    out.flush()?;
    Ok(())
}

/// Read a line without echoing it, printing `*` per character.
fn prompt_hidden(prompt: &str) -> AdminResult<String> {
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
            KeyCode::Enter => break,
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
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

    execute!(out, Print("\r\n"))?;
    out.flush()?;
    Ok(buf)
}

async fn create_user(engine: &Engine, args: UserCreateArgs) -> AdminResult<()> {
    for _ in 0..3 {
        let password = prompt_hidden("Password: ")?;
        let confirm_password = prompt_hidden("Confirm password: ")?;

        let result = engine
            .register_user(NewUser {
                username: args.username.clone(),
                email: args.email.clone(),
                password,
                confirm_password,
            })
            .await;

        match result {
            Ok(user) => {
                println!("created user: {} (id {})", user.username, user.id);
                return Ok(());
            }
            Err(err @ (EngineError::PasswordMismatch | EngineError::InvalidInput(_))) => {
                print_line(&format!("{err}. Try again."))?;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> AdminResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> AdminResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => create_user(&engine, args).await?,
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.list_users().await? {
                println!("{}\t{}\t{}", user.id, user.username, user.email);
            }
        }
        Command::Expense(Expense {
            command: ExpenseCommand::List(args),
        }) => {
            let user = engine.user(args.user_id).await?;
            println!("expenses of {}:", user.username);
            for expense in engine.list_expenses_for_user(user.id).await? {
                println!(
                    "{}\t{}\t{}\t{:.2}\t/{} = {:.2}",
                    expense.id,
                    engine.local_date(expense.spent_at).format("%Y-%m-%d"),
                    expense.title,
                    expense.amount,
                    expense.split_with,
                    expense.per_person
                );
            }
        }
    }

    Ok(())
}
