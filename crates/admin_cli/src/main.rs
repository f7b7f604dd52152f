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
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

const DEMO_USERNAME: &str = "demouser";
const DEMO_PASSWORD: &str = "demopassword";
const DEMO_EMAIL: &str = "demo@example.com";

#[derive(Parser, Debug)]
#[command(name = "pocketbook_admin")]
#[command(about = "Admin utilities for Pocketbook (bootstrap users and categories)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./pocketbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Create the demo login (demouser / demopassword) with default categories.
    Demo,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a login; the password is read from the terminal.
    Create(UserCreateArgs),
    /// Add the default income and expense categories a user is missing.
    SeedCategories(SeedArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long)]
    username: String,
}

/// Keeps the terminal in raw mode for as long as it lives.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn say(out: &mut impl Write, message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message)
    )?;
    out.flush()?;
    Ok(())
}

fn end_line(out: &mut impl Write) -> Result<(), Box<dyn Error + Send + Sync>> {
    execute!(out, Print("\r\n"))?;
    out.flush()?;
    Ok(())
}

/// Reads one line from the terminal without echoing it.
fn read_secret(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    let _raw = RawMode::enable()?;
    say(&mut out, prompt)?;

    let mut secret = String::new();
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
                secret.pop();
            }
            KeyCode::Esc => {
                end_line(&mut out)?;
                return Err("cancelled".into());
            }
            KeyCode::Char('c' | 'd') if modifiers.contains(KeyModifiers::CONTROL) => {
                end_line(&mut out)?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => secret.push(ch),
            _ => {}
        }
    }
    end_line(&mut out)?;
    Ok(secret)
}

/// Asks for a new password and its confirmation, up to three times.
fn prompt_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let password = read_secret("New password: ")?;
        if password.is_empty() {
            say(&mut out, "The password cannot be empty.\r\n")?;
            continue;
        }
        if read_secret("Repeat password: ")? == password {
            return Ok(password);
        }
        say(&mut out, "The passwords differ, try again.\r\n")?;
    }
    Err("no matching password after three attempts".into())
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
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;

            match engine
                .create_user(&args.username, args.email.as_deref(), &password)
                .await
            {
                Ok(user) => println!("created user: {}", user.username),
                Err(EngineError::ExistingUser(username)) => {
                    eprintln!("user already exists: {username}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::SeedCategories(args),
        }) => match engine.seed_default_categories(&args.username).await {
            Ok(created) => println!("created {created} categories for {}", args.username),
            Err(EngineError::KeyNotFound(_)) => {
                eprintln!("user not found: {}", args.username);
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        },
        Command::Demo => {
            match engine
                .create_user(DEMO_USERNAME, Some(DEMO_EMAIL), DEMO_PASSWORD)
                .await
            {
                Ok(_) => println!("demo user created"),
                Err(EngineError::ExistingUser(_)) => println!("demo user already exists"),
                Err(err) => return Err(err.into()),
            }
            let created = engine.seed_default_categories(DEMO_USERNAME).await?;
            println!("created {created} default categories");
            println!("username: {DEMO_USERNAME}");
            println!("password: {DEMO_PASSWORD}");
        }
    }

    Ok(())
}
