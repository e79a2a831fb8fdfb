//! Administrative tasks against the campus Q&A database.
//!
//! `qa-admin migrate` applies pending migrations; `create-superuser` reads the
//! password from standard input; `activate` and `deactivate` toggle login for
//! an account by roll number.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, BufRead};
use std::sync::Arc;

use campus_qa::domain::AccountService;
use campus_qa::domain::ports::{AccountAdministration, RegisterAccountRequest};
use campus_qa::domain::{EmailPolicy, RegistrationInput};
use campus_qa::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselDepartmentRepository, PoolConfig,
    run_pending_migrations,
};
use campus_qa::outbound::security::Argon2PasswordHasher;
use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tokio::runtime::Builder;

const DATABASE_URL_ENV: &str = "CAMPUS_QA_DATABASE_URL";

/// `qa-admin` command line.
#[derive(Debug, Parser)]
#[command(name = "qa-admin", about = "Campus Q&A administration", version)]
struct Cli {
    /// Database connection URL. Falls back to `CAMPUS_QA_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Create an active staff superuser.
    CreateSuperuser(SuperuserArgs),
    /// Allow an account to log in.
    Activate {
        #[arg(value_name = "roll-number")]
        roll_number: String,
    },
    /// Stop an account from logging in.
    Deactivate {
        #[arg(value_name = "roll-number")]
        roll_number: String,
    },
}

#[derive(Debug, Args)]
struct SuperuserArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long = "first-name")]
    first_name: String,
    #[arg(long = "middle-name")]
    middle_name: Option<String>,
    #[arg(long = "last-name")]
    last_name: String,
    /// Date of birth as `YYYY-MM-DD`.
    #[arg(long = "date-of-birth")]
    date_of_birth: String,
    #[arg(long = "grad-year")]
    grad_year: i32,
    #[arg(long = "roll-number")]
    roll_number: String,
    #[arg(long)]
    phone: String,
    /// Department id.
    #[arg(long)]
    department: i32,
    /// Staff flag; superusers must be staff.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    staff: bool,
}

impl From<SuperuserArgs> for RegistrationInput {
    fn from(args: SuperuserArgs) -> Self {
        Self {
            email: Some(args.email),
            username: Some(args.username),
            first_name: Some(args.first_name),
            middle_name: args.middle_name,
            last_name: Some(args.last_name),
            date_of_birth: Some(args.date_of_birth),
            grad_year: Some(args.grad_year),
            roll_number: Some(args.roll_number),
            phone: Some(args.phone),
            department: Some(args.department),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let database_url = resolve_database_url(cli.database_url, env::var(DATABASE_URL_ENV).ok())?;

    if let Command::Migrate = cli.command {
        let applied = run_pending_migrations(&database_url)
            .await
            .wrap_err("migration failed")?;
        println!("applied {applied} migration(s)");
        return Ok(());
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .wrap_err("failed to create database pool")?;
    let service = AccountService::new(
        Arc::new(DieselAccountRepository::new(pool.clone())),
        Arc::new(DieselDepartmentRepository::new(pool)),
        Arc::new(Argon2PasswordHasher),
        EmailPolicy::default(),
        Arc::new(DefaultClock),
    );

    match cli.command {
        Command::Migrate => Ok(()),
        Command::CreateSuperuser(args) => {
            let staff = args.staff;
            let password = read_password(io::stdin().lock())?;
            let request = RegisterAccountRequest {
                input: args.into(),
                password: Some(password),
            };
            let account = service
                .create_superuser(request, staff)
                .await
                .map_err(|err| eyre!("create-superuser failed: {err}"))?;
            println!("created superuser {}", account.id);
            Ok(())
        }
        Command::Activate { roll_number } => set_active(&service, &roll_number, true).await,
        Command::Deactivate { roll_number } => set_active(&service, &roll_number, false).await,
    }
}

async fn set_active(
    service: &impl AccountAdministration,
    roll_number: &str,
    active: bool,
) -> Result<()> {
    service
        .set_active(roll_number, active)
        .await
        .map_err(|err| eyre!("failed to update {roll_number}: {err}"))?;
    let state = if active { "activated" } else { "deactivated" };
    println!("{state} {roll_number}");
    Ok(())
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .or(from_env)
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| eyre!("database URL missing: pass --database-url or set {DATABASE_URL_ENV}"))
}

fn read_password(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .wrap_err("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(eyre!("password must not be empty"));
    }
    Ok(password.to_owned())
}
