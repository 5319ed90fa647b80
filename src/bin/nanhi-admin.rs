//! Operator CLI for nanhi-link.
//!
//! ```bash
//! nanhi-admin key create --owner 6f1c2a9e-0b7d-4c43-9a55-2f1e8d7c6b5a --name CI
//! nanhi-admin key list [--owner <uuid>]
//! nanhi-admin key revoke CI
//! nanhi-admin stats
//! nanhi-admin db check
//! nanhi-admin db migrate
//! ```
//!
//! Uses the server's environment. Key hashes depend on
//! `API_KEY_SIGNING_SECRET`, so the CLI and the server must share it.

use nanhi_link::application::services::AuthService;
use nanhi_link::config::{Config, load_from_env, mask_connection_string};
use nanhi_link::domain::repositories::ApiKey;
use nanhi_link::infrastructure::persistence::PgApiKeyRepository;
use nanhi_link::server::{connect_pool, run_migrations};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "nanhi-admin", version, about = "Operator CLI for nanhi-link")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// API key management
    #[command(subcommand)]
    Key(KeyCommand),
    /// Counts across all owners
    Stats,
    /// Connectivity and schema
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Issue a key for an owner; the raw value is printed once
    Create(CreateKeyArgs),
    /// Show keys, newest first
    List {
        #[arg(short, long)]
        owner: Option<Uuid>,
    },
    /// Revoke a key by numeric id or by name
    Revoke { key: String },
}

#[derive(Args)]
struct CreateKeyArgs {
    #[arg(short, long)]
    owner: Uuid,
    #[arg(short, long)]
    name: Option<String>,
    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    yes: bool,
}

#[derive(Subcommand)]
enum DbCommand {
    Check,
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_from_env().context("Failed to load configuration")?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Command::Key(cmd) => {
            let repo = Arc::new(PgApiKeyRepository::new(Arc::new(pool.clone())));
            let auth = AuthService::new(repo, config.api_key_signing_secret.clone());
            run_key_command(&auth, cmd).await
        }
        Command::Stats => print_stats(&pool).await,
        Command::Db(cmd) => run_db_command(&pool, &config, cmd).await,
    }
}

fn section(title: &str) {
    println!("{}\n", title.bold().underline());
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let answer = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    if !answer {
        eprintln!("{}", "aborted".dimmed());
    }
    Ok(answer)
}

fn timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn key_status(key: &ApiKey) -> ColoredString {
    match key.revoked_at {
        Some(at) => format!("revoked {}", timestamp(Some(at))).red(),
        None => "active".green(),
    }
}

async fn run_key_command(auth: &AuthService, cmd: KeyCommand) -> Result<()> {
    match cmd {
        KeyCommand::Create(args) => create_key(auth, args).await,
        KeyCommand::List { owner } => list_keys(auth, owner).await,
        KeyCommand::Revoke { key } => revoke_key(auth, &key).await,
    }
}

async fn create_key(auth: &AuthService, args: CreateKeyArgs) -> Result<()> {
    section("New API key");

    let name = match args.name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Name")
            .default("default".to_string())
            .interact_text()?,
    };

    println!("owner {}  name {}", args.owner.to_string().cyan(), name.cyan());
    if !args.yes && !confirm("Issue this key?", true)? {
        return Ok(());
    }

    let (key, raw) = auth
        .create_key(args.owner, &name)
        .await
        .map_err(|e| anyhow!("could not create key: {e}"))?;

    println!("\nkey #{} issued", key.id);
    println!("{}", raw.yellow().bold());
    println!(
        "{}",
        "Store it now; only its hash is kept, so it cannot be shown again.".red()
    );
    println!("Send it as the {} header or the api_key query parameter.", "X-API-Key".bold());

    Ok(())
}

async fn list_keys(auth: &AuthService, owner: Option<Uuid>) -> Result<()> {
    section("API keys");

    let keys = auth
        .list_keys(owner)
        .await
        .map_err(|e| anyhow!("could not list keys: {e}"))?;

    if keys.is_empty() {
        println!("{}", "no keys".dimmed());
        return Ok(());
    }

    for key in &keys {
        println!(
            "#{:<5} {:<24} {}  created {}  used {}  {}",
            key.id,
            key.name.cyan(),
            key.owner_id,
            timestamp(Some(key.created_at)),
            timestamp(key.last_used_at),
            key_status(key)
        );
    }
    println!("\n{} key(s)", keys.len());

    Ok(())
}

async fn revoke_key(auth: &AuthService, id_or_name: &str) -> Result<()> {
    let key = auth
        .find_key(id_or_name)
        .await
        .map_err(|e| anyhow!("lookup failed: {e}"))?
        .with_context(|| format!("no key matches '{id_or_name}'"))?;

    if key.revoked_at.is_some() {
        println!("#{} {} is already {}", key.id, key.name, key_status(&key));
        return Ok(());
    }

    println!("#{} {} (owner {})", key.id, key.name.cyan(), key.owner_id);
    if !confirm("Revoke it? Requests using it will fail immediately", false)? {
        return Ok(());
    }

    auth.revoke_key(key.id)
        .await
        .map_err(|e| anyhow!("could not revoke key: {e}"))?;
    println!("{}", "revoked".green());

    Ok(())
}

const STAT_QUERIES: &[(&str, &str)] = &[
    ("links", "SELECT COUNT(*) FROM links WHERE deleted_at IS NULL"),
    ("clicks", "SELECT COUNT(*) FROM link_clicks"),
    ("active keys", "SELECT COUNT(*) FROM api_keys WHERE revoked_at IS NULL"),
];

async fn print_stats(pool: &PgPool) -> Result<()> {
    section("Totals");

    for (label, sql) in STAT_QUERIES {
        let count: i64 = sqlx::query_scalar(*sql)
            .fetch_one(pool)
            .await
            .with_context(|| format!("counting {label}"))?;
        println!("{label:>12}  {}", count.to_string().bold());
    }

    Ok(())
}

async fn run_db_command(pool: &PgPool, config: &Config, cmd: DbCommand) -> Result<()> {
    match cmd {
        DbCommand::Check => {
            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            println!(
                "{} {}\n{}",
                "reachable:".green(),
                mask_connection_string(&config.database_url),
                version.dimmed()
            );
        }
        DbCommand::Migrate => {
            run_migrations(pool).await?;
            println!("{}", "schema up to date".green());
        }
    }

    Ok(())
}
