use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Context;
use dotenvy::dotenv;
use pdf_print_server::{
    auth::hash_password,
    codec::CodecRegistry,
    config::Config,
    models::{NewUser, UserRecord},
    startup::HttpServer,
    utils::state::{self, AppState},
};
use secrecy::SecretString;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Upload and manage PDF print jobs.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Create the database tables
    Syncdb {
        /// Only list the migrations that would run
        #[arg(long)]
        dry_run: bool,
    },
    /// Create the administrator account unless it already exists
    Createsuperuser {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Only report what would be done
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    config_tracing();

    let cli = Cli::parse();
    let config = Config::load().wrap_err("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Syncdb { dry_run } => syncdb(&config, dry_run).await,
        Command::Createsuperuser {
            username,
            email,
            password,
            dry_run,
        } => {
            let username = username.unwrap_or_else(|| config.superuser.username.clone());
            let email = email.unwrap_or_else(|| config.superuser.email.clone());
            let password = password
                .map(SecretString::from)
                .unwrap_or_else(|| config.superuser.password.clone());
            createsuperuser(&config, username, email, password, dry_run).await
        }
    }
}

async fn serve(config: &Config) -> color_eyre::Result<()> {
    let state = state::setup(config)
        .await
        .wrap_err("Failed to set up application state")?;

    let server = HttpServer::new(config, state).await?;
    server.run().await
}

async fn syncdb(config: &Config, dry_run: bool) -> color_eyre::Result<()> {
    let db = state::connect(config).await?;

    if dry_run {
        let pending = state::pending_migrations(&db).await?;
        if pending.is_empty() {
            tracing::info!("database is up to date");
        }
        for name in pending {
            tracing::info!("would apply migration {name}");
        }
        return Ok(());
    }

    state::migrate(&db).await?;
    tracing::info!("database schema is up to date");
    Ok(())
}

async fn createsuperuser(
    config: &Config,
    username: String,
    email: String,
    password: SecretString,
    dry_run: bool,
) -> color_eyre::Result<()> {
    if dry_run {
        tracing::info!("would ensure superuser {username} <{email}> exists");
        return Ok(());
    }

    let db = state::connect(config).await?;
    state::migrate(&db).await?;
    let state = AppState::new(Arc::new(db), config, &CodecRegistry::default())?;

    let password_hash = hash_password(&password).wrap_err("Failed to hash password")?;
    let (user, created) = state
        .user_repo
        .ensure_superuser(NewUser::new(username, email, password_hash))
        .await
        .wrap_err("Failed to provision superuser")?;

    match Provisioned::of(&user, created) {
        Provisioned::Created => tracing::info!("superuser {} created", user.username),
        Provisioned::Existing => {
            tracing::info!("superuser {} already exists, nothing to do", user.username)
        }
        Provisioned::NotAdmin => tracing::warn!(
            "user {} already exists but is not an administrator, left unchanged",
            user.username
        ),
        Provisioned::Inactive => tracing::warn!(
            "superuser {} already exists but is deactivated, left unchanged",
            user.username
        ),
    }
    Ok(())
}

/// Outcome of `createsuperuser` for the account holding the username.
#[derive(Debug, PartialEq, Eq)]
enum Provisioned {
    Created,
    Existing,
    NotAdmin,
    Inactive,
}

impl Provisioned {
    fn of(user: &UserRecord, created: bool) -> Self {
        if created {
            Self::Created
        } else if !user.is_admin {
            Self::NotAdmin
        } else if !user.active {
            Self::Inactive
        } else {
            Self::Existing
        }
    }
}

fn config_tracing() {
    use tracing::Level;
    use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

    let tracing_layer = tracing_subscriber::fmt::layer();
    let filter = filter::Targets::new()
        .with_target("hyper::proto", Level::INFO)
        .with_target("sqlx::query", Level::WARN)
        .with_target("tower_http::trace", Level::DEBUG)
        .with_default(Level::DEBUG);

    tracing_subscriber::registry()
        .with(tracing_layer)
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(active: bool, is_admin: bool) -> UserRecord {
        UserRecord {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            joined_at: Utc::now(),
            active,
            is_admin,
        }
    }

    #[test]
    fn test_provisioned_outcomes() {
        assert_eq!(Provisioned::of(&account(true, true), true), Provisioned::Created);
        assert_eq!(Provisioned::of(&account(true, true), false), Provisioned::Existing);
        assert_eq!(Provisioned::of(&account(true, false), false), Provisioned::NotAdmin);
        assert_eq!(Provisioned::of(&account(false, false), false), Provisioned::NotAdmin);
        assert_eq!(Provisioned::of(&account(false, true), false), Provisioned::Inactive);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["pdf-print-server", "syncdb", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Syncdb { dry_run: true })));

        let cli = Cli::try_parse_from(["pdf-print-server"]).unwrap();
        assert!(cli.command.is_none());
    }
}
