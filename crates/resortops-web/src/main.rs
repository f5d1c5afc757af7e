//! ResortOps back-office server.
//!
//! Usage:
//!   resortops [serve]                      run migrations and serve HTTP
//!   resortops migrate                      apply migrations and exit
//!   resortops create-user <name> --role admin
//!
//! Configuration comes from resortops.toml (or the file named by
//! RESORTOPS_CONFIG) plus environment overrides.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use resortops_common::auth::Role;
use resortops_config::Config;
use resortops_db::Database;
use resortops_web::auth::hash_password;
use resortops_web::handlers::auth::MIN_PASSWORD_LEN;
use resortops_web::router::build_router;
use resortops_web::state::AppState;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "resortops", version, about = "Resort back-office server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply migrations, then serve HTTP (default).
    Serve,
    /// Apply pending migrations and exit.
    Migrate,
    /// Create a login.
    CreateUser {
        username: String,
        #[arg(long, default_value = "staff")]
        role: Role,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long, env = "RESORTOPS_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The subscriber goes up before the config is read so its messages are
    // kept; the configured level replaces the default afterwards.
    let (filter, has_env_filter) = startup_filter(EnvFilter::try_from_default_env().ok());
    let (filter, filter_handle) = reload::Layer::new(filter);
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let config = Config::load().context("loading configuration")?;
    if !has_env_filter {
        filter_handle
            .reload(EnvFilter::new(&config.server.log_level))
            .context("applying server.log_level")?;
    }

    info!(version = env!("CARGO_PKG_VERSION"), property = %config.property.name, "ResortOps starting");

    let db = Database::connect(&config.database).await.context("connecting to PostgreSQL")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            db.migrate().await?;
            serve(db, config).await
        }
        Command::Migrate => {
            db.migrate().await?;
            info!("Migrations applied");
            Ok(())
        }
        Command::CreateUser { username, role, full_name, password } => {
            anyhow::ensure!(
                password.chars().count() >= MIN_PASSWORD_LEN,
                "password must be at least {MIN_PASSWORD_LEN} characters"
            );
            let hash = hash_password(&password)?;
            let user = resortops_db::UserRepository::new(Arc::new(db))
                .insert(&username, full_name.as_deref(), &hash, role)
                .await?;
            info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
            Ok(())
        }
    }
}

/// Filter used until the config is read, and whether `RUST_LOG` supplied it.
fn startup_filter(from_env: Option<EnvFilter>) -> (EnvFilter, bool) {
    match from_env {
        Some(filter) => (filter, true),
        None => (EnvFilter::new(DEFAULT_LOG_LEVEL), false),
    }
}

async fn serve(db: Database, config: Config) -> anyhow::Result<()> {
    if !config.drive.is_enabled() {
        tracing::warn!("GOOGLE_DRIVE_TOKEN not set; document uploads are disabled");
    }
    let bind = config.server.bind.clone();
    let app = build_router(AppState::new(Arc::new(db), config));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_filter_prefers_rust_log() {
        let (filter, from_env) = startup_filter(Some(EnvFilter::new("resortops_db=debug")));
        assert!(from_env);
        assert_eq!(filter.to_string(), "resortops_db=debug");

        let (filter, from_env) = startup_filter(None);
        assert!(!from_env);
        assert_eq!(filter.to_string(), DEFAULT_LOG_LEVEL);
    }
}
