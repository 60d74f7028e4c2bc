//! `folio` command-line entry point.
//!
//! # Responsibility
//! - Load environment configuration and initialize logging.
//! - Run the HTTP API or perform operator tasks such as admin creation.

use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use folio_api::{AppState, Config};
use folio_core::{
    db::open_db, init_logging, repo::user_repo::find_any_admin, AuthService, Profile,
    SqliteUserRepository, TokenSigner,
};
use log::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio content backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        /// Overrides FOLIO_PORT.
        #[arg(long)]
        port: Option<u16>,

        /// Overrides FOLIO_DB_PATH.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },

    /// Create an admin account in the configured database.
    CreateAdmin {
        #[arg(long, default_value = "admin")]
        username: String,

        #[arg(long)]
        email: String,

        /// Prefer FOLIO_ADMIN_PASSWORD; the flag leaks into shell history.
        #[arg(long, env = "FOLIO_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Overrides FOLIO_DB_PATH.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("folio: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    match cli.command {
        Command::Serve { port, db_path } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(db_path) = db_path {
                config.db_path = db_path;
            }
            config.log_summary();

            let state = AppState::open(config)?;
            folio_api::serve(state).await?;
        }
        Command::CreateAdmin {
            username,
            email,
            password,
            first_name,
            last_name,
            db_path,
        } => {
            if let Some(db_path) = db_path {
                config.db_path = db_path;
            }

            let conn = open_db(&config.db_path)?;
            if let Some(existing) = find_any_admin(&conn)? {
                warn!("event=admin_create module=cli status=warn existing_admin={existing}");
            }

            let signer = TokenSigner::new(&config.jwt_secret, config.token_ttl_days)?;
            let service = AuthService::new(
                SqliteUserRepository::new(&conn),
                signer,
                config.bcrypt_cost,
            );
            let profile = Profile {
                first_name,
                last_name,
                bio: None,
            };
            let admin = service.create_admin(&username, &email, &password, profile)?;

            info!(
                "event=admin_create module=cli status=ok user_id={}",
                admin.id
            );
            println!("Admin user created: {} <{}>", admin.username, admin.email);
        }
    }

    Ok(())
}
