use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};
use sales_admin::{keygen, token};
use sales_config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ten years.
const MAX_TOKEN_HOURS: i64 = 87_600;

#[derive(Parser)]
#[command(name = "sales-admin")]
#[command(about = "Administrative tools for the sales API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA key pair for signing tokens
    Genkey {
        /// Directory to write private.pem and public.pem into
        #[arg(short = 'o', long, default_value = ".")]
        out_dir: PathBuf,

        /// Overwrite an existing key pair
        #[arg(long)]
        force: bool,
    },
    /// Mint a signed token
    Gentoken {
        /// Private key file (defaults to SALES_AUTH_PRIVATE_KEY_FILE)
        #[arg(short = 'k', long)]
        private_key_file: Option<PathBuf>,

        /// Key id placed in the token header (defaults to SALES_AUTH_KEY_ID)
        #[arg(long)]
        kid: Option<String>,

        /// Subject of the token
        #[arg(short = 's', long, default_value = "1234567890")]
        subject: String,

        /// Roles granted by the token
        #[arg(short = 'r', long, value_delimiter = ',', default_value = "ADMIN")]
        roles: Vec<String>,

        /// Token lifetime in hours
        #[arg(
            long,
            default_value_t = 8760,
            value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_HOURS)
        )]
        hours: i64,
    },
    /// Apply database migrations
    Migrate,
    /// Load seed data (runs migrations first)
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    match cli.command {
        Commands::Genkey { out_dir, force } => {
            let files = keygen::generate_keypair(&out_dir, force)?;
            println!("private key: {}", files.private.display());
            println!("public key:  {}", files.public.display());
        }
        Commands::Gentoken {
            private_key_file,
            kid,
            subject,
            roles,
            hours,
        } => {
            let file = private_key_file.unwrap_or_else(|| PathBuf::from(&cfg.auth.private_key_file));
            let kid = kid.unwrap_or_else(|| cfg.auth.key_id.clone());
            let token = token::generate_token(
                &file,
                &cfg.auth.algorithm,
                &kid,
                &subject,
                roles,
                Duration::hours(hours),
            )?;
            println!("{token}");
        }
        Commands::Migrate => {
            let pool = sales_db::open(&cfg.db);
            sales_db::wait_ready(&pool, 20)
                .await
                .context("waiting for database")?;
            sales_db::migrate(&pool).await?;
        }
        Commands::Seed => {
            let pool = sales_db::open(&cfg.db);
            sales_db::wait_ready(&pool, 20)
                .await
                .context("waiting for database")?;
            sales_db::migrate(&pool).await?;
            sales_db::seed(&pool).await?;
            info!("seed complete");
        }
    }

    Ok(())
}
