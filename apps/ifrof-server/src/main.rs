mod config;
mod cors;
mod logging;
mod server;
mod signals;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marketplace::{NewUser, Role};
use mimalloc::MiMalloc;
use uuid::Uuid;

use crate::config::{AppConfig, CliOverrides};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// IFROF Server - B2B marketplace connecting buyers with verified factories
#[derive(Parser)]
#[command(name = "ifrof-server")]
#[command(about = "IFROF Server - B2B marketplace connecting buyers with verified factories")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Print a session token for an existing user
    IssueToken {
        /// User id
        #[arg(long)]
        user: Uuid,
    },
    /// Insert a user and print its id and a session token
    CreateUser {
        /// buyer, factory or admin
        #[arg(long, default_value = "buyer")]
        role: Role,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Factory the user belongs to (factory role only)
        #[arg(long)]
        factory: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.to_string_lossy());
    }

    let overrides = CliOverrides { port: cli.port };
    let config = AppConfig::load(cli.config.as_deref(), &overrides)?;

    logging::init(&config.logging, cli.verbose);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "IFROF Server starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => server::run(config).await,
        Commands::Check => check_config(&config),
        Commands::IssueToken { user } => issue_token(&config, user).await,
        Commands::CreateUser {
            role,
            name,
            email,
            factory,
        } => {
            let user = NewUser {
                name,
                email,
                role,
                factory_id: factory,
            };
            create_user(&config, user).await
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    cors::build_cors_layer(&config.cors)?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn issue_token(config: &AppConfig, user_id: Uuid) -> Result<()> {
    let module = server::bootstrap(config).await?;
    let token = module
        .issue_token(user_id)
        .await
        .with_context(|| format!("cannot issue a token for user {user_id}"))?;
    println!("{token}");
    Ok(())
}

async fn create_user(config: &AppConfig, user: NewUser) -> Result<()> {
    let module = server::bootstrap(config).await?;
    let user = module
        .create_user(user)
        .await
        .context("failed to create user")?;
    let token = module.issue_token(user.id).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    println!("id: {}", user.id);
    println!("role: {}", user.role);
    println!("token: {token}");
    Ok(())
}
