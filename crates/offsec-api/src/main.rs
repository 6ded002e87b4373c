use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use offsec_api::AppState;
use offsec_config::OffsecConfig;
use offsec_core::enums::UserRole;
use offsec_db::inputs::NewUser;
use offsec_db::service::OffsecService;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("offsecd error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = OffsecConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(ref path) = cli.database {
        config.database.path.clone_from(path);
    }
    if let Commands::Serve {
        bind: Some(ref bind),
    } = cli.command
    {
        config.server.bind_addr.clone_from(bind);
    }
    config.validate().context("invalid configuration")?;

    let svc = OffsecService::open_local(&config.database.path, config.database.busy_timeout())
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))?;

    match cli.command {
        Commands::Serve { .. } => {
            let addr = config.server.socket_addr()?;
            let state = Arc::new(AppState::new(svc, &config.auth));
            offsec_api::serve(state, addr)
                .await
                .context("server failed")?;
        }
        Commands::BootstrapAdmin {
            name,
            full_name,
            email,
        } => {
            let mut new = NewUser::new(name, UserRole::Admin);
            new.full_name = full_name;
            new.email = email;
            let issued = offsec_auth::bootstrap_admin(&svc, new)
                .await
                .context("bootstrap failed")?;
            println!("Created admin {} ({})", issued.user.name, issued.user.id);
            println!("API token (shown once): {}", issued.token);
        }
        Commands::Migrate => {
            // Opening the database already applied migrations.
            tracing::info!(path = %config.database.path, "migrations applied");
        }
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("OFFSEC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
