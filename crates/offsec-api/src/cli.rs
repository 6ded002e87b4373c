use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `offsecd` binary.
#[derive(Debug, Parser)]
#[command(
    name = "offsecd",
    version,
    about = "Offensive security program tracker API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (overrides `database.path`)
    #[arg(long, global = true)]
    pub database: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Listen address (overrides `server.bind_addr`)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Create the first admin user and print their API token once.
    BootstrapAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Apply schema migrations and exit.
    Migrate,
}
