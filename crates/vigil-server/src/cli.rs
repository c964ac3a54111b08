use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `vigil` binary.
#[derive(Debug, Parser)]
#[command(name = "vigil", version, about = "Vigil - scan job orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Apply database migrations and exit
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`)
    #[arg(long)]
    pub bind: Option<String>,

    /// Database file (overrides `database.path`)
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Database file (overrides `database.path`)
    #[arg(long)]
    pub database: Option<String>,
}
