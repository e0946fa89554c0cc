//! nssh CLI
//!
//! SSH into cellular devices by name:
//! - connect: resolve a device by name and open a shell through a port mapping
//! - list: show port mappings, all or per device name
//! - interactive: pick an online device from a list and connect to it

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nssh::commands::{self, SessionArgs};
use nssh::context::{AppContext, GlobalOptions};
use nssh::output::print_error;
use nssh_core::config::{ApiVersion, DEFAULT_PROFILE_NAME};
use nssh_core::DEFAULT_LOGIN;

#[derive(Parser)]
#[command(name = "nssh")]
#[command(author, about = "SSH into cellular devices by name")]
struct Cli {
    /// Coverage type (g or jp), overrides the profile
    #[arg(long, global = true)]
    coverage_type: Option<String>,

    /// Profile to load credentials from
    #[arg(long, global = true, default_value = DEFAULT_PROFILE_NAME)]
    profile_name: String,

    /// Directory API variant (sims or subscribers)
    #[arg(long, global = true, env = "NSSH_API", default_value = "sims")]
    api: ApiVersion,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a device by name
    /// Alias: c
    #[command(alias = "c")]
    Connect {
        /// Target as [login@]name
        target: String,
        #[command(flatten)]
        session: SessionArgs,
    },

    /// List port mappings, optionally for devices with a given name
    /// Alias: l
    #[command(alias = "l")]
    List {
        /// Device name
        name: Option<String>,
    },

    /// Pick an online device interactively and connect to it
    /// Alias: i
    #[command(alias = "i")]
    Interactive {
        /// Login user on the device
        #[arg(short = 'u', long, default_value = DEFAULT_LOGIN)]
        login: String,
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Show version information
    /// Alias: v
    #[command(alias = "v")]
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        commands::version_command();
        return Ok(());
    }

    let options = GlobalOptions {
        coverage_type: cli.coverage_type,
        profile_name: cli.profile_name,
        api: cli.api,
    };
    let ctx = AppContext::from_options(&options)
        .await
        .context("Failed to create a client")?;

    match cli.command {
        Commands::Connect { target, session } => {
            commands::connect_command(&ctx, &target, &session).await?;
        }

        Commands::List { name } => {
            commands::list_command(&ctx, name.as_deref()).await?;
        }

        Commands::Interactive { login, session } => {
            commands::interactive_command(&ctx, &login, &session).await?;
        }

        Commands::Version => {}
    }

    Ok(())
}
