use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use kursbot::cli::setup::{setup, setup_at_path};
use kursbot::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for kursbot::AppCommand {
    fn from(cmd: Commands) -> kursbot::AppCommand {
        match cmd {
            Commands::Ask { text } => kursbot::AppCommand::Ask(text.join(" ")),
            Commands::Rates { currencies } => kursbot::AppCommand::Rates(currencies),
            Commands::Chat => kursbot::AppCommand::Chat,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Answer one message, e.g. "30 usd и 40 eur в rub"
    Ask {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Show exchange rates to RUB
    Rates {
        /// Currency codes or names; the main currencies when omitted
        currencies: Vec<String>,
    },
    /// Talk to the bot interactively
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => setup_at_path(path),
            None => setup(),
        },
        Some(cmd) => kursbot::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
