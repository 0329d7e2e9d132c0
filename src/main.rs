use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xcur::core::log::init_logging;
use xcur::core::metals::Metal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Serve cached rates only, never touch the network
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        /// Source currency, defaults to `base_currency`
        from: Option<String>,
        /// Target currency, defaults to `target_currency`
        to: Option<String>,
        /// Swap source and target
        #[arg(short, long)]
        swap: bool,
    },
    /// List exchange rates for a base currency
    Rates {
        base: Option<String>,
        /// Filter by code or name
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show gold or silver prices in every currency
    Metal {
        metal: Metal,
        /// Filter by code or name
        #[arg(short, long)]
        query: Option<String>,
        /// Price per gram instead of per troy ounce
        #[arg(short, long)]
        grams: bool,
    },
    /// Pick a currency interactively
    Pick {
        #[arg(short, long)]
        query: Option<String>,
    },
    /// List or toggle favorite currencies
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesCommand>,
    },
    /// Keep favorite rates on screen and refresh on connectivity changes
    Watch { base: Option<String> },
}

#[derive(Subcommand)]
enum FavoritesCommand {
    /// List favorites
    List,
    /// Add or remove a favorite
    Toggle { code: String },
}

impl From<Commands> for xcur::AppCommand {
    fn from(cmd: Commands) -> xcur::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                swap,
            } => xcur::AppCommand::Convert {
                amount,
                from,
                to,
                swap,
            },
            Commands::Rates { base, query } => xcur::AppCommand::Rates { base, query },
            Commands::Metal {
                metal,
                query,
                grams,
            } => xcur::AppCommand::Metal {
                metal,
                query,
                grams,
            },
            Commands::Pick { query } => xcur::AppCommand::Pick { query },
            Commands::Favorites { action } => xcur::AppCommand::Favorites(match action {
                Some(FavoritesCommand::Toggle { code }) => xcur::FavoritesAction::Toggle(code),
                Some(FavoritesCommand::List) | None => xcur::FavoritesAction::List,
            }),
            Commands::Watch { base } => xcur::AppCommand::Watch { base },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xcur::cli::setup::setup(),
        Some(cmd) => {
            xcur::run_command(cmd.into(), cli.config_path.as_deref(), cli.offline).await
        }
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
