use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use appcheck::commands::{
    cmd_config_get, cmd_config_set, cmd_config_show, cmd_delete, cmd_export_all, cmd_export_date,
    cmd_export_number, cmd_filter, cmd_ls, cmd_recent, cmd_show, App,
};
use appcheck::config::Config;
use appcheck::Result;

#[derive(Parser)]
#[command(name = "appcheck")]
#[command(about = "Maintenance-application tracker client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show recently updated applications
    #[command(visible_alias = "r")]
    Recent {
        /// How many applications to show
        #[arg(short, long, default_value_t = appcheck::api::DEFAULT_RECENT_LIMIT)]
        limit: usize,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the full collection grouped by day
    Ls {
        /// Output JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Filter applications by free text and/or calendar day
    #[command(visible_alias = "f")]
    Filter {
        /// Search term, matched as a substring across application fields
        term: Option<String>,

        /// Calendar day (YYYY-MM-DD) to match against the last edit
        #[arg(short, long)]
        date: Option<String>,

        /// Export the result set after filtering
        #[arg(long)]
        export: bool,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Display one application
    #[command(visible_alias = "s")]
    Show {
        /// Application id
        id: i64,

        /// Output JSON instead of the detail view
        #[arg(long)]
        json: bool,
    },

    /// Delete an application
    Delete {
        /// Application id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Download Excel exports
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ExportTarget {
    /// Export the entire collection
    All,

    /// Export one application by its number
    Number { number: String },

    /// Export all applications edited on a day (YYYY-MM-DD)
    Date { date: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set { key: String, value: String },

    /// Print a configuration value
    Get { key: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn build_app() -> Result<App> {
    let config = Config::load()?;
    App::from_config(&config)
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "appcheck", &mut std::io::stdout());
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value),
            ConfigAction::Get { key } => cmd_config_get(&key),
        },

        Commands::Recent { limit, json } => {
            let app = build_app()?;
            cmd_recent(&app, limit, json).await
        }

        Commands::Ls { json } => {
            let mut app = build_app()?;
            cmd_ls(&mut app, json).await
        }

        Commands::Filter {
            term,
            date,
            export,
            json,
        } => {
            let mut app = build_app()?;
            cmd_filter(
                &mut app,
                term.as_deref().unwrap_or(""),
                date.as_deref(),
                export,
                json,
            )
            .await
        }

        Commands::Show { id, json } => {
            let app = build_app()?;
            cmd_show(&app, id, json).await
        }

        Commands::Delete { id, yes } => {
            let app = build_app()?;
            cmd_delete(&app, id, yes).await
        }

        Commands::Export { target } => {
            let app = build_app()?;
            match target {
                ExportTarget::All => cmd_export_all(&app).await,
                ExportTarget::Number { number } => cmd_export_number(&app, &number).await,
                ExportTarget::Date { date } => cmd_export_date(&app, &date).await,
            }
        }
    }
}
