use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "somaflow", version, about = "SomaFlow breathing coach")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the session you would start right now
    Home,
    /// Run a breathing session (Enter pauses/continues, Ctrl-C stops)
    Breathe(commands::breathe::BreatheArgs),
    /// Last session, total sessions and this week's count
    Summary,
    /// Weekly progress and recent sessions
    Progress,
    /// List the available breathing techniques
    Techniques,
    /// Session history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// User preferences
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Device configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SOMAFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Home => commands::home::run(),
        Commands::Breathe(args) => commands::breathe::run(args),
        Commands::Summary => commands::stats::run_summary(),
        Commands::Progress => commands::stats::run_progress(),
        Commands::Techniques => commands::techniques::run(),
        Commands::History { action } => commands::history::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
