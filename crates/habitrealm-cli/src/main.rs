use clap::{Parser, Subcommand};
use habitrealm_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod session;

#[derive(Parser)]
#[command(name = "habitrealm-cli", version, about = "HabitRealm CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management and completion tracking
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Progression account (essence, points, level)
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Trophy catalog and unlock state
    Trophy {
        #[command(subcommand)]
        action: commands::trophy::TrophyAction,
    },
    /// Buy and equip collectibles with spendable points
    Shop {
        #[command(subcommand)]
        action: commands::shop::ShopAction,
    },
    /// Emoji mood journal
    Emoji {
        #[command(subcommand)]
        action: commands::emoji::EmojiAction,
    },
    /// User preferences
    Prefs {
        #[command(subcommand)]
        action: commands::prefs::PrefsAction,
    },
    /// Export, import and wipe
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("HABITREALM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Account { action } => commands::account::run(action),
        Commands::Trophy { action } => commands::trophy::run(action),
        Commands::Shop { action } => commands::shop::run(action),
        Commands::Emoji { action } => commands::emoji::run(action),
        Commands::Prefs { action } => commands::prefs::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
