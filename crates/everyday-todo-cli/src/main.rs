use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "everyday-todo", version, about = "Everyday Todo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board for the current moment
    Now(commands::now::NowArgs),
    /// Keep the board on screen, refreshing when the period changes
    Watch(commands::watch::WatchArgs),
    /// Recurring task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// One-time task management
    Once {
        #[command(subcommand)]
        action: commands::once::OnceAction,
    },
    /// Check/uncheck history
    Log {
        #[command(subcommand)]
        action: commands::log::LogCommand,
    },
    /// Time-of-day period management
    Period {
        #[command(subcommand)]
        action: commands::period::PeriodAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Webhook notifications
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Export, import and reset
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("EVERYDAY_TODO_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Now(args) => commands::now::run(args),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Task { action } => commands::task::run(action),
        Commands::Once { action } => commands::once::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Period { action } => commands::period::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "everyday-todo",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
