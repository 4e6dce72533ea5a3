use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "repflow-cli", version, about = "Repflow guided workout CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a guided session in the terminal
    Run(commands::run::RunArgs),
    /// Print the flattened timeline of a workout as JSON
    Timeline(commands::workout::WorkoutArgs),
    /// Print the built-in sample workout as JSON
    Sample,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Timeline(args) => commands::workout::timeline(args),
        Commands::Sample => commands::workout::sample(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
